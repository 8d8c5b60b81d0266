//! Per-camera mask stages of the dart locator.
//!
//! For one camera, a throw is reduced to a single pixel in four steps:
//! 1. Threshold the absolute difference between the base and post-throw frames.
//! 2. Open the mask (erode, then dilate) to drop speckle noise.
//! 3. Drop foreground farther than a fixed radius from the foreground centroid.
//! 4. Take the lowest foreground pixel as the dart tip.
//!
//! Every step is a pure function returning a fresh [`BinaryMask`]. The
//! [`TipDetector`] wires them together and turns "nothing left" into a checked
//! [`MaskError::EmptyMask`].
//!
//! ```
//! use dartsight_core::GrayImage;
//! use dartsight_mask::{MaskParams, TipDetector};
//!
//! let base = GrayImage::filled(64, 48, 200);
//! let mut post = base.clone();
//! for y in 10..30 {
//!     for x in 20..24 {
//!         post.set(x, y, 20);
//!     }
//! }
//!
//! let detector = TipDetector::new(MaskParams::default()).unwrap();
//! let diff = detector.difference(&base.view(), &post.view()).unwrap();
//! let trace = detector.refine(diff).unwrap();
//! assert_eq!((trace.tip.x, trace.tip.y), (20, 29));
//! ```
//!
//! [`BinaryMask`]: dartsight_core::BinaryMask

mod cluster;
mod detector;
mod diff;
mod error;
mod morphology;
mod params;
mod tip;

pub use cluster::{centroid, filter_by_centroid};
pub use detector::{MaskStage, MaskTrace, TipDetector};
pub use diff::binary_diff;
pub use error::MaskError;
pub use morphology::{dilate, erode, open, StructuringElement};
pub use params::MaskParams;
pub use tip::locate_tip;
