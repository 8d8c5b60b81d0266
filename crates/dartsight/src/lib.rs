//! Locate where a dart landed on a target from two calibrated cameras.
//!
//! One throw is one run of the pipeline: a "before" and an "after" frame
//! from each camera go in, and either a [`LandingCoordinate`] or `None` (no
//! visible dart, i.e. a miss) comes out.
//!
//! ## Quickstart
//!
//! ```no_run
//! use dartsight::{detect, DartLocator, LocatorConfig, StereoPair};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let base = StereoPair::new(
//!     detect::load_frame("cam1_base.png")?,
//!     detect::load_frame("cam2_base.png")?,
//! );
//! let post = StereoPair::new(
//!     detect::load_frame("cam1_post.png")?,
//!     detect::load_frame("cam2_post.png")?,
//! );
//!
//! let locator = DartLocator::new(LocatorConfig::default())?;
//! match locator.locate(&base, &post)? {
//!     Some(dart) => println!("x = {:.1}, z = {:.1}", dart.landing.x, dart.landing.z),
//!     None => println!("miss"),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `dartsight::core`: frames, binary masks, the two-camera [`StereoPair`].
//! - `dartsight::mask`: differencing, opening, centroid filtering, tip.
//! - `dartsight::stereo`: camera models, triangulation, target alignment.
//! - [`DartLocator`] / [`locate_dart`]: the whole pipeline.
//! - [`StageObserver`]: intermediate masks and points, for debugging.
//! - [`StereoCapture`]: warm-up aware capture from any [`FrameSource`].
//! - `dartsight::detect` (feature `image`): file I/O and PNG debug dumps.
//!
//! With the `rayon` feature the two cameras' mask stages run in parallel.

pub use dartsight_core as core;
pub use dartsight_mask as mask;
pub use dartsight_stereo as stereo;

pub use dartsight_core::{BinaryMask, CameraId, Frame, PixelPoint, StereoPair};
pub use dartsight_mask::MaskStage;
pub use dartsight_stereo::{LandingCoordinate, Triangulation};

mod capture;
mod config;
mod error;
mod observer;
mod pipeline;
mod report;

pub use capture::{CaptureError, CaptureParams, FrameQueue, FrameSource, StereoCapture};
pub use config::{
    default_cameras, ConfigIoError, LocatorConfig, CAMERA1_INTRINSICS, CAMERA2_INTRINSICS,
};
pub use error::{FrameRole, LocateError};
pub use observer::{NoopObserver, RecordingObserver, StageEvent, StageObserver};
pub use pipeline::{locate_dart, DartLocation, DartLocator};
pub use report::{LocateReport, LocateStatus, StageCounts};

#[cfg(feature = "image")]
pub mod detect;
