//! Core types shared by the `dartsight-*` crates.
//!
//! This crate is intentionally small. It knows about pixels, masks and the
//! fact that there are exactly two cameras, and nothing about how a dart is
//! found or triangulated.

mod image;
mod logger;
mod mask;
mod stereo_pair;

pub use image::{ColorImage, Frame, GrayImage, GrayImageView, ImageError};
pub use mask::{BinaryMask, PixelPoint, BACKGROUND, FOREGROUND};
pub use stereo_pair::{CameraId, StereoPair};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::init_with_level;
