use std::fmt;

use dartsight_core::{CameraId, ImageError};
use dartsight_mask::{MaskError, MaskStage};
use dartsight_stereo::{CameraModelError, TriangulationError};

use crate::capture::CaptureError;

/// Which of a camera's two frames an error refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameRole {
    Base,
    Post,
}

impl fmt::Display for FrameRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FrameRole::Base => "base",
            FrameRole::Post => "post-throw",
        })
    }
}

/// Errors produced while locating one throw.
///
/// A throw that left no visible difference is not an error: the locator
/// returns `Ok(None)` for it.
#[derive(thiserror::Error, Debug)]
pub enum LocateError {
    #[error("{camera} {role} frame is {width}x{height}, expected {expected_width}x{expected_height}")]
    FrameSizeMismatch {
        camera: CameraId,
        role: FrameRole,
        width: usize,
        height: usize,
        expected_width: usize,
        expected_height: usize,
    },

    #[error("{camera} {role} frame is malformed: {source}")]
    InvalidFrame {
        camera: CameraId,
        role: FrameRole,
        source: ImageError,
    },

    /// Denoising or centroid filtering removed the whole difference.
    #[error("{camera}: no foreground left after the {stage} stage")]
    EmptyMask { camera: CameraId, stage: MaskStage },

    #[error("{camera}: {source}")]
    Mask { camera: CameraId, source: MaskError },

    #[error("invalid mask parameters: {0}")]
    InvalidMaskParams(#[source] MaskError),

    #[error("invalid triangulation parameters: {0}")]
    InvalidTriangulationParams(#[source] TriangulationError),

    #[error("{camera} model is invalid: {source}")]
    InvalidCamera {
        camera: CameraId,
        source: CameraModelError,
    },

    #[error(transparent)]
    Triangulation(#[from] TriangulationError),

    #[error(transparent)]
    Capture(#[from] CaptureError),
}

impl LocateError {
    pub(crate) fn from_mask(camera: CameraId, err: MaskError) -> Self {
        match err {
            MaskError::EmptyMask { stage } => LocateError::EmptyMask { camera, stage },
            source => LocateError::Mask { camera, source },
        }
    }
}
