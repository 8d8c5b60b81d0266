use dartsight_core::ImageError;

use crate::MaskStage;

/// Errors returned by the mask stages.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum MaskError {
    #[error("frame dimensions differ (base {base_width}x{base_height}, post {post_width}x{post_height})")]
    DimensionMismatch {
        base_width: usize,
        base_height: usize,
        post_width: usize,
        post_height: usize,
    },
    #[error("{0}")]
    Buffer(#[from] ImageError),
    #[error("structuring element must be at least 1x1 (got {width}x{height})")]
    InvalidStructuringElement { width: usize, height: usize },
    #[error("cluster radius must be finite and non-negative (got {0})")]
    InvalidClusterRadius(f64),
    #[error("no foreground left after the {stage} stage")]
    EmptyMask { stage: MaskStage },
}
