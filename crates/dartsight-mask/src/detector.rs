use std::fmt;

use dartsight_core::{BinaryMask, GrayImageView, PixelPoint};
use serde::{Deserialize, Serialize};

use crate::{binary_diff, filter_by_centroid, locate_tip, open, MaskError, MaskParams};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// The mask produced by each stage of [`TipDetector`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaskStage {
    Difference,
    Opened,
    Filtered,
}

impl MaskStage {
    pub const ALL: [MaskStage; 3] = [MaskStage::Difference, MaskStage::Opened, MaskStage::Filtered];

    pub fn name(self) -> &'static str {
        match self {
            MaskStage::Difference => "difference",
            MaskStage::Opened => "opening",
            MaskStage::Filtered => "centroid filter",
        }
    }
}

impl fmt::Display for MaskStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// All intermediate masks of one camera plus the located tip.
#[derive(Clone, Debug)]
pub struct MaskTrace {
    pub difference: BinaryMask,
    pub opened: BinaryMask,
    pub filtered: BinaryMask,
    pub tip: PixelPoint,
}

/// Runs the mask stages for one camera.
#[derive(Clone, Debug)]
pub struct TipDetector {
    params: MaskParams,
}

impl TipDetector {
    pub fn new(params: MaskParams) -> Result<Self, MaskError> {
        params.validate()?;
        Ok(Self { params })
    }

    #[inline]
    pub fn params(&self) -> &MaskParams {
        &self.params
    }

    /// Thresholded difference between the base and post-throw frames.
    pub fn difference(
        &self,
        base: &GrayImageView<'_>,
        post: &GrayImageView<'_>,
    ) -> Result<BinaryMask, MaskError> {
        let mask = binary_diff(base, post, self.params.diff_threshold)?;
        log::debug!(
            "difference mask: {} foreground pixels (threshold {})",
            mask.count_foreground(),
            self.params.diff_threshold
        );
        Ok(mask)
    }

    pub fn denoise(&self, mask: &BinaryMask) -> BinaryMask {
        let opened = open(mask, self.params.structuring_element);
        log::debug!(
            "opening {}x{}: {} -> {} foreground pixels",
            self.params.structuring_element.width,
            self.params.structuring_element.height,
            mask.count_foreground(),
            opened.count_foreground()
        );
        opened
    }

    pub fn isolate(&self, mask: &BinaryMask) -> BinaryMask {
        filter_by_centroid(mask, self.params.cluster_radius_px)
    }

    /// Denoise, isolate and locate the tip in a difference mask.
    pub fn refine(&self, difference: BinaryMask) -> Result<MaskTrace, MaskError> {
        self.refine_with(difference, |_, _| {})
    }

    /// Like [`TipDetector::refine`], reporting every mask to `on_stage` as soon
    /// as it exists, including the one that turned out empty.
    #[cfg_attr(feature = "tracing", instrument(level = "debug", skip_all))]
    pub fn refine_with(
        &self,
        difference: BinaryMask,
        mut on_stage: impl FnMut(MaskStage, &BinaryMask),
    ) -> Result<MaskTrace, MaskError> {
        on_stage(MaskStage::Difference, &difference);
        require_foreground(&difference, MaskStage::Difference)?;

        let opened = self.denoise(&difference);
        on_stage(MaskStage::Opened, &opened);
        require_foreground(&opened, MaskStage::Opened)?;

        let filtered = self.isolate(&opened);
        on_stage(MaskStage::Filtered, &filtered);
        let tip = locate_tip(&filtered).ok_or(MaskError::EmptyMask {
            stage: MaskStage::Filtered,
        })?;
        log::debug!("tip at ({}, {})", tip.x, tip.y);

        Ok(MaskTrace {
            difference,
            opened,
            filtered,
            tip,
        })
    }
}

fn require_foreground(mask: &BinaryMask, stage: MaskStage) -> Result<(), MaskError> {
    if mask.has_foreground() {
        Ok(())
    } else {
        Err(MaskError::EmptyMask { stage })
    }
}
