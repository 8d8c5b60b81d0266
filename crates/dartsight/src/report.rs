//! Serializable summary of one locator run.

use std::{fs, path::Path};

use dartsight_core::{BinaryMask, CameraId, PixelPoint, StereoPair};
use dartsight_mask::MaskStage;
use dartsight_stereo::{LandingCoordinate, Triangulation};
use nalgebra::Point3;
use serde::{Deserialize, Serialize};

use crate::{ConfigIoError, DartLocation, LocateError, StageObserver};

/// Foreground pixel count after each mask stage. `None` for stages that
/// never ran.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageCounts {
    #[serde(default)]
    pub difference: Option<usize>,
    #[serde(default)]
    pub opened: Option<usize>,
    #[serde(default)]
    pub filtered: Option<usize>,
}

impl StageCounts {
    fn slot(&mut self, stage: MaskStage) -> &mut Option<usize> {
        match stage {
            MaskStage::Difference => &mut self.difference,
            MaskStage::Opened => &mut self.opened,
            MaskStage::Filtered => &mut self.filtered,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocateStatus {
    Located,
    Miss,
    Failed,
}

/// Filled in as a [`StageObserver`], then closed with
/// [`LocateReport::finish`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LocateReport {
    #[serde(default)]
    pub status: Option<LocateStatus>,
    #[serde(default)]
    pub foreground: StereoPair<StageCounts>,
    #[serde(default)]
    pub tips: StereoPair<Option<PixelPoint>>,
    /// Triangulated point in camera 1's frame.
    #[serde(default)]
    pub point: Option<Point3<f64>>,
    /// The same point in the target frame.
    #[serde(default)]
    pub aligned: Option<Point3<f64>>,
    #[serde(default)]
    pub landing: Option<LandingCoordinate>,
    #[serde(default)]
    pub ray_angle_deg: Option<f64>,
    #[serde(default)]
    pub reprojection_error_px: Option<StereoPair<f64>>,
    #[serde(default)]
    pub error: Option<String>,
}

impl LocateReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome returned by the locator.
    pub fn finish(&mut self, result: &Result<Option<DartLocation>, LocateError>) {
        match result {
            Ok(Some(location)) => {
                self.status = Some(LocateStatus::Located);
                self.landing = Some(location.landing);
                self.error = None;
            }
            Ok(None) => {
                self.status = Some(LocateStatus::Miss);
                self.error = None;
            }
            Err(err) => self.set_error(err),
        }
    }

    pub fn set_error(&mut self, err: &LocateError) {
        self.status = Some(LocateStatus::Failed);
        self.error = Some(err.to_string());
    }

    /// Write this report to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), ConfigIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

impl StageObserver for LocateReport {
    fn on_mask(&mut self, camera: CameraId, stage: MaskStage, mask: &BinaryMask) {
        *self.foreground[camera].slot(stage) = Some(mask.count_foreground());
    }

    fn on_tip(&mut self, camera: CameraId, tip: PixelPoint) {
        self.tips[camera] = Some(tip);
    }

    fn on_triangulated(&mut self, triangulation: &Triangulation) {
        self.point = Some(triangulation.point);
        self.ray_angle_deg = Some(triangulation.ray_angle_deg);
        self.reprojection_error_px = Some(triangulation.reprojection_error_px);
    }

    fn on_aligned(&mut self, aligned: &Point3<f64>, landing: LandingCoordinate) {
        self.aligned = Some(*aligned);
        self.landing = Some(landing);
    }
}
