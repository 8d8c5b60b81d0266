//! Locator configuration and its JSON form.

use std::{fs, path::Path};

use dartsight_core::{CameraId, StereoPair};
use dartsight_mask::MaskParams;
use dartsight_stereo::{
    AlignmentConfig, Axis, AxisRotation, CameraIntrinsics, CameraModel, RigidTransform,
    TriangulationParams,
};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::capture::CaptureParams;
use crate::LocateError;

#[derive(thiserror::Error, Debug)]
pub enum ConfigIoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Intrinsics of the first deployed camera, from a chessboard calibration.
pub const CAMERA1_INTRINSICS: CameraIntrinsics =
    CameraIntrinsics::new(459.447_322_53, 462.620_713_83, 339.568_881_57, 222.543_415_88);

/// Intrinsics of the second deployed camera.
pub const CAMERA2_INTRINSICS: CameraIntrinsics =
    CameraIntrinsics::new(458.809_170_86, 462.447_820_24, 360.127_524_69, 194.388_163_58);

/// The deployed rig: camera 1 defines the world frame, camera 2 is turned a
/// quarter turn about `y` and offset by `(-30, 0, -30)`.
pub fn default_cameras() -> StereoPair<CameraModel> {
    StereoPair::new(
        CameraModel::new(CAMERA1_INTRINSICS, RigidTransform::identity()),
        CameraModel::new(
            CAMERA2_INTRINSICS,
            RigidTransform::new(
                AxisRotation::new(Axis::Y, 90.0).matrix(),
                Vector3::new(-30.0, 0.0, -30.0),
            ),
        ),
    )
}

/// Everything the locator reads. Loaded once, never mutated by the pipeline.
///
/// Every section falls back to its default when missing from the JSON, so a
/// config file only needs to carry what differs from the deployed rig.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LocatorConfig {
    #[serde(default)]
    pub mask: MaskParams,
    #[serde(default = "default_cameras")]
    pub cameras: StereoPair<CameraModel>,
    #[serde(default)]
    pub triangulation: TriangulationParams,
    #[serde(default)]
    pub alignment: AlignmentConfig,
    #[serde(default)]
    pub capture: CaptureParams,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            mask: MaskParams::default(),
            cameras: default_cameras(),
            triangulation: TriangulationParams::default(),
            alignment: AlignmentConfig::default(),
            capture: CaptureParams::default(),
        }
    }
}

impl LocatorConfig {
    /// Load a JSON config from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ConfigIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this config to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), ConfigIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), LocateError> {
        self.mask.validate().map_err(LocateError::InvalidMaskParams)?;
        self.triangulation
            .validate()
            .map_err(LocateError::InvalidTriangulationParams)?;
        for camera in CameraId::ALL {
            self.cameras[camera]
                .validate()
                .map_err(|source| LocateError::InvalidCamera { camera, source })?;
        }
        Ok(())
    }
}
