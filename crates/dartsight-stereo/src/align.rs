use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

use crate::{Axis, AxisRotation, RigidTransform};

fn default_target_from_camera1() -> RigidTransform {
    RigidTransform::from_translation(Vector3::new(0.0, 0.0, -30.0))
}

fn default_axis_corrections() -> Vec<AxisRotation> {
    vec![
        AxisRotation::new(Axis::Z, 180.0),
        AxisRotation::new(Axis::X, 180.0),
    ]
}

/// Where the target sits relative to camera 1, and how its axes are oriented.
///
/// `axis_corrections` are applied in list order after the recentring
/// transform. The second default correction has not been checked against a
/// physical board; treat the whole list as calibration data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AlignmentConfig {
    /// Maps camera 1 coordinates to coordinates centred on the target.
    #[serde(default = "default_target_from_camera1")]
    pub target_from_camera1: RigidTransform,
    #[serde(default = "default_axis_corrections")]
    pub axis_corrections: Vec<AxisRotation>,
}

impl Default for AlignmentConfig {
    fn default() -> Self {
        Self {
            target_from_camera1: default_target_from_camera1(),
            axis_corrections: default_axis_corrections(),
        }
    }
}

/// In-plane position on the target. The depth axis (`y`) is dropped.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LandingCoordinate {
    pub x: f64,
    pub z: f64,
}

impl LandingCoordinate {
    pub const fn new(x: f64, z: f64) -> Self {
        Self { x, z }
    }
}

/// Ordered sequence of rigid transforms from camera 1's frame to the target
/// frame. Steps are applied front to back.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameAligner {
    steps: Vec<RigidTransform>,
}

impl Default for FrameAligner {
    fn default() -> Self {
        Self::from_config(&AlignmentConfig::default())
    }
}

impl FrameAligner {
    pub fn new(steps: Vec<RigidTransform>) -> Self {
        Self { steps }
    }

    /// Recentre first, then each axis correction in order.
    pub fn from_config(config: &AlignmentConfig) -> Self {
        let steps = std::iter::once(config.target_from_camera1)
            .chain(config.axis_corrections.iter().map(AxisRotation::transform))
            .collect();
        Self { steps }
    }

    pub fn steps(&self) -> &[RigidTransform] {
        &self.steps
    }

    pub fn apply(&self, p: &Point3<f64>) -> Point3<f64> {
        self.steps.iter().fold(*p, |acc, step| step.apply(&acc))
    }

    /// All steps folded into one transform.
    pub fn composed(&self) -> RigidTransform {
        self.steps
            .iter()
            .fold(RigidTransform::identity(), |acc, step| acc.then(step))
    }

    /// Target frame back to camera 1's frame.
    pub fn inverse(&self) -> FrameAligner {
        Self {
            steps: self.steps.iter().rev().map(RigidTransform::inverse).collect(),
        }
    }

    pub fn landing(&self, p: &Point3<f64>) -> LandingCoordinate {
        let aligned = self.apply(p);
        LandingCoordinate::new(aligned.x, aligned.z)
    }
}
