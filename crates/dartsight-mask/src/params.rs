use serde::{Deserialize, Serialize};

use crate::{MaskError, StructuringElement};

fn default_diff_threshold() -> u8 {
    30
}

fn default_cluster_radius_px() -> f64 {
    170.0
}

/// Configuration for the per-camera mask stages.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MaskParams {
    /// A pixel becomes foreground when the absolute gray-level difference
    /// between the base and post-throw frames is strictly above this value.
    #[serde(default = "default_diff_threshold")]
    pub diff_threshold: u8,
    /// Element used for the opening that removes speckle noise.
    #[serde(default)]
    pub structuring_element: StructuringElement,
    /// Foreground farther than this many pixels from the centroid of the
    /// opened mask is discarded.
    #[serde(default = "default_cluster_radius_px")]
    pub cluster_radius_px: f64,
}

impl Default for MaskParams {
    fn default() -> Self {
        Self {
            diff_threshold: default_diff_threshold(),
            structuring_element: StructuringElement::default(),
            cluster_radius_px: default_cluster_radius_px(),
        }
    }
}

impl MaskParams {
    pub fn validate(&self) -> Result<(), MaskError> {
        let se = self.structuring_element;
        if se.width == 0 || se.height == 0 {
            return Err(MaskError::InvalidStructuringElement {
                width: se.width,
                height: se.height,
            });
        }
        if !self.cluster_radius_px.is_finite() || self.cluster_radius_px < 0.0 {
            return Err(MaskError::InvalidClusterRadius(self.cluster_radius_px));
        }
        Ok(())
    }
}
