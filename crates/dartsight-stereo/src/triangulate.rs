//! Linear two-view triangulation.
//!
//! Each observation contributes the two rows `x * P3 - P1` and `y * P3 - P2`
//! of the homogeneous system `A X = 0`, where `P = [R | T]` and `(x, y)` is
//! the observation in normalized image coordinates (`K^-1` applied). Rows are
//! scaled to unit norm and the solution is the right singular vector of the
//! smallest singular value. Working in normalized coordinates keeps `A` well
//! conditioned regardless of focal length.

use dartsight_core::{CameraId, StereoPair};
use nalgebra::{Matrix4, Point2, Point3, RowVector4};
use serde::{Deserialize, Serialize};

use crate::CameraModel;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Errors returned by [`triangulate`].
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum TriangulationError {
    #[error("camera centers coincide (baseline {baseline:.3e})")]
    CoincidentCameraCenters { baseline: f64 },
    #[error("viewing rays are parallel (angle {angle_deg:.4} deg)")]
    ParallelRays { angle_deg: f64 },
    #[error("{camera} has invalid intrinsics")]
    InvalidIntrinsics { camera: CameraId },
    #[error("triangulated point is at infinity")]
    PointAtInfinity,
    #[error("svd failed during triangulation")]
    SolverFailed,
    #[error("{name} must be finite and positive (got {value})")]
    InvalidParams { name: &'static str, value: f64 },
}

/// Baselines at or below this are coincident whatever the configured minimum.
const BASELINE_FLOOR: f64 = f64::EPSILON;
/// Ray angles at or below this are parallel whatever the configured minimum.
const RAY_ANGLE_FLOOR_DEG: f64 = 1e-9;

fn default_min_baseline() -> f64 {
    1e-6
}

fn default_min_ray_angle_deg() -> f64 {
    0.1
}

/// Conditioning thresholds for [`triangulate`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TriangulationParams {
    /// Minimum distance between the two optical centers, in world units.
    #[serde(default = "default_min_baseline")]
    pub min_baseline: f64,
    /// Minimum angle between the two viewing rays.
    #[serde(default = "default_min_ray_angle_deg")]
    pub min_ray_angle_deg: f64,
}

impl TriangulationParams {
    pub fn validate(&self) -> Result<(), TriangulationError> {
        for (name, value) in [
            ("min_baseline", self.min_baseline),
            ("min_ray_angle_deg", self.min_ray_angle_deg),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(TriangulationError::InvalidParams { name, value });
            }
        }
        Ok(())
    }
}

impl Default for TriangulationParams {
    fn default() -> Self {
        Self {
            min_baseline: default_min_baseline(),
            min_ray_angle_deg: default_min_ray_angle_deg(),
        }
    }
}

/// Result of a successful triangulation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Triangulation {
    /// The point in camera 1's frame.
    pub point: Point3<f64>,
    /// The point in the world frame the camera poses are expressed in.
    pub world: Point3<f64>,
    /// Angle between the two viewing rays.
    pub ray_angle_deg: f64,
    /// Distance in pixels between each observation and the reprojected point.
    pub reprojection_error_px: StereoPair<f64>,
}

/// Triangulate one point seen at `pixels` by the two `cameras`.
///
/// Deterministic: the same inputs always give the same point. Points behind
/// a camera are not rejected, only ill-conditioned configurations are.
#[cfg_attr(feature = "tracing", instrument(level = "debug", skip(cameras, params)))]
pub fn triangulate(
    cameras: &StereoPair<CameraModel>,
    pixels: StereoPair<Point2<f64>>,
    params: &TriangulationParams,
) -> Result<Triangulation, TriangulationError> {
    for (camera, model) in cameras.iter() {
        if !model.intrinsics.is_valid() {
            return Err(TriangulationError::InvalidIntrinsics { camera });
        }
    }

    // `f64::max` ignores a NaN operand, so a broken threshold falls back to
    // the floor.
    let min_baseline = params.min_baseline.max(BASELINE_FLOOR);
    let min_ray_angle_deg = params.min_ray_angle_deg.max(RAY_ANGLE_FLOOR_DEG);

    let baseline = (cameras.first.center() - cameras.second.center()).norm();
    if baseline.is_nan() || baseline <= min_baseline {
        return Err(TriangulationError::CoincidentCameraCenters { baseline });
    }

    let d1 = cameras.first.ray_direction(pixels.first);
    let d2 = cameras.second.ray_direction(pixels.second);
    let ray_angle_deg = d1.dot(&d2).abs().min(1.0).acos().to_degrees();
    if ray_angle_deg.is_nan() || ray_angle_deg <= min_ray_angle_deg {
        return Err(TriangulationError::ParallelRays {
            angle_deg: ray_angle_deg,
        });
    }

    let mut a = Matrix4::<f64>::zeros();
    for (k, (camera, model)) in cameras.iter().enumerate() {
        let n = model.intrinsics.pixel_to_normalized(pixels[camera]);
        let p = model.extrinsic_matrix();
        let rows = [
            p.row(2) * n.x - p.row(0),
            p.row(2) * n.y - p.row(1),
        ];
        for (j, row) in rows.iter().enumerate() {
            let norm = row.norm();
            let row: RowVector4<f64> = if norm > 0.0 { row / norm } else { *row };
            a.set_row(2 * k + j, &row);
        }
    }

    let svd = a.svd(false, true);
    let v_t = svd.v_t.ok_or(TriangulationError::SolverFailed)?;
    let smallest = svd.singular_values.imin();
    let x_h = v_t.row(smallest);

    let w = x_h[3];
    let scale = (x_h[0] * x_h[0] + x_h[1] * x_h[1] + x_h[2] * x_h[2]).sqrt();
    if !w.is_finite() || w.abs() <= 1e-12 * scale.max(1.0) {
        return Err(TriangulationError::PointAtInfinity);
    }
    let world = Point3::new(x_h[0] / w, x_h[1] / w, x_h[2] / w);
    let point = cameras.first.pose.apply(&world);

    let reprojection_error_px = StereoPair::from_fn(|camera| {
        cameras[camera]
            .project(&world)
            .map(|px| (px - pixels[camera]).norm())
            .unwrap_or(f64::INFINITY)
    });

    for (camera, model) in cameras.iter() {
        if model.depth(&world) <= 0.0 {
            log::debug!("triangulated point lies behind {camera}");
        }
    }
    log::debug!(
        "triangulated ({:.3}, {:.3}, {:.3}) in camera 1 frame, ray angle {:.2} deg, reprojection error {:.3} / {:.3} px",
        point.x,
        point.y,
        point.z,
        ray_angle_deg,
        reprojection_error_px.first,
        reprojection_error_px.second
    );

    Ok(Triangulation {
        point,
        world,
        ray_angle_deg,
        reprojection_error_px,
    })
}
