use nalgebra::{Matrix3, Matrix3x4, Point2, Point3, Vector3};
use serde::{Deserialize, Serialize};

use crate::RigidTransform;

/// Pinhole intrinsics in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraIntrinsics {
    pub fx: f64,
    pub fy: f64,
    pub cx: f64,
    pub cy: f64,
    #[serde(default)]
    pub skew: f64,
}

impl CameraIntrinsics {
    pub const fn new(fx: f64, fy: f64, cx: f64, cy: f64) -> Self {
        Self {
            fx,
            fy,
            cx,
            cy,
            skew: 0.0,
        }
    }

    /// Read intrinsics from an upper-triangular `K`.
    pub fn from_matrix(k: &Matrix3<f64>) -> Self {
        Self {
            fx: k[(0, 0)],
            fy: k[(1, 1)],
            cx: k[(0, 2)],
            cy: k[(1, 2)],
            skew: k[(0, 1)],
        }
    }

    pub fn matrix(&self) -> Matrix3<f64> {
        Matrix3::new(
            self.fx, self.skew, self.cx, //
            0.0, self.fy, self.cy, //
            0.0, 0.0, 1.0,
        )
    }

    /// Returns `true` when all entries are finite and focal lengths are non-zero.
    pub fn is_valid(&self) -> bool {
        [self.fx, self.fy, self.cx, self.cy, self.skew]
            .iter()
            .all(|v| v.is_finite())
            && self.fx.abs() > 1e-12
            && self.fy.abs() > 1e-12
    }

    /// `K^-1 * [u, v, 1]`, i.e. the normalized image point at depth 1.
    pub fn pixel_to_normalized(&self, pixel: Point2<f64>) -> Point2<f64> {
        let y = (pixel.y - self.cy) / self.fy;
        let x = (pixel.x - self.cx - self.skew * y) / self.fx;
        Point2::new(x, y)
    }

    pub fn normalized_to_pixel(&self, n: Point2<f64>) -> Point2<f64> {
        Point2::new(
            self.fx * n.x + self.skew * n.y + self.cx,
            self.fy * n.y + self.cy,
        )
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum CameraModelError {
    #[error("intrinsics must be finite with non-zero focal lengths")]
    InvalidIntrinsics,
    #[error("pose rotation is not a proper rotation matrix")]
    InvalidRotation,
    #[error("pose translation is not finite")]
    InvalidTranslation,
}

/// Calibrated pinhole camera.
///
/// `pose` maps world coordinates into this camera's frame:
/// `x_cam = pose.rotation * x_world + pose.translation`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraModel {
    pub intrinsics: CameraIntrinsics,
    #[serde(default)]
    pub pose: RigidTransform,
}

impl CameraModel {
    pub fn new(intrinsics: CameraIntrinsics, pose: RigidTransform) -> Self {
        Self { intrinsics, pose }
    }

    pub fn validate(&self) -> Result<(), CameraModelError> {
        if !self.intrinsics.is_valid() {
            return Err(CameraModelError::InvalidIntrinsics);
        }
        if !self.pose.is_proper_rotation(1e-6) {
            return Err(CameraModelError::InvalidRotation);
        }
        if !self.pose.translation.iter().all(|v| v.is_finite()) {
            return Err(CameraModelError::InvalidTranslation);
        }
        Ok(())
    }

    /// `[R | T]`, the pose part of the projection.
    pub fn extrinsic_matrix(&self) -> Matrix3x4<f64> {
        let mut m = Matrix3x4::zeros();
        m.fixed_view_mut::<3, 3>(0, 0).copy_from(&self.pose.rotation);
        m.fixed_view_mut::<3, 1>(0, 3).copy_from(&self.pose.translation);
        m
    }

    /// Full projection matrix `K [R | T]`.
    pub fn projection_matrix(&self) -> Matrix3x4<f64> {
        self.intrinsics.matrix() * self.extrinsic_matrix()
    }

    /// Optical center in world coordinates, `-R^T T`.
    pub fn center(&self) -> Point3<f64> {
        Point3::from(-(self.pose.rotation.transpose() * self.pose.translation))
    }

    /// Signed depth of a world point along the optical axis.
    pub fn depth(&self, world: &Point3<f64>) -> f64 {
        self.pose.apply(world).z
    }

    /// Pixel of a world point. `None` when the point lies in the camera's
    /// focal plane.
    pub fn project(&self, world: &Point3<f64>) -> Option<Point2<f64>> {
        let c = self.pose.apply(world);
        if c.z.abs() < 1e-12 {
            return None;
        }
        Some(
            self.intrinsics
                .normalized_to_pixel(Point2::new(c.x / c.z, c.y / c.z)),
        )
    }

    /// Unit direction, in world coordinates, of the ray through `pixel`.
    pub fn ray_direction(&self, pixel: Point2<f64>) -> Vector3<f64> {
        let n = self.intrinsics.pixel_to_normalized(pixel);
        (self.pose.rotation.transpose() * Vector3::new(n.x, n.y, 1.0)).normalize()
    }
}
