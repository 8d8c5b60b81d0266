use nalgebra::{Matrix3, Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Coordinate axis used by [`AxisRotation`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
    Z,
}

/// Right-handed rotation about one coordinate axis, in degrees.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AxisRotation {
    pub axis: Axis,
    pub degrees: f64,
}

impl AxisRotation {
    pub const fn new(axis: Axis, degrees: f64) -> Self {
        Self { axis, degrees }
    }

    pub fn matrix(&self) -> Matrix3<f64> {
        let (s, c) = sin_cos_deg(self.degrees);
        match self.axis {
            Axis::X => Matrix3::new(
                1.0, 0.0, 0.0, //
                0.0, c, -s, //
                0.0, s, c,
            ),
            Axis::Y => Matrix3::new(
                c, 0.0, s, //
                0.0, 1.0, 0.0, //
                -s, 0.0, c,
            ),
            Axis::Z => Matrix3::new(
                c, -s, 0.0, //
                s, c, 0.0, //
                0.0, 0.0, 1.0,
            ),
        }
    }

    pub fn transform(&self) -> RigidTransform {
        RigidTransform::from_rotation(self.matrix())
    }
}

/// Quarter turns come out exact so that axis flips do not leak `1e-17` terms.
fn sin_cos_deg(degrees: f64) -> (f64, f64) {
    let quarter = degrees / 90.0;
    if quarter.fract() == 0.0 {
        match (quarter as i64).rem_euclid(4) {
            0 => (0.0, 1.0),
            1 => (1.0, 0.0),
            2 => (0.0, -1.0),
            _ => (-1.0, 0.0),
        }
    } else {
        degrees.to_radians().sin_cos()
    }
}

/// `p' = rotation * p + translation`.
///
/// Serialized as a row-major `rotation` array and a `translation` triple.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "RigidTransformRepr", into = "RigidTransformRepr")]
pub struct RigidTransform {
    pub rotation: Matrix3<f64>,
    pub translation: Vector3<f64>,
}

#[derive(Clone, Copy, Serialize, Deserialize)]
struct RigidTransformRepr {
    rotation: [[f64; 3]; 3],
    translation: [f64; 3],
}

impl From<RigidTransformRepr> for RigidTransform {
    fn from(r: RigidTransformRepr) -> Self {
        Self::from_rows(r.rotation, r.translation)
    }
}

impl From<RigidTransform> for RigidTransformRepr {
    fn from(t: RigidTransform) -> Self {
        Self {
            rotation: t.rotation_rows(),
            translation: [t.translation.x, t.translation.y, t.translation.z],
        }
    }
}

impl Default for RigidTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl RigidTransform {
    pub fn new(rotation: Matrix3<f64>, translation: Vector3<f64>) -> Self {
        Self {
            rotation,
            translation,
        }
    }

    pub fn identity() -> Self {
        Self::new(Matrix3::identity(), Vector3::zeros())
    }

    pub fn from_rotation(rotation: Matrix3<f64>) -> Self {
        Self::new(rotation, Vector3::zeros())
    }

    pub fn from_translation(translation: Vector3<f64>) -> Self {
        Self::new(Matrix3::identity(), translation)
    }

    pub fn from_rows(rotation: [[f64; 3]; 3], translation: [f64; 3]) -> Self {
        let r = rotation;
        Self::new(
            Matrix3::new(
                r[0][0], r[0][1], r[0][2], //
                r[1][0], r[1][1], r[1][2], //
                r[2][0], r[2][1], r[2][2],
            ),
            Vector3::from(translation),
        )
    }

    pub fn rotation_rows(&self) -> [[f64; 3]; 3] {
        let r = &self.rotation;
        [
            [r[(0, 0)], r[(0, 1)], r[(0, 2)]],
            [r[(1, 0)], r[(1, 1)], r[(1, 2)]],
            [r[(2, 0)], r[(2, 1)], r[(2, 2)]],
        ]
    }

    #[inline]
    pub fn apply(&self, p: &Point3<f64>) -> Point3<f64> {
        Point3::from(self.rotation * p.coords + self.translation)
    }

    /// `self` first, then `next`.
    pub fn then(&self, next: &RigidTransform) -> RigidTransform {
        RigidTransform::new(
            next.rotation * self.rotation,
            next.rotation * self.translation + next.translation,
        )
    }

    /// Exact inverse, assuming `rotation` is orthonormal.
    pub fn inverse(&self) -> RigidTransform {
        let rt = self.rotation.transpose();
        RigidTransform::new(rt, -(rt * self.translation))
    }

    /// `true` when `rotation` is orthonormal with determinant +1 within `tol`.
    pub fn is_proper_rotation(&self, tol: f64) -> bool {
        let r = &self.rotation;
        let ortho = (r.transpose() * r - Matrix3::identity()).amax();
        ortho <= tol && (r.determinant() - 1.0).abs() <= tol
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn quarter_turns_are_exact() {
        let rz = AxisRotation::new(Axis::Z, 90.0).matrix();
        assert_eq!(rz * Vector3::x(), Vector3::y());
        let ry = AxisRotation::new(Axis::Y, 90.0).matrix();
        assert_eq!(ry * Vector3::z(), Vector3::x());
        let rx = AxisRotation::new(Axis::X, -270.0).matrix();
        assert_eq!(rx * Vector3::y(), Vector3::z());
        let half = AxisRotation::new(Axis::X, 180.0).matrix();
        assert_eq!(half, Matrix3::from_diagonal(&Vector3::new(1.0, -1.0, -1.0)));
    }

    #[test]
    fn arbitrary_angle_matches_trig() {
        let r = AxisRotation::new(Axis::Z, 30.0).matrix();
        let v = r * Vector3::x();
        assert_relative_eq!(v.x, 3f64.sqrt() / 2.0, epsilon = 1e-12);
        assert_relative_eq!(v.y, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn then_applies_in_order_and_inverse_undoes() {
        let a = RigidTransform::new(
            AxisRotation::new(Axis::Y, 35.0).matrix(),
            Vector3::new(1.0, -2.0, 3.0),
        );
        let b = RigidTransform::new(
            AxisRotation::new(Axis::X, -60.0).matrix(),
            Vector3::new(0.5, 0.0, -4.0),
        );
        let p = Point3::new(0.3, 7.0, -1.5);

        let ab = a.then(&b);
        assert_relative_eq!(ab.apply(&p), b.apply(&a.apply(&p)), epsilon = 1e-12);
        assert_relative_eq!(ab.inverse().apply(&ab.apply(&p)), p, epsilon = 1e-12);
        assert!(ab.is_proper_rotation(1e-9));
    }

    #[test]
    fn serializes_row_major() {
        let t = RigidTransform::new(
            AxisRotation::new(Axis::Z, 90.0).matrix(),
            Vector3::new(1.0, 2.0, 3.0),
        );
        let json = serde_json::to_value(t).unwrap();
        assert_eq!(
            json["rotation"],
            serde_json::json!([[0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]])
        );
        let back: RigidTransform = serde_json::from_value(json).unwrap();
        assert_eq!(back, t);
    }
}
