//! Stereo geometry for the dart locator.
//!
//! - [`CameraModel`]: pinhole intrinsics plus a pose mapping the shared world
//!   frame (camera 1's frame in practice) into the camera frame.
//! - [`triangulate`]: linear (DLT) two-view triangulation with explicit
//!   rejection of ill-conditioned rigs and observations.
//! - [`FrameAligner`]: an ordered list of rigid transforms taking a point from
//!   camera 1's frame to the target's frame, and the final
//!   [`LandingCoordinate`].
//!
//! Conventions: `x_cam = R * x_world + T`, pixels are `(column, row)`, and
//! rotations are right-handed.

mod align;
mod camera;
mod rigid;
mod triangulate;

pub use align::{AlignmentConfig, FrameAligner, LandingCoordinate};
pub use camera::{CameraIntrinsics, CameraModel, CameraModelError};
pub use rigid::{Axis, AxisRotation, RigidTransform};
pub use triangulate::{triangulate, Triangulation, TriangulationError, TriangulationParams};
