use std::fmt;
use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

/// Identifies one of the two cameras of the rig.
///
/// Camera 1 ([`CameraId::First`]) defines the reference frame the
/// triangulated point is expressed in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CameraId {
    First,
    Second,
}

impl CameraId {
    pub const ALL: [CameraId; 2] = [CameraId::First, CameraId::Second];

    #[inline]
    pub fn index(self) -> usize {
        match self {
            CameraId::First => 0,
            CameraId::Second => 1,
        }
    }

    #[inline]
    pub fn other(self) -> CameraId {
        match self {
            CameraId::First => CameraId::Second,
            CameraId::Second => CameraId::First,
        }
    }
}

impl fmt::Display for CameraId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "camera {}", self.index() + 1)
    }
}

/// Exactly two values, one per camera.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StereoPair<T> {
    pub first: T,
    pub second: T,
}

impl<T> StereoPair<T> {
    pub const fn new(first: T, second: T) -> Self {
        Self { first, second }
    }

    /// Build both entries from a per-camera closure.
    pub fn from_fn(mut f: impl FnMut(CameraId) -> T) -> Self {
        Self {
            first: f(CameraId::First),
            second: f(CameraId::Second),
        }
    }

    pub fn each_ref(&self) -> StereoPair<&T> {
        StereoPair {
            first: &self.first,
            second: &self.second,
        }
    }

    pub fn map<U>(self, mut f: impl FnMut(CameraId, T) -> U) -> StereoPair<U> {
        StereoPair {
            first: f(CameraId::First, self.first),
            second: f(CameraId::Second, self.second),
        }
    }

    pub fn zip<U>(self, other: StereoPair<U>) -> StereoPair<(T, U)> {
        StereoPair {
            first: (self.first, other.first),
            second: (self.second, other.second),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (CameraId, &T)> {
        [(CameraId::First, &self.first), (CameraId::Second, &self.second)].into_iter()
    }

    pub fn into_array(self) -> [T; 2] {
        [self.first, self.second]
    }
}

impl<T, E> StereoPair<Result<T, E>> {
    /// Camera 1's error wins when both failed.
    pub fn transpose(self) -> Result<StereoPair<T>, E> {
        Ok(StereoPair {
            first: self.first?,
            second: self.second?,
        })
    }
}

impl<T> Index<CameraId> for StereoPair<T> {
    type Output = T;

    fn index(&self, id: CameraId) -> &T {
        match id {
            CameraId::First => &self.first,
            CameraId::Second => &self.second,
        }
    }
}

impl<T> IndexMut<CameraId> for StereoPair<T> {
    fn index_mut(&mut self, id: CameraId) -> &mut T {
        match id {
            CameraId::First => &mut self.first,
            CameraId::Second => &mut self.second,
        }
    }
}
