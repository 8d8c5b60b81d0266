//! Hooks for intermediate artifacts.
//!
//! The pipeline calls a [`StageObserver`] at every stage boundary. Observers
//! only look: nothing they do changes the returned location. Events for
//! camera 1 always precede those for camera 2 within a stage, with or without
//! the `rayon` feature.

use dartsight_core::{BinaryMask, CameraId, Frame, PixelPoint};
use dartsight_mask::MaskStage;
use dartsight_stereo::{LandingCoordinate, Triangulation};
use nalgebra::Point3;

pub trait StageObserver {
    fn on_frames(&mut self, _camera: CameraId, _base: &Frame, _post: &Frame) {}

    /// Called for every mask that was computed, including one that came out
    /// empty and stopped the pipeline.
    fn on_mask(&mut self, _camera: CameraId, _stage: MaskStage, _mask: &BinaryMask) {}

    fn on_tip(&mut self, _camera: CameraId, _tip: PixelPoint) {}

    fn on_triangulated(&mut self, _triangulation: &Triangulation) {}

    fn on_aligned(&mut self, _aligned: &Point3<f64>, _landing: LandingCoordinate) {}
}

impl<T: StageObserver + ?Sized> StageObserver for &mut T {
    fn on_frames(&mut self, camera: CameraId, base: &Frame, post: &Frame) {
        (**self).on_frames(camera, base, post)
    }

    fn on_mask(&mut self, camera: CameraId, stage: MaskStage, mask: &BinaryMask) {
        (**self).on_mask(camera, stage, mask)
    }

    fn on_tip(&mut self, camera: CameraId, tip: PixelPoint) {
        (**self).on_tip(camera, tip)
    }

    fn on_triangulated(&mut self, triangulation: &Triangulation) {
        (**self).on_triangulated(triangulation)
    }

    fn on_aligned(&mut self, aligned: &Point3<f64>, landing: LandingCoordinate) {
        (**self).on_aligned(aligned, landing)
    }
}

/// Forwards every event to both observers, `A` first.
impl<A: StageObserver, B: StageObserver> StageObserver for (A, B) {
    fn on_frames(&mut self, camera: CameraId, base: &Frame, post: &Frame) {
        self.0.on_frames(camera, base, post);
        self.1.on_frames(camera, base, post);
    }

    fn on_mask(&mut self, camera: CameraId, stage: MaskStage, mask: &BinaryMask) {
        self.0.on_mask(camera, stage, mask);
        self.1.on_mask(camera, stage, mask);
    }

    fn on_tip(&mut self, camera: CameraId, tip: PixelPoint) {
        self.0.on_tip(camera, tip);
        self.1.on_tip(camera, tip);
    }

    fn on_triangulated(&mut self, triangulation: &Triangulation) {
        self.0.on_triangulated(triangulation);
        self.1.on_triangulated(triangulation);
    }

    fn on_aligned(&mut self, aligned: &Point3<f64>, landing: LandingCoordinate) {
        self.0.on_aligned(aligned, landing);
        self.1.on_aligned(aligned, landing);
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NoopObserver;

impl StageObserver for NoopObserver {}

/// One observed artifact, owned.
#[derive(Clone, Debug)]
pub enum StageEvent {
    Frames {
        camera: CameraId,
    },
    Mask {
        camera: CameraId,
        stage: MaskStage,
        mask: BinaryMask,
    },
    Tip {
        camera: CameraId,
        tip: PixelPoint,
    },
    Triangulated(Triangulation),
    Aligned {
        point: Point3<f64>,
        landing: LandingCoordinate,
    },
}

/// Keeps a copy of everything it is shown. Mostly useful in tests.
#[derive(Clone, Debug, Default)]
pub struct RecordingObserver {
    pub events: Vec<StageEvent>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mask(&self, camera: CameraId, stage: MaskStage) -> Option<&BinaryMask> {
        self.events.iter().find_map(|e| match e {
            StageEvent::Mask {
                camera: c,
                stage: s,
                mask,
            } if *c == camera && *s == stage => Some(mask),
            _ => None,
        })
    }

    /// Stages seen for `camera`, in the order they were reported.
    pub fn stages(&self, camera: CameraId) -> Vec<MaskStage> {
        self.events
            .iter()
            .filter_map(|e| match e {
                StageEvent::Mask {
                    camera: c, stage, ..
                } if *c == camera => Some(*stage),
                _ => None,
            })
            .collect()
    }

    pub fn tip(&self, camera: CameraId) -> Option<PixelPoint> {
        self.events.iter().find_map(|e| match e {
            StageEvent::Tip { camera: c, tip } if *c == camera => Some(*tip),
            _ => None,
        })
    }

    pub fn landing(&self) -> Option<LandingCoordinate> {
        self.events.iter().find_map(|e| match e {
            StageEvent::Aligned { landing, .. } => Some(*landing),
            _ => None,
        })
    }
}

impl StageObserver for RecordingObserver {
    fn on_frames(&mut self, camera: CameraId, _base: &Frame, _post: &Frame) {
        self.events.push(StageEvent::Frames { camera });
    }

    fn on_mask(&mut self, camera: CameraId, stage: MaskStage, mask: &BinaryMask) {
        self.events.push(StageEvent::Mask {
            camera,
            stage,
            mask: mask.clone(),
        });
    }

    fn on_tip(&mut self, camera: CameraId, tip: PixelPoint) {
        self.events.push(StageEvent::Tip { camera, tip });
    }

    fn on_triangulated(&mut self, triangulation: &Triangulation) {
        self.events
            .push(StageEvent::Triangulated(triangulation.clone()));
    }

    fn on_aligned(&mut self, aligned: &Point3<f64>, landing: LandingCoordinate) {
        self.events.push(StageEvent::Aligned {
            point: *aligned,
            landing,
        });
    }
}
