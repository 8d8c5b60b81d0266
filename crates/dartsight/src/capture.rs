//! Frame acquisition for both cameras.
//!
//! Devices are behind the [`FrameSource`] trait; this module only decides
//! *when* frames are read. Camera drivers buffer a few frames, so every
//! capture first discards [`CaptureParams::warmup_reads`] frames per camera,
//! interleaving the two cameras so the views end up as close in time as
//! possible.

use std::collections::VecDeque;

use dartsight_core::{CameraId, Frame, StereoPair};
use serde::{Deserialize, Serialize};

/// Errors reported by frame sources. The capture layer never retries.
#[derive(thiserror::Error, Debug)]
pub enum CaptureError {
    #[error("frame source is exhausted")]
    Exhausted,
    #[error("{camera}: {source}")]
    Camera {
        camera: CameraId,
        source: Box<CaptureError>,
    },
    #[error("frame source failed: {0}")]
    Source(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Anything that yields camera frames, one per call.
pub trait FrameSource {
    fn read_frame(&mut self) -> Result<Frame, CaptureError>;
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn read_frame(&mut self) -> Result<Frame, CaptureError> {
        (**self).read_frame()
    }
}

/// In-memory source replaying a fixed list of frames.
#[derive(Clone, Debug, Default)]
pub struct FrameQueue {
    frames: VecDeque<Frame>,
}

impl FrameQueue {
    pub fn new(frames: impl IntoIterator<Item = Frame>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
        }
    }

    pub fn push(&mut self, frame: Frame) {
        self.frames.push_back(frame);
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl FrameSource for FrameQueue {
    fn read_frame(&mut self) -> Result<Frame, CaptureError> {
        self.frames.pop_front().ok_or(CaptureError::Exhausted)
    }
}

fn default_warmup_reads() -> usize {
    5
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureParams {
    /// Frames discarded per camera before each capture.
    #[serde(default = "default_warmup_reads")]
    pub warmup_reads: usize,
}

impl Default for CaptureParams {
    fn default() -> Self {
        Self {
            warmup_reads: default_warmup_reads(),
        }
    }
}

/// Owns one [`FrameSource`] per camera.
pub struct StereoCapture<S> {
    sources: StereoPair<S>,
    params: CaptureParams,
}

impl<S: FrameSource> StereoCapture<S> {
    pub fn new(sources: StereoPair<S>, params: CaptureParams) -> Self {
        Self { sources, params }
    }

    pub fn params(&self) -> &CaptureParams {
        &self.params
    }

    pub fn sources_mut(&mut self) -> &mut StereoPair<S> {
        &mut self.sources
    }

    pub fn into_sources(self) -> StereoPair<S> {
        self.sources
    }

    /// Flush both cameras, then read one frame from each.
    ///
    /// Call once for the base frames and once after the throw.
    pub fn capture(&mut self) -> Result<StereoPair<Frame>, CaptureError> {
        for _ in 0..self.params.warmup_reads {
            for camera in CameraId::ALL {
                self.read(camera)?;
            }
        }
        let first = self.read(CameraId::First)?;
        let second = self.read(CameraId::Second)?;
        log::debug!(
            "captured {}x{} frames after {} warm-up reads",
            first.dimensions().0,
            first.dimensions().1,
            self.params.warmup_reads
        );
        Ok(StereoPair::new(first, second))
    }

    fn read(&mut self, camera: CameraId) -> Result<Frame, CaptureError> {
        self.sources[camera].read_frame().map_err(|err| {
            log::warn!("{camera} capture failed: {err}");
            CaptureError::Camera {
                camera,
                source: Box::new(err),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dartsight_core::GrayImage;

    /// Frame whose every pixel carries `tag`, so reads can be identified.
    fn tagged(tag: u8) -> Frame {
        Frame::from_gray(GrayImage::filled(4, 3, tag))
    }

    #[test]
    fn discards_warmup_frames_before_capture() {
        let sources = StereoPair::new(
            FrameQueue::new((0..7).map(tagged)),
            FrameQueue::new((100..107).map(tagged)),
        );
        let mut capture = StereoCapture::new(sources, CaptureParams { warmup_reads: 5 });

        let frames = capture.capture().unwrap();
        assert_eq!(frames.first.gray.get(0, 0), 5);
        assert_eq!(frames.second.gray.get(0, 0), 105);

        let left = capture.into_sources();
        assert_eq!(left.first.len(), 1);
        assert_eq!(left.second.len(), 1);
    }

    #[test]
    fn failure_names_the_camera_and_is_not_retried() {
        let sources = StereoPair::new(
            FrameQueue::new((0..3).map(tagged)),
            FrameQueue::new((0..1).map(tagged)),
        );
        let mut capture = StereoCapture::new(sources, CaptureParams { warmup_reads: 2 });

        let err = capture.capture().unwrap_err();
        match &err {
            CaptureError::Camera { camera, source } => {
                assert_eq!(*camera, CameraId::Second);
                assert!(matches!(**source, CaptureError::Exhausted));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(err.to_string(), "camera 2: frame source is exhausted");
        // Camera 1 was read twice (once per warm-up pass), camera 2 once.
        assert_eq!(capture.sources_mut().first.len(), 1);
    }

    #[test]
    fn warmup_reads_default_from_json() {
        let params: CaptureParams = serde_json::from_str("{}").unwrap();
        assert_eq!(params.warmup_reads, 5);
    }
}
