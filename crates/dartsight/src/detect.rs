//! `image` crate integration: loading frames, exporting masks, and a debug
//! observer that dumps every stage as PNG.

use std::{
    collections::VecDeque,
    fs,
    path::{Path, PathBuf},
};

use ::image::{DynamicImage, ImageReader, Rgb, RgbImage};
use dartsight_core::{
    BinaryMask, CameraId, ColorImage, Frame, GrayImage, GrayImageView, PixelPoint, StereoPair,
};
use dartsight_mask::MaskStage;

use crate::{CaptureError, FrameSource, StageObserver};

/// Errors produced by the image helpers.
#[derive(thiserror::Error, Debug)]
pub enum DetectError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Image(#[from] ::image::ImageError),

    #[error(transparent)]
    Buffer(#[from] dartsight_core::ImageError),
}

/// Borrow an `image::GrayImage` as a core view.
pub fn gray_view(img: &::image::GrayImage) -> GrayImageView<'_> {
    GrayImageView {
        width: img.width() as usize,
        height: img.height() as usize,
        data: img.as_raw(),
    }
}

pub fn gray_from_image(img: &::image::GrayImage) -> Result<GrayImage, DetectError> {
    Ok(GrayImage::from_raw(
        img.width() as usize,
        img.height() as usize,
        img.as_raw().clone(),
    )?)
}

/// Single-channel images stay gray-only; anything else keeps its color.
pub fn frame_from_image(img: DynamicImage) -> Result<Frame, DetectError> {
    match img {
        DynamicImage::ImageLuma8(gray) => Ok(Frame::from_gray(gray_from_image(&gray)?)),
        other => {
            let rgb = other.to_rgb8();
            let color = ColorImage::from_raw(
                rgb.width() as usize,
                rgb.height() as usize,
                rgb.into_raw(),
            )?;
            Ok(Frame::from_color(color))
        }
    }
}

pub fn load_frame(path: impl AsRef<Path>) -> Result<Frame, DetectError> {
    let img = ImageReader::open(path)?.decode()?;
    frame_from_image(img)
}

pub fn mask_to_image(mask: &BinaryMask) -> ::image::GrayImage {
    let (w, h) = mask.dimensions();
    ::image::GrayImage::from_fn(w as u32, h as u32, |x, y| {
        ::image::Luma([mask.as_raw()[y as usize * w + x as usize]])
    })
}

pub fn save_mask_png(mask: &BinaryMask, path: impl AsRef<Path>) -> Result<(), DetectError> {
    mask_to_image(mask).save(path)?;
    Ok(())
}

pub fn color_to_image(color: &ColorImage) -> RgbImage {
    let (w, h) = color.dimensions();
    RgbImage::from_fn(w as u32, h as u32, |x, y| {
        Rgb(color.get(x as usize, y as usize))
    })
}

const MASK_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
const TIP_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
const TIP_RADIUS: f64 = 5.0;

/// `post` with the filtered mask painted red and a green ring around the tip.
pub fn render_overlay(post: &Frame, filtered: &BinaryMask, tip: PixelPoint) -> RgbImage {
    let mut out = color_to_image(&post.color_or_gray());
    for p in filtered.foreground_pixels() {
        if p.x < out.width() && p.y < out.height() {
            out.put_pixel(p.x, p.y, MASK_COLOR);
        }
    }

    let r = TIP_RADIUS.ceil() as i64 + 1;
    let (cx, cy) = (tip.x as i64, tip.y as i64);
    for dy in -r..=r {
        for dx in -r..=r {
            let d = ((dx * dx + dy * dy) as f64).sqrt();
            if (d - TIP_RADIUS).abs() > 0.5 {
                continue;
            }
            let (x, y) = (cx + dx, cy + dy);
            if x >= 0 && y >= 0 && (x as u32) < out.width() && (y as u32) < out.height() {
                out.put_pixel(x as u32, y as u32, TIP_COLOR);
            }
        }
    }
    out
}

/// Replays image files in order, one per read.
#[derive(Clone, Debug, Default)]
pub struct ImageFileSource {
    paths: VecDeque<PathBuf>,
}

impl ImageFileSource {
    pub fn new(paths: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }
}

impl FrameSource for ImageFileSource {
    fn read_frame(&mut self) -> Result<Frame, CaptureError> {
        let path = self.paths.pop_front().ok_or(CaptureError::Exhausted)?;
        log::debug!("reading frame from {}", path.display());
        load_frame(&path).map_err(|err| CaptureError::Source(Box::new(err)))
    }
}

/// Writes `camera{N}_{stage}.png` for every mask and `camera{N}_overlay.png`
/// once the tip is known.
///
/// Write failures are logged and counted, never propagated.
#[derive(Debug)]
pub struct PngDumpObserver {
    dir: PathBuf,
    posts: StereoPair<Option<Frame>>,
    filtered: StereoPair<Option<BinaryMask>>,
    written: Vec<PathBuf>,
    failures: usize,
}

impl PngDumpObserver {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, DetectError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            posts: StereoPair::default(),
            filtered: StereoPair::default(),
            written: Vec::new(),
            failures: 0,
        })
    }

    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    pub fn failures(&self) -> usize {
        self.failures
    }

    fn path(&self, camera: CameraId, what: &str) -> PathBuf {
        self.dir
            .join(format!("camera{}_{what}.png", camera.index() + 1))
    }

    fn record(&mut self, path: PathBuf, result: Result<(), DetectError>) {
        match result {
            Ok(()) => self.written.push(path),
            Err(err) => {
                log::warn!("failed to write {}: {err}", path.display());
                self.failures += 1;
            }
        }
    }
}

fn stage_file_name(stage: MaskStage) -> &'static str {
    match stage {
        MaskStage::Difference => "difference",
        MaskStage::Opened => "opened",
        MaskStage::Filtered => "filtered",
    }
}

impl StageObserver for PngDumpObserver {
    fn on_frames(&mut self, camera: CameraId, _base: &Frame, post: &Frame) {
        self.posts[camera] = Some(post.clone());
    }

    fn on_mask(&mut self, camera: CameraId, stage: MaskStage, mask: &BinaryMask) {
        let path = self.path(camera, stage_file_name(stage));
        let result = save_mask_png(mask, &path);
        self.record(path, result);
        if stage == MaskStage::Filtered {
            self.filtered[camera] = Some(mask.clone());
        }
    }

    fn on_tip(&mut self, camera: CameraId, tip: PixelPoint) {
        let (Some(post), Some(filtered)) = (&self.posts[camera], &self.filtered[camera]) else {
            return;
        };
        let overlay = render_overlay(post, filtered, tip);
        let path = self.path(camera, "overlay");
        let result = overlay.save(&path).map_err(DetectError::from);
        self.record(path, result);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gray_png_round_trips_through_frame() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gray.png");
        let img = ::image::GrayImage::from_fn(5, 4, |x, y| ::image::Luma([(x * 10 + y) as u8]));
        img.save(&path).unwrap();

        let frame = load_frame(&path).unwrap();
        assert!(frame.color.is_none());
        assert_eq!(frame.dimensions(), (5, 4));
        assert_eq!(frame.gray.get(3, 2), 32);
        assert_eq!(gray_view(&img).get(3, 2), 32);
    }

    #[test]
    fn color_frame_keeps_original_and_converts_to_luma() {
        let rgb = RgbImage::from_pixel(3, 2, Rgb([255, 0, 0]));
        let frame = frame_from_image(DynamicImage::ImageRgb8(rgb)).unwrap();
        assert_eq!(frame.color.as_ref().map(|c| c.get(1, 1)), Some([255, 0, 0]));
        assert_eq!(frame.gray.get(1, 1), 76);
    }

    #[test]
    fn overlay_paints_mask_and_ring() {
        let post = Frame::from_gray(GrayImage::filled(40, 30, 50));
        let mask = BinaryMask::from_fn(40, 30, |x, y| x == 20 && (5..=15).contains(&y));
        let out = render_overlay(&post, &mask, PixelPoint::new(20, 15));

        assert_eq!(*out.get_pixel(20, 8), MASK_COLOR);
        assert_eq!(*out.get_pixel(25, 15), TIP_COLOR);
        assert_eq!(*out.get_pixel(20, 20), TIP_COLOR);
        assert_eq!(*out.get_pixel(0, 0), Rgb([50, 50, 50]));
    }

    #[test]
    fn file_source_reports_exhaustion() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("one.png");
        ::image::GrayImage::new(2, 2).save(&path).unwrap();

        let mut source = ImageFileSource::new([path]);
        assert!(source.read_frame().is_ok());
        assert!(matches!(source.read_frame(), Err(CaptureError::Exhausted)));
    }
}
