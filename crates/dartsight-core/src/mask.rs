use serde::{Deserialize, Serialize};

use crate::image::{GrayImage, ImageError};

pub const FOREGROUND: u8 = 255;
pub const BACKGROUND: u8 = 0;

/// Integer pixel location: `x` is the column, `y` the row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PixelPoint {
    pub x: u32,
    pub y: u32,
}

impl PixelPoint {
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn to_f64(self) -> [f64; 2] {
        [self.x as f64, self.y as f64]
    }
}

/// Row-major binary mask. Every cell is exactly [`FOREGROUND`] or [`BACKGROUND`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BinaryMask {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl BinaryMask {
    /// All-background mask.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![BACKGROUND; width * height],
        }
    }

    /// Build a mask from a predicate evaluated at every `(x, y)`.
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> bool) -> Self {
        let mut data = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                data.push(if f(x, y) { FOREGROUND } else { BACKGROUND });
            }
        }
        Self {
            width,
            height,
            data,
        }
    }

    /// Interpret a raw buffer as a mask; any non-zero byte becomes foreground.
    pub fn from_raw(width: usize, height: usize, raw: &[u8]) -> Result<Self, ImageError> {
        let expected = width * height;
        if raw.len() != expected {
            return Err(ImageError::InvalidBuffer {
                expected,
                got: raw.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data: raw
                .iter()
                .map(|&v| if v != 0 { FOREGROUND } else { BACKGROUND })
                .collect(),
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    #[inline]
    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub fn is_foreground(&self, x: usize, y: usize) -> bool {
        self.data[y * self.width + x] == FOREGROUND
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, foreground: bool) {
        self.data[y * self.width + x] = if foreground { FOREGROUND } else { BACKGROUND };
    }

    pub fn count_foreground(&self) -> usize {
        self.data.iter().filter(|&&v| v == FOREGROUND).count()
    }

    pub fn has_foreground(&self) -> bool {
        self.data.contains(&FOREGROUND)
    }

    /// Foreground pixels in row-major order.
    pub fn foreground_pixels(&self) -> impl Iterator<Item = PixelPoint> + '_ {
        let w = self.width;
        self.data
            .iter()
            .enumerate()
            .filter(|(_, &v)| v == FOREGROUND)
            .map(move |(i, _)| PixelPoint::new((i % w) as u32, (i / w) as u32))
    }

    /// Copy into a grayscale image (0 / 255), e.g. for saving.
    pub fn to_gray(&self) -> GrayImage {
        GrayImage {
            width: self.width,
            height: self.height,
            data: self.data.clone(),
        }
    }
}
