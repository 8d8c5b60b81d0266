/// Errors raised when building images from raw buffers.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ImageError {
    #[error("invalid image buffer length (expected {expected} bytes, got {got})")]
    InvalidBuffer { expected: usize, got: usize },

    #[error("invalid image dimensions (width={width}, height={height})")]
    InvalidDimensions { width: usize, height: usize },
}

fn checked_len(width: usize, height: usize, channels: usize) -> Result<usize, ImageError> {
    if width == 0 || height == 0 {
        return Err(ImageError::InvalidDimensions { width, height });
    }
    width
        .checked_mul(height)
        .and_then(|n| n.checked_mul(channels))
        .ok_or(ImageError::InvalidDimensions { width, height })
}

#[derive(Clone, Copy, Debug)]
pub struct GrayImageView<'a> {
    pub width: usize,
    pub height: usize,
    pub data: &'a [u8], // row-major, len = w*h
}

impl GrayImageView<'_> {
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.width + x]
    }

    #[inline]
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Check that `data` holds exactly `width * height` bytes.
    pub fn validate(&self) -> Result<(), ImageError> {
        check_buffer(self.width, self.height, 1, self.data.len())
    }
}

fn check_buffer(width: usize, height: usize, channels: usize, got: usize) -> Result<(), ImageError> {
    let expected = checked_len(width, height, channels)?;
    if got != expected {
        return Err(ImageError::InvalidBuffer { expected, got });
    }
    Ok(())
}

/// Owned 8-bit single channel image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GrayImage {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

impl GrayImage {
    /// Image of the given size with every pixel set to `value`.
    pub fn filled(width: usize, height: usize, value: u8) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
    }

    pub fn from_raw(width: usize, height: usize, data: Vec<u8>) -> Result<Self, ImageError> {
        let expected = checked_len(width, height, 1)?;
        if data.len() != expected {
            return Err(ImageError::InvalidBuffer {
                expected,
                got: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    #[inline]
    pub fn view(&self) -> GrayImageView<'_> {
        GrayImageView {
            width: self.width,
            height: self.height,
            data: &self.data,
        }
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.width + x]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: u8) {
        self.data[y * self.width + x] = value;
    }

    #[inline]
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }
}

/// Owned interleaved RGB image, 8 bits per channel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColorImage {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>, // row-major, len = w*h*3
}

impl ColorImage {
    pub fn filled(width: usize, height: usize, rgb: [u8; 3]) -> Self {
        let mut data = Vec::with_capacity(width * height * 3);
        for _ in 0..width * height {
            data.extend_from_slice(&rgb);
        }
        Self {
            width,
            height,
            data,
        }
    }

    pub fn from_raw(width: usize, height: usize, data: Vec<u8>) -> Result<Self, ImageError> {
        let expected = checked_len(width, height, 3)?;
        if data.len() != expected {
            return Err(ImageError::InvalidBuffer {
                expected,
                got: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> [u8; 3] {
        let i = (y * self.width + x) * 3;
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, rgb: [u8; 3]) {
        let i = (y * self.width + x) * 3;
        self.data[i..i + 3].copy_from_slice(&rgb);
    }

    /// Luma conversion with ITU-R BT.601 weights, rounded to nearest.
    pub fn to_gray(&self) -> GrayImage {
        let data = self
            .data
            .chunks_exact(3)
            .map(|px| {
                let y = 0.299 * px[0] as f32 + 0.587 * px[1] as f32 + 0.114 * px[2] as f32;
                y.round().clamp(0.0, 255.0) as u8
            })
            .collect();
        GrayImage {
            width: self.width,
            height: self.height,
            data,
        }
    }

    /// Replicate a grayscale image into three identical channels.
    pub fn from_gray(gray: &GrayImage) -> Self {
        let mut data = Vec::with_capacity(gray.data.len() * 3);
        for &v in &gray.data {
            data.extend_from_slice(&[v, v, v]);
        }
        Self {
            width: gray.width,
            height: gray.height,
            data,
        }
    }

    #[inline]
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }
}

/// One captured camera frame.
///
/// Detection only ever reads `gray`. The color original is kept around for
/// observers that want to paint results on what the camera actually saw.
#[derive(Clone, Debug)]
pub struct Frame {
    pub gray: GrayImage,
    pub color: Option<ColorImage>,
}

impl Frame {
    pub fn from_gray(gray: GrayImage) -> Self {
        Self { gray, color: None }
    }

    pub fn from_color(color: ColorImage) -> Self {
        Self {
            gray: color.to_gray(),
            color: Some(color),
        }
    }

    #[inline]
    pub fn dimensions(&self) -> (usize, usize) {
        self.gray.dimensions()
    }

    /// Check both buffers against their dimensions. A color image must also
    /// match the gray one in size.
    pub fn validate(&self) -> Result<(), ImageError> {
        self.gray.view().validate()?;
        if let Some(color) = &self.color {
            if color.dimensions() != self.gray.dimensions() {
                return Err(ImageError::InvalidDimensions {
                    width: color.width,
                    height: color.height,
                });
            }
            check_buffer(color.width, color.height, 3, color.data.len())?;
        }
        Ok(())
    }

    /// Color version of the frame, synthesised from gray when absent.
    pub fn color_or_gray(&self) -> ColorImage {
        self.color
            .clone()
            .unwrap_or_else(|| ColorImage::from_gray(&self.gray))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_raw_rejects_wrong_length() {
        let err = GrayImage::from_raw(4, 3, vec![0; 11]).unwrap_err();
        assert_eq!(
            err,
            ImageError::InvalidBuffer {
                expected: 12,
                got: 11
            }
        );
        assert!(ColorImage::from_raw(0, 3, Vec::new()).is_err());
    }

    #[test]
    fn luma_of_primaries_matches_bt601() {
        let mut img = ColorImage::filled(3, 1, [0, 0, 0]);
        img.set(0, 0, [255, 0, 0]);
        img.set(1, 0, [0, 255, 0]);
        img.set(2, 0, [0, 0, 255]);
        let gray = img.to_gray();
        assert_eq!(gray.data, vec![76, 150, 29]);
    }

    #[test]
    fn hand_built_frames_are_checked() {
        let mut frame = Frame::from_gray(GrayImage::filled(4, 3, 0));
        assert!(frame.validate().is_ok());

        frame.gray.data.pop();
        assert_eq!(
            frame.validate(),
            Err(ImageError::InvalidBuffer {
                expected: 12,
                got: 11
            })
        );

        let mut frame = Frame::from_color(ColorImage::filled(4, 3, [1, 2, 3]));
        assert!(frame.validate().is_ok());
        frame.color.as_mut().unwrap().width = 5;
        assert!(frame.validate().is_err());
    }

    #[test]
    fn gray_frame_synthesises_color() {
        let frame = Frame::from_gray(GrayImage::filled(2, 2, 90));
        let color = frame.color_or_gray();
        assert_eq!(color.get(1, 1), [90, 90, 90]);
        assert_eq!(frame.dimensions(), (2, 2));
    }
}
