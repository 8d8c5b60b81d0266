use dartsight_core::{BinaryMask, GrayImageView};

use crate::MaskError;

/// Foreground wherever `|base - post| > threshold`.
///
/// Both views must have the same dimensions and buffers that match them.
pub fn binary_diff(
    base: &GrayImageView<'_>,
    post: &GrayImageView<'_>,
    threshold: u8,
) -> Result<BinaryMask, MaskError> {
    base.validate()?;
    post.validate()?;
    if base.dimensions() != post.dimensions() {
        return Err(MaskError::DimensionMismatch {
            base_width: base.width,
            base_height: base.height,
            post_width: post.width,
            post_height: post.height,
        });
    }

    let width = base.width;
    let mask = BinaryMask::from_fn(width, base.height, |x, y| {
        let i = y * width + x;
        base.data[i].abs_diff(post.data[i]) > threshold
    });
    Ok(mask)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dartsight_core::{GrayImage, ImageError};

    fn ramp(width: usize, height: usize) -> GrayImage {
        let data = (0..width * height).map(|i| (i % 251) as u8).collect();
        GrayImage::from_raw(width, height, data).unwrap()
    }

    #[test]
    fn identical_frames_give_empty_mask() {
        let img = ramp(40, 30);
        let mask = binary_diff(&img.view(), &img.view(), 0).unwrap();
        assert_eq!(mask.dimensions(), (40, 30));
        assert!(!mask.has_foreground());
    }

    #[test]
    fn step_inside_rectangle_is_foreground_exactly_there() {
        let base = ramp(50, 40);
        let mut post = base.clone();
        let (x0, x1, y0, y1) = (12usize, 30usize, 5usize, 22usize);
        for y in y0..y1 {
            for x in x0..x1 {
                let v = base.get(x, y);
                post.set(x, y, if v >= 128 { v - 100 } else { v + 100 });
            }
        }

        let mask = binary_diff(&base.view(), &post.view(), 50).unwrap();
        for y in 0..40 {
            for x in 0..50 {
                let inside = (x0..x1).contains(&x) && (y0..y1).contains(&y);
                assert_eq!(mask.is_foreground(x, y), inside, "pixel ({x}, {y})");
            }
        }
    }

    #[test]
    fn threshold_is_strict() {
        let base = GrayImage::filled(2, 1, 100);
        let mut post = base.clone();
        post.set(0, 0, 130);
        post.set(1, 0, 131);
        let mask = binary_diff(&base.view(), &post.view(), 30).unwrap();
        assert!(!mask.is_foreground(0, 0));
        assert!(mask.is_foreground(1, 0));
    }

    #[test]
    fn mismatched_dimensions_are_rejected() {
        let a = GrayImage::filled(4, 4, 0);
        let b = GrayImage::filled(4, 5, 0);
        let err = binary_diff(&a.view(), &b.view(), 10).unwrap_err();
        assert!(matches!(err, MaskError::DimensionMismatch { post_height: 5, .. }));
    }

    #[test]
    fn short_buffer_is_rejected_instead_of_indexed() {
        let base = GrayImage::filled(4, 4, 0);
        let data = vec![0u8; 15];
        let post = GrayImageView {
            width: 4,
            height: 4,
            data: &data,
        };
        let err = binary_diff(&base.view(), &post, 10).unwrap_err();
        assert_eq!(
            err,
            MaskError::Buffer(ImageError::InvalidBuffer {
                expected: 16,
                got: 15
            })
        );
    }
}
