//! Binary morphology with a rectangular structuring element.
//!
//! The element is anchored at its top-left cell. [`erode`] marks the anchor
//! positions at which the whole element fits inside the foreground, and
//! [`dilate`] stamps the element back at every marked anchor. Their
//! composition, [`open`], is therefore the union of all placements of the
//! element that fit in the input: it never adds foreground, keeps every blob
//! the element fits into pixel-for-pixel, and never shifts anything.
//!
//! Both passes are separable and use sliding counts, so the cost does not
//! depend on the element size.

use dartsight_core::BinaryMask;
use serde::{Deserialize, Serialize};

/// Rectangular structuring element, `width` columns by `height` rows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuringElement {
    pub width: usize,
    pub height: usize,
}

impl StructuringElement {
    pub const fn square(size: usize) -> Self {
        Self {
            width: size,
            height: size,
        }
    }

    #[inline]
    fn clamped(self) -> (usize, usize) {
        (self.width.max(1), self.height.max(1))
    }
}

impl Default for StructuringElement {
    fn default() -> Self {
        Self::square(2)
    }
}

/// Anchor positions where the element fits entirely inside the foreground.
///
/// Anchors whose placement would leave the mask are background, so a blob
/// touching the border is eroded like any other.
pub fn erode(mask: &BinaryMask, se: StructuringElement) -> BinaryMask {
    let (w, h) = mask.dimensions();
    let (kw, kh) = se.clamped();
    let mut out = BinaryMask::new(w, h);
    if kw > w || kh > h {
        return out;
    }

    // fits_row[y * w + x]: mask[y][x..x + kw] is all foreground.
    let mut fits_row = vec![false; w * h];
    for y in 0..h {
        let mut run = 0usize;
        for x in (0..w).rev() {
            run = if mask.is_foreground(x, y) { run + 1 } else { 0 };
            fits_row[y * w + x] = run >= kw;
        }
    }

    for x in 0..=(w - kw) {
        let mut run = 0usize;
        for y in (0..h).rev() {
            run = if fits_row[y * w + x] { run + 1 } else { 0 };
            if run >= kh {
                out.set(x, y, true);
            }
        }
    }
    out
}

/// Stamp the element at every foreground anchor, clipped to the mask.
pub fn dilate(mask: &BinaryMask, se: StructuringElement) -> BinaryMask {
    let (w, h) = mask.dimensions();
    let (kw, kh) = se.clamped();

    // hits_row[y * w + x]: some anchor in mask[y][x + 1 - kw..=x].
    let mut hits_row = vec![false; w * h];
    for y in 0..h {
        let mut since = usize::MAX;
        for x in 0..w {
            since = if mask.is_foreground(x, y) {
                0
            } else {
                since.saturating_add(1)
            };
            hits_row[y * w + x] = since < kw;
        }
    }

    let mut out = BinaryMask::new(w, h);
    for x in 0..w {
        let mut since = usize::MAX;
        for y in 0..h {
            since = if hits_row[y * w + x] {
                0
            } else {
                since.saturating_add(1)
            };
            if since < kh {
                out.set(x, y, true);
            }
        }
    }
    out
}

/// Morphological opening: [`erode`] followed by [`dilate`] with the same element.
pub fn open(mask: &BinaryMask, se: StructuringElement) -> BinaryMask {
    dilate(&erode(mask, se), se)
}
