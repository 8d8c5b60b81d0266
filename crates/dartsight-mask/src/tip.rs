use dartsight_core::{BinaryMask, PixelPoint};

/// Lowest foreground pixel (maximum row); the leftmost one on ties.
///
/// Cameras are mounted so that the tip of a stuck dart is the point of its
/// silhouette closest to the bottom of the image.
pub fn locate_tip(mask: &BinaryMask) -> Option<PixelPoint> {
    let (w, h) = mask.dimensions();
    (0..h)
        .rev()
        .find_map(|y| (0..w).find(|&x| mask.is_foreground(x, y)).map(|x| (x, y)))
        .map(|(x, y)| PixelPoint::new(x as u32, y as u32))
}
