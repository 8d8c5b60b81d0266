use dartsight_core::BinaryMask;
use nalgebra::Point2;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Mean position of all foreground pixels (`x` = column, `y` = row).
///
/// `None` for an empty mask.
pub fn centroid(mask: &BinaryMask) -> Option<Point2<f64>> {
    let mut n = 0usize;
    let mut sx = 0.0f64;
    let mut sy = 0.0f64;
    for p in mask.foreground_pixels() {
        n += 1;
        sx += p.x as f64;
        sy += p.y as f64;
    }
    if n == 0 {
        return None;
    }
    Some(Point2::new(sx / n as f64, sy / n as f64))
}

/// Keep only foreground pixels within `max_distance` pixels of the centroid.
///
/// Pixels exactly at `max_distance` are kept. An empty mask comes back empty.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(mask), fields(width = mask.width(), height = mask.height()))
)]
pub fn filter_by_centroid(mask: &BinaryMask, max_distance: f64) -> BinaryMask {
    let (w, h) = mask.dimensions();
    let Some(c) = centroid(mask) else {
        return BinaryMask::new(w, h);
    };

    let max_d2 = max_distance * max_distance;
    let mut out = BinaryMask::new(w, h);
    let mut dropped = 0usize;
    for p in mask.foreground_pixels() {
        let dx = p.x as f64 - c.x;
        let dy = p.y as f64 - c.y;
        if dx * dx + dy * dy <= max_d2 {
            out.set(p.x as usize, p.y as usize, true);
        } else {
            dropped += 1;
        }
    }

    log::debug!(
        "centroid ({:.1}, {:.1}), radius {:.1}px: dropped {} foreground pixels",
        c.x,
        c.y,
        max_distance,
        dropped
    );
    out
}
