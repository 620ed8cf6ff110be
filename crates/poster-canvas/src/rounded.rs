//! Rounded-corner mask.

use image::{Rgba, RgbaImage};
use tracing::debug;

const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Clip the four corners of `img` to circular arcs of radius `radius`.
///
/// A pixel is kept when its column lies in `radius..=width-radius` or its
/// row lies in `radius..=height-radius`. Any other pixel is kept only if it
/// lies within `radius` of one of the four circle centres inset by `radius`
/// from the edges; the rest become fully transparent.
///
/// Only the corner boxes are visited. Radii above half the smaller side
/// are not clamped, the circles then simply overlap.
pub fn rounded_corners(img: &RgbaImage, radius: u32) -> RgbaImage {
    let mut out = img.clone();
    if radius == 0 {
        return out;
    }

    let (w, h) = (i64::from(img.width()), i64::from(img.height()));
    let r = i64::from(radius);
    debug!(w, h, r, "Applying rounded-corner mask");

    let centres = [(r, r), (w - r, r), (r, h - r), (w - r, h - r)];
    let outside_band = |v: i64, len: i64| v < r || v > len - r;

    let cols: Vec<i64> = (0..w).filter(|&x| outside_band(x, w)).collect();
    let rows: Vec<i64> = (0..h).filter(|&y| outside_band(y, h)).collect();

    for &y in &rows {
        for &x in &cols {
            let inside = centres.iter().any(|&(cx, cy)| {
                let (dx, dy) = (x - cx, y - cy);
                dx * dx + dy * dy <= r * r
            });
            if !inside {
                out.put_pixel(x as u32, y as u32, TRANSPARENT);
            }
        }
    }

    out
}
