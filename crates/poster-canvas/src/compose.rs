//! Alpha compositing onto the canvas.

use image::{Rgba, RgbaImage};

/// Overlay `top` onto `base` with its top-left corner at `(x, y)`.
///
/// Offsets may be negative or past the edge; pixels falling outside `base`
/// are dropped. `top` is alpha-composited over the base.
pub fn overlay(base: &mut RgbaImage, top: &RgbaImage, x: i64, y: i64) {
    let (base_w, base_h) = (i64::from(base.width()), i64::from(base.height()));
    for (dx, dy, pixel) in top.enumerate_pixels() {
        let target_x = x + i64::from(dx);
        let target_y = y + i64::from(dy);
        if (0..base_w).contains(&target_x) && (0..base_h).contains(&target_y) {
            blend_onto(base, target_x as u32, target_y as u32, *pixel);
        }
    }
}

/// Composite `fg` over the pixel of `base` at `(x, y)`.
pub fn blend_onto(base: &mut RgbaImage, x: u32, y: u32, fg: Rgba<u8>) {
    match fg[3] {
        0 => {}
        255 => base.put_pixel(x, y, fg),
        _ => {
            let bg = *base.get_pixel(x, y);
            base.put_pixel(x, y, blend_pixel(bg, fg));
        }
    }
}

/// Source-over blend of two straight-alpha pixels.
pub fn blend_pixel(bg: Rgba<u8>, fg: Rgba<u8>) -> Rgba<u8> {
    let fa = f32::from(fg[3]) / 255.0;
    let ba = f32::from(bg[3]) / 255.0;
    let out_a = fa + ba * (1.0 - fa);
    if out_a <= 0.0 {
        return Rgba([0, 0, 0, 0]);
    }
    let channel = |i: usize| {
        let c = (f32::from(fg[i]) * fa + f32::from(bg[i]) * ba * (1.0 - fa)) / out_a;
        c.round().clamp(0.0, 255.0) as u8
    };
    Rgba([
        channel(0),
        channel(1),
        channel(2),
        (out_a * 255.0).round() as u8,
    ])
}
