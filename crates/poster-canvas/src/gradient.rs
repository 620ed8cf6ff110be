//! Banded horizontal gradient mask.
//!
//! A rectangle is split into `deep` horizontal bands of constant alpha,
//! stepping linearly between 127 and 60 on the 7-bit transparency scale
//! (0 = opaque, 127 = fully transparent).

use image::RgbaImage;
use imageproc::drawing::{Blend, draw_filled_rect_mut};
use imageproc::rect::Rect;
use tracing::{debug, warn};

use crate::color::Color;

/// Fully transparent end of the band scale.
pub const ALPHA_TRANSPARENT: u8 = 127;

/// Most opaque band alpha a gradient reaches.
pub const ALPHA_DENSEST: u8 = 60;

pub const MIN_DEPTH: i32 = 1;
pub const MAX_DEPTH: i32 = 100;

/// Default number of bands.
pub const DEFAULT_DEPTH: i32 = 20;

/// One horizontal strip of the gradient.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GradientBand {
    pub index: u32,
    /// First row, inclusive.
    pub top: i64,
    /// Last row, inclusive.
    pub bottom: i64,
    /// Transparency on the 0..=127 scale.
    pub alpha: u8,
}

impl GradientBand {
    /// The band alpha as an 8-bit opacity (255 = opaque).
    pub fn opacity(&self) -> u8 {
        let transparency = u32::from(self.alpha.min(ALPHA_TRANSPARENT));
        let opaque = u32::from(ALPHA_TRANSPARENT) - transparency;
        ((opaque * 255 + 63) / 127) as u8
    }
}

/// Clamp a requested band count into `MIN_DEPTH..=MAX_DEPTH`.
pub fn clamp_depth(deep: i32) -> u32 {
    let clamped = deep.clamp(MIN_DEPTH, MAX_DEPTH);
    if clamped != deep {
        warn!(requested = deep, clamped, "Gradient depth out of range, clamping");
    }
    clamped as u32
}

/// Compute the bands covering rows `y1..y2`.
///
/// Band heights and the alpha increment are each rounded independently, so
/// neighbouring bands can overlap or leave a one-pixel gap; alphas past the
/// end of the scale are clamped to 127.
pub fn gradient_bands(y1: i64, y2: i64, deep: i32, reverse: bool) -> Vec<GradientBand> {
    let deep = clamp_depth(deep);
    let height = (y2 - y1).abs();
    let step = (height as f64 / f64::from(deep)).round() as i64;
    let alpha_step = (f64::from(ALPHA_TRANSPARENT - ALPHA_DENSEST) / f64::from(deep)).round() as i64;

    (0..deep)
        .map(|i| {
            let offset = i64::from(i) * alpha_step;
            let alpha = if reverse {
                i64::from(ALPHA_DENSEST) + offset
            } else {
                i64::from(ALPHA_TRANSPARENT) - offset
            };
            let start = y1 + step * i64::from(i) + 1;
            let end = y1 + step * (i64::from(i) + 1);
            GradientBand {
                index: i,
                top: start.min(end),
                bottom: start.max(end),
                alpha: alpha.clamp(0, i64::from(ALPHA_TRANSPARENT)) as u8,
            }
        })
        .collect()
}

/// Paint the bands of a gradient spanning columns `x1..=x2` over `canvas`.
pub fn paint_horizontal_gradient(
    canvas: &mut RgbaImage,
    color: Color,
    (x1, y1): (i64, i64),
    (x2, y2): (i64, i64),
    deep: i32,
    reverse: bool,
) {
    let bands = gradient_bands(y1, y2, deep, reverse);
    let (left, right) = (x1.min(x2), x1.max(x2));
    debug!(left, right, bands = bands.len(), reverse, "Painting horizontal gradient");

    let (canvas_w, canvas_h) = (i64::from(canvas.width()), i64::from(canvas.height()));
    let (cols_from, cols_to) = (left.max(0), right.min(canvas_w - 1));
    if cols_from > cols_to {
        return;
    }

    let mut blend = Blend(std::mem::replace(canvas, RgbaImage::new(0, 0)));
    for band in &bands {
        let (rows_from, rows_to) = (band.top.max(0), band.bottom.min(canvas_h - 1));
        if rows_from > rows_to {
            continue;
        }
        // Clipped to the canvas, so every value fits the rect's i32/u32 fields.
        let rect = Rect::at(cols_from as i32, rows_from as i32)
            .of_size((cols_to - cols_from + 1) as u32, (rows_to - rows_from + 1) as u32);
        draw_filled_rect_mut(&mut blend, rect, color.with_alpha(band.opacity()).to_rgba());
    }
    *canvas = blend.0;
}
