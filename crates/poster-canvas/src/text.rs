//! Text rendering onto the poster canvas.
//!
//! Text is laid out along a baseline anchored at a point, rasterized into a
//! coverage mask and composited over the canvas, optionally rotated
//! counter-clockwise around the anchor.

use std::path::Path;

use ab_glyph::{Font, FontVec, PxScale, ScaleFont, point};
use image::{GrayImage, Luma, RgbaImage};
use tracing::debug;

use crate::color::{Color, DEFAULT_TEXT_COLOR, hex_to_rgb};
use crate::compose::blend_onto;
use crate::{PosterError, Result};

/// Default font size in points.
pub const DEFAULT_FONT_SIZE: f32 = 24.0;

/// Resolution used to turn point sizes into pixels.
pub const DEFAULT_DPI: f32 = 96.0;

/// Color, size and rotation for one `add_text` call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub color: Color,
    /// Size in points.
    pub size: f32,
    /// Rotation in degrees, counter-clockwise.
    pub angle: f32,
}

impl Default for TextStyle {
    fn default() -> Self {
        let (r, g, b) = hex_to_rgb(DEFAULT_TEXT_COLOR);
        Self {
            color: Color::rgb(r, g, b),
            size: DEFAULT_FONT_SIZE,
            angle: 0.0,
        }
    }
}

impl TextStyle {
    /// Set the color from a hex string; malformed input yields black.
    pub fn color(mut self, hex: &str) -> Self {
        let (r, g, b) = hex_to_rgb(hex);
        self.color = Color::rgb(r, g, b);
        self
    }

    pub fn size(mut self, size: f32) -> Self {
        self.size = size;
        self
    }

    pub fn angle(mut self, degrees: f32) -> Self {
        self.angle = degrees;
        self
    }
}

/// Read and parse a TTF/OTF font file.
pub fn load_font(path: &Path) -> Result<FontVec> {
    let data = std::fs::read(path).map_err(|e| PosterError::Font {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    FontVec::try_from_vec(data).map_err(|_| PosterError::Font {
        path: path.to_path_buf(),
        reason: "invalid font data (TTF/OTF)".into(),
    })
}

/// Pixel scale for a point size at the given resolution.
pub fn pt_to_px_scale<F: Font>(font: &F, pt: f32, dpi: f32) -> PxScale {
    let px_per_em = pt * dpi / 72.0;
    match font.units_per_em() {
        Some(units) if units > 0.0 => PxScale::from(px_per_em * font.height_unscaled() / units),
        _ => PxScale::from(px_per_em),
    }
}

/// Glyph coverage of one line of text.
///
/// `origin` is the position of mask pixel `(0, 0)` relative to the start of
/// the baseline.
#[derive(Debug, Clone)]
pub struct Coverage {
    pub mask: GrayImage,
    pub origin: (i64, i64),
}

/// Rasterize `text` on a baseline at y = 0 starting at x = 0.
///
/// Returns `None` when nothing would be drawn (empty or whitespace-only text).
pub fn rasterize_line<F: Font>(font: &F, scale: PxScale, text: &str) -> Option<Coverage> {
    let scaled = font.as_scaled(scale);
    let mut caret = 0.0f32;
    let mut prev_glyph: Option<ab_glyph::GlyphId> = None;
    let mut outlined = Vec::new();

    for ch in text.chars() {
        let glyph_id = scaled.glyph_id(ch);
        if let Some(prev) = prev_glyph {
            caret += scaled.kern(prev, glyph_id);
        }
        let glyph = glyph_id.with_scale_and_position(scale, point(caret, 0.0));
        caret += scaled.h_advance(glyph_id);
        prev_glyph = Some(glyph_id);
        if let Some(g) = font.outline_glyph(glyph) {
            outlined.push(g);
        }
    }

    let (min_x, min_y, max_x, max_y) = outlined.iter().map(|g| g.px_bounds()).fold(
        (f32::MAX, f32::MAX, f32::MIN, f32::MIN),
        |(x0, y0, x1, y1), b| (x0.min(b.min.x), y0.min(b.min.y), x1.max(b.max.x), y1.max(b.max.y)),
    );
    if outlined.is_empty() || max_x <= min_x || max_y <= min_y {
        return None;
    }

    let (ox, oy) = (min_x.floor() as i64, min_y.floor() as i64);
    let width = (max_x.ceil() as i64 - ox) as u32;
    let height = (max_y.ceil() as i64 - oy) as u32;
    let mut mask = GrayImage::new(width, height);

    for g in &outlined {
        let bounds = g.px_bounds();
        let (bx, by) = (bounds.min.x as i64 - ox, bounds.min.y as i64 - oy);
        g.draw(|gx, gy, c| {
            let (mx, my) = (bx + i64::from(gx), by + i64::from(gy));
            if mx >= 0 && my >= 0 && (mx as u32) < width && (my as u32) < height {
                let value = (c.clamp(0.0, 1.0) * 255.0).round() as u8;
                let px = mask.get_pixel_mut(mx as u32, my as u32);
                px.0[0] = px.0[0].max(value);
            }
        });
    }

    Some(Coverage {
        mask,
        origin: (ox, oy),
    })
}

/// Composite `coverage` onto `canvas` with its baseline starting at
/// `anchor`, rotated `angle` degrees counter-clockwise around the anchor.
pub fn draw_coverage(
    canvas: &mut RgbaImage,
    coverage: &Coverage,
    anchor: (i64, i64),
    angle: f32,
    color: Color,
) {
    let (sin, cos) = f64::from(angle).to_radians().sin_cos();
    let (ax, ay) = (anchor.0 as f64, anchor.1 as f64);
    let (ox, oy) = (coverage.origin.0 as f64, coverage.origin.1 as f64);
    let (mw, mh) = (coverage.mask.width(), coverage.mask.height());

    // Screen y points down, so a positive angle turns the baseline upwards.
    let forward = |dx: f64, dy: f64| (ax + dx * cos + dy * sin, ay - dx * sin + dy * cos);
    let corners = [
        forward(ox, oy),
        forward(ox + f64::from(mw), oy),
        forward(ox, oy + f64::from(mh)),
        forward(ox + f64::from(mw), oy + f64::from(mh)),
    ];
    let min_x = corners.iter().map(|c| c.0).fold(f64::MAX, f64::min).floor().max(0.0) as i64;
    let min_y = corners.iter().map(|c| c.1).fold(f64::MAX, f64::min).floor().max(0.0) as i64;
    let max_x = (corners.iter().map(|c| c.0).fold(f64::MIN, f64::max).ceil() as i64)
        .min(i64::from(canvas.width()));
    let max_y = (corners.iter().map(|c| c.1).fold(f64::MIN, f64::max).ceil() as i64)
        .min(i64::from(canvas.height()));

    for y in min_y..max_y {
        for x in min_x..max_x {
            let px = x as f64 + 0.5 - ax;
            let py = y as f64 + 0.5 - ay;
            let lx = px * cos - py * sin - ox;
            let ly = px * sin + py * cos - oy;
            if lx < 0.0 || ly < 0.0 || lx >= f64::from(mw) || ly >= f64::from(mh) {
                continue;
            }
            let Luma([c]) = *coverage.mask.get_pixel(lx as u32, ly as u32);
            if c == 0 {
                continue;
            }
            let alpha = (u32::from(c) * u32::from(color.a) + 127) / 255;
            blend_onto(canvas, x as u32, y as u32, color.with_alpha(alpha as u8).to_rgba());
        }
    }
}

/// Lay out and draw `text` with its baseline starting at `anchor`.
pub fn draw_text<F: Font>(
    canvas: &mut RgbaImage,
    font: &F,
    anchor: (i64, i64),
    style: &TextStyle,
    dpi: f32,
    text: &str,
) {
    let scale = pt_to_px_scale(font, style.size, dpi);
    debug!(
        x = anchor.0,
        y = anchor.1,
        size = style.size,
        px = scale.y,
        angle = style.angle,
        chars = text.chars().count(),
        "Drawing text"
    );
    if let Some(coverage) = rasterize_line(font, scale, text) {
        draw_coverage(canvas, &coverage, anchor, style.angle, style.color);
    }
}
