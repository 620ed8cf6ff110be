//! The poster canvas and its composition operations.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use base64::{Engine as _, engine::general_purpose};
use image::{ImageFormat, RgbaImage};
use tracing::{debug, info};

use crate::color::Color;
use crate::compose;
use crate::gradient::{self, DEFAULT_DEPTH};
use crate::resize::{self, Placement, ResizeFilter};
use crate::rounded::rounded_corners;
use crate::source::ImageSource;
use crate::text::{self, DEFAULT_DPI, TextStyle};
use crate::{PosterError, Result};

/// Tunables that stay fixed for the lifetime of a canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasOptions {
    pub resize_filter: ResizeFilter,
    /// Resolution for converting text point sizes to pixels.
    pub text_dpi: f32,
}

impl Default for CanvasOptions {
    fn default() -> Self {
        Self {
            resize_filter: ResizeFilter::default(),
            text_dpi: DEFAULT_DPI,
        }
    }
}

/// Placement of one image on the canvas.
///
/// `width`/`height` default to 0, placement to [`Placement::Scale`] and the
/// corner radius to 0 (square corners).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImageLayer {
    pub x: i64,
    pub y: i64,
    pub width: u32,
    pub height: u32,
    pub placement: Placement,
    pub radius: u32,
}

impl ImageLayer {
    pub fn at(x: i64, y: i64) -> Self {
        Self {
            x,
            y,
            ..Self::default()
        }
    }

    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn placement(mut self, placement: Placement) -> Self {
        self.placement = placement;
        self
    }

    pub fn radius(mut self, radius: u32) -> Self {
        self.radius = radius;
        self
    }
}

/// One poster under construction.
///
/// The canvas is sized to the background at construction and never
/// resized; every operation draws into it in call order.
#[derive(Debug, Clone)]
pub struct PosterCanvas {
    canvas: RgbaImage,
    font: PathBuf,
    options: CanvasOptions,
}

impl PosterCanvas {
    /// Open a background image file and remember the font used for text.
    pub fn open(background: impl AsRef<Path>, font: impl Into<PathBuf>) -> Result<Self> {
        Self::from_source(
            &ImageSource::file(background.as_ref()),
            font,
            CanvasOptions::default(),
        )
    }

    /// Like [`PosterCanvas::open`], with explicit options.
    pub fn with_options(
        background: impl AsRef<Path>,
        font: impl Into<PathBuf>,
        options: CanvasOptions,
    ) -> Result<Self> {
        Self::from_source(&ImageSource::file(background.as_ref()), font, options)
    }

    /// Build a canvas from any image source.
    pub fn from_source(
        background: &ImageSource<'_>,
        font: impl Into<PathBuf>,
        options: CanvasOptions,
    ) -> Result<Self> {
        let canvas = background.decode()?.to_rgba8();
        let font = font.into();
        info!(
            width = canvas.width(),
            height = canvas.height(),
            font = %font.display(),
            "Poster canvas created"
        );
        Ok(Self {
            canvas,
            font,
            options,
        })
    }

    /// Canvas width and height in pixels.
    pub fn dimensions(&self) -> (u32, u32) {
        self.canvas.dimensions()
    }

    pub fn font(&self) -> &Path {
        &self.font
    }

    pub fn options(&self) -> &CanvasOptions {
        &self.options
    }

    /// Borrow the composited pixels.
    pub fn image(&self) -> &RgbaImage {
        &self.canvas
    }

    pub fn into_image(self) -> RgbaImage {
        self.canvas
    }

    /// Decode `source`, fit it according to `layer` and merge it at
    /// `(layer.x, layer.y)`.
    ///
    /// The canvas is left untouched if decoding or sizing fails.
    pub fn add_image(&mut self, source: &ImageSource<'_>, layer: ImageLayer) -> Result<&mut Self> {
        let img = source.decode()?;
        let filter = self.options.resize_filter;
        let fitted = match layer.placement {
            Placement::Scale => resize::scale_image(&img, layer.width, layer.height, filter)?,
            Placement::Crop => resize::crop_image(&img, layer.width, layer.height, filter)?,
            Placement::Original => img,
        };

        let mut pixels = fitted.to_rgba8();
        if layer.radius > 0 {
            pixels = rounded_corners(&pixels, layer.radius);
        }

        debug!(
            x = layer.x,
            y = layer.y,
            width = pixels.width(),
            height = pixels.height(),
            placement = ?layer.placement,
            radius = layer.radius,
            "Merging image"
        );
        compose::overlay(&mut self.canvas, &pixels, layer.x, layer.y);
        Ok(self)
    }

    /// Draw `text` with its baseline starting at `(x, y)`.
    ///
    /// The font file is read on every call.
    pub fn add_text(&mut self, text: &str, x: i64, y: i64, style: &TextStyle) -> Result<&mut Self> {
        let font = text::load_font(&self.font)?;
        text::draw_text(&mut self.canvas, &font, (x, y), style, self.options.text_dpi, text);
        Ok(self)
    }

    /// Lay a banded alpha gradient of `color` over the rectangle
    /// `(x1, y1)`-`(x2, y2)`.
    ///
    /// `deep` is clamped to `1..=100`. Bands get more opaque downwards, or
    /// less opaque when `reverse` is set.
    pub fn add_horizontal_gradient(
        &mut self,
        color: &str,
        (x1, y1): (i64, i64),
        (x2, y2): (i64, i64),
        deep: i32,
        reverse: bool,
    ) -> &mut Self {
        let color = Color::from_hex_lossy(color);
        gradient::paint_horizontal_gradient(&mut self.canvas, color, (x1, y1), (x2, y2), deep, reverse);
        self
    }

    /// [`PosterCanvas::add_horizontal_gradient`] with the default depth of 20, not reversed.
    pub fn add_default_gradient(&mut self, color: &str, from: (i64, i64), to: (i64, i64)) -> &mut Self {
        self.add_horizontal_gradient(color, from, to, DEFAULT_DEPTH, false)
    }

    /// Encode the canvas as PNG.
    pub fn to_png_bytes(&self) -> Result<Vec<u8>> {
        let mut cursor = Cursor::new(Vec::new());
        self.canvas
            .write_to(&mut cursor, ImageFormat::Png)
            .map_err(PosterError::Encode)?;
        Ok(cursor.into_inner())
    }

    /// Encode the canvas as PNG, then as standard base64.
    pub fn export_base64(&self) -> Result<String> {
        let png = self.to_png_bytes()?;
        debug!(png_len = png.len(), "Exporting poster as base64");
        Ok(general_purpose::STANDARD.encode(png))
    }

    /// Write the canvas to `path` as PNG.
    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let png = self.to_png_bytes()?;
        std::fs::write(path, png).map_err(|source| PosterError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), "Poster saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);
    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);

    fn png_bytes(img: &RgbaImage) -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        img.write_to(&mut cursor, ImageFormat::Png).unwrap();
        cursor.into_inner()
    }

    fn blue_poster(w: u32, h: u32) -> PosterCanvas {
        let bg = png_bytes(&RgbaImage::from_pixel(w, h, BLUE));
        // Nearest keeps solid test colors exact through resampling.
        let options = CanvasOptions {
            resize_filter: ResizeFilter::Nearest,
            ..CanvasOptions::default()
        };
        PosterCanvas::from_source(&ImageSource::bytes(bg), "unused.ttf", options).unwrap()
    }

    fn red_source(w: u32, h: u32) -> ImageSource<'static> {
        ImageSource::bytes(png_bytes(&RgbaImage::from_pixel(w, h, RED)))
    }

    #[test]
    fn canvas_takes_background_dimensions() {
        let poster = blue_poster(120, 80);
        assert_eq!(poster.dimensions(), (120, 80));
        assert_eq!(poster.image().get_pixel(0, 0), &BLUE);
        assert_eq!(poster.font(), Path::new("unused.ttf"));
    }

    #[test]
    fn undecodable_background_is_rejected() {
        let err = PosterCanvas::from_source(
            &ImageSource::bytes(&b"not an image"[..]),
            "font.ttf",
            CanvasOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, PosterError::Decode(_)));
    }

    #[test]
    fn missing_background_file_is_rejected() {
        let err = PosterCanvas::open("/nonexistent/bg.png", "font.ttf").unwrap_err();
        assert!(matches!(err, PosterError::Io { .. }));
    }

    #[test]
    fn scaled_image_keeps_ratio() {
        let mut poster = blue_poster(300, 300);
        poster
            .add_image(&red_source(200, 100), ImageLayer::at(10, 20).size(0, 50))
            .unwrap();
        // 100x50 red block at (10, 20)
        assert_eq!(poster.image().get_pixel(10, 20), &RED);
        assert_eq!(poster.image().get_pixel(109, 69), &RED);
        assert_eq!(poster.image().get_pixel(110, 69), &BLUE);
        assert_eq!(poster.image().get_pixel(109, 70), &BLUE);
        assert_eq!(poster.image().get_pixel(9, 20), &BLUE);
    }

    #[test]
    fn cropped_image_fills_exact_target() {
        let mut poster = blue_poster(100, 100);
        poster
            .add_image(
                &red_source(400, 200),
                ImageLayer::at(0, 0).size(30, 30).placement(Placement::Crop),
            )
            .unwrap();
        assert_eq!(poster.image().get_pixel(29, 29), &RED);
        assert_eq!(poster.image().get_pixel(30, 29), &BLUE);
        assert_eq!(poster.image().get_pixel(29, 30), &BLUE);
    }

    #[test]
    fn original_placement_keeps_source_size() {
        let mut poster = blue_poster(50, 50);
        poster
            .add_image(&red_source(7, 5), ImageLayer::at(1, 1).placement(Placement::Original))
            .unwrap();
        assert_eq!(poster.image().get_pixel(7, 5), &RED);
        assert_eq!(poster.image().get_pixel(8, 5), &BLUE);
        assert_eq!(poster.image().get_pixel(7, 6), &BLUE);
    }

    #[test]
    fn rounded_corners_show_background() {
        let mut poster = blue_poster(60, 60);
        poster
            .add_image(
                &red_source(50, 50),
                ImageLayer::at(5, 5).size(50, 50).radius(10),
            )
            .unwrap();
        assert_eq!(poster.image().get_pixel(5, 5), &BLUE);
        assert_eq!(poster.image().get_pixel(15, 15), &RED);
        assert_eq!(poster.image().get_pixel(30, 5), &RED);
    }

    #[test]
    fn images_are_clipped_at_canvas_edges() {
        let mut poster = blue_poster(40, 40);
        poster
            .add_image(&red_source(20, 20), ImageLayer::at(-10, 30).size(20, 20))
            .unwrap()
            .add_image(&red_source(20, 20), ImageLayer::at(1000, 1000).size(20, 20))
            .unwrap();
        assert_eq!(poster.image().get_pixel(0, 39), &RED);
        assert_eq!(poster.image().get_pixel(10, 39), &BLUE);
        assert_eq!(poster.dimensions(), (40, 40));
    }

    #[test]
    fn zero_scale_target_is_rejected_without_mutation() {
        let mut poster = blue_poster(20, 20);
        let before = poster.image().clone();
        let err = poster
            .add_image(&red_source(10, 10), ImageLayer::at(0, 0))
            .unwrap_err();
        assert!(matches!(err, PosterError::InvalidDimension { width: 0, height: 0 }));
        assert_eq!(poster.image(), &before);
    }

    #[test]
    fn undecodable_overlay_leaves_canvas_untouched() {
        let mut poster = blue_poster(20, 20);
        poster
            .add_image(&red_source(4, 4), ImageLayer::at(0, 0).size(4, 4))
            .unwrap();
        let before = poster.image().clone();
        let err = poster
            .add_image(&ImageSource::base64("AAAA"), ImageLayer::at(0, 0).size(4, 4))
            .unwrap_err();
        assert!(matches!(err, PosterError::Decode(_)));
        assert_eq!(poster.image(), &before);
    }

    #[test]
    fn text_with_missing_font_fails_cleanly() {
        let mut poster = blue_poster(20, 20);
        let before = poster.image().clone();
        let err = poster
            .add_text("hello", 0, 10, &TextStyle::default())
            .unwrap_err();
        assert!(matches!(err, PosterError::Font { .. }));
        assert_eq!(poster.image(), &before);
    }

    #[test]
    fn export_is_repeatable() {
        let mut poster = blue_poster(32, 32);
        poster.add_default_gradient("#000", (0, 0), (31, 31));
        let first = poster.export_base64().unwrap();
        let second = poster.export_base64().unwrap();
        assert_eq!(first, second);
        assert!(!first.is_empty());
    }

    #[test]
    fn exported_gradient_shows_ten_darkening_bands() {
        let mut poster = blue_poster(100, 100);
        poster.add_horizontal_gradient("#000000", (0, 0), (100, 100), 10, false);
        let encoded = poster.export_base64().unwrap();

        let png = general_purpose::STANDARD.decode(encoded).unwrap();
        let decoded = image::load_from_memory(&png).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (100, 100));

        // Bands cover rows 1..=10, 11..=20, ... 91..=100.
        let band_blue = |band: u32| decoded.get_pixel(50, band * 10 + 5)[2];
        assert_eq!(band_blue(0), 255, "top band is fully transparent");
        for band in 1..10 {
            assert!(
                band_blue(band) < band_blue(band - 1),
                "band {band} should be darker than band {}",
                band - 1
            );
        }
        // Uniform within a band.
        assert_eq!(decoded.get_pixel(0, 41), decoded.get_pixel(99, 50));
        assert!(decoded.pixels().all(|p| p[3] == 255));
    }

    #[test]
    fn gradient_accepts_bad_hex_as_black() {
        let mut a = blue_poster(10, 10);
        let mut b = blue_poster(10, 10);
        a.add_horizontal_gradient("nonsense", (0, 0), (9, 9), 2, true);
        b.add_horizontal_gradient("#000000", (0, 0), (9, 9), 2, true);
        assert_eq!(a.image(), b.image());
    }

    #[test]
    fn saves_png_to_disk() {
        let poster = blue_poster(8, 8);
        let path = std::env::temp_dir().join(format!("poster-canvas-save-{}.png", std::process::id()));
        poster.save_png(&path).unwrap();
        let reloaded = image::open(&path).unwrap().to_rgba8();
        let _ = std::fs::remove_file(&path);
        assert_eq!(&reloaded, poster.image());
    }
}
