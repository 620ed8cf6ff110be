//! Serializable poster description.
//!
//! A job names a background, a font and an ordered list of layers. Every
//! layer field left out takes the same default as the matching
//! [`PosterCanvas`] operation.
//!
//! ```json
//! {
//!   "background": "bg.jpg",
//!   "font": "NotoSans.ttf",
//!   "layers": [
//!     { "type": "image", "src": "avatar.png", "x": 40, "y": 40, "width": 120, "height": 120, "mode": "crop", "radius": 60 },
//!     { "type": "gradient", "color": "#000", "x1": 0, "y1": 600, "x2": 750, "y2": 1000 },
//!     { "type": "text", "text": "Hello", "x": 40, "y": 900, "color": "#fff", "size": 32 }
//!   ]
//! }
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::canvas::{CanvasOptions, ImageLayer, PosterCanvas};
use crate::color::{Color, DEFAULT_TEXT_COLOR};
use crate::gradient::DEFAULT_DEPTH;
use crate::resize::Placement;
use crate::source::ImageSource;
use crate::text::{DEFAULT_FONT_SIZE, TextStyle};
use crate::Result;

/// A complete poster: background, font and layers in drawing order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PosterJob {
    pub background: PathBuf,
    #[serde(default)]
    pub font: Option<PathBuf>,
    #[serde(default)]
    pub layers: Vec<Layer>,
    /// Reject malformed layer colors instead of drawing them black.
    #[serde(default)]
    pub strict_colors: bool,
}

/// One drawing step of a [`PosterJob`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Layer {
    Image {
        /// File path, or base64 data when `base64` is set.
        src: String,
        #[serde(default)]
        base64: bool,
        #[serde(default)]
        x: i64,
        #[serde(default)]
        y: i64,
        #[serde(default)]
        width: u32,
        #[serde(default)]
        height: u32,
        #[serde(default)]
        mode: Placement,
        #[serde(default)]
        radius: u32,
    },
    Text {
        text: String,
        #[serde(default)]
        x: i64,
        #[serde(default)]
        y: i64,
        #[serde(default = "default_text_color")]
        color: String,
        #[serde(default = "default_font_size")]
        size: f32,
        #[serde(default)]
        angle: f32,
    },
    Gradient {
        color: String,
        x1: i64,
        y1: i64,
        x2: i64,
        y2: i64,
        #[serde(default = "default_depth")]
        deep: i32,
        #[serde(default)]
        reverse: bool,
    },
}

fn default_text_color() -> String {
    DEFAULT_TEXT_COLOR.to_string()
}

fn default_font_size() -> f32 {
    DEFAULT_FONT_SIZE
}

fn default_depth() -> i32 {
    DEFAULT_DEPTH
}

impl PosterJob {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Build the poster.
    ///
    /// Relative paths resolve against `base_dir`. `fallback_font` is used
    /// when the job names no font; with neither, text layers fail.
    pub fn render(
        &self,
        base_dir: &Path,
        fallback_font: Option<&Path>,
        options: CanvasOptions,
    ) -> Result<PosterCanvas> {
        let font = self
            .font
            .as_deref()
            .or(fallback_font)
            .map(|f| resolve(base_dir, f))
            .unwrap_or_default();
        let background = resolve(base_dir, &self.background);
        let mut poster = PosterCanvas::from_source(&ImageSource::file(background), font, options)?;

        for layer in &self.layers {
            if self.strict_colors {
                check_color(layer)?;
            }
            apply_layer(&mut poster, base_dir, layer)?;
        }
        info!(layers = self.layers.len(), "Poster job rendered");
        Ok(poster)
    }
}

fn apply_layer(poster: &mut PosterCanvas, base_dir: &Path, layer: &Layer) -> Result<()> {
    match layer {
        Layer::Image {
            src,
            base64,
            x,
            y,
            width,
            height,
            mode,
            radius,
        } => {
            let source = if *base64 {
                ImageSource::base64(src.as_str())
            } else {
                ImageSource::file(resolve(base_dir, Path::new(src)))
            };
            let placement = ImageLayer::at(*x, *y)
                .size(*width, *height)
                .placement(*mode)
                .radius(*radius);
            poster.add_image(&source, placement)?;
        }
        Layer::Text {
            text,
            x,
            y,
            color,
            size,
            angle,
        } => {
            let style = TextStyle::default().color(color).size(*size).angle(*angle);
            poster.add_text(text, *x, *y, &style)?;
        }
        Layer::Gradient {
            color,
            x1,
            y1,
            x2,
            y2,
            deep,
            reverse,
        } => {
            poster.add_horizontal_gradient(color, (*x1, *y1), (*x2, *y2), *deep, *reverse);
        }
    }
    Ok(())
}

fn check_color(layer: &Layer) -> Result<()> {
    match layer {
        Layer::Text { color, .. } | Layer::Gradient { color, .. } => Color::from_hex(color).map(|_| ()),
        Layer::Image { .. } => Ok(()),
    }
}

fn resolve(base_dir: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}
