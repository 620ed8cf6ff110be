//! Poster composition on top of the `image` raster stack.
//!
//! A [`PosterCanvas`] owns one RGBA buffer sized to a background image.
//! Images, text and gradient masks are merged into it in call order and
//! the result is exported as a base64-encoded PNG.

pub mod canvas;
pub mod color;
pub mod compose;
pub mod gradient;
pub mod job;
pub mod resize;
pub mod rounded;
pub mod source;
pub mod text;

use std::path::PathBuf;

// Re-exports for convenience
pub use canvas::{CanvasOptions, ImageLayer, PosterCanvas};
pub use color::{Color, hex_to_rgb};
pub use gradient::{GradientBand, gradient_bands};
pub use job::{Layer, PosterJob};
pub use resize::{CropRect, Placement, ResizeFilter};
pub use rounded::rounded_corners;
pub use source::ImageSource;
pub use text::TextStyle;

/// Errors that can occur while composing a poster.
#[derive(Debug, thiserror::Error)]
pub enum PosterError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Image decode error: {0}")]
    Decode(#[source] image::ImageError),

    #[error("Invalid base64 image payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Font error ({path}): {reason}")]
    Font { path: PathBuf, reason: String },

    #[error("Invalid target dimensions: {width}x{height}")]
    InvalidDimension { width: u32, height: u32 },

    #[error("Invalid hex color: {0:?}")]
    InvalidColor(String),

    #[error("PNG encode error: {0}")]
    Encode(#[source] image::ImageError),

    #[error("Invalid poster job: {0}")]
    Job(#[from] serde_json::Error),
}

/// Result type alias for poster operations.
pub type Result<T> = std::result::Result<T, PosterError>;
