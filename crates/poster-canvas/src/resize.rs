//! Scale and crop geometry for images placed on a poster.
//!
//! Scale mode keeps the aspect ratio when one target side is zero and
//! stretches otherwise. Crop mode cuts a centered region matching the
//! target aspect ratio, then resamples it to the exact target size.

use std::str::FromStr;

use image::DynamicImage;
use image::imageops::FilterType;
use tracing::debug;

use crate::{PosterError, Result};

/// How an inserted image is fitted to its target size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Placement {
    /// Aspect-preserving resize (or stretch when both sides are given).
    #[default]
    Scale,
    /// Center-crop to the target ratio, then resize to the exact size.
    Crop,
    /// Merge the decoded image at its own size.
    Original,
}

impl FromStr for Placement {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "scale" => Ok(Self::Scale),
            "crop" => Ok(Self::Crop),
            "original" | "none" => Ok(Self::Original),
            other => Err(format!("unknown placement: {other}")),
        }
    }
}

/// Resampling filter used for scale and crop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeFilter {
    Nearest,
    Triangle,
    CatmullRom,
    Gaussian,
    #[default]
    Lanczos3,
}

impl ResizeFilter {
    pub fn filter_type(self) -> FilterType {
        match self {
            Self::Nearest => FilterType::Nearest,
            Self::Triangle => FilterType::Triangle,
            Self::CatmullRom => FilterType::CatmullRom,
            Self::Gaussian => FilterType::Gaussian,
            Self::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

impl FromStr for ResizeFilter {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "nearest" => Ok(Self::Nearest),
            "triangle" | "bilinear" => Ok(Self::Triangle),
            "catmullrom" | "bicubic" => Ok(Self::CatmullRom),
            "gaussian" => Ok(Self::Gaussian),
            "lanczos3" | "lanczos" => Ok(Self::Lanczos3),
            other => Err(format!("unknown resize filter: {other}")),
        }
    }
}

/// Source region extracted in crop mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Compute the output size for scale mode.
///
/// A zero side is derived from the other one and the source aspect ratio,
/// rounded to the nearest pixel (never below 1).
pub fn scaled_size(src_w: u32, src_h: u32, w: u32, h: u32) -> Result<(u32, u32)> {
    match (w, h) {
        (0, 0) => Err(PosterError::InvalidDimension { width: w, height: h }),
        (0, h) => {
            let ratio = f64::from(src_w) / f64::from(src_h.max(1));
            Ok((((f64::from(h) * ratio).round() as u32).max(1), h))
        }
        (w, 0) => {
            let ratio = f64::from(src_h) / f64::from(src_w.max(1));
            Ok((w, ((f64::from(w) * ratio).round() as u32).max(1)))
        }
        (w, h) => Ok((w, h)),
    }
}

/// Compute the centered source region whose aspect ratio matches `w / h`.
///
/// Offsets and sizes are truncated to whole pixels. Equal ratios select
/// the full source.
pub fn crop_rect(src_w: u32, src_h: u32, w: u32, h: u32) -> Result<CropRect> {
    if w == 0 || h == 0 {
        return Err(PosterError::InvalidDimension { width: w, height: h });
    }
    let target = f64::from(w) / f64::from(h);
    let current = f64::from(src_w) / f64::from(src_h.max(1));

    let rect = if target > current {
        let height = (f64::from(src_w) * f64::from(h) / f64::from(w)) as u32;
        CropRect {
            x: 0,
            y: (src_h.saturating_sub(height)) / 2,
            width: src_w,
            height: height.max(1),
        }
    } else if target < current {
        let width = (f64::from(src_h) * f64::from(w) / f64::from(h)) as u32;
        CropRect {
            x: (src_w.saturating_sub(width)) / 2,
            y: 0,
            width: width.max(1),
            height: src_h,
        }
    } else {
        CropRect {
            x: 0,
            y: 0,
            width: src_w,
            height: src_h,
        }
    };
    Ok(rect)
}

/// Resize `img` for scale mode.
pub fn scale_image(img: &DynamicImage, w: u32, h: u32, filter: ResizeFilter) -> Result<DynamicImage> {
    let (orig_w, orig_h) = (img.width(), img.height());
    let (new_width, new_height) = scaled_size(orig_w, orig_h, w, h)?;

    debug!(orig_w, orig_h, new_width, new_height, "Scaling image");
    Ok(img.resize_exact(new_width, new_height, filter.filter_type()))
}

/// Center-crop `img` to the ratio of `w×h`, then resize to exactly `w×h`.
pub fn crop_image(img: &DynamicImage, w: u32, h: u32, filter: ResizeFilter) -> Result<DynamicImage> {
    let rect = crop_rect(img.width(), img.height(), w, h)?;

    debug!(
        orig_w = img.width(),
        orig_h = img.height(),
        crop_x = rect.x,
        crop_y = rect.y,
        crop_w = rect.width,
        crop_h = rect.height,
        new_width = w,
        new_height = h,
        "Cropping image"
    );

    let region = img.crop_imm(rect.x, rect.y, rect.width, rect.height);
    Ok(region.resize_exact(w, h, filter.filter_type()))
}
