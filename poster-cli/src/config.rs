//! Runtime configuration loaded from the environment (and `.env`).

use std::path::PathBuf;

use poster_canvas::{CanvasOptions, ResizeFilter};
use poster_canvas::text::DEFAULT_DPI;

/// CLI settings with their environment overrides applied.
#[derive(Debug, Clone, PartialEq)]
pub struct CliConfig {
    /// Font used when a job does not name one (`POSTER_FONT`).
    pub default_font: Option<PathBuf>,
    /// `POSTER_RESIZE_FILTER`
    pub resize_filter: ResizeFilter,
    /// `POSTER_TEXT_DPI`
    pub text_dpi: f32,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            default_font: None,
            resize_filter: ResizeFilter::default(),
            text_dpi: DEFAULT_DPI,
        }
    }
}

impl CliConfig {
    /// Load configuration from process environment variables.
    pub fn load() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any key lookup; unset or unparsable
    /// values keep their defaults.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let g = |key: &str| get(key).map(|v| v.trim().to_string()).unwrap_or_default();
        let defaults = Self::default();

        let default_font = Some(g("POSTER_FONT"))
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);

        let resize_filter = match g("POSTER_RESIZE_FILTER") {
            v if v.is_empty() => defaults.resize_filter,
            v => v.parse().unwrap_or_else(|e| {
                tracing::warn!("{e}, using {:?}", defaults.resize_filter);
                defaults.resize_filter
            }),
        };

        Self {
            default_font,
            resize_filter,
            text_dpi: parse_f32(&g("POSTER_TEXT_DPI"), defaults.text_dpi),
        }
    }

    pub fn canvas_options(&self) -> CanvasOptions {
        CanvasOptions {
            resize_filter: self.resize_filter,
            text_dpi: self.text_dpi,
        }
    }
}

fn parse_f32(s: &str, default: f32) -> f32 {
    if s.is_empty() {
        return default;
    }
    match s.parse::<f32>() {
        Ok(v) if v > 0.0 => v,
        _ => default,
    }
}

/// Load .env from multiple candidate paths.
pub fn load_dotenv() {
    let candidates = [".env", "../.env"];
    for path in &candidates {
        if dotenvy::from_filename(path).is_ok() {
            tracing::info!("Loaded .env from: {path}");
            return;
        }
    }
    tracing::debug!("No .env file found, using system environment variables");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_gives_defaults() {
        assert_eq!(CliConfig::from_lookup(|_| None), CliConfig::default());
    }

    #[test]
    fn overrides_are_applied() {
        let config = CliConfig::from_lookup(lookup(&[
            ("POSTER_FONT", " /fonts/Poster.ttf "),
            ("POSTER_RESIZE_FILTER", "Triangle"),
            ("POSTER_TEXT_DPI", "72"),
        ]));
        assert_eq!(config.default_font, Some(PathBuf::from("/fonts/Poster.ttf")));
        assert_eq!(config.resize_filter, ResizeFilter::Triangle);
        assert_eq!(config.text_dpi, 72.0);
        assert_eq!(config.canvas_options().resize_filter, ResizeFilter::Triangle);
    }

    #[test]
    fn bad_values_fall_back() {
        let config = CliConfig::from_lookup(lookup(&[
            ("POSTER_RESIZE_FILTER", "sharpest"),
            ("POSTER_TEXT_DPI", "-5"),
            ("POSTER_FONT", ""),
        ]));
        assert_eq!(config, CliConfig::default());
    }
}
