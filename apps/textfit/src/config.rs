use anyhow::{Context, Result};

use textfit::layout::FontFamily;
use textfit::{ClampOptions, Length};

/// Demo configuration loaded from environment variables (and `.env`, if present).
#[derive(Debug, Clone)]
pub struct Config {
    pub max_lines: u32,
    pub use_soft_clamp: bool,
    pub strict: bool,
    pub min_font_size: Length,
    pub max_font_size: Option<Length>,
    /// Container width in px.
    pub width_px: f32,
    /// Stylesheet font size of the headings in px.
    pub font_size_px: f32,
    pub font: FontFamily,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            max_lines: parse_env("TEXTFIT_MAX_LINES", 1)?,
            use_soft_clamp: parse_env("TEXTFIT_SOFT_CLAMP", true)?,
            strict: parse_env("TEXTFIT_STRICT", true)?,
            min_font_size: length_env("TEXTFIT_MIN_FONT_SIZE")?
                .unwrap_or(Length::px(1.0)?),
            max_font_size: length_env("TEXTFIT_MAX_FONT_SIZE")?,
            width_px: parse_env("TEXTFIT_WIDTH", 320.0)?,
            font_size_px: parse_env("TEXTFIT_FONT_SIZE", 32.0)?,
            font: match std::env::var("TEXTFIT_FONT") {
                Ok(v) => v
                    .parse::<FontFamily>()
                    .map_err(anyhow::Error::msg)
                    .context("TEXTFIT_FONT must be 'inter' or 'oswald'")?,
                Err(_) => FontFamily::Inter,
            },
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    pub fn clamp_options(&self) -> ClampOptions {
        let options = ClampOptions::default()
            .max_lines(self.max_lines)
            .use_soft_clamp(self.use_soft_clamp)
            .strict(self.strict)
            .min_font_size(self.min_font_size);
        match self.max_font_size {
            Some(max) => options.max_font_size(max),
            None => options,
        }
    }
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value: {raw:?}")),
        Err(_) => Ok(default),
    }
}

fn length_env(key: &str) -> Result<Option<Length>> {
    std::env::var(key)
        .ok()
        .map(|raw| {
            raw.parse::<Length>()
                .with_context(|| format!("Environment variable '{key}' is not a valid length"))
        })
        .transpose()
}
