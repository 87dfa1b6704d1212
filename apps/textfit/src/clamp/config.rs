//! Clamp configuration: the optional, user-facing [`ClampOptions`] and the
//! frozen [`ClampConfig`] a controller resolves them into.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::FitError;

pub const DEFAULT_MAX_LINES: u32 = 1;
pub const DEFAULT_MIN_FONT_SIZE_PX: f32 = 1.0;
pub const MAX_LINES_LIMIT: u32 = 10_000;
/// Ceiling for font sizes; keeps the 1px search loop short and exact in `f32`.
pub const MAX_FONT_SIZE_PX: f32 = 4096.0;
pub const DEFAULT_ELLIPSIS: &str = "\u{2026}";

const PX_PER_PT: f32 = 4.0 / 3.0;

// ────────────────────────────────────────────────────────────────────────────
// Length
// ────────────────────────────────────────────────────────────────────────────

/// A non-negative CSS length, normalized to px.
///
/// Parses a bare number (px), `"<n>px"`, or `"<n>pt"`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "LengthRepr", into = "f32")]
pub struct Length(f32);

impl Length {
    pub fn px(value: f32) -> Result<Self, FitError> {
        if !value.is_finite() || value < 0.0 {
            return Err(FitError::NonFiniteLength(value));
        }
        Ok(Length(value))
    }

    pub fn as_px(self) -> f32 {
        self.0
    }
}

impl FromStr for Length {
    type Err = FitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let lower = trimmed.to_ascii_lowercase();
        let (number, scale) = if let Some(n) = lower.strip_suffix("px") {
            (n, 1.0)
        } else if let Some(n) = lower.strip_suffix("pt") {
            (n, PX_PER_PT)
        } else {
            (lower.as_str(), 1.0)
        };
        let value: f32 = number
            .trim()
            .parse()
            .map_err(|_| FitError::InvalidLength(trimmed.to_string()))?;
        Length::px(value * scale)
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}px", self.0)
    }
}

impl From<Length> for f32 {
    fn from(length: Length) -> f32 {
        length.0
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LengthRepr {
    Number(f32),
    Text(String),
}

impl TryFrom<LengthRepr> for Length {
    type Error = FitError;

    fn try_from(repr: LengthRepr) -> Result<Self, Self::Error> {
        match repr {
            LengthRepr::Number(n) => Length::px(n),
            LengthRepr::Text(s) => s.parse(),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Options (input) and config (resolved)
// ────────────────────────────────────────────────────────────────────────────

/// Construction options. Every field is optional; unset fields take the
/// defaults `{maxLines: 1, useSoftClamp: true, strict: true, minFontSize: 1}`,
/// and `basisLineHeight` / `maxFontSize` are inferred from the surface.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ClampOptions {
    pub max_lines: Option<u32>,
    pub use_soft_clamp: Option<bool>,
    pub strict: Option<bool>,
    pub basis_line_height: Option<Length>,
    pub min_font_size: Option<Length>,
    pub max_font_size: Option<Length>,
    pub ellipsis: Option<String>,
}

impl ClampOptions {
    pub fn from_json(json: &str) -> Result<Self, FitError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn max_lines(mut self, max_lines: u32) -> Self {
        self.max_lines = Some(max_lines);
        self
    }

    pub fn use_soft_clamp(mut self, enabled: bool) -> Self {
        self.use_soft_clamp = Some(enabled);
        self
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = Some(strict);
        self
    }

    pub fn basis_line_height(mut self, length: Length) -> Self {
        self.basis_line_height = Some(length);
        self
    }

    pub fn min_font_size(mut self, length: Length) -> Self {
        self.min_font_size = Some(length);
        self
    }

    pub fn max_font_size(mut self, length: Length) -> Self {
        self.max_font_size = Some(length);
        self
    }

    pub fn ellipsis(mut self, marker: impl Into<String>) -> Self {
        self.ellipsis = Some(marker.into());
        self
    }

    /// The line budget, rejecting zero and anything above `MAX_LINES_LIMIT`.
    pub(crate) fn checked_max_lines(&self) -> Result<u32, FitError> {
        let max_lines = self.max_lines.unwrap_or(DEFAULT_MAX_LINES);
        if max_lines == 0 || max_lines > MAX_LINES_LIMIT {
            return Err(FitError::InvalidMaxLines(max_lines));
        }
        Ok(max_lines)
    }
}

/// Fully resolved configuration, frozen for the lifetime of one controller.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClampConfig {
    pub max_lines: u32,
    pub use_soft_clamp: bool,
    pub strict: bool,
    /// Per-line height in px; only consulted when `strict` is false.
    pub basis_line_height: f32,
    pub min_font_size: f32,
    pub max_font_size: f32,
    pub ellipsis: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_parses_px_pt_and_bare_numbers() {
        assert_eq!("12px".parse::<Length>().unwrap().as_px(), 12.0);
        assert_eq!(" 16 ".parse::<Length>().unwrap().as_px(), 16.0);
        assert!(("9PT".parse::<Length>().unwrap().as_px() - 12.0).abs() < 1e-4);
    }

    #[test]
    fn test_length_rejects_garbage_and_negatives() {
        assert!(matches!(
            "12qq".parse::<Length>(),
            Err(FitError::InvalidLength(s)) if s == "12qq"
        ));
        assert!(matches!(
            "-3px".parse::<Length>(),
            Err(FitError::NonFiniteLength(_))
        ));
        assert!(Length::px(f32::NAN).is_err());
    }

    #[test]
    fn test_options_from_json_accepts_numbers_and_strings() {
        let opts = ClampOptions::from_json(
            r#"{"maxLines": 2, "useSoftClamp": false, "minFontSize": "10px", "maxFontSize": 24}"#,
        )
        .unwrap();
        assert_eq!(opts.max_lines, Some(2));
        assert_eq!(opts.use_soft_clamp, Some(false));
        assert_eq!(opts.min_font_size.map(Length::as_px), Some(10.0));
        assert_eq!(opts.max_font_size.map(Length::as_px), Some(24.0));
        assert_eq!(opts.strict, None);
    }

    #[test]
    fn test_options_from_json_rejects_unknown_fields_and_bad_lengths() {
        assert!(ClampOptions::from_json(r#"{"lines": 2}"#).is_err());
        assert!(ClampOptions::from_json(r#"{"minFontSize": "big"}"#).is_err());
    }

    #[test]
    fn test_checked_max_lines() {
        assert_eq!(ClampOptions::default().checked_max_lines().unwrap(), 1);
        assert_eq!(
            ClampOptions::default()
                .max_lines(3)
                .checked_max_lines()
                .unwrap(),
            3
        );
        assert!(matches!(
            ClampOptions::default().max_lines(0).checked_max_lines(),
            Err(FitError::InvalidMaxLines(0))
        ));
        assert_eq!(
            ClampOptions::default()
                .max_lines(MAX_LINES_LIMIT)
                .checked_max_lines()
                .unwrap(),
            MAX_LINES_LIMIT
        );
        assert!(matches!(
            ClampOptions::default()
                .max_lines(u32::MAX)
                .checked_max_lines(),
            Err(FitError::InvalidMaxLines(u32::MAX))
        ));
    }
}
