//! Measurement protocol: report `(inner_height, line_height)` with box-model
//! distortions zeroed, leaving no residue on the surface.
//!
//! The inline style and the content are overridden through a [`MeasureScope`]
//! that restores both on drop, so every exit path (including unwinding)
//! puts the surface back exactly as it was.

use serde::Serialize;
use tracing::debug;

use crate::clamp::surface::{InlineStyle, RenderSurface};

/// Properties that would otherwise leak into a content-height measurement.
const ZEROED_PROPERTIES: [&str; 5] = [
    "min-height",
    "border-top-width",
    "border-bottom-width",
    "padding-top",
    "padding-bottom",
];

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Measurement {
    /// Content height of the current rendering, in px.
    pub inner_height: f32,
    /// Height of one line box at the current style, in px.
    pub line_height: f32,
}

impl Measurement {
    /// Lines the content occupies when each line is `line_height` tall.
    /// A non-positive `line_height` means nothing is rendered: zero lines.
    pub fn lines_at(&self, line_height: f32) -> f32 {
        if line_height > 0.0 {
            self.inner_height / line_height
        } else {
            0.0
        }
    }
}

/// One non-breaking space followed by `max_lines` forced breaks.
pub fn calibration_markup(max_lines: u32) -> String {
    format!("&nbsp;{}", "<br>".repeat(max_lines as usize))
}

/// Scoped style/content override. Restores content first, then the style text
/// verbatim.
struct MeasureScope<'a, S: RenderSurface + ?Sized> {
    surface: &'a mut S,
    style: String,
    markup: Option<String>,
}

impl<'a, S: RenderSurface + ?Sized> MeasureScope<'a, S> {
    fn enter(surface: &'a mut S) -> Self {
        let style = surface.inline_style();
        let mut overridden = InlineStyle::parse(&style);
        for property in ZEROED_PROPERTIES {
            overridden.append(property, "0");
        }
        surface.set_inline_style(&overridden.to_string());
        MeasureScope {
            surface,
            style,
            markup: None,
        }
    }

    fn replace_markup(&mut self, markup: &str) {
        if self.markup.is_none() {
            self.markup = Some(self.surface.inner_markup());
        }
        self.surface.set_inner_markup(markup);
    }

    fn height(&self) -> f32 {
        self.surface.offset_height()
    }
}

impl<S: RenderSurface + ?Sized> Drop for MeasureScope<'_, S> {
    fn drop(&mut self) {
        if let Some(markup) = self.markup.take() {
            self.surface.set_inner_markup(&markup);
        }
        self.surface.set_inline_style(&self.style);
    }
}

/// Measures the surface's content height and its true per-line height.
///
/// Callers must suspend mutation observation around this call; the scope's
/// writes would otherwise be observed as changes.
pub fn measure<S: RenderSurface + ?Sized>(surface: &mut S, max_lines: u32) -> Measurement {
    let max_lines = max_lines.max(1);
    let mut scope = MeasureScope::enter(surface);
    let inner_height = scope.height();
    scope.replace_markup(&calibration_markup(max_lines));
    let line_height = scope.height() / max_lines as f32;
    drop(scope);

    debug!(inner_height, line_height, "measured surface");
    Measurement {
        inner_height,
        line_height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{ElementStyle, SimulatedElement};
    use pretty_assertions::assert_eq;

    fn padded_heading(text: &str) -> SimulatedElement {
        let mut el = SimulatedElement::new(
            text,
            200.0,
            ElementStyle {
                font_size_px: 20.0,
                padding_top_px: 7.0,
                border_bottom_px: 3.0,
                ..ElementStyle::default()
            },
        );
        el.set_inline_style("color: red; min-height: 90px");
        el
    }

    #[test]
    fn test_calibration_markup() {
        assert_eq!(calibration_markup(1), "&nbsp;<br>");
        assert_eq!(calibration_markup(3), "&nbsp;<br><br><br>");
    }

    #[test]
    fn test_measure_ignores_padding_border_and_min_height() {
        let mut el = padded_heading("Travis Van Couvering");
        let m = measure(&mut el, 1);
        // One line at 20px * 1.2 fits in 200px.
        assert!((m.inner_height - 24.0).abs() < 1e-3, "{m:?}");
        assert!((m.line_height - 24.0).abs() < 1e-3, "{m:?}");
    }

    #[test]
    fn test_line_height_is_independent_of_content_and_budget() {
        let mut el = padded_heading("Travis Van Couvering Travis Van Couvering");
        let one = measure(&mut el, 1);
        let three = measure(&mut el, 3);
        assert!((one.line_height - three.line_height).abs() < 1e-3);
        assert!((one.inner_height - 48.0).abs() < 1e-3, "{one:?}");
    }

    #[test]
    fn test_measure_leaves_no_residue() {
        let mut el = padded_heading("a & b");
        let markup = el.inner_markup();
        let style = el.inline_style();
        let height = el.offset_height();

        measure(&mut el, 2);

        assert_eq!(el.inner_markup(), markup);
        assert_eq!(el.inline_style(), style);
        assert_eq!(el.offset_height(), height);
    }

    #[test]
    fn test_lines_at_handles_zero_line_height() {
        let m = Measurement {
            inner_height: 0.0,
            line_height: 0.0,
        };
        assert_eq!(m.lines_at(0.0), 0.0);
        let m = Measurement {
            inner_height: 48.0,
            line_height: 24.0,
        };
        assert_eq!(m.lines_at(24.0), 2.0);
    }
}
