//! Greedy word-wrap used by the simulated surface to turn text into line boxes.

use crate::layout::font_metrics::FontMetricTable;

/// Breaks on ordinary whitespace only; a non-breaking space glues its neighbours.
fn is_break_opportunity(c: char) -> bool {
    c.is_whitespace() && c != '\u{a0}'
}

/// Greedy word-wrap simulation. Returns the px width of every line.
///
/// A word wider than `max_width_px` overflows its own line rather than being
/// split, matching `overflow-wrap: normal`. Text with no words returns an
/// empty vec.
pub fn wrap_lines(
    text: &str,
    metrics: &FontMetricTable,
    font_size_px: f32,
    max_width_px: f32,
) -> Vec<f32> {
    let words: Vec<&str> = text
        .split(is_break_opportunity)
        .filter(|w| !w.is_empty())
        .collect();
    if words.is_empty() {
        return vec![];
    }

    let space_w = metrics.space_width * font_size_px;
    let mut lines: Vec<f32> = Vec::new();
    let mut current_width = 0.0_f32;
    let mut first_on_line = true;

    for word in &words {
        let word_w = metrics.measure_px(word, font_size_px);
        let gap = if first_on_line { 0.0 } else { space_w };

        if !first_on_line && current_width + gap + word_w > max_width_px {
            lines.push(current_width);
            current_width = word_w;
        } else {
            current_width += gap + word_w;
            first_on_line = false;
        }
    }
    lines.push(current_width);
    lines
}

/// Number of line boxes `text` occupies.
pub fn count_lines(
    text: &str,
    metrics: &FontMetricTable,
    font_size_px: f32,
    max_width_px: f32,
) -> usize {
    wrap_lines(text, metrics, font_size_px, max_width_px).len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::font_metrics::{get_metrics, FontFamily};

    #[test]
    fn test_empty_and_whitespace_have_no_lines() {
        let metrics = get_metrics(FontFamily::Inter);
        assert_eq!(count_lines("", metrics, 16.0, 100.0), 0);
        assert_eq!(count_lines("  \n\t ", metrics, 16.0, 100.0), 0);
    }

    #[test]
    fn test_short_text_fits_one_line() {
        let metrics = get_metrics(FontFamily::Inter);
        assert_eq!(count_lines("Travis", metrics, 16.0, 200.0), 1);
    }

    #[test]
    fn test_wraps_at_word_boundary() {
        let metrics = get_metrics(FontFamily::Inter);
        // "Travis Van Couvering" is ~9.4em; at 32px that is ~300px.
        let lines = wrap_lines("Travis Van Couvering", metrics, 32.0, 200.0);
        assert_eq!(lines.len(), 2);
        assert!(lines.iter().all(|w| *w <= 200.0));
    }

    #[test]
    fn test_overlong_word_overflows_its_own_line() {
        let metrics = get_metrics(FontFamily::Inter);
        let lines = wrap_lines("Couvering", metrics, 32.0, 50.0);
        assert_eq!(lines.len(), 1);
        assert!(lines[0] > 50.0);
    }

    #[test]
    fn test_nbsp_does_not_break() {
        let metrics = get_metrics(FontFamily::Inter);
        let glued = "Travis\u{a0}Van\u{a0}Couvering";
        assert_eq!(count_lines(glued, metrics, 32.0, 100.0), 1);
        assert_eq!(count_lines("\u{a0}", metrics, 16.0, 100.0), 1);
    }
}
