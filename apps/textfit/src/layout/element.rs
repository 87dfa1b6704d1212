//! A simulated element that implements [`RenderSurface`] on top of the
//! static font metrics and greedy word-wrap.
//!
//! Markup support is limited to what the clamp controller writes: `<br>`
//! (any casing, optionally self-closing) forces a line break, `&nbsp;`,
//! `&amp;`, `&lt;`, `&gt;`, `&quot;` and numeric entities are decoded, and
//! every other tag is ignored.

use serde::{Deserialize, Serialize};

use crate::clamp::config::Length;
use crate::clamp::surface::{InlineStyle, MutationObserverInit, MutationRecord, RenderSurface};
use crate::layout::font_metrics::{get_metrics, FontFamily};
use crate::layout::wrap::count_lines;

/// Line height used when neither the stylesheet nor the inline style sets one.
pub const NORMAL_LINE_HEIGHT: f32 = 1.2;

/// Stylesheet (non-inline) values for the element. Inline declarations of the
/// same properties take precedence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementStyle {
    pub font: FontFamily,
    pub font_size_px: f32,
    /// Unitless multiplier of the font size.
    pub line_height: f32,
    pub padding_top_px: f32,
    pub padding_bottom_px: f32,
    pub border_top_px: f32,
    pub border_bottom_px: f32,
    pub min_height_px: f32,
}

impl Default for ElementStyle {
    fn default() -> Self {
        ElementStyle {
            font: FontFamily::Inter,
            font_size_px: 16.0,
            line_height: NORMAL_LINE_HEIGHT,
            padding_top_px: 0.0,
            padding_bottom_px: 0.0,
            border_top_px: 0.0,
            border_bottom_px: 0.0,
            min_height_px: 0.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SimulatedElement {
    markup: String,
    inline_style: String,
    stylesheet: ElementStyle,
    width_px: f32,
    mounted: bool,
    observer: Option<MutationObserverInit>,
    records: Vec<MutationRecord>,
}

impl SimulatedElement {
    pub fn new(text: &str, width_px: f32, stylesheet: ElementStyle) -> Self {
        SimulatedElement {
            markup: escape_text(text),
            inline_style: String::new(),
            stylesheet,
            width_px,
            mounted: true,
            observer: None,
            records: Vec::new(),
        }
    }

    /// Content-box width. Changing it is a layout change, not a DOM mutation.
    pub fn set_width(&mut self, width_px: f32) {
        self.width_px = width_px;
    }

    pub fn width(&self) -> f32 {
        self.width_px
    }

    /// An unmounted element renders nothing and reports zero height.
    pub fn set_mounted(&mut self, mounted: bool) {
        self.mounted = mounted;
    }

    pub fn stylesheet(&self) -> &ElementStyle {
        &self.stylesheet
    }

    pub fn is_observed(&self) -> bool {
        self.observer.is_some()
    }

    pub fn pending_records(&self) -> usize {
        self.records.len()
    }

    /// Number of line boxes the current content occupies.
    pub fn line_count(&self) -> usize {
        let metrics = get_metrics(self.stylesheet.font);
        let font_size = self.computed_font_size();
        let segments = parse_markup(&self.markup);
        let last = segments.len().saturating_sub(1);

        if segments.len() == 1 {
            return count_lines(&segments[0], metrics, font_size, self.width_px);
        }
        segments
            .iter()
            .enumerate()
            // A trailing <br> does not open a new line box.
            .filter(|(i, seg)| !(*i == last && seg.is_empty()))
            .map(|(_, seg)| count_lines(seg, metrics, font_size, self.width_px).max(1))
            .sum()
    }

    fn style(&self) -> InlineStyle {
        InlineStyle::parse(&self.inline_style)
    }

    fn px_property(&self, style: &InlineStyle, name: &str, fallback: f32) -> f32 {
        style
            .get(name)
            .and_then(|v| v.parse::<Length>().ok())
            .map(Length::as_px)
            .unwrap_or(fallback)
    }

    fn line_height_px(&self, style: &InlineStyle, font_size: f32) -> f32 {
        match style.get("line-height") {
            Some(v) if v.ends_with("px") => self.px_property(style, "line-height", font_size),
            Some(v) => v
                .trim()
                .parse::<f32>()
                .map(|m| m * font_size)
                .unwrap_or(self.stylesheet.line_height * font_size),
            None => self.stylesheet.line_height * font_size,
        }
    }

    fn record(&mut self, record: MutationRecord) {
        let Some(init) = self.observer else {
            return;
        };
        let wanted = match &record {
            MutationRecord::CharacterData => init.character_data,
            MutationRecord::ChildList => init.child_list,
            MutationRecord::Attribute(_) => init.attributes,
        };
        if wanted {
            self.records.push(record);
        }
    }
}

impl RenderSurface for SimulatedElement {
    fn text_content(&self) -> String {
        parse_markup(&self.markup).concat()
    }

    fn set_text_content(&mut self, text: &str) {
        self.markup = escape_text(text);
        self.record(MutationRecord::ChildList);
    }

    fn inner_markup(&self) -> String {
        self.markup.clone()
    }

    fn set_inner_markup(&mut self, markup: &str) {
        self.markup = markup.to_string();
        self.record(MutationRecord::ChildList);
    }

    fn inline_style(&self) -> String {
        self.inline_style.clone()
    }

    fn set_inline_style(&mut self, css: &str) {
        self.inline_style = css.to_string();
        self.record(MutationRecord::Attribute("style".to_string()));
    }

    fn computed_font_size(&self) -> f32 {
        let style = self.style();
        self.px_property(&style, "font-size", self.stylesheet.font_size_px)
    }

    fn offset_height(&self) -> f32 {
        if !self.mounted {
            return 0.0;
        }
        let style = self.style();
        let font_size = self.px_property(&style, "font-size", self.stylesheet.font_size_px);
        let content = self.line_count() as f32 * self.line_height_px(&style, font_size);
        let min_height = self.px_property(&style, "min-height", self.stylesheet.min_height_px);

        content.max(min_height)
            + self.px_property(&style, "padding-top", self.stylesheet.padding_top_px)
            + self.px_property(&style, "padding-bottom", self.stylesheet.padding_bottom_px)
            + self.px_property(&style, "border-top-width", self.stylesheet.border_top_px)
            + self.px_property(&style, "border-bottom-width", self.stylesheet.border_bottom_px)
    }

    fn observe_mutations(&mut self, init: MutationObserverInit) {
        self.observer = Some(init);
    }

    fn disconnect_mutations(&mut self) {
        self.observer = None;
        self.records.clear();
    }

    fn take_mutation_records(&mut self) -> Vec<MutationRecord> {
        std::mem::take(&mut self.records)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Markup helpers
// ────────────────────────────────────────────────────────────────────────────

fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            c => out.push(c),
        }
    }
    out
}

fn decode_entity(name: &str) -> Option<char> {
    match name {
        "nbsp" => Some('\u{a0}'),
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "hellip" => Some('\u{2026}'),
        _ => {
            let digits = name.strip_prefix('#')?;
            let code = match digits.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => digits.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}

/// Splits markup into decoded text segments separated by `<br>`.
fn parse_markup(markup: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut rest = markup;

    while let Some(c) = rest.chars().next() {
        match c {
            '<' => match rest.find('>') {
                Some(end) => {
                    let tag = rest[1..end].trim().trim_end_matches('/').trim();
                    if tag.eq_ignore_ascii_case("br") {
                        segments.push(std::mem::take(&mut current));
                    }
                    rest = &rest[end + 1..];
                }
                None => {
                    current.push_str(rest);
                    rest = "";
                }
            },
            '&' => {
                let decoded = rest
                    .find(';')
                    .filter(|end| *end <= 10)
                    .and_then(|end| decode_entity(&rest[1..end]).map(|ch| (ch, end)));
                match decoded {
                    Some((ch, end)) => {
                        current.push(ch);
                        rest = &rest[end + 1..];
                    }
                    None => {
                        current.push('&');
                        rest = &rest[1..];
                    }
                }
            }
            c => {
                current.push(c);
                rest = &rest[c.len_utf8()..];
            }
        }
    }
    segments.push(current);
    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heading(text: &str, width: f32) -> SimulatedElement {
        SimulatedElement::new(
            text,
            width,
            ElementStyle {
                font_size_px: 32.0,
                ..ElementStyle::default()
            },
        )
    }

    #[test]
    fn test_text_round_trips_through_markup() {
        let el = heading("a < b & c", 300.0);
        assert_eq!(el.inner_markup(), "a &lt; b &amp; c");
        assert_eq!(el.text_content(), "a < b & c");
    }

    #[test]
    fn test_parse_markup_splits_on_br_variants() {
        assert_eq!(
            parse_markup("&nbsp;<br><BR/><br />x"),
            vec!["\u{a0}", "", "", "x"]
        );
        assert_eq!(parse_markup("<b>bold</b>"), vec!["bold"]);
        assert_eq!(parse_markup("fish &chips; &#65;"), vec!["fish &chips; A"]);
    }

    #[test]
    fn test_calibration_markup_yields_one_line_per_break() {
        let mut el = heading("", 300.0);
        for lines in 1..=4 {
            el.set_inner_markup(&format!("&nbsp;{}", "<br>".repeat(lines)));
            assert_eq!(el.line_count(), lines);
        }
    }

    #[test]
    fn test_offset_height_counts_lines() {
        let el = heading("Travis Van Couvering", 200.0);
        // 2 lines at 32px * 1.2
        assert!((el.offset_height() - 76.8).abs() < 1e-3);
    }

    #[test]
    fn test_empty_content_has_zero_height() {
        let el = heading("", 200.0);
        assert_eq!(el.offset_height(), 0.0);
    }

    #[test]
    fn test_box_model_and_min_height_from_inline_style() {
        let mut el = heading("Travis", 300.0);
        el.set_inline_style("padding-top: 4px; border-bottom-width: 2px; min-height: 100px");
        assert!((el.offset_height() - 106.0).abs() < 1e-3);
        el.set_style_property("min-height", "");
        assert!((el.offset_height() - (38.4 + 6.0)).abs() < 1e-3);
    }

    #[test]
    fn test_inline_font_size_overrides_stylesheet() {
        let mut el = heading("Travis Van Couvering", 200.0);
        el.set_style_property("font-size", "16px");
        assert_eq!(el.computed_font_size(), 16.0);
        assert_eq!(el.line_count(), 1);
    }

    #[test]
    fn test_unmounted_element_reports_zero_height() {
        let mut el = heading("Travis", 300.0);
        el.set_mounted(false);
        assert_eq!(el.offset_height(), 0.0);
    }

    #[test]
    fn test_records_only_while_observed() {
        let mut el = heading("Travis", 300.0);
        el.set_text_content("Van");
        assert_eq!(el.pending_records(), 0);

        el.observe_mutations(MutationObserverInit {
            attributes: true,
            ..MutationObserverInit::default()
        });
        el.set_text_content("Couvering");
        el.set_inline_style("color: red");
        assert_eq!(
            el.take_mutation_records(),
            vec![MutationRecord::Attribute("style".into())]
        );

        el.observe_mutations(MutationObserverInit::all());
        el.set_text_content("Travis");
        el.disconnect_mutations();
        assert_eq!(el.pending_records(), 0);
        assert!(!el.is_observed());
    }
}
