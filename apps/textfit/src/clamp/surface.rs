//! Capability traits for the host the controller runs against.
//!
//! [`RenderSurface`] is a DOM-like element: readable/replaceable content,
//! an inline style attribute, a computed font size, a rendered box height,
//! and mutation observation. [`ChangeNotifier`] is the viewport-resize
//! channel. Both are pull-based: pending notifications are drained by the
//! controller rather than pushed through callbacks.

use std::fmt;

use serde::{Deserialize, Serialize};

// ────────────────────────────────────────────────────────────────────────────
// Mutation observation
// ────────────────────────────────────────────────────────────────────────────

/// Granularity of a mutation subscription.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MutationObserverInit {
    pub character_data: bool,
    pub subtree: bool,
    pub child_list: bool,
    pub attributes: bool,
}

impl MutationObserverInit {
    /// Text, structure, and attribute changes anywhere under the element.
    pub fn all() -> Self {
        MutationObserverInit {
            character_data: true,
            subtree: true,
            child_list: true,
            attributes: true,
        }
    }
}

/// One observed change to the surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationRecord {
    CharacterData,
    ChildList,
    Attribute(String),
}

/// Handle for one resize subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ResizeSubscription(pub u64);

// ────────────────────────────────────────────────────────────────────────────
// Traits
// ────────────────────────────────────────────────────────────────────────────

/// A measurable, mutable element.
pub trait RenderSurface {
    /// Concatenated text of the element, markup stripped.
    fn text_content(&self) -> String;
    /// Replaces all content with literal text.
    fn set_text_content(&mut self, text: &str);
    fn inner_markup(&self) -> String;
    /// Replaces all content with markup (`<br>` and entities are honoured).
    fn set_inner_markup(&mut self, markup: &str);
    /// Raw text of the inline `style` attribute.
    fn inline_style(&self) -> String;
    fn set_inline_style(&mut self, css: &str);
    /// Computed font size in px.
    fn computed_font_size(&self) -> f32;
    /// Rendered border-box height in px; zero when not rendered.
    fn offset_height(&self) -> f32;

    fn observe_mutations(&mut self, init: MutationObserverInit);
    /// Stops observation and discards undelivered records.
    fn disconnect_mutations(&mut self);
    fn take_mutation_records(&mut self) -> Vec<MutationRecord>;

    fn style_property(&self, name: &str) -> Option<String> {
        InlineStyle::parse(&self.inline_style())
            .get(name)
            .map(str::to_string)
    }

    /// Sets one inline property; an empty value removes it. Leaves the
    /// attribute untouched when the property already has that value.
    fn set_style_property(&mut self, name: &str, value: &str) {
        let mut style = InlineStyle::parse(&self.inline_style());
        let value = value.trim();
        if style.get(name).unwrap_or("") == value {
            return;
        }
        style.set(name, value);
        self.set_inline_style(&style.to_string());
    }
}

/// Viewport resize notifications.
pub trait ChangeNotifier {
    fn subscribe_resize(&mut self) -> ResizeSubscription;
    fn unsubscribe_resize(&mut self, subscription: ResizeSubscription);
    /// Number of resize events delivered to `subscription` since the last call.
    fn take_resize_events(&mut self, subscription: ResizeSubscription) -> usize;
}

// ────────────────────────────────────────────────────────────────────────────
// Inline style
// ────────────────────────────────────────────────────────────────────────────

/// Ordered declarations of an inline `style` attribute.
///
/// Later declarations of the same property win, as in CSS.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InlineStyle {
    declarations: Vec<(String, String)>,
}

impl InlineStyle {
    /// Lenient parse: declarations without a `:` or with an empty name are skipped.
    pub fn parse(css: &str) -> Self {
        let declarations = css
            .split(';')
            .filter_map(|decl| {
                let (name, value) = decl.split_once(':')?;
                let name = name.trim().to_ascii_lowercase();
                let value = value.trim();
                if name.is_empty() || value.is_empty() {
                    return None;
                }
                Some((name, value.to_string()))
            })
            .collect();
        InlineStyle { declarations }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        let name = name.to_ascii_lowercase();
        self.declarations
            .iter()
            .rev()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Replaces every declaration of `name`; an empty value removes it.
    pub fn set(&mut self, name: &str, value: &str) {
        let name = name.to_ascii_lowercase();
        let value = value.trim();
        match self.declarations.iter().position(|(n, _)| *n == name) {
            Some(first) => {
                self.declarations.retain(|(n, _)| *n != name);
                if !value.is_empty() {
                    self.declarations
                        .insert(first.min(self.declarations.len()), (name, value.to_string()));
                }
            }
            None if !value.is_empty() => self.declarations.push((name, value.to_string())),
            None => {}
        }
    }

    /// Adds a declaration after the existing ones without touching them.
    pub fn append(&mut self, name: &str, value: &str) {
        self.declarations
            .push((name.to_ascii_lowercase(), value.trim().to_string()));
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }
}

impl fmt::Display for InlineStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, value)) in self.declarations.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{name}: {value};")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_skips_malformed_declarations() {
        let style = InlineStyle::parse("color: red;; bogus; :x; Font-Size : 12px ;");
        assert_eq!(style.get("color"), Some("red"));
        assert_eq!(style.get("font-size"), Some("12px"));
        assert_eq!(style.to_string(), "color: red; font-size: 12px;");
    }

    #[test]
    fn test_later_declarations_win() {
        let mut style = InlineStyle::parse("min-height: 40px");
        style.append("min-height", "0");
        assert_eq!(style.get("min-height"), Some("0"));
        assert_eq!(style.to_string(), "min-height: 40px; min-height: 0;");
    }

    #[test]
    fn test_set_replaces_in_place_and_empty_removes() {
        let mut style = InlineStyle::parse("font-size: 20px; color: red; font-size: 18px");
        style.set("font-size", "12px");
        assert_eq!(style.to_string(), "font-size: 12px; color: red;");
        style.set("font-size", "");
        assert_eq!(style.to_string(), "color: red;");
        style.set("color", "");
        assert!(style.is_empty());
        style.set("padding-top", "");
        assert!(style.is_empty());
    }
}
