//! Core domain types shared between the HTML reader, the outline builder and
//! the context compiler.

use serde::{Deserialize, Serialize};

/// Highest heading level (`h6`).
pub const MAX_HEADING_LEVEL: u8 = 6;

// ---------------------------------------------------------------------------
// Heading
// ---------------------------------------------------------------------------

/// One `h1`..`h6` element as read from a page, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    /// Nominal level taken from the tag name (1 for `h1`, ..., 6 for `h6`).
    pub level: u8,
    /// Whitespace-normalized text content of the element.
    pub text: String,
    /// The element's own `id` attribute, if present (may be empty).
    pub id: Option<String>,
    /// `id` attributes of descendant `<a>` elements, in document order.
    pub anchor_ids: Vec<String>,
}

impl Heading {
    /// Tag name of the element (`h1`..`h6`).
    pub fn tag(&self) -> String {
        format!("h{}", self.level)
    }
}

// ---------------------------------------------------------------------------
// Help contexts
// ---------------------------------------------------------------------------

/// A context group as configured by the user (`[[contexts]]` in `helptoc.toml`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelpContext {
    /// Context identifier referenced by the help runtime.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Display title; falls back to the first topic's label when empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Free-text, possibly multi-line description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Pages (relative to the source folder) listed as topics of this context.
    pub topic_pages: Vec<String>,
}

/// A `(label, href)` pair referencing one page of a context.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Topic {
    /// First heading text of the page, if it has one.
    pub label: Option<String>,
    /// Page path prefixed with the help prefix.
    pub href: String,
}

/// One compiled `<context>` entry of the contexts document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextRecord {
    pub id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub topics: Vec<Topic>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heading_tag_name() {
        let heading = Heading {
            level: 3,
            text: "Setup".into(),
            id: None,
            anchor_ids: vec![],
        };
        assert_eq!(heading.tag(), "h3");
    }

    #[test]
    fn help_context_from_toml() {
        let toml_str = r#"
id = "first_page_context"
description = "Line one\nLine two"
topic_pages = ["page1.html", "sub/page2.html"]
"#;
        let ctx: HelpContext = toml::from_str(toml_str).expect("parse");
        assert_eq!(ctx.id.as_deref(), Some("first_page_context"));
        assert_eq!(ctx.title, None);
        assert_eq!(ctx.description.as_deref(), Some("Line one\nLine two"));
        assert_eq!(ctx.topic_pages.len(), 2);
    }
}
