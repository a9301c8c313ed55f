//! HTML heading extraction.
//!
//! Parses documentation pages with `scraper` and reads their `h1`..`h6`
//! elements, in document order, into [`Heading`] values. This is the only
//! place that touches the HTML tree; everything downstream works on headings.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Node, Selector};
use tracing::{debug, instrument};

use helptoc_shared::Heading;

static HEADING_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h1, h2, h3, h4, h5, h6").expect("valid selector"));

static ANCHOR_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a").expect("valid selector"));

/// Headings read from one HTML page.
#[derive(Debug, Clone, Default)]
pub struct HtmlPage {
    headings: Vec<Heading>,
}

impl HtmlPage {
    /// Parse a whole HTML document and collect its headings.
    #[instrument(skip_all, fields(len = html.len()))]
    pub fn parse(html: &str) -> Self {
        let doc = Html::parse_document(html);
        let headings: Vec<Heading> = doc.select(&HEADING_SEL).filter_map(read_heading).collect();
        debug!(headings = headings.len(), "headings extracted");
        Self { headings }
    }

    /// All headings in document order.
    pub fn headings(&self) -> &[Heading] {
        &self.headings
    }

    /// The first heading of the page, if any.
    pub fn first_heading(&self) -> Option<&Heading> {
        self.headings.first()
    }
}

/// Read one heading element. Returns `None` for anything that is not `h1`..`h6`.
fn read_heading(el: ElementRef<'_>) -> Option<Heading> {
    let level = heading_level(el.value().name())?;

    let anchor_ids = el
        .select(&ANCHOR_SEL)
        .filter_map(|a| a.value().attr("id"))
        .map(String::from)
        .collect();

    Some(Heading {
        level,
        text: element_text(&el),
        id: el.value().attr("id").map(String::from),
        anchor_ids,
    })
}

/// Map a tag name to its heading level.
fn heading_level(tag: &str) -> Option<u8> {
    match tag {
        "h1" => Some(1),
        "h2" => Some(2),
        "h3" => Some(3),
        "h4" => Some(4),
        "h5" => Some(5),
        "h6" => Some(6),
        _ => None,
    }
}

/// Elements that break the text flow: a space separates their content from
/// the surrounding text.
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "dd", "div", "dl", "dt", "figcaption",
    "figure", "footer", "header", "hr", "li", "nav", "ol", "p", "pre", "section", "table",
    "td", "th", "tr", "ul",
];

/// Text content with runs of whitespace collapsed and the ends trimmed.
///
/// `<br>` and block element boundaries count as whitespace.
fn element_text(el: &ElementRef<'_>) -> String {
    let mut raw = String::new();
    push_text(*el, &mut raw);
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn push_text(el: ElementRef<'_>, out: &mut String) {
    for child in el.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(element) => {
                let Some(child_el) = ElementRef::wrap(child) else {
                    continue;
                };
                let name = element.name();
                if name == "br" {
                    out.push(' ');
                } else if BLOCK_TAGS.contains(&name) {
                    out.push(' ');
                    push_text(child_el, out);
                    out.push(' ');
                } else {
                    push_text(child_el, out);
                }
            }
            _ => {}
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
