//! TOC (Table of Contents) writer.
//!
//! Renders an [`Outline`] as an Eclipse help `toc.xml`. The root becomes the
//! `<toc>` element; every other node becomes a nested `<topic>`. Topics
//! directly below the root link to their page, deeper topics link to the
//! heading anchor inside the page.

use tracing::{debug, instrument};

use crate::outline::{NodeId, Outline};
use crate::pages::with_help_prefix;
use crate::xml::push_attr;

/// Render `outline` as a `toc.xml` document.
///
/// `book_title` and `book_file` describe the `<toc>` element; `help_prefix`
/// is prepended to every page path.
#[instrument(skip(outline), fields(nodes = outline.len()))]
pub fn render_toc(
    outline: &Outline,
    book_title: &str,
    book_file: &str,
    help_prefix: Option<&str>,
) -> String {
    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");

    xml.push_str("<toc");
    push_attr(&mut xml, "label", Some(book_title));
    let topic = with_help_prefix(help_prefix, book_file);
    push_attr(&mut xml, "topic", Some(topic.as_str()));

    let children = outline.children(outline.root());
    if children.is_empty() {
        xml.push_str("/>\n");
    } else {
        xml.push_str(">\n");
        for child in children {
            write_topic(&mut xml, outline, *child, help_prefix, 1);
        }
        xml.push_str("</toc>\n");
    }

    debug!(bytes = xml.len(), "toc rendered");
    xml
}

fn write_topic(
    xml: &mut String,
    outline: &Outline,
    id: NodeId,
    help_prefix: Option<&str>,
    depth: usize,
) {
    let node = outline.node(id);
    let indent = "\t".repeat(depth);

    let mut href = with_help_prefix(help_prefix, &node.source_page);
    if depth > 1 {
        if let Some(anchor) = &node.identifier {
            href.push('#');
            href.push_str(anchor);
        }
    }

    xml.push_str(&indent);
    xml.push_str("<topic");
    push_attr(xml, "href", Some(href.as_str()));
    push_attr(xml, "label", Some(node.label.as_str()));

    if node.children.is_empty() {
        xml.push_str("/>\n");
        return;
    }

    xml.push_str(">\n");
    for child in &node.children {
        write_topic(xml, outline, *child, help_prefix, depth + 1);
    }
    xml.push_str(&indent);
    xml.push_str("</topic>\n");
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
