//! Help contexts: compilation of configured context groups into
//! [`ContextRecord`]s and their `contexts.xml` serialization.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, instrument};

use helptoc_shared::{ContextRecord, HelpContext, Topic};

use crate::pages::{normalize_page_path, with_help_prefix};
use crate::xml::{escape_attr, push_attr};

const INDENT: &str = "    ";
const NEW_LINE: &str = "\n";

/// Compile configured contexts into records.
///
/// `titles` maps a normalized page path to the text of its first heading;
/// pages missing from it produce topics without a label.
#[instrument(skip_all, fields(contexts = contexts.len()))]
pub fn compile(
    contexts: &[HelpContext],
    titles: &HashMap<String, String>,
    help_prefix: Option<&str>,
) -> Vec<ContextRecord> {
    contexts
        .iter()
        .map(|ctx| {
            let topics: Vec<Topic> = ctx
                .topic_pages
                .iter()
                .map(|page| {
                    let path = normalize_page_path(page);
                    Topic {
                        label: titles.get(&path).cloned(),
                        href: with_help_prefix(help_prefix, &path),
                    }
                })
                .collect();

            let title = ctx
                .title
                .clone()
                .filter(|t| !t.is_empty())
                .or_else(|| topics.first().and_then(|t| t.label.clone()));

            debug!(id = ?ctx.id, topics = topics.len(), "context compiled");

            ContextRecord {
                id: ctx.id.clone(),
                title,
                description: ctx.description.clone(),
                topics,
            }
        })
        .collect()
}

/// Serialize records into the `contexts.xml` document.
///
/// The layout is fixed: two processing instructions, four-space indentation,
/// every element on its own line, no trailing newline.
pub fn to_xml(contexts: &[ContextRecord]) -> String {
    let mut xml = String::new();
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    xml.push_str(NEW_LINE);
    xml.push_str(r#"<?NLS TYPE="org.eclipse.help.contexts"?>"#);
    xml.push_str(NEW_LINE);
    xml.push_str("<contexts>");

    for context in contexts {
        write_context(&mut xml, context);
    }

    xml.push_str(NEW_LINE);
    xml.push_str("</contexts>");
    xml
}

fn write_context(xml: &mut String, context: &ContextRecord) {
    xml.push_str(NEW_LINE);
    xml.push_str(INDENT);
    xml.push_str("<context");
    push_attr(xml, "id", context.id.as_deref());
    push_attr(xml, "title", context.title.as_deref());
    xml.push('>');

    if let Some(description) = context.description.as_deref().filter(|d| !d.is_empty()) {
        xml.push_str(NEW_LINE);
        xml.push_str(INDENT);
        xml.push_str(INDENT);
        xml.push_str("<description>");
        xml.push_str(&escape_description(description));
        xml.push_str("</description>");
    }

    for topic in &context.topics {
        xml.push_str(NEW_LINE);
        xml.push_str(INDENT);
        xml.push_str(INDENT);
        xml.push_str("<topic");
        push_attr(xml, "label", topic.label.as_deref());
        push_attr(xml, "href", Some(topic.href.as_str()));
        xml.push_str("/>");
    }

    xml.push_str(NEW_LINE);
    xml.push_str(INDENT);
    xml.push_str("</context>");
}

/// Escape each line separately and keep the line breaks literal.
fn escape_description(description: &str) -> String {
    static LINE_BREAK_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\r?\n").expect("valid regex"));

    LINE_BREAK_RE
        .split(description)
        .map(escape_attr)
        .collect::<Vec<_>>()
        .join(NEW_LINE)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
