//! Minimal XML text helpers shared by the TOC and contexts writers.

/// Escape a string for use inside a double-quoted XML attribute.
///
/// Besides the markup characters, tab, line feed and carriage return are
/// written as character references so they survive attribute normalization.
pub fn escape_attr(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&apos;"),
            '\t' => result.push_str("&#x9;"),
            '\n' => result.push_str("&#xA;"),
            '\r' => result.push_str("&#xD;"),
            _ => result.push(ch),
        }
    }
    result
}

/// Append ` name="value"`, or nothing when the value is absent or empty.
pub fn push_attr(out: &mut String, name: &str, value: Option<&str>) {
    if let Some(value) = value.filter(|v| !v.is_empty()) {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        out.push_str(&escape_attr(value));
        out.push('"');
    }
}
