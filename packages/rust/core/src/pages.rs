//! Page resolution: relative page names to files under the source folder.

use std::path::{Path, PathBuf};

use tracing::debug;

use helptoc_shared::{HelpTocError, Result};

/// A configured page that exists on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcePage {
    /// Slash-separated path relative to the source folder.
    pub path: String,
    /// Location on disk.
    pub file: PathBuf,
}

/// Resolve `page` against `source_folder`. Fails with a config error when
/// the file does not exist.
pub fn resolve_page(source_folder: &Path, page: &str) -> Result<SourcePage> {
    let path = normalize_page_path(page);
    let file = source_folder.join(&path);
    if !file.is_file() {
        return Err(HelpTocError::config(format!(
            "file '{}' not found",
            file.display()
        )));
    }
    Ok(SourcePage { path, file })
}

/// Read a page as UTF-8 text.
pub fn read_page(page: &SourcePage) -> Result<String> {
    let html = std::fs::read_to_string(&page.file).map_err(|e| HelpTocError::io(&page.file, e))?;
    debug!(page = %page.path, bytes = html.len(), "page read");
    Ok(html)
}

/// Normalize a page name to a slash-separated relative path.
///
/// Backslashes become slashes; empty and `.` segments are dropped.
pub fn normalize_page_path(page: &str) -> String {
    page.replace('\\', "/")
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect::<Vec<_>>()
        .join("/")
}

/// Prepend the help prefix to a page path, with exactly one `/` in between.
pub fn with_help_prefix(help_prefix: Option<&str>, path: &str) -> String {
    match help_prefix.filter(|p| !p.is_empty()) {
        Some(prefix) if prefix.ends_with('/') => format!("{prefix}{path}"),
        Some(prefix) => format!("{prefix}/{path}"),
        None => path.to_string(),
    }
}
