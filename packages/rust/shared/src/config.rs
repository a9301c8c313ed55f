//! Run configuration for helptoc.
//!
//! A run is described by `helptoc.toml`, looked up in the working directory
//! unless a path is given explicitly. CLI flags override config file values,
//! which override defaults. Relative paths in the file are resolved against
//! the directory that contains it.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{HelpTocError, Result};
use crate::types::HelpContext;

/// Default configuration file name.
pub const CONFIG_FILE_NAME: &str = "helptoc.toml";

// ---------------------------------------------------------------------------
// Config structs (matching helptoc.toml schema)
// ---------------------------------------------------------------------------

/// Top-level config, deserialized from TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Folder the page paths are relative to.
    #[serde(default = "default_source_folder")]
    pub source_folder: String,

    /// Ordered list of HTML pages.
    #[serde(default)]
    pub pages: Vec<String>,

    /// File holding the ordered list of pages, one per line.
    /// Mutually exclusive with `pages`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pages_list_file: Option<String>,

    /// Location of the HTML pages relative to the toc file in the help plugin.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help_prefix: Option<String>,

    /// Book title; when set, a root is synthesized and every heading hangs below it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub book_title: Option<String>,

    /// Output files.
    #[serde(default)]
    pub output: OutputConfig,

    /// Help contexts to compile into the contexts file.
    #[serde(default)]
    pub contexts: Vec<HelpContext>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            source_folder: default_source_folder(),
            pages: Vec::new(),
            pages_list_file: None,
            help_prefix: None,
            book_title: None,
            output: OutputConfig::default(),
            contexts: Vec::new(),
        }
    }
}

fn default_source_folder() -> String {
    "src/main/docs".into()
}

/// `[output]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Where the generated `toc.xml` is written.
    #[serde(default = "default_toc_file")]
    pub toc_file: String,

    /// Where the generated `contexts.xml` is written. Required when contexts are configured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contexts_file: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            toc_file: default_toc_file(),
            contexts_file: None,
        }
    }
}

fn default_toc_file() -> String {
    "target/generated-toc-file/toc.xml".into()
}

// ---------------------------------------------------------------------------
// Generate config (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime configuration of one generation run, with paths resolved.
#[derive(Debug, Clone, Default)]
pub struct GenerateConfig {
    /// Folder the page paths are relative to.
    pub source_folder: PathBuf,
    /// Ordered pages, relative to `source_folder`. Blank entries are ignored.
    pub pages: Vec<String>,
    /// Prefix prepended to page paths in hrefs.
    pub help_prefix: Option<String>,
    /// Synthesized root label, if any.
    pub book_title: Option<String>,
    /// Output path for `toc.xml`.
    pub toc_file: Option<PathBuf>,
    /// Output path for `contexts.xml`.
    pub contexts_file: Option<PathBuf>,
    /// Help contexts to compile.
    pub contexts: Vec<HelpContext>,
}

impl GenerateConfig {
    /// Resolve a file config against `base_dir` (the config file's directory).
    ///
    /// Reads `pages_list_file` when configured. Fails when pages are given
    /// both inline and through a list file.
    pub fn resolve(config: &AppConfig, base_dir: &Path) -> Result<Self> {
        let pages = match &config.pages_list_file {
            Some(list_file) => {
                if config.pages.iter().any(|p| !p.trim().is_empty()) {
                    return Err(HelpTocError::config(
                        "the pages list is defined using a file (pages_list_file), \
                         the pages setting should not be used",
                    ));
                }
                read_pages_list(&base_dir.join(list_file))?
            }
            None => config.pages.clone(),
        };

        Ok(Self {
            source_folder: base_dir.join(&config.source_folder),
            pages,
            help_prefix: config.help_prefix.clone(),
            book_title: config.book_title.clone(),
            toc_file: Some(base_dir.join(&config.output.toc_file)),
            contexts_file: config
                .output
                .contexts_file
                .as_ref()
                .map(|p| base_dir.join(p)),
            contexts: config.contexts.clone(),
        })
    }
}

/// Read an ordered pages list: one page per line, blank lines skipped.
pub fn read_pages_list(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path).map_err(|e| HelpTocError::io(path, e))?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect())
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Load the config for a run.
///
/// Uses `explicit` when given, otherwise `helptoc.toml` in `cwd` if present,
/// otherwise defaults. Returns the config and the directory its relative
/// paths are resolved against.
pub fn load_config(explicit: Option<&Path>, cwd: &Path) -> Result<(AppConfig, PathBuf)> {
    let path = match explicit {
        Some(p) => cwd.join(p),
        None => {
            let candidate = cwd.join(CONFIG_FILE_NAME);
            if !candidate.exists() {
                tracing::debug!(path = ?candidate, "config file not found, using defaults");
                return Ok((AppConfig::default(), cwd.to_path_buf()));
            }
            candidate
        }
    };

    let config = load_config_from(&path)?;
    let base_dir = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| cwd.to_path_buf());
    Ok((config, base_dir))
}

/// Load the config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| HelpTocError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| HelpTocError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Write a default `helptoc.toml` into `dir`. Refuses to overwrite an existing file.
pub fn init_config(dir: &Path) -> Result<PathBuf> {
    let path = dir.join(CONFIG_FILE_NAME);
    if path.exists() {
        return Err(HelpTocError::config(format!(
            "{} already exists",
            path.display()
        )));
    }

    std::fs::create_dir_all(dir).map_err(|e| HelpTocError::io(dir, e))?;
    let content = toml::to_string_pretty(&AppConfig::default())
        .map_err(|e| HelpTocError::config(e.to_string()))?;
    std::fs::write(&path, content).map_err(|e| HelpTocError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("helptoc-config-test-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("source_folder"));
        assert!(toml_str.contains("generated-toc-file/toc.xml"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.source_folder, "src/main/docs");
        assert_eq!(parsed.output.toc_file, "target/generated-toc-file/toc.xml");
        assert!(parsed.output.contexts_file.is_none());
    }

    #[test]
    fn config_with_contexts() {
        let toml_str = r#"
source_folder = "docs"
pages = ["index.html", "guide.html"]
help_prefix = "html"

[output]
contexts_file = "out/contexts.xml"

[[contexts]]
id = "first_page_context"
title = "Page Context 1"
topic_pages = ["index.html"]

[[contexts]]
id = "second_page_context"
topic_pages = ["index.html", "guide.html"]
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.pages.len(), 2);
        assert_eq!(config.contexts.len(), 2);
        assert_eq!(config.contexts[1].title, None);
        assert_eq!(config.output.toc_file, "target/generated-toc-file/toc.xml");

        let resolved = GenerateConfig::resolve(&config, Path::new("/project")).expect("resolve");
        assert_eq!(resolved.source_folder, PathBuf::from("/project/docs"));
        assert_eq!(
            resolved.contexts_file,
            Some(PathBuf::from("/project/out/contexts.xml"))
        );
        assert_eq!(resolved.help_prefix.as_deref(), Some("html"));
    }

    #[test]
    fn pages_list_file_is_read_in_order() {
        let tmp = temp_dir();
        std::fs::write(tmp.join("pages.txt"), "b.html\n\n  a.html  \r\nsub/c.html\n").unwrap();

        let config = AppConfig {
            pages_list_file: Some("pages.txt".into()),
            ..AppConfig::default()
        };
        let resolved = GenerateConfig::resolve(&config, &tmp).expect("resolve");
        assert_eq!(resolved.pages, vec!["b.html", "a.html", "sub/c.html"]);

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn pages_and_pages_list_file_conflict() {
        let config = AppConfig {
            pages: vec!["index.html".into()],
            pages_list_file: Some("pages.txt".into()),
            ..AppConfig::default()
        };
        let err = GenerateConfig::resolve(&config, Path::new("/nowhere")).unwrap_err();
        assert!(matches!(err, HelpTocError::Config { .. }));
    }

    #[test]
    fn missing_pages_list_file_is_io_error() {
        let config = AppConfig {
            pages_list_file: Some("does-not-exist.txt".into()),
            ..AppConfig::default()
        };
        let err = GenerateConfig::resolve(&config, &std::env::temp_dir()).unwrap_err();
        assert!(matches!(err, HelpTocError::Io { .. }));
    }

    #[test]
    fn load_config_falls_back_to_defaults() {
        let tmp = temp_dir();
        let (config, base_dir) = load_config(None, &tmp).expect("load");
        assert_eq!(config.source_folder, "src/main/docs");
        assert_eq!(base_dir, tmp);

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn init_then_load() {
        let tmp = temp_dir();
        let path = init_config(&tmp).expect("init");
        assert!(path.exists());
        assert!(init_config(&tmp).is_err(), "must not overwrite");

        let (config, base_dir) = load_config(None, &tmp).expect("load");
        assert_eq!(config.output.toc_file, "target/generated-toc-file/toc.xml");
        assert_eq!(base_dir, tmp);

        let _ = std::fs::remove_dir_all(&tmp);
    }
}
