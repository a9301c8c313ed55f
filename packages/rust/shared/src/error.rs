//! Error types for helptoc.
//!
//! Library crates use [`HelpTocError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all helptoc operations.
///
/// Every variant is fatal to a run: nothing is retried and no partial output
/// is written once one of these is raised.
#[derive(Debug, thiserror::Error)]
pub enum HelpTocError {
    /// Caller/input misuse: bad configuration, missing pages, missing output paths.
    #[error("config error: {message}")]
    Config { message: String },

    /// A heading that is not the root has no `id` and no anchor carrying one.
    #[error("no id found for heading <{tag}> '{label}' in {page}")]
    MissingIdentifier {
        tag: String,
        label: String,
        page: String,
    },

    /// None of the pages contained a heading, so there is no root.
    #[error("no heading found in the html pages")]
    NoHeading,

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, HelpTocError>;

impl HelpTocError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// True for errors caused by the documentation content itself.
    pub fn is_structural(&self) -> bool {
        matches!(self, Self::MissingIdentifier { .. } | Self::NoHeading)
    }
}
