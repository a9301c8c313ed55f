//! Shared types, error model, and configuration for helptoc.
//!
//! This crate is the foundation depended on by all other helptoc crates.
//! It provides:
//! - [`HelpTocError`]: the unified error type
//! - Domain types ([`Heading`], [`HelpContext`], [`ContextRecord`], [`Topic`])
//! - Configuration ([`AppConfig`], [`GenerateConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, CONFIG_FILE_NAME, GenerateConfig, OutputConfig, init_config, load_config,
    load_config_from, read_pages_list,
};
pub use error::{HelpTocError, Result};
pub use types::{ContextRecord, Heading, HelpContext, MAX_HEADING_LEVEL, Topic};
