//! Core domain logic for helptoc.
//!
//! This crate rebuilds the heading outline of an ordered set of HTML pages
//! and turns it into Eclipse help documents:
//! - [`outline`]: outline reconstruction from heading levels
//! - [`toc`]: `toc.xml` writer
//! - [`contexts`]: help context compilation and `contexts.xml` writer
//! - [`pipeline`]: the end-to-end `generate` run

pub mod contexts;
pub mod outline;
pub mod pages;
pub mod pipeline;
pub mod toc;
pub mod xml;

pub use outline::{NodeId, Outline, OutlineBuilder, OutlineNode, OutlineTree};
pub use pipeline::{
    BuiltOutline, GenerateResult, ProgressReporter, SilentProgress, build_outline, generate,
};
