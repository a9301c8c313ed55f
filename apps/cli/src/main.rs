//! helptoc CLI: Eclipse help generator for HTML documentation.
//!
//! Rebuilds the heading outline of an ordered set of HTML pages and writes
//! it as `toc.xml`, plus an optional `contexts.xml`.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli)
}
