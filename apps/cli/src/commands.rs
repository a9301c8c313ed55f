//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use helptoc_core::pipeline::{GenerateResult, ProgressReporter, SilentProgress};
use helptoc_core::{NodeId, Outline};
use helptoc_shared::{AppConfig, GenerateConfig, init_config, load_config};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// helptoc: turn HTML documentation into Eclipse help tables of contents.
#[derive(Parser)]
#[command(
    name = "helptoc",
    version,
    about = "Generate Eclipse help toc.xml and contexts.xml files from HTML pages.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Outline print format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum OutlineFormat {
    Text,
    Json,
}

/// Where the pages come from. Every flag overrides the config file.
#[derive(Args, Debug, Default)]
pub(crate) struct SourceArgs {
    /// Config file (defaults to ./helptoc.toml when present).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Folder the pages are relative to.
    #[arg(long)]
    pub source_folder: Option<PathBuf>,

    /// Page to include, in order (repeatable).
    #[arg(short, long = "page", conflicts_with = "pages_list_file")]
    pub pages: Vec<String>,

    /// File listing the pages in order, one per line.
    #[arg(long)]
    pub pages_list_file: Option<PathBuf>,

    /// Path of the HTML pages relative to the toc file in the help plugin.
    #[arg(long)]
    pub help_prefix: Option<String>,

    /// Synthesize a root with this title instead of using the first heading.
    #[arg(long)]
    pub book_title: Option<String>,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Generate toc.xml (and contexts.xml when contexts are configured).
    Generate {
        #[command(flatten)]
        source: SourceArgs,

        /// Output toc file.
        #[arg(long)]
        toc_file: Option<PathBuf>,

        /// Output contexts file.
        #[arg(long)]
        contexts_file: Option<PathBuf>,
    },

    /// Print the reconstructed outline without writing any file.
    Outline {
        #[command(flatten)]
        source: SourceArgs,

        /// Output format.
        #[arg(long, default_value = "text")]
        format: OutlineFormat,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Write a default helptoc.toml into the working directory.
    Init,
    /// Show resolved configuration.
    Show {
        #[command(flatten)]
        source: SourceArgs,
    },
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "helptoc=info",
        1 => "helptoc=debug",
        _ => "helptoc=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) fn run(cli: Cli) -> Result<()> {
    let cwd = std::env::current_dir().map_err(|e| eyre!("cannot determine working directory: {e}"))?;

    match cli.command {
        Command::Generate {
            source,
            toc_file,
            contexts_file,
        } => cmd_generate(&cwd, &source, toc_file.as_deref(), contexts_file.as_deref()),
        Command::Outline { source, format } => cmd_outline(&cwd, &source, &format),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(&cwd),
            ConfigAction::Show { source } => cmd_config_show(&cwd, &source),
        },
    }
}

/// Load the config file and apply the source flags on top of it.
///
/// Flag paths are relative to the working directory; config file paths are
/// relative to the config file. Returns the merged config and the directory
/// to resolve it against.
fn merged_config(cwd: &Path, source: &SourceArgs) -> Result<(AppConfig, PathBuf)> {
    let (mut config, base_dir) = load_config(source.config.as_deref(), cwd)?;

    if let Some(folder) = &source.source_folder {
        config.source_folder = absolute(cwd, folder);
    }
    if !source.pages.is_empty() {
        config.pages = source.pages.clone();
        config.pages_list_file = None;
    }
    if let Some(list_file) = &source.pages_list_file {
        config.pages_list_file = Some(absolute(cwd, list_file));
        config.pages.clear();
    }
    if let Some(prefix) = &source.help_prefix {
        config.help_prefix = Some(prefix.clone());
    }
    if let Some(title) = &source.book_title {
        config.book_title = Some(title.clone());
    }

    Ok((config, base_dir))
}

fn absolute(cwd: &Path, path: &Path) -> String {
    cwd.join(path).to_string_lossy().into_owned()
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

fn cmd_generate(
    cwd: &Path,
    source: &SourceArgs,
    toc_file: Option<&Path>,
    contexts_file: Option<&Path>,
) -> Result<()> {
    let (mut config, base_dir) = merged_config(cwd, source)?;
    if let Some(path) = toc_file {
        config.output.toc_file = absolute(cwd, path);
    }
    if let Some(path) = contexts_file {
        config.output.contexts_file = Some(absolute(cwd, path));
    }

    let generate_config = GenerateConfig::resolve(&config, &base_dir)?;

    info!(
        source = %generate_config.source_folder.display(),
        pages = generate_config.pages.len(),
        contexts = generate_config.contexts.len(),
        "generating help files"
    );

    let reporter = CliProgress::new();
    let result = match helptoc_core::generate(&generate_config, &reporter) {
        Ok(result) => result,
        Err(e) => {
            reporter.abandon();
            return Err(e.into());
        }
    };

    println!();
    println!("  Help files generated!");
    println!("  Book:     {}", result.book_title);
    println!("  Entry:    {}", result.book_file);
    println!("  Pages:    {}", result.page_count);
    println!("  Topics:   {}", result.node_count);
    println!("  Toc:      {}", result.toc_file.display());
    if let Some(path) = &result.contexts_file {
        println!("  Contexts: {} ({})", path.display(), result.context_count);
    }
    println!("  Time:     {:.1}s", result.elapsed.as_secs_f64());
    println!();

    Ok(())
}

fn cmd_outline(cwd: &Path, source: &SourceArgs, format: &OutlineFormat) -> Result<()> {
    let (config, base_dir) = merged_config(cwd, source)?;
    let generate_config = GenerateConfig::resolve(&config, &base_dir)?;

    let built = helptoc_core::build_outline(&generate_config, &SilentProgress)?;

    match format {
        OutlineFormat::Text => print!("{}", outline_text(&built.outline)),
        OutlineFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&built.outline.to_tree())?);
        }
    }
    Ok(())
}

fn cmd_config_init(cwd: &Path) -> Result<()> {
    let path = init_config(cwd)?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(cwd: &Path, source: &SourceArgs) -> Result<()> {
    let (config, _) = merged_config(cwd, source)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

/// Indented text view of an outline, one node per line.
fn outline_text(outline: &Outline) -> String {
    let mut out = String::new();
    write_outline_node(&mut out, outline, outline.root(), 0);
    out
}

fn write_outline_node(out: &mut String, outline: &Outline, id: NodeId, depth: usize) {
    let node = outline.node(id);
    let anchor = node
        .identifier
        .as_deref()
        .map(|a| format!("#{a}"))
        .unwrap_or_default();
    out.push_str(&format!(
        "{}{}  [{}{}]\n",
        "  ".repeat(depth),
        node.label,
        node.source_page,
        anchor
    ));
    for child in &node.children {
        write_outline_node(out, outline, *child, depth + 1);
    }
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }

    fn abandon(&self) {
        self.spinner.finish_and_clear();
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn page_parsed(&self, path: &str, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Parsing [{current}/{total}] {path}"));
    }

    fn done(&self, _result: &GenerateResult) {
        self.spinner.finish_and_clear();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
