//! End-to-end `generate` pipeline: pages → headings → outline → toc.xml
//! (+ contexts.xml).
//!
//! Everything is validated, read and built before the first output file is
//! written. Outputs are staged next to their targets and renamed into place
//! together, so a failing run leaves no partial output behind.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{debug, info, instrument};

use helptoc_html::HtmlPage;
use helptoc_shared::{GenerateConfig, HelpTocError, Result};

use crate::contexts;
use crate::outline::{Outline, OutlineBuilder, sanitize_label};
use crate::pages::{SourcePage, read_page, resolve_page};
use crate::toc;

/// Result of the `generate` pipeline.
#[derive(Debug, Clone)]
pub struct GenerateResult {
    /// Label of the outline root.
    pub book_title: String,
    /// Page of the outline root.
    pub book_file: String,
    /// Number of pages read for the outline.
    pub page_count: usize,
    /// Number of outline nodes, root included.
    pub node_count: usize,
    /// Number of contexts written.
    pub context_count: usize,
    /// Path of the written `toc.xml`.
    pub toc_file: PathBuf,
    /// Path of the written `contexts.xml`, when contexts were configured.
    pub contexts_file: Option<PathBuf>,
    /// Total elapsed time.
    pub elapsed: std::time::Duration,
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called after a page has been parsed and its headings ingested.
    fn page_parsed(&self, path: &str, current: usize, total: usize);
    /// Called when the pipeline completes.
    fn done(&self, result: &GenerateResult);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn page_parsed(&self, _path: &str, _current: usize, _total: usize) {}
    fn done(&self, _result: &GenerateResult) {}
}

/// An outline together with the first-heading title of every page read.
#[derive(Debug, Clone)]
pub struct BuiltOutline {
    pub outline: Outline,
    /// Normalized page path → sanitized text of the page's first heading.
    pub titles: HashMap<String, String>,
    pub page_count: usize,
}

/// Run the full `generate` pipeline.
///
/// 1. Validate the configuration and resolve every page and topic page
/// 2. Parse pages in order and build the outline
/// 3. Read topic pages that are not part of the outline
/// 4. Render toc.xml and contexts.xml
/// 5. Write both files
#[instrument(skip_all, fields(source = %config.source_folder.display(), pages = config.pages.len()))]
pub fn generate(config: &GenerateConfig, progress: &dyn ProgressReporter) -> Result<GenerateResult> {
    let start = Instant::now();

    let toc_file = config
        .toc_file
        .clone()
        .ok_or_else(|| HelpTocError::config("toc output file is not set"))?;
    let contexts_file = if config.contexts.is_empty() {
        None
    } else {
        Some(config.contexts_file.clone().ok_or_else(|| {
            HelpTocError::config(format!(
                "contexts output file is not set (but there are {} contexts)",
                config.contexts.len()
            ))
        })?)
    };

    // Resolve topic pages up front so a missing file fails before any parsing.
    let topic_pages = resolve_topic_pages(config)?;

    let BuiltOutline {
        outline,
        mut titles,
        page_count,
    } = build_outline(config, progress)?;

    // --- Topic pages outside the outline ---
    for page in &topic_pages {
        if !titles.contains_key(&page.path) {
            let html = read_page(page)?;
            if let Some(first) = HtmlPage::parse(&html).first_heading() {
                titles.insert(page.path.clone(), sanitize_label(&first.text));
            }
        }
    }

    // --- Render ---
    progress.phase("Rendering");
    let help_prefix = config.help_prefix.as_deref();
    let toc_xml = toc::render_toc(
        &outline,
        outline.book_title(),
        outline.book_file(),
        help_prefix,
    );
    let contexts_xml = contexts_file.as_ref().map(|_| {
        let records = contexts::compile(&config.contexts, &titles, help_prefix);
        contexts::to_xml(&records)
    });

    // --- Write ---
    progress.phase("Writing");
    let mut outputs = vec![(toc_file.as_path(), toc_xml.as_str())];
    if let (Some(path), Some(xml)) = (&contexts_file, &contexts_xml) {
        outputs.push((path.as_path(), xml.as_str()));
    }
    write_outputs(&outputs)?;

    let result = GenerateResult {
        book_title: outline.book_title().to_string(),
        book_file: outline.book_file().to_string(),
        page_count,
        node_count: outline.len(),
        context_count: config.contexts.len(),
        toc_file,
        contexts_file,
        elapsed: start.elapsed(),
    };

    info!(
        book = %result.book_title,
        nodes = result.node_count,
        elapsed_ms = result.elapsed.as_millis() as u64,
        "generate pipeline complete"
    );
    progress.done(&result);

    Ok(result)
}

/// Validate the source settings, then read every page in order and build the outline.
///
/// Does not write anything.
#[instrument(skip_all, fields(pages = config.pages.len()))]
pub fn build_outline(config: &GenerateConfig, progress: &dyn ProgressReporter) -> Result<BuiltOutline> {
    let pages = resolve_pages(config)?;

    progress.phase("Reading pages");
    let mut builder = match config.book_title.as_deref().filter(|t| !t.is_empty()) {
        Some(title) => OutlineBuilder::with_root(title, pages[0].path.clone()),
        None => OutlineBuilder::new(),
    };
    let mut titles = HashMap::new();

    let total = pages.len();
    for (i, page) in pages.iter().enumerate() {
        let html = read_page(page)?;
        let parsed = HtmlPage::parse(&html);

        for heading in parsed.headings() {
            builder.ingest(heading, &page.path)?;
        }
        if let Some(first) = parsed.first_heading() {
            titles.insert(page.path.clone(), sanitize_label(&first.text));
        }

        debug!(page = %page.path, headings = parsed.headings().len(), "page processed");
        progress.page_parsed(&page.path, i + 1, total);
    }

    let outline = builder.finish()?;
    Ok(BuiltOutline {
        outline,
        titles,
        page_count: total,
    })
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn check_source_folder(source_folder: &Path) -> Result<()> {
    if !source_folder.is_dir() {
        return Err(HelpTocError::config(format!(
            "source folder '{}' not found",
            source_folder.display()
        )));
    }
    Ok(())
}

/// Resolve the ordered page list, skipping blank entries.
fn resolve_pages(config: &GenerateConfig) -> Result<Vec<SourcePage>> {
    check_source_folder(&config.source_folder)?;

    let pages = config
        .pages
        .iter()
        .filter(|p| !p.trim().is_empty())
        .map(|p| resolve_page(&config.source_folder, p.trim()))
        .collect::<Result<Vec<_>>>()?;

    if pages.is_empty() {
        return Err(HelpTocError::config(
            "no pages configured, at least one page is required",
        ));
    }
    Ok(pages)
}

fn resolve_topic_pages(config: &GenerateConfig) -> Result<Vec<SourcePage>> {
    check_source_folder(&config.source_folder)?;

    config
        .contexts
        .iter()
        .flat_map(|ctx| ctx.topic_pages.iter())
        .map(|p| resolve_page(&config.source_folder, p))
        .collect()
}

/// Write every output to a `.tmp` sibling first, then rename them into
/// place. A failed write removes the staged files and leaves existing
/// outputs untouched.
fn write_outputs(outputs: &[(&Path, &str)]) -> Result<()> {
    let mut staged = Vec::with_capacity(outputs.len());
    for (path, content) in outputs {
        match stage_output(path, content) {
            Ok(tmp) => staged.push(tmp),
            Err(e) => {
                discard_staged(&staged);
                return Err(e);
            }
        }
    }

    for (i, ((path, content), tmp)) in outputs.iter().zip(&staged).enumerate() {
        if let Err(e) = std::fs::rename(tmp, path) {
            discard_staged(&staged[i..]);
            return Err(HelpTocError::io(*path, e));
        }
        info!(path = %path.display(), bytes = content.len(), "wrote output file");
    }
    Ok(())
}

/// Write `content` next to `path`, creating parent directories on demand.
fn stage_output(path: &Path, content: &str) -> Result<PathBuf> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| HelpTocError::io(parent, e))?;
    }
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    std::fs::write(&tmp, content).map_err(|e| HelpTocError::io(&tmp, e))?;
    debug!(path = %tmp.display(), "output staged");
    Ok(tmp)
}

fn discard_staged(staged: &[PathBuf]) {
    for tmp in staged {
        let _ = std::fs::remove_file(tmp);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use helptoc_shared::HelpContext;

    fn fixture_dir() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("../../../fixtures/html")
    }

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("helptoc-pipeline-test-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn make_config(out: &Path) -> GenerateConfig {
        GenerateConfig {
            source_folder: fixture_dir(),
            pages: vec![
                "page1.html".into(),
                "".into(),
                "page2.html".into(),
                "sub/page3.html".into(),
            ],
            help_prefix: Some("html".into()),
            book_title: None,
            toc_file: Some(out.join("toc").join("toc.xml")),
            contexts_file: Some(out.join("contexts.xml")),
            contexts: vec![],
        }
    }

    #[test]
    fn generate_writes_toc() {
        let tmp = temp_dir();
        let config = make_config(&tmp);

        let result = generate(&config, &SilentProgress).unwrap();
        assert_eq!(result.book_title, "Lorem Ipsum");
        assert_eq!(result.book_file, "page1.html");
        assert_eq!(result.page_count, 3);
        assert_eq!(result.node_count, 6);
        assert!(result.contexts_file.is_none());

        let toc = std::fs::read_to_string(&result.toc_file).unwrap();
        assert!(toc.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<toc label=\"Lorem Ipsum\" topic=\"html/page1.html\">"));
        assert!(toc.contains("\t<topic href=\"html/page1.html\" label=\"Sed sagittis\">"));
        assert!(toc.contains("\t\t<topic href=\"html/page1.html#n102\" label=\"Nunc &quot;fermentum&quot; elit\"/>"));
        assert!(toc.contains("\t\t<topic href=\"html/page2.html#n201\" label=\"Amet\"/>"));
        assert!(toc.contains("\t<topic href=\"html/sub/page3.html\" label=\"Consectetur\"/>"));
        assert!(!tmp.join("contexts.xml").exists());

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn generate_writes_contexts() {
        let tmp = temp_dir();
        let mut config = make_config(&tmp);
        config.contexts = vec![
            HelpContext {
                id: Some("intro_context".into()),
                title: None,
                description: Some("First line\nSecond <line>".into()),
                topic_pages: vec!["page1.html".into(), "extra.html".into()],
            },
            HelpContext {
                id: Some("empty_page_context".into()),
                title: Some("Nothing here".into()),
                description: None,
                topic_pages: vec!["empty.html".into()],
            },
        ];

        let result = generate(&config, &SilentProgress).unwrap();
        assert_eq!(result.context_count, 2);

        let xml = std::fs::read_to_string(tmp.join("contexts.xml")).unwrap();
        let expected = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
<?NLS TYPE=\"org.eclipse.help.contexts\"?>\n\
<contexts>\n    \
<context id=\"intro_context\" title=\"Lorem Ipsum\">\n        \
<description>First line\nSecond &lt;line&gt;</description>\n        \
<topic label=\"Lorem Ipsum\" href=\"html/page1.html\"/>\n        \
<topic label=\"Extra page\" href=\"html/extra.html\"/>\n    \
</context>\n    \
<context id=\"empty_page_context\" title=\"Nothing here\">\n        \
<topic href=\"html/empty.html\"/>\n    \
</context>\n\
</contexts>";
        assert_eq!(xml, expected);

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn book_title_seeds_root() {
        let tmp = temp_dir();
        let mut config = make_config(&tmp);
        config.book_title = Some("User Guide".into());

        let built = build_outline(&config, &SilentProgress).unwrap();
        let outline = &built.outline;
        assert_eq!(outline.book_title(), "User Guide");
        assert_eq!(outline.book_file(), "page1.html");
        // The page's h1 is now a regular child of the synthetic root.
        let first = outline.children(outline.root())[0];
        assert_eq!(outline.node(first).label, "Lorem Ipsum");
        assert_eq!(built.titles.get("page2.html").map(String::as_str), Some("Dolor sit"));

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn missing_identifier_aborts_without_output() {
        let tmp = temp_dir();
        let mut config = make_config(&tmp);
        config.pages = vec!["page1.html".into(), "broken.html".into()];

        let err = generate(&config, &SilentProgress).unwrap_err();
        assert!(err.is_structural());
        assert!(err.to_string().contains("No id here"));
        assert!(!tmp.join("toc").exists());

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn no_heading_is_structural_error() {
        let tmp = temp_dir();
        let mut config = make_config(&tmp);
        config.pages = vec!["empty.html".into()];

        let err = generate(&config, &SilentProgress).unwrap_err();
        assert!(matches!(err, HelpTocError::NoHeading));
        assert!(!tmp.join("toc").exists());

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn configuration_errors() {
        let tmp = temp_dir();

        let mut config = make_config(&tmp);
        config.pages = vec!["  ".into()];
        assert!(matches!(
            generate(&config, &SilentProgress),
            Err(HelpTocError::Config { .. })
        ));

        let mut config = make_config(&tmp);
        config.pages.push("missing.html".into());
        assert!(matches!(
            generate(&config, &SilentProgress),
            Err(HelpTocError::Config { .. })
        ));

        let mut config = make_config(&tmp);
        config.source_folder = tmp.join("no-such-folder");
        assert!(matches!(
            generate(&config, &SilentProgress),
            Err(HelpTocError::Config { .. })
        ));

        let mut config = make_config(&tmp);
        config.toc_file = None;
        assert!(matches!(
            generate(&config, &SilentProgress),
            Err(HelpTocError::Config { .. })
        ));

        let mut config = make_config(&tmp);
        config.contexts_file = None;
        config.contexts = vec![HelpContext {
            topic_pages: vec!["page1.html".into()],
            ..Default::default()
        }];
        assert!(matches!(
            generate(&config, &SilentProgress),
            Err(HelpTocError::Config { .. })
        ));

        let mut config = make_config(&tmp);
        config.contexts = vec![HelpContext {
            topic_pages: vec!["nope.html".into()],
            ..Default::default()
        }];
        assert!(matches!(
            generate(&config, &SilentProgress),
            Err(HelpTocError::Config { .. })
        ));

        assert!(!tmp.join("toc").exists());
        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn failed_contexts_write_leaves_no_toc() {
        let tmp = temp_dir();
        let mut config = make_config(&tmp);
        std::fs::write(tmp.join("blocker"), "not a directory").unwrap();
        config.contexts_file = Some(tmp.join("blocker").join("contexts.xml"));
        config.contexts = vec![HelpContext {
            id: Some("ctx".into()),
            topic_pages: vec!["page1.html".into()],
            ..Default::default()
        }];

        let err = generate(&config, &SilentProgress).unwrap_err();
        assert!(matches!(err, HelpTocError::Io { .. }));

        let toc_dir = tmp.join("toc");
        let leftovers = std::fs::read_dir(&toc_dir)
            .map(|entries| entries.count())
            .unwrap_or(0);
        assert_eq!(leftovers, 0);
        assert!(!toc_dir.join("toc.xml").exists());

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn generate_is_idempotent() {
        let tmp = temp_dir();
        let mut config = make_config(&tmp);
        config.contexts = vec![HelpContext {
            id: Some("ctx".into()),
            topic_pages: vec!["page2.html".into()],
            ..Default::default()
        }];

        generate(&config, &SilentProgress).unwrap();
        let first_toc = std::fs::read(tmp.join("toc").join("toc.xml")).unwrap();
        let first_ctx = std::fs::read(tmp.join("contexts.xml")).unwrap();

        generate(&config, &SilentProgress).unwrap();
        assert_eq!(first_toc, std::fs::read(tmp.join("toc").join("toc.xml")).unwrap());
        assert_eq!(first_ctx, std::fs::read(tmp.join("contexts.xml")).unwrap());

        let _ = std::fs::remove_dir_all(&tmp);
    }
}
