//! Outline reconstruction.
//!
//! Headings carry nothing but their level, so the tree is rebuilt while
//! streaming them in document order, page after page. The builder keeps a
//! spine: for every level, the most recently added node at that level. A new
//! heading hangs below the nearest populated spine entry above its own level.
//! A heading with nothing above it becomes the root of the run.
//!
//! Nodes live in an append-only arena and refer to each other by [`NodeId`].

use std::collections::HashSet;

use serde::Serialize;
use tracing::{debug, warn};

use helptoc_shared::{Heading, HelpTocError, MAX_HEADING_LEVEL, Result};

/// Level of the root node.
pub const ROOT_LEVEL: u8 = 0;

const SPINE_LEN: usize = MAX_HEADING_LEVEL as usize + 1;

/// Index of a node in an [`Outline`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// One heading-derived node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineNode {
    /// 0 for the root, 1..=6 otherwise.
    pub level: u8,
    /// Anchor id of the heading. Only the root may lack one.
    pub identifier: Option<String>,
    /// Sanitized heading text.
    pub label: String,
    /// Slash-separated path of the page, relative to the source folder.
    pub source_page: String,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

// ---------------------------------------------------------------------------
// Outline (finished tree)
// ---------------------------------------------------------------------------

/// A finished, rooted outline.
#[derive(Debug, Clone)]
pub struct Outline {
    nodes: Vec<OutlineNode>,
    root: NodeId,
}

impl Outline {
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &OutlineNode {
        &self.nodes[id.index()]
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    /// Number of nodes, root included. Nodes detached by a root replacement
    /// are still counted.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Label of the root, used as the book title.
    pub fn book_title(&self) -> &str {
        &self.node(self.root).label
    }

    /// Page of the root, used as the book's entry file.
    pub fn book_file(&self) -> &str {
        &self.node(self.root).source_page
    }

    /// Nested, serializable view of the tree reachable from the root.
    pub fn to_tree(&self) -> OutlineTree {
        self.subtree(self.root)
    }

    fn subtree(&self, id: NodeId) -> OutlineTree {
        let node = self.node(id);
        OutlineTree {
            level: node.level,
            id: node.identifier.clone(),
            label: node.label.clone(),
            page: node.source_page.clone(),
            children: node.children.iter().map(|c| self.subtree(*c)).collect(),
        }
    }
}

/// Owned, nested representation of an outline (for JSON output and tests).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutlineTree {
    pub level: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub label: String,
    pub page: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<OutlineTree>,
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Incremental outline builder for one run.
///
/// Feed headings with [`ingest`](Self::ingest) in page order, then call
/// [`finish`](Self::finish) once.
#[derive(Debug, Default)]
pub struct OutlineBuilder {
    nodes: Vec<OutlineNode>,
    /// Most recently added node per level, indexed 0..=6.
    spine: [Option<NodeId>; SPINE_LEN],
    root: Option<NodeId>,
    /// Set by [`with_root`](Self::with_root).
    seeded_root: Option<NodeId>,
    seen_ids: HashSet<String>,
}

impl OutlineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a synthetic root, so that every heading (top-level `h1`s
    /// included) becomes a descendant of it.
    pub fn with_root(label: impl Into<String>, source_page: impl Into<String>) -> Self {
        let mut builder = Self::new();
        let root = builder.push(OutlineNode {
            level: ROOT_LEVEL,
            identifier: None,
            label: label.into(),
            source_page: source_page.into(),
            parent: None,
            children: Vec::new(),
        });
        builder.root = Some(root);
        builder.seeded_root = Some(root);
        builder.spine[usize::from(ROOT_LEVEL)] = Some(root);
        builder
    }

    /// Add one heading found on `source_page`.
    ///
    /// Fails when the heading does not become the root and no identifier can
    /// be resolved for it. Direct children of a synthetic root are linked by
    /// page only and may lack an identifier.
    pub fn ingest(&mut self, heading: &Heading, source_page: &str) -> Result<NodeId> {
        let nominal = heading.level.clamp(1, MAX_HEADING_LEVEL);
        let label = sanitize_label(&heading.text);
        let parent = self.find_parent(nominal);
        let level = if parent.is_some() { nominal } else { ROOT_LEVEL };

        let identifier = match resolve_identifier(heading) {
            Some(id) => Some(id.to_string()),
            None if parent.is_none() => None,
            None if parent.is_some() && parent == self.seeded_root => None,
            None => {
                return Err(HelpTocError::MissingIdentifier {
                    tag: heading.tag(),
                    label,
                    page: source_page.to_string(),
                });
            }
        };

        if let Some(id) = &identifier {
            if !self.seen_ids.insert(id.clone()) {
                warn!(id = %id, page = source_page, "duplicate heading id");
            }
        }

        let node = self.push(OutlineNode {
            level,
            identifier,
            label,
            source_page: source_page.to_string(),
            parent,
            children: Vec::new(),
        });

        match parent {
            Some(p) => self.nodes[p.index()].children.push(node),
            None => {
                if let Some(previous) = self.root {
                    warn!(
                        previous = %self.nodes[previous.index()].label,
                        page = source_page,
                        "heading without parent replaces the registered root"
                    );
                }
                self.root = Some(node);
            }
        }

        self.spine[usize::from(level)] = Some(node);
        debug!(level, node = node.0, page = source_page, "heading ingested");
        Ok(node)
    }

    /// Finish the run. Fails when no heading was ever ingested.
    pub fn finish(self) -> Result<Outline> {
        let root = self.root.ok_or(HelpTocError::NoHeading)?;
        Ok(Outline {
            nodes: self.nodes,
            root,
        })
    }

    /// Nearest populated spine entry strictly above `level`, root slot included.
    fn find_parent(&self, level: u8) -> Option<NodeId> {
        (0..usize::from(level)).rev().find_map(|l| self.spine[l])
    }

    fn push(&mut self, node: OutlineNode) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Replace typographic double quotes (U+201C, U+201D, U+201E) with `"`.
pub fn sanitize_label(text: &str) -> String {
    text.replace(['\u{201C}', '\u{201D}', '\u{201E}'], "\"")
}

/// The heading's own `id`, else the first descendant anchor `id`. Empty ids
/// count as absent.
pub fn resolve_identifier(heading: &Heading) -> Option<&str> {
    heading
        .id
        .as_deref()
        .filter(|id| !id.is_empty())
        .or_else(|| {
            heading
                .anchor_ids
                .iter()
                .map(String::as_str)
                .find(|id| !id.is_empty())
        })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
