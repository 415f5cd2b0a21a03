use std::path::PathBuf;

use serde::Serialize;

use crate::domain::Rewrite;

/// What a trimming run did, or would do in a dry run.
///
/// All paths are relative to the content root.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    /// Whether the run left the tree untouched.
    pub dry_run: bool,

    /// Whether the site title in `conf.py` was replaced.
    pub title_updated: bool,

    /// Whether the root `index.md` was replaced with the workshop homepage.
    pub index_replaced: bool,

    /// Removed module directories.
    pub removed_directories: Vec<PathBuf>,

    /// Removed standalone documents.
    pub removed_files: Vec<PathBuf>,

    /// Removed setup pages of kept modules.
    pub removed_setup_pages: Vec<PathBuf>,

    /// Module indexes whose table of contents no longer lists the setup page.
    pub updated_indexes: Vec<PathBuf>,

    /// Documents with references rewritten into external links.
    pub documents: Vec<DocumentReport>,

    /// References left unchanged because they point above the content root.
    pub outside_root: Vec<EscapingReference>,
}

impl Report {
    /// Total number of rewritten references across all documents.
    #[must_use]
    pub fn rewrite_count(&self) -> usize {
        self.documents
            .iter()
            .map(|document| document.rewrites.len())
            .sum()
    }
}

/// The rewrites applied to a single document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentReport {
    /// The document, relative to the content root.
    pub path: PathBuf,
    /// The rewritten references.
    pub rewrites: Vec<Rewrite>,
}

/// A reference whose path cannot be expressed relative to the content root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EscapingReference {
    /// The document containing the reference, relative to the content root.
    pub document: PathBuf,
    /// The reference path as written.
    pub reference: String,
}
