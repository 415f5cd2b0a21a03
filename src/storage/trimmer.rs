//! Trims a documentation tree down to the workshop variant.
//!
//! The [`Trimmer`] works on a content root on disk and runs five steps in a
//! fixed order:
//!
//! 1. replace the site title in `conf.py`
//! 2. replace the root `index.md` with the workshop homepage
//! 3. delete removed modules and removed standalone documents
//! 4. delete the setup page of every kept module and drop it from the module
//!    index
//! 5. rewrite references to removed content in every remaining document
//!
//! Later steps assume earlier ones completed. There is no rollback: an I/O
//! error aborts the run and leaves the tree partially trimmed.

use std::{
    ffi::OsStr,
    fs, io,
    path::{Component, Path, PathBuf},
    sync::LazyLock,
};

use regex::{NoExpand, Regex};
use walkdir::WalkDir;

use crate::{
    domain::{
        Config, Rewriter,
        resolver::{CONTENT_EXTENSION, SETUP_PAGE},
    },
    storage::report::{DocumentReport, EscapingReference, Report},
};

static SITE_TITLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^project = ['"].*['"]"#).expect("this must never fail")
});

/// The table-of-contents line for a module's setup page.
const SETUP_TOC_ENTRY: &str = "\nSetup <setup>\n";

/// The bundled workshop homepage.
const WORKSHOP_INDEX: &str = include_str!("workshop_index.md");

const CONF_FILE: &str = "conf.py";

const INDEX_FILE: &str = "index.md";

/// Whether a [`Trimmer`] touches the filesystem.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Modify the content root in place.
    #[default]
    Apply,
    /// Record what would change without writing or deleting anything.
    DryRun,
}

/// Trims a content root according to a [`Config`].
#[derive(Debug)]
pub struct Trimmer {
    /// The content root. All documents live below it.
    root: PathBuf,
    config: Config,
    mode: Mode,
}

impl Trimmer {
    /// Creates a trimmer for the content root at `root`.
    #[must_use]
    pub const fn new(root: PathBuf, config: Config) -> Self {
        Self {
            root,
            config,
            mode: Mode::Apply,
        }
    }

    /// Sets whether the trimmer modifies the tree.
    #[must_use]
    pub const fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// The content root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The configuration in use.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    const fn is_dry_run(&self) -> bool {
        matches!(self.mode, Mode::DryRun)
    }

    /// Run all trimming steps.
    ///
    /// # Errors
    ///
    /// Returns an error if the content root does not exist, or if any document
    /// cannot be read, written or deleted. The tree is left as it was at the
    /// point of failure.
    pub fn run(&self) -> Result<Report, TrimError> {
        self.ensure_root()?;

        let mut report = Report {
            dry_run: self.is_dry_run(),
            ..Report::default()
        };

        tracing::info!("Step 1: updating site title");
        self.update_site_title(&mut report)?;

        tracing::info!("Step 2: replacing the root index");
        self.replace_index(&mut report)?;

        tracing::info!("Step 3: removing unused modules");
        self.remove_unused_content(&mut report)?;

        tracing::info!("Step 4: removing setup pages");
        self.remove_setup_pages(&mut report)?;

        tracing::info!("Step 5: converting cross-references");
        self.convert_cross_references(&mut report)?;

        Ok(report)
    }

    /// List the references that trimming would rewrite, without modifying
    /// anything.
    ///
    /// Only the `documents` and `outside_root` fields of the returned report
    /// are filled in.
    ///
    /// # Errors
    ///
    /// Returns an error if the content root does not exist or a document
    /// cannot be read.
    pub fn check(&self) -> Result<Report, TrimError> {
        self.ensure_root()?;

        let checker = Self {
            root: self.root.clone(),
            config: self.config.clone(),
            mode: Mode::DryRun,
        };
        let mut report = Report {
            dry_run: true,
            ..Report::default()
        };
        checker.convert_cross_references(&mut report)?;
        Ok(report)
    }

    fn ensure_root(&self) -> Result<(), TrimError> {
        if self.root.is_dir() {
            Ok(())
        } else {
            Err(TrimError::MissingRoot(self.root.clone()))
        }
    }

    fn update_site_title(&self, report: &mut Report) -> Result<(), TrimError> {
        let conf_path = self.root.join(CONF_FILE);

        if !conf_path.is_file() {
            tracing::warn!("{CONF_FILE} not found at {}", conf_path.display());
            return Ok(());
        }

        let content = read(&conf_path)?;
        let assignment = format!(
            "project = '{}'",
            self.config
                .site_title()
                .replace('\\', "\\\\")
                .replace('\'', "\\'")
        );
        let updated = SITE_TITLE.replace_all(&content, NoExpand(&assignment));

        if updated == content {
            tracing::warn!(
                "Site title already updated or pattern not found: {}",
                conf_path.display()
            );
            return Ok(());
        }

        if !self.is_dry_run() {
            write(&conf_path, &updated)?;
        }
        tracing::info!("Updated site title: {}", conf_path.display());
        report.title_updated = true;
        Ok(())
    }

    fn replace_index(&self, report: &mut Report) -> Result<(), TrimError> {
        let index_path = self.root.join(INDEX_FILE);

        let content = match self.config.index_template() {
            Some(template) => read(template)?,
            None => WORKSHOP_INDEX.to_string(),
        };

        if !self.is_dry_run() {
            write(&index_path, &content)?;
        }
        tracing::info!("Replaced: {}", index_path.display());
        report.index_replaced = true;
        Ok(())
    }

    fn remove_unused_content(&self, report: &mut Report) -> Result<(), TrimError> {
        for module in self.config.removed_modules() {
            let module_path = self.root.join(module);
            if !module_path.is_dir() {
                tracing::debug!("Already removed: {}", module_path.display());
                continue;
            }
            if !self.is_dry_run() {
                fs::remove_dir_all(&module_path).map_err(io_error("remove", &module_path))?;
            }
            tracing::info!("Removed directory: {}", module_path.display());
            report.removed_directories.push(PathBuf::from(module));
        }

        for filename in self.config.removed_files() {
            let file_path = self.root.join(filename);
            if !file_path.is_file() {
                tracing::debug!("Already removed: {}", file_path.display());
                continue;
            }
            if !self.is_dry_run() {
                fs::remove_file(&file_path).map_err(io_error("remove", &file_path))?;
            }
            tracing::info!("Removed file: {}", file_path.display());
            report.removed_files.push(PathBuf::from(filename));
        }

        Ok(())
    }

    fn remove_setup_pages(&self, report: &mut Report) -> Result<(), TrimError> {
        let setup_file = format!("{SETUP_PAGE}{CONTENT_EXTENSION}");

        for module in self.config.kept_modules() {
            let module_path = self.root.join(module);
            let setup_path = module_path.join(&setup_file);
            let index_path = module_path.join(INDEX_FILE);

            if setup_path.is_file() {
                if !self.is_dry_run() {
                    fs::remove_file(&setup_path).map_err(io_error("remove", &setup_path))?;
                }
                tracing::info!("Removed: {}", setup_path.display());
                report
                    .removed_setup_pages
                    .push(Path::new(module).join(&setup_file));
            }

            if index_path.is_file() {
                let content = read(&index_path)?;
                if !content.contains(SETUP_TOC_ENTRY) {
                    continue;
                }
                if !self.is_dry_run() {
                    write(&index_path, &content.replace(SETUP_TOC_ENTRY, "\n"))?;
                }
                tracing::info!("Updated toctree: {}", index_path.display());
                report
                    .updated_indexes
                    .push(Path::new(module).join(INDEX_FILE));
            }
        }

        Ok(())
    }

    fn convert_cross_references(&self, report: &mut Report) -> Result<(), TrimError> {
        let rewriter = Rewriter::new(&self.config, &self.root);

        for path in collect_markdown_paths(&self.root)? {
            let relative = path.strip_prefix(&self.root).unwrap_or(&path).to_path_buf();
            if self.is_removed(&relative) {
                tracing::debug!("Skipping removed document {}", relative.display());
                continue;
            }

            let content = read(&path)?;
            let rewritten = rewriter.rewrite_document(&content, &path);

            for reference in rewritten.outside_root {
                tracing::warn!(
                    "Reference '{reference}' in {} points outside the content root, leaving it unchanged",
                    relative.display()
                );
                report.outside_root.push(EscapingReference {
                    document: relative.clone(),
                    reference,
                });
            }

            if rewritten.rewrites.is_empty() {
                continue;
            }

            if !self.is_dry_run() {
                write(&path, &rewritten.content)?;
            }
            tracing::info!("Updated cross-references: {}", path.display());
            report.documents.push(DocumentReport {
                path: relative,
                rewrites: rewritten.rewrites,
            });
        }

        Ok(())
    }

    /// Checks whether the document at `relative` is deleted by trimming.
    ///
    /// After a real run only documents inside removed modules can still be
    /// found (for example if a module directory reappears). In a dry run the
    /// documents that steps 2 to 4 would have replaced or deleted are skipped
    /// as well.
    fn is_removed(&self, relative: &Path) -> bool {
        let Some(Component::Normal(first)) = relative.components().next() else {
            return false;
        };
        if first
            .to_str()
            .is_some_and(|first| self.config.is_removed_module(first))
        {
            return true;
        }

        if !self.is_dry_run() {
            return false;
        }

        let relative = relative.to_string_lossy().replace('\\', "/");
        relative == INDEX_FILE
            || self.config.removed_files().any(|file| file == relative)
            || self
                .config
                .kept_modules()
                .any(|module| relative == format!("{module}/{SETUP_PAGE}{CONTENT_EXTENSION}"))
    }
}

/// Trim the content root at `root` with the default workshop configuration.
///
/// # Errors
///
/// See [`Trimmer::run`].
pub fn run(root: impl Into<PathBuf>) -> Result<Report, TrimError> {
    Trimmer::new(root.into(), Config::default()).run()
}

fn collect_markdown_paths(root: &Path) -> Result<Vec<PathBuf>, TrimError> {
    let mut paths = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        if entry.file_type().is_file() && entry.path().extension() == Some(OsStr::new("md")) {
            paths.push(entry.into_path());
        }
    }
    Ok(paths)
}

fn read(path: &Path) -> Result<String, TrimError> {
    fs::read_to_string(path).map_err(io_error("read", path))
}

fn write(path: &Path, content: &str) -> Result<(), TrimError> {
    fs::write(path, content).map_err(io_error("write", path))
}

fn io_error(action: &'static str, path: &Path) -> impl FnOnce(io::Error) -> TrimError {
    let path = path.to_path_buf();
    move |source| TrimError::Io {
        action,
        path,
        source,
    }
}

/// Errors that abort a trimming run.
#[derive(Debug, thiserror::Error)]
pub enum TrimError {
    /// The content root is missing or not a directory.
    #[error("content root {} not found", .0.display())]
    MissingRoot(PathBuf),

    /// A document could not be read, written or deleted.
    #[error("failed to {action} {}: {source}", .path.display())]
    Io {
        /// What was attempted.
        action: &'static str,
        /// The file or directory involved.
        path: PathBuf,
        /// The underlying I/O error.
        source: io::Error,
    },

    /// The content root could not be traversed.
    #[error("failed to walk content root: {0}")]
    Walk(#[from] walkdir::Error),
}
