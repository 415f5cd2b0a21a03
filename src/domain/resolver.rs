//! Reference path resolution.
//!
//! References found in a document are resolved to a canonical path relative
//! to the content root, then classified against the [`Config`]:
//!
//! - `../stage-setting/index.md` from `asset-structure/test.md` →
//!   `stage-setting/index` (removed module)
//! - `/composition-basics/layers.md` → `composition-basics/layers`
//!   (root-absolute, removed module)
//! - `setup.md` from `asset-structure/test.md` → `asset-structure/setup`
//!   (setup page of a kept module)
//!
//! Resolution is pure path arithmetic. Targets are never looked up on disk.

use std::path::{Component, Path};

use crate::domain::Config;

/// Extension of the documents in the content root.
pub(crate) const CONTENT_EXTENSION: &str = ".md";

/// Name of the setup sub-page that is stripped from kept modules.
pub(crate) const SETUP_PAGE: &str = "setup";

/// The verdict for a single reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The target is still part of the trimmed tree.
    Retained,

    /// The target is removed. Holds its canonical path relative to the content
    /// root, without the `.md` extension.
    Removed(String),

    /// The reference, or the document containing it, lies outside the
    /// content root. Treated like [`Resolution::Retained`] when rewriting.
    OutsideRoot,
}

impl Resolution {
    /// The canonical path of the removed target, if the target is removed.
    #[must_use]
    pub fn removed(&self) -> Option<&str> {
        match self {
            Self::Removed(path) => Some(path),
            Self::Retained | Self::OutsideRoot => None,
        }
    }
}

/// Resolve `reference`, found in `document`, against the content `root`.
///
/// `document` may be given either as a path below `root` or as a path
/// relative to `root`. References starting with `/` are root-absolute; all
/// other references (including `../` and `./` forms) are relative to the
/// directory containing `document`.
#[must_use]
pub fn resolve(reference: &str, document: &Path, root: &Path, config: &Config) -> Resolution {
    match normalize(reference, document, root) {
        Some(path) => classify(&path, config),
        None => Resolution::OutsideRoot,
    }
}

/// Join `reference` onto its base directory and collapse `.` and `..`.
///
/// Returns `None` if the result cannot be expressed relative to `root`.
fn normalize(reference: &str, document: &Path, root: &Path) -> Option<String> {
    let (mut segments, rest) = if reference.starts_with('/') {
        (Vec::new(), reference.trim_start_matches('/'))
    } else {
        let document = document
            .strip_prefix(root)
            .ok()
            .or_else(|| document.is_relative().then_some(document))?;
        let directory = document.parent().unwrap_or_else(|| Path::new(""));
        (
            document_segments(directory)?,
            reference.strip_prefix("./").unwrap_or(reference),
        )
    };

    for segment in rest.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop()?;
            }
            name => segments.push(name.to_string()),
        }
    }

    Some(segments.join("/"))
}

fn document_segments(directory: &Path) -> Option<Vec<String>> {
    let mut segments = Vec::new();
    for component in directory.components() {
        match component {
            Component::Normal(name) => segments.push(name.to_str()?.to_string()),
            Component::CurDir => {}
            Component::ParentDir => {
                segments.pop()?;
            }
            Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    Some(segments)
}

/// Test a normalized path against the removed content, in order: removed
/// modules, removed standalone files, setup pages of kept modules.
fn classify(path: &str, config: &Config) -> Resolution {
    let stem = path.strip_suffix(CONTENT_EXTENSION).unwrap_or(path);

    if config
        .removed_modules()
        .any(|module| is_within_module(path, module))
    {
        return Resolution::Removed(stem.to_string());
    }

    if let Some(base_name) = config
        .removed_files()
        .map(|file| file.strip_suffix(CONTENT_EXTENSION).unwrap_or(file))
        .find(|base_name| *base_name == stem)
    {
        return Resolution::Removed(base_name.to_string());
    }

    if let Some(setup) = config
        .kept_modules()
        .map(|module| format!("{module}/{SETUP_PAGE}"))
        .find(|setup| setup == stem)
    {
        return Resolution::Removed(setup);
    }

    Resolution::Retained
}

/// Checks whether `path` is the module itself or lies below it.
pub(crate) fn is_within_module(path: &str, module: &str) -> bool {
    path.strip_prefix(module)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn resolve_from(reference: &str, document: &str) -> Resolution {
        let root = PathBuf::from("/docs");
        resolve(reference, &root.join(document), &root, &Config::default())
    }

    #[test]
    fn parent_relative_path_to_removed_module() {
        assert_eq!(
            resolve_from("../stage-setting/index.md", "asset-structure/test.md"),
            Resolution::Removed("stage-setting/index".to_string())
        );
    }

    #[test]
    fn parent_relative_path_to_kept_module() {
        assert_eq!(
            resolve_from(
                "../creating-composition-arcs/index.md",
                "asset-structure/test.md"
            ),
            Resolution::Retained
        );
    }

    #[test]
    fn bare_path_from_root_document() {
        assert_eq!(
            resolve_from("beyond-basics/value-resolution.md", "glossary.md"),
            Resolution::Removed("beyond-basics/value-resolution".to_string())
        );
    }

    #[test]
    fn dot_slash_path_is_relative_to_document() {
        assert_eq!(
            resolve_from("./stage-setting/prims", "glossary.md"),
            Resolution::Removed("stage-setting/prims".to_string())
        );
    }

    #[test]
    fn absolute_path_to_removed_module() {
        assert_eq!(
            resolve_from("/composition-basics/layers.md", "asset-structure/test.md"),
            Resolution::Removed("composition-basics/layers".to_string())
        );
    }

    #[test]
    fn module_root_itself_is_removed() {
        assert_eq!(
            resolve_from("../beyond-basics", "asset-structure/test.md"),
            Resolution::Removed("beyond-basics".to_string())
        );
    }

    #[test]
    fn module_name_prefix_is_not_a_match() {
        assert_eq!(
            resolve_from("/stage-setting-extras/index.md", "glossary.md"),
            Resolution::Retained
        );
    }

    #[test]
    fn path_to_removed_file() {
        assert_eq!(
            resolve_from(
                "../usdview-install-instructions.md",
                "asset-structure/test.md"
            ),
            Resolution::Removed("usdview-install-instructions".to_string())
        );
        assert_eq!(
            resolve_from("usdview-install-instructions", "glossary.md"),
            Resolution::Removed("usdview-install-instructions".to_string())
        );
    }

    #[test]
    fn setup_page_in_current_module() {
        assert_eq!(
            resolve_from("setup.md", "asset-structure/test.md"),
            Resolution::Removed("asset-structure/setup".to_string())
        );
    }

    #[test]
    fn setup_page_in_sibling_module() {
        assert_eq!(
            resolve_from("../data-exchange/setup", "asset-structure/test.md"),
            Resolution::Removed("data-exchange/setup".to_string())
        );
    }

    #[test]
    fn setup_page_outside_kept_module_is_retained() {
        assert_eq!(resolve_from("setup.md", "glossary.md"), Resolution::Retained);
    }

    #[test]
    fn dot_segments_are_collapsed() {
        assert_eq!(
            resolve_from(
                "../asset-structure/./../stage-setting/index.md",
                "asset-structure/test.md"
            ),
            Resolution::Removed("stage-setting/index".to_string())
        );
    }

    #[test]
    fn escaping_the_root_is_outside() {
        assert_eq!(
            resolve_from("../../stage-setting/index.md", "asset-structure/test.md"),
            Resolution::OutsideRoot
        );
        assert_eq!(
            resolve_from("/../stage-setting/index.md", "glossary.md"),
            Resolution::OutsideRoot
        );
    }

    #[test]
    fn document_outside_root_is_outside() {
        let resolution = resolve(
            "../stage-setting/index.md",
            Path::new("/elsewhere/asset-structure/test.md"),
            Path::new("/docs"),
            &Config::default(),
        );
        assert_eq!(resolution, Resolution::OutsideRoot);
    }

    #[test]
    fn root_relative_document_path_is_accepted() {
        let resolution = resolve(
            "../stage-setting/index.md",
            Path::new("asset-structure/test.md"),
            Path::new("/docs"),
            &Config::default(),
        );
        assert_eq!(resolution.removed(), Some("stage-setting/index"));
    }

    #[test]
    fn custom_configuration_is_respected() {
        let config = Config::new(
            ["intro"],
            ["advanced"],
            ["legacy.md"],
            "https://example.com/",
        )
        .unwrap();
        let root = Path::new("/docs");
        let document = root.join("intro/index.md");

        assert_eq!(
            resolve("../advanced/topic.md", &document, root, &config).removed(),
            Some("advanced/topic")
        );
        assert_eq!(
            resolve("../legacy", &document, root, &config).removed(),
            Some("legacy")
        );
        assert_eq!(
            resolve("../stage-setting/index.md", &document, root, &config),
            Resolution::Retained
        );
    }
}
