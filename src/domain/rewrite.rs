//! Rewriting references to removed content.
//!
//! Two reference syntaxes are recognised:
//!
//! - structured cross-references: ``{doc}`path` `` and
//!   ``{doc}`label <path>` ``
//! - Markdown links: `[label](path)`, `[label](<path>)`, optionally with a
//!   `#fragment`
//!
//! A reference whose target resolves to removed content is replaced by a
//! Markdown link into the external site. Every other reference is left
//! byte-for-byte unchanged.

use std::{
    borrow::Cow,
    path::Path,
    sync::LazyLock,
};

use regex::{Captures, Regex};
use serde::Serialize;

use crate::domain::{
    Config, Resolution,
    resolver::{self, CONTENT_EXTENSION},
};

static CROSS_REFERENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{doc\}`([^`]+)`").expect("this must never fail"));

static LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").expect("this must never fail"));

static LABELLED_PAYLOAD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+?)\s*<(.+?)>").expect("this must never fail"));

/// Link targets that are never rewritten.
const PASS_THROUGH_PREFIXES: &[&str] = &["http://", "https://", "#", "inv:"];

/// A reference that was rewritten into an external link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rewrite {
    /// The reference as it appeared in the document.
    pub original: String,
    /// The external link that replaced it.
    pub replacement: String,
    /// Canonical path of the removed target, relative to the content root.
    pub target: String,
}

/// The result of rewriting a whole document.
#[derive(Debug)]
pub struct RewrittenDocument<'c> {
    /// The new document content. Borrowed if nothing was rewritten.
    pub content: Cow<'c, str>,
    /// Every rewrite, in the order it was applied.
    pub rewrites: Vec<Rewrite>,
    /// References whose path escapes the content root. These are left
    /// unchanged.
    pub outside_root: Vec<String>,
}

impl RewrittenDocument<'_> {
    /// Checks whether any reference was rewritten.
    #[must_use]
    pub fn is_changed(&self) -> bool {
        !self.rewrites.is_empty()
    }
}

enum Outcome {
    Unchanged,
    OutsideRoot(String),
    Rewritten(Rewrite),
}

/// Rewrites references to removed content into external links.
#[derive(Debug, Clone, Copy)]
pub struct Rewriter<'a> {
    config: &'a Config,
    root: &'a Path,
}

impl<'a> Rewriter<'a> {
    /// Creates a rewriter for documents below the content `root`.
    #[must_use]
    pub const fn new(config: &'a Config, root: &'a Path) -> Self {
        Self { config, root }
    }

    /// Rewrite the payload of a structured cross-reference.
    ///
    /// `payload` is the text between the backticks: either a bare path or
    /// `label <path>`. Without an explicit label, the link text is derived
    /// from the last path segment (`value-resolution` → `Value Resolution`).
    ///
    /// Returns `None` if the reference must be left unchanged.
    #[must_use]
    pub fn rewrite_structured(&self, payload: &str, document: &Path) -> Option<Rewrite> {
        match self.structured(payload, document) {
            Outcome::Rewritten(rewrite) => Some(rewrite),
            Outcome::Unchanged | Outcome::OutsideRoot(_) => None,
        }
    }

    /// Rewrite a Markdown link `[label](raw_path)`.
    ///
    /// External URLs, in-page anchors and inventory references (`inv:`) are
    /// never rewritten. A `#fragment` on the path is carried over verbatim.
    ///
    /// Returns `None` if the link must be left unchanged.
    #[must_use]
    pub fn rewrite_link(&self, label: &str, raw_path: &str, document: &Path) -> Option<Rewrite> {
        match self.link(label, raw_path, document) {
            Outcome::Rewritten(rewrite) => Some(rewrite),
            Outcome::Unchanged | Outcome::OutsideRoot(_) => None,
        }
    }

    /// Rewrite every reference in `content`.
    ///
    /// Structured cross-references are rewritten first, then Markdown links.
    /// Rewritten references are absolute `https://` links, so rewriting an
    /// already rewritten document changes nothing.
    #[must_use]
    pub fn rewrite_document<'c>(&self, content: &'c str, document: &Path) -> RewrittenDocument<'c> {
        let mut rewrites = Vec::new();
        let mut outside_root = Vec::new();

        let mut apply = |outcome: Outcome, token: &str| match outcome {
            Outcome::Rewritten(rewrite) => {
                let replacement = rewrite.replacement.clone();
                rewrites.push(rewrite);
                replacement
            }
            Outcome::OutsideRoot(reference) => {
                outside_root.push(reference);
                token.to_string()
            }
            Outcome::Unchanged => token.to_string(),
        };

        let structured = CROSS_REFERENCE.replace_all(content, |caps: &Captures<'_>| {
            apply(self.structured(&caps[1], document), &caps[0])
        });

        let linked = match LINK.replace_all(&structured, |caps: &Captures<'_>| {
            apply(self.link(&caps[1], &caps[2], document), &caps[0])
        }) {
            Cow::Owned(content) => Some(content),
            Cow::Borrowed(_) => None,
        };

        let content = if rewrites.is_empty() {
            Cow::Borrowed(content)
        } else {
            linked.map_or(structured, Cow::Owned)
        };

        RewrittenDocument {
            content,
            rewrites,
            outside_root,
        }
    }

    fn structured(&self, payload: &str, document: &Path) -> Outcome {
        let (label, path) = LABELLED_PAYLOAD.captures(payload).map_or_else(
            || (None, payload.trim()),
            |caps| {
                let label = caps.get(1).map_or("", |m| m.as_str()).trim();
                let path = caps.get(2).map_or("", |m| m.as_str()).trim();
                (Some(label).filter(|label| !label.is_empty()), path)
            },
        );

        match resolver::resolve(path, document, self.root, self.config) {
            Resolution::Retained => Outcome::Unchanged,
            Resolution::OutsideRoot => Outcome::OutsideRoot(path.to_string()),
            Resolution::Removed(target) => {
                let display = label.map_or_else(|| title_from_path(path), str::to_string);
                let url = self.external_url(&target, "");
                Outcome::Rewritten(Rewrite {
                    original: format!("{{doc}}`{payload}`"),
                    replacement: format!("[{display}]({url})"),
                    target,
                })
            }
        }
    }

    fn link(&self, label: &str, raw_path: &str, document: &Path) -> Outcome {
        let path = raw_path
            .strip_prefix('<')
            .and_then(|path| path.strip_suffix('>'))
            .unwrap_or(raw_path);

        if PASS_THROUGH_PREFIXES
            .iter()
            .any(|prefix| path.starts_with(prefix))
        {
            return Outcome::Unchanged;
        }

        let (path, anchor) = path.find('#').map_or((path, ""), |index| path.split_at(index));
        let path = path.strip_prefix("./").unwrap_or(path);

        match resolver::resolve(path, document, self.root, self.config) {
            Resolution::Retained => Outcome::Unchanged,
            Resolution::OutsideRoot => Outcome::OutsideRoot(path.to_string()),
            Resolution::Removed(target) => {
                let url = self.external_url(&target, anchor);
                Outcome::Rewritten(Rewrite {
                    original: format!("[{label}]({raw_path})"),
                    replacement: format!("[{label}]({url})"),
                    target,
                })
            }
        }
    }

    fn external_url(&self, target: &str, anchor: &str) -> String {
        format!(
            "{}{}{anchor}",
            self.config.external_base_url(),
            html_path(target)
        )
    }
}

/// Swap the content extension for `.html`.
fn html_path(target: &str) -> String {
    let stem = target.strip_suffix(CONTENT_EXTENSION).unwrap_or(target);
    if stem.ends_with(".html") {
        stem.to_string()
    } else {
        format!("{stem}.html")
    }
}

/// Link text for a reference without an explicit label.
///
/// `../beyond-basics/value-resolution.md` → `Value Resolution`
fn title_from_path(path: &str) -> String {
    let segment = path.rsplit('/').next().unwrap_or(path);
    let segment = segment.strip_suffix(CONTENT_EXTENSION).unwrap_or(segment);
    title_case(&segment.replace('-', " "))
}

/// Uppercases every letter that does not follow another letter and
/// lowercases the rest, so `3d` becomes `3D`.
fn title_case(text: &str) -> String {
    let mut title = String::with_capacity(text.len());
    let mut after_letter = false;
    for c in text.chars() {
        if after_letter {
            title.extend(c.to_lowercase());
        } else {
            title.extend(c.to_uppercase());
        }
        after_letter = c.is_alphabetic();
    }
    title
}
