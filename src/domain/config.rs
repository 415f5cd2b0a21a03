use std::{
    io,
    path::{Path, PathBuf},
};

use non_empty_string::NonEmptyString;
use serde::{Deserialize, Serialize};

/// Modules the workshop keeps in its table of contents.
const KEPT_MODULES: &[&str] = &[
    "creating-composition-arcs",
    "asset-structure",
    "data-exchange",
    "asset-modularity-instancing",
];

/// Modules deleted from the workshop tree.
const REMOVED_MODULES: &[&str] = &[
    "what-openusd",
    "stage-setting",
    "scene-description-blueprints",
    "composition-basics",
    "beyond-basics",
];

/// Standalone documents deleted from the workshop tree.
const REMOVED_FILES: &[&str] = &["usdview-install-instructions.md"];

const EXTERNAL_BASE_URL: &str = "https://docs.nvidia.com/learn-openusd/latest/";

const SITE_TITLE: &str = "Learn OpenUSD: Applied Concepts Workshop";

/// Configuration for preparing the workshop tree.
///
/// The configuration is immutable once constructed and is passed explicitly
/// to everything that resolves or rewrites references. Construction always
/// validates it, so a `Config` value never lists a module as both kept and
/// removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Versions", into = "Versions")]
pub struct Config {
    /// Top-level modules that remain in the workshop.
    kept_modules: Vec<NonEmptyString>,

    /// Top-level modules that are deleted and linked externally instead.
    removed_modules: Vec<NonEmptyString>,

    /// Standalone documents (relative to the content root) that are deleted.
    ///
    /// For example, `usdview-install-instructions.md`.
    removed_files: Vec<NonEmptyString>,

    /// Prefix under which removed content stays published.
    ///
    /// Always starts with `https://` and ends with `/`.
    external_base_url: String,

    /// Title written into the documentation builder's `conf.py`.
    site_title: String,

    /// Replacement body for the root `index.md`.
    ///
    /// When `None`, the bundled workshop homepage is used.
    index_template: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            kept_modules: names(KEPT_MODULES),
            removed_modules: names(REMOVED_MODULES),
            removed_files: names(REMOVED_FILES),
            external_base_url: EXTERNAL_BASE_URL.to_string(),
            site_title: SITE_TITLE.to_string(),
            index_template: None,
        }
    }
}

fn names(values: &[&str]) -> Vec<NonEmptyString> {
    values
        .iter()
        .filter_map(|value| NonEmptyString::new((*value).to_string()).ok())
        .collect()
}

impl Config {
    /// Builds a configuration from explicit module and file lists.
    ///
    /// The site title defaults to the workshop title and the bundled index
    /// template is used.
    ///
    /// # Errors
    ///
    /// Returns an error if any name is empty, a module name contains a path
    /// separator, a module is both kept and removed, or the base URL is not an
    /// `https://` URL ending in `/`.
    pub fn new<K, R, F>(
        kept_modules: K,
        removed_modules: R,
        removed_files: F,
        external_base_url: impl Into<String>,
    ) -> Result<Self, ConfigError>
    where
        K: IntoIterator,
        K::Item: Into<String>,
        R: IntoIterator,
        R::Item: Into<String>,
        F: IntoIterator,
        F::Item: Into<String>,
    {
        let config = Self {
            kept_modules: non_empty(kept_modules, "kept module")?,
            removed_modules: non_empty(removed_modules, "removed module")?,
            removed_files: non_empty(removed_files, "removed file")?,
            external_base_url: external_base_url.into(),
            site_title: SITE_TITLE.to_string(),
            index_template: None,
        };
        config.validate()?;
        Ok(config)
    }

    /// Replaces the site title written into `conf.py`.
    #[must_use]
    pub fn with_site_title(mut self, title: impl Into<String>) -> Self {
        self.site_title = title.into();
        self
    }

    /// Uses the file at `path` as the replacement root index.
    #[must_use]
    pub fn with_index_template(mut self, path: impl Into<PathBuf>) -> Self {
        self.index_template = Some(path.into());
        self
    }

    /// Loads the configuration from a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, if the TOML content is
    /// invalid, or if the resulting configuration fails validation.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(toml::from_str(&content)?)
    }

    /// Saves the configuration to a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized to TOML or if
    /// the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Serializes the configuration to pretty-printed TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Modules that remain in the workshop.
    pub fn kept_modules(&self) -> impl Iterator<Item = &str> {
        self.kept_modules.iter().map(NonEmptyString::as_str)
    }

    /// Modules that are deleted from the workshop.
    pub fn removed_modules(&self) -> impl Iterator<Item = &str> {
        self.removed_modules.iter().map(NonEmptyString::as_str)
    }

    /// Standalone documents that are deleted from the workshop.
    pub fn removed_files(&self) -> impl Iterator<Item = &str> {
        self.removed_files.iter().map(NonEmptyString::as_str)
    }

    /// The external base URL, including its trailing `/`.
    #[must_use]
    pub fn external_base_url(&self) -> &str {
        &self.external_base_url
    }

    /// The workshop site title.
    #[must_use]
    pub fn site_title(&self) -> &str {
        &self.site_title
    }

    /// The replacement root index, if one is configured.
    #[must_use]
    pub fn index_template(&self) -> Option<&Path> {
        self.index_template.as_deref()
    }

    /// Checks whether `name` is a removed module.
    #[must_use]
    pub fn is_removed_module(&self, name: &str) -> bool {
        self.removed_modules().any(|module| module == name)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(module) = self
            .kept_modules()
            .chain(self.removed_modules())
            .find(|module| module.contains('/'))
        {
            return Err(ConfigError::InvalidModuleName(module.to_string()));
        }

        let overlap: Vec<String> = self
            .kept_modules()
            .filter(|kept| self.is_removed_module(kept))
            .map(str::to_string)
            .collect();
        if !overlap.is_empty() {
            return Err(ConfigError::Overlap(overlap));
        }

        let url = &self.external_base_url;
        if !url.starts_with("https://") || !url.ends_with('/') {
            return Err(ConfigError::InvalidBaseUrl(url.clone()));
        }

        Ok(())
    }
}

fn non_empty<I>(values: I, kind: &'static str) -> Result<Vec<NonEmptyString>, ConfigError>
where
    I: IntoIterator,
    I::Item: Into<String>,
{
    values
        .into_iter()
        .map(|value| NonEmptyString::new(value.into()).map_err(|_| ConfigError::EmptyName(kind)))
        .collect()
}

/// Errors raised while loading, saving or validating a [`Config`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config file {}: {source}", .path.display())]
    Read {
        /// The file that was read.
        path: PathBuf,
        /// The underlying I/O error.
        source: io::Error,
    },

    /// The configuration file could not be written.
    #[error("failed to write config file {}: {source}", .path.display())]
    Write {
        /// The file that was written.
        path: PathBuf,
        /// The underlying I/O error.
        source: io::Error,
    },

    /// The TOML content is malformed.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// The configuration could not be rendered as TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// A module or file name is empty.
    #[error("{0} name must not be empty")]
    EmptyName(&'static str),

    /// A module name is not a single path segment.
    #[error("module name '{0}' must not contain '/'")]
    InvalidModuleName(String),

    /// Some modules are listed as both kept and removed.
    #[error("modules listed as both kept and removed: {}", .0.join(", "))]
    Overlap(Vec<String>),

    /// The external base URL is not an `https://` URL ending in `/`.
    #[error("external base URL '{0}' must start with 'https://' and end with '/'")]
    InvalidBaseUrl(String),
}

/// The serialized versions of the configuration.
/// This allows for future changes to the configuration format and to the domain
/// type without breaking compatibility.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default = "default_kept_modules")]
        kept_modules: Vec<String>,

        #[serde(default = "default_removed_modules")]
        removed_modules: Vec<String>,

        #[serde(default = "default_removed_files")]
        removed_files: Vec<String>,

        #[serde(default = "default_external_base_url")]
        external_base_url: String,

        #[serde(default = "default_site_title")]
        site_title: String,

        #[serde(default, skip_serializing_if = "Option::is_none")]
        index_template: Option<PathBuf>,
    },
}

fn default_kept_modules() -> Vec<String> {
    KEPT_MODULES.iter().map(ToString::to_string).collect()
}

fn default_removed_modules() -> Vec<String> {
    REMOVED_MODULES.iter().map(ToString::to_string).collect()
}

fn default_removed_files() -> Vec<String> {
    REMOVED_FILES.iter().map(ToString::to_string).collect()
}

fn default_external_base_url() -> String {
    EXTERNAL_BASE_URL.to_string()
}

fn default_site_title() -> String {
    SITE_TITLE.to_string()
}

impl TryFrom<Versions> for Config {
    type Error = ConfigError;

    fn try_from(versions: Versions) -> Result<Self, Self::Error> {
        match versions {
            Versions::V1 {
                kept_modules,
                removed_modules,
                removed_files,
                external_base_url,
                site_title,
                index_template,
            } => {
                let config = Self::new(
                    kept_modules,
                    removed_modules,
                    removed_files,
                    external_base_url,
                )?
                .with_site_title(site_title);
                Ok(match index_template {
                    Some(path) => config.with_index_template(path),
                    None => config,
                })
            }
        }
    }
}

impl From<Config> for Versions {
    fn from(config: Config) -> Self {
        Self::V1 {
            kept_modules: config.kept_modules().map(str::to_string).collect(),
            removed_modules: config.removed_modules().map(str::to_string).collect(),
            removed_files: config.removed_files().map(str::to_string).collect(),
            external_base_url: config.external_base_url,
            site_title: config.site_title,
            index_template: config.index_template,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::HashSet, io::Write};

    use super::*;

    #[test]
    fn default_lists_are_disjoint() {
        let config = Config::default();
        let kept: HashSet<_> = config.kept_modules().collect();
        let removed: HashSet<_> = config.removed_modules().collect();

        assert!(kept.contains("asset-structure"));
        assert!(removed.contains("stage-setting"));
        assert!(removed.contains("beyond-basics"));
        assert!(kept.is_disjoint(&removed));
    }

    #[test]
    fn default_base_url_is_https_directory() {
        let config = Config::default();
        let url = config.external_base_url();

        assert!(url.starts_with("https://"));
        assert!(url.ends_with('/'));
        assert!(url.contains("docs.nvidia.com"));
    }

    #[test]
    fn overlapping_modules_are_rejected() {
        let error = Config::new(
            ["asset-structure", "data-exchange"],
            ["data-exchange"],
            Vec::<String>::new(),
            "https://example.com/",
        )
        .unwrap_err();

        assert!(matches!(error, ConfigError::Overlap(ref modules) if modules == &["data-exchange"]));
    }

    #[test]
    fn base_url_must_end_with_slash() {
        let error = Config::new(
            ["a"],
            ["b"],
            Vec::<String>::new(),
            "https://example.com/docs",
        )
        .unwrap_err();

        assert!(matches!(error, ConfigError::InvalidBaseUrl(_)));
    }

    #[test]
    fn base_url_must_be_https() {
        let error = Config::new(["a"], ["b"], Vec::<String>::new(), "http://example.com/")
            .unwrap_err();

        assert!(matches!(error, ConfigError::InvalidBaseUrl(_)));
    }

    #[test]
    fn empty_module_name_is_rejected() {
        let error = Config::new([""], ["b"], Vec::<String>::new(), "https://example.com/")
            .unwrap_err();

        assert!(matches!(error, ConfigError::EmptyName("kept module")));
    }

    #[test]
    fn nested_module_name_is_rejected() {
        let error = Config::new(
            ["a"],
            ["b/c"],
            Vec::<String>::new(),
            "https://example.com/",
        )
        .unwrap_err();

        assert!(matches!(error, ConfigError::InvalidModuleName(ref name) if name == "b/c"));
    }

    #[test]
    fn load_reads_valid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(
            b"_version = \"1\"\nkept_modules = [\"intro\"]\nremoved_modules = [\"advanced\"]\nremoved_files = []\nexternal_base_url = \"https://example.com/docs/\"\nsite_title = \"Intro Workshop\"\nindex_template = \"workshop.md\"\n",
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();

        assert_eq!(config.kept_modules().collect::<Vec<_>>(), ["intro"]);
        assert_eq!(config.removed_modules().collect::<Vec<_>>(), ["advanced"]);
        assert_eq!(config.removed_files().count(), 0);
        assert_eq!(config.external_base_url(), "https://example.com/docs/");
        assert_eq!(config.site_title(), "Intro Workshop");
        assert_eq!(config.index_template(), Some(Path::new("workshop.md")));
    }

    #[test]
    fn load_missing_file_returns_error() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("missing.toml");

        let error = Config::load(&missing).unwrap_err();
        assert!(error.to_string().starts_with("failed to read config file"));
    }

    #[test]
    fn load_overlapping_file_returns_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"_version = \"1\"\nkept_modules = [\"a\"]\nremoved_modules = [\"a\"]\n")
            .unwrap();

        let error = Config::load(file.path()).unwrap_err();
        assert!(matches!(error, ConfigError::Parse(_)));
        assert!(error.to_string().contains("both kept and removed"));
    }

    #[test]
    fn empty_file_returns_default() {
        let expected = Config::default();
        let actual: Config = toml::from_str(r#"_version = "1""#).unwrap();
        assert_eq!(actual, expected);
    }

    #[test]
    fn save_then_load_preserves_configuration() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("workshop.toml");
        let config = Config::default().with_site_title("Custom");

        config.save(&path).unwrap();

        assert_eq!(Config::load(&path).unwrap(), config);
    }
}
