//! Learn OpenUSD workshop preparation
//!
//! Turns the full documentation tree into the trimmed workshop variant:
//! removed modules are deleted and references to them become links into the
//! published full site.

pub mod domain;
pub use domain::{Config, ConfigError, Resolution, Rewrite, Rewriter};

/// Trimming of the documentation tree on disk.
pub mod storage;
pub use storage::{Mode, Report, TrimError, Trimmer, run};
