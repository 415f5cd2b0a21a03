//! Pure logic for preparing the workshop tree.
//!
//! This module contains the configuration type and the reference resolution
//! and rewriting rules. Apart from loading and saving the configuration,
//! nothing in here touches the filesystem.

mod config;
pub use config::{Config, ConfigError};

pub mod resolver;
pub use resolver::{Resolution, resolve};

pub mod rewrite;
pub use rewrite::{Rewrite, RewrittenDocument, Rewriter};
