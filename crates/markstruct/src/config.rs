//! Converter configuration.
//!
//! Parses TOML configuration with serde. Every key is optional:
//!
//! ```toml
//! [markdown]
//! gfm = false
//! strikethrough = true
//!
//! [traversal]
//! max_depth = 64
//! ```

use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use pulldown_cmark::Options;
use serde::Deserialize;

use crate::converter::Converter;
use crate::markdown::MarkdownRenderer;

/// Converter configuration.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Markdown parser extensions.
    pub markdown: MarkdownConfig,
    /// Traversal limits.
    pub traversal: TraversalConfig,
}

/// Markdown parser extensions. All disabled by default (plain CommonMark).
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
#[allow(clippy::struct_excessive_bools)]
pub struct MarkdownConfig {
    /// Enable the GitHub Flavored Markdown set (tables, strikethrough,
    /// task lists, alerts).
    pub gfm: bool,
    pub tables: bool,
    pub strikethrough: bool,
    pub tasklists: bool,
    pub footnotes: bool,
    /// Curly quotes, en/em dashes and ellipses.
    pub smart_punctuation: bool,
    /// `# Heading {#id .class}` attribute syntax.
    pub heading_attributes: bool,
}

impl MarkdownConfig {
    /// Parser options for the enabled extensions.
    #[must_use]
    pub fn options(&self) -> Options {
        let flags = [
            (self.tables, Options::ENABLE_TABLES),
            (self.strikethrough, Options::ENABLE_STRIKETHROUGH),
            (self.tasklists, Options::ENABLE_TASKLISTS),
            (self.footnotes, Options::ENABLE_FOOTNOTES),
            (self.smart_punctuation, Options::ENABLE_SMART_PUNCTUATION),
            (self.heading_attributes, Options::ENABLE_HEADING_ATTRIBUTES),
        ];
        flags
            .into_iter()
            .filter(|(enabled, _)| *enabled)
            .fold(Options::empty(), |options, (_, flag)| options | flag)
    }

    /// Renderer configured with these extensions.
    #[must_use]
    pub fn renderer(&self) -> MarkdownRenderer {
        MarkdownRenderer::new()
            .with_options(self.options())
            .with_gfm(self.gfm)
    }
}

/// Traversal limits.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct TraversalConfig {
    /// Maximum record nesting depth. Unbounded when absent.
    pub max_depth: Option<usize>,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
}

impl Config {
    /// Parse and validate configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Check value ranges serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.traversal.max_depth == Some(0) {
            return Err(ConfigError::Validation(
                "traversal.max_depth must be at least 1".to_owned(),
            ));
        }
        Ok(())
    }

    /// Build a Markdown converter from this configuration.
    #[must_use]
    pub fn converter(&self) -> Converter<MarkdownRenderer> {
        let converter = Converter::new(self.markdown.renderer());
        match self.traversal.max_depth.and_then(NonZeroUsize::new) {
            Some(depth) => converter.with_max_depth(depth),
            None => converter,
        }
    }
}
