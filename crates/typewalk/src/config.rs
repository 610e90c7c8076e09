// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Walk configuration.
//!
//! Supports both programmatic and file-based configuration (TOML, behind the
//! `config-loaders` feature).

use thiserror::Error;

/// Default bound on composite nesting.
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Spaces per nesting level in text output.
pub const DEFAULT_INDENT_WIDTH: usize = 4;

/// Upper bound accepted for `indent_width`.
pub const MAX_INDENT_WIDTH: usize = 16;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "config-loaders")]
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Walker configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "config-loaders", derive(serde::Deserialize))]
#[cfg_attr(feature = "config-loaders", serde(default, deny_unknown_fields))]
pub struct WalkConfig {
    /// Deepest composite nesting a walk may enter (root is depth 0).
    pub max_depth: usize,

    /// Spaces per nesting level for the pretty printer.
    pub indent_width: usize,
}

impl Default for WalkConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            indent_width: DEFAULT_INDENT_WIDTH,
        }
    }
}

impl WalkConfig {
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    #[must_use]
    pub fn with_indent_width(mut self, indent_width: usize) -> Self {
        self.indent_width = indent_width;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.indent_width > MAX_INDENT_WIDTH {
            return Err(ConfigError::Invalid(format!(
                "indent_width {} exceeds {}",
                self.indent_width, MAX_INDENT_WIDTH
            )));
        }
        Ok(())
    }

    /// Parse configuration from TOML text.
    #[cfg(feature = "config-loaders")]
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    #[cfg(feature = "config-loaders")]
    pub fn from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = WalkConfig::default();
        assert_eq!(config.max_depth, 32);
        assert_eq!(config.indent_width, 4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_wide_indent() {
        let config = WalkConfig::default().with_indent_width(40);
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[cfg(feature = "config-loaders")]
    #[test]
    fn test_from_toml_partial() {
        let config = WalkConfig::from_toml_str("max_depth = 4\n").expect("parse");
        assert_eq!(config.max_depth, 4);
        assert_eq!(config.indent_width, DEFAULT_INDENT_WIDTH);
    }

    #[cfg(feature = "config-loaders")]
    #[test]
    fn test_from_toml_unknown_key() {
        assert!(matches!(
            WalkConfig::from_toml_str("depth = 4\n"),
            Err(ConfigError::Toml(_))
        ));
    }

    #[cfg(feature = "config-loaders")]
    #[test]
    fn test_from_file() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        writeln!(file, "max_depth = 2\nindent_width = 2").expect("write");
        let config = WalkConfig::from_file(file.path()).expect("load");
        assert_eq!(config, WalkConfig::default().with_max_depth(2).with_indent_width(2));
    }
}
