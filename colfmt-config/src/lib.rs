//! Shared configuration loader for the colfmt toolchain.
//!
//! `defaults/colfmt.default.toml` is embedded into every binary so that docs and
//! runtime behavior stay in sync. Applications layer user-specific files on top
//! of those defaults via [`Loader`] before deserializing into [`ColfmtConfig`],
//! and convert the alignment section into engine settings with
//! [`AlignmentConfig::to_settings`].

use std::collections::HashMap;
use std::path::Path;

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use serde::Deserialize;

use colfmt_engine::{AlignmentSettings, ColumnSetting};

const DEFAULT_TOML: &str = include_str!("../defaults/colfmt.default.toml");

/// Top-level configuration consumed by colfmt applications.
#[derive(Debug, Clone, Deserialize)]
pub struct ColfmtConfig {
    pub alignment: AlignmentConfig,
}

/// Mirrors the knobs exposed by the alignment engine.
#[derive(Debug, Clone, Deserialize)]
pub struct AlignmentConfig {
    pub tab_size: u32,
    pub indent_width: u32,
    pub use_tab_char: bool,
    pub smart_tabs: bool,
    pub right_justify_numbers: bool,
    pub delimit_by_blank_lines: bool,
    pub delimit_by_statement_type: bool,
    pub delimit_by_unaligned_lines: bool,
    pub group_assignments_with_declarations: bool,
    pub deeper_switch: bool,
    pub method_call_similarity: usize,
    #[serde(default)]
    pub columns: HashMap<String, ColumnConfig>,
}

/// Per-column policy as written in configuration files.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ColumnConfig {
    pub aligned: bool,
    pub min_spacing: u32,
    pub allow_tabs: bool,
    pub rearrange: bool,
}

impl AlignmentConfig {
    /// Convert the configuration section into engine settings.
    pub fn to_settings(&self) -> AlignmentSettings {
        let mut settings = AlignmentSettings {
            tab_size: self.tab_size,
            indent_width: self.indent_width,
            use_tab_char: self.use_tab_char,
            smart_tabs: self.smart_tabs,
            right_justify_numbers: self.right_justify_numbers,
            delimit_by_blank_lines: self.delimit_by_blank_lines,
            delimit_by_statement_type: self.delimit_by_statement_type,
            delimit_by_unaligned_lines: self.delimit_by_unaligned_lines,
            group_assignments_with_declarations: self.group_assignments_with_declarations,
            deeper_switch: self.deeper_switch,
            method_call_similarity: self.method_call_similarity,
            ..AlignmentSettings::default()
        };
        for (key, column) in &self.columns {
            settings.columns.insert(
                key.clone(),
                ColumnSetting {
                    aligned: column.aligned,
                    min_spacing: column.min_spacing,
                    allow_tabs: column.allow_tabs,
                    rearrange: column.rearrange,
                },
            );
        }
        settings
    }
}

/// Helper for layering user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer an optional configuration file (ignored if the file is absent).
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override (useful for CLI settings).
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Finalize the builder and deserialize the resulting configuration.
    pub fn build(self) -> Result<ColfmtConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<ColfmtConfig, ConfigError> {
    Loader::new().build()
}
