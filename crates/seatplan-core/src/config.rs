#![forbid(unsafe_code)]

//! Engine configuration.
//!
//! Every knob of a new chart in one struct that loads from JSON, or from
//! TOML with the `toml-config` feature:
//!
//! ```toml
//! # seatplan.toml
//! rows = 5
//! cols = 7
//! history_depth = 50
//! seed = 42
//! officer_tags = ["班長", "副班", "衛生"]
//! ```
//!
//! Fields left out take their defaults, so `EngineConfig::default()` is the
//! classroom a fresh chart starts with: 6×6 seats and the standard officer
//! and subject tag lists.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::tags::{DEFAULT_OFFICER_TAGS, DEFAULT_TEACHER_TAGS, TEACHER_SUFFIX, is_officer_label};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[cfg(feature = "toml-config")]
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("unsupported config file extension: {extension:?}")]
    UnsupportedFormat { extension: String },

    #[error("validation errors: {}", .0.join("; "))]
    Validation(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Rows of a new chart.
    pub rows: u16,
    /// Columns of a new chart.
    pub cols: u16,
    /// Largest grid a resize may produce.
    pub max_rows: u16,
    pub max_cols: u16,
    /// Built-in officer tags.
    pub officer_tags: Vec<String>,
    /// Built-in subject tags.
    pub teacher_tags: Vec<String>,
    /// Undo snapshots kept per session.
    pub history_depth: usize,
    /// Fixed RNG seed for reproducible shuffles. `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            rows: 6,
            cols: 6,
            max_rows: 20,
            max_cols: 20,
            officer_tags: DEFAULT_OFFICER_TAGS.map(String::from).to_vec(),
            teacher_tags: DEFAULT_TEACHER_TAGS.map(String::from).to_vec(),
            history_depth: 100,
            seed: None,
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(s)?;
        config.validated()
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    #[cfg(feature = "toml-config")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validated()
    }

    #[cfg(feature = "toml-config")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Load a config file, choosing the parser from the extension.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        match extension.as_str() {
            "json" => Self::from_json_file(path),
            #[cfg(feature = "toml-config")]
            "toml" => Self::from_toml_file(path),
            _ => Err(ConfigError::UnsupportedFormat { extension }),
        }
    }

    fn validated(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// Check every field. An empty list means the config is usable.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.max_rows == 0 || self.max_cols == 0 {
            errors.push(format!(
                "max grid must be at least 1x1, got {}x{}",
                self.max_rows, self.max_cols
            ));
        }
        if !(1..=self.max_rows).contains(&self.rows) {
            errors.push(format!(
                "rows must be in 1..={}, got {}",
                self.max_rows, self.rows
            ));
        }
        if !(1..=self.max_cols).contains(&self.cols) {
            errors.push(format!(
                "cols must be in 1..={}, got {}",
                self.max_cols, self.cols
            ));
        }
        if self.history_depth == 0 {
            errors.push("history_depth must be > 0".into());
        }

        for (field, tags) in [
            ("officer_tags", &self.officer_tags),
            ("teacher_tags", &self.teacher_tags),
        ] {
            for (i, tag) in tags.iter().enumerate() {
                if tag.trim().is_empty() {
                    errors.push(format!("{field}[{i}] is blank"));
                } else if tags[..i].contains(tag) {
                    errors.push(format!("{field}[{i}] duplicates {tag:?}"));
                }
            }
        }
        for (i, tag) in self.officer_tags.iter().enumerate() {
            if !is_officer_label(tag.trim()) {
                errors.push(format!("officer_tags[{i}] ends in {TEACHER_SUFFIX:?}"));
            }
        }

        errors
    }

    /// Whether a resize target is within the configured bounds.
    #[must_use]
    pub fn allows_grid(&self, rows: u16, cols: u16) -> bool {
        (1..=self.max_rows).contains(&rows) && (1..=self.max_cols).contains(&cols)
    }
}
