//! Redaction settings and data directory management.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::span::Category;

/// How a redacted span is rendered in the output text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelStyle {
    /// Fixed-width opaque block string.
    #[serde(alias = "black_boxes")]
    Blocks,
    /// `custom_label` reused for every span.
    Custom,
    /// `[CATEGORY_n]`, numbered by position within each category.
    #[default]
    #[serde(alias = "labels")]
    Indexed,
}

fn enabled() -> bool {
    true
}

/// Per-request redaction settings. Every field has a default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedactionConfig {
    #[serde(default = "enabled", alias = "redact_emails")]
    pub redact_email: bool,
    #[serde(default = "enabled", alias = "redact_phones")]
    pub redact_phone: bool,
    #[serde(default = "enabled", alias = "redact_names")]
    pub redact_name: bool,
    #[serde(default = "enabled", alias = "redact_addresses")]
    pub redact_address: bool,
    #[serde(default = "enabled", alias = "redact_ssn")]
    pub redact_id_number: bool,
    #[serde(default = "enabled", alias = "redact_credit_cards")]
    pub redact_card_number: bool,
    #[serde(default, alias = "redaction_style")]
    pub label_style: LabelStyle,
    #[serde(default)]
    pub custom_label: Option<String>,
}

impl Default for RedactionConfig {
    fn default() -> Self {
        Self {
            redact_email: true,
            redact_phone: true,
            redact_name: true,
            redact_address: true,
            redact_id_number: true,
            redact_card_number: true,
            label_style: LabelStyle::Indexed,
            custom_label: None,
        }
    }
}

impl RedactionConfig {
    /// Check cross-field constraints. Must pass before any detection runs.
    pub fn validate(&self) -> Result<()> {
        if self.label_style == LabelStyle::Custom {
            match self.custom_label.as_deref() {
                Some(label) if !label.is_empty() => {}
                _ => {
                    return Err(Error::Config(
                        "label_style 'custom' requires a non-empty custom_label".into(),
                    ))
                }
            }
        }
        Ok(())
    }

    /// Whether spans of `category` may appear in the output.
    pub fn is_enabled(&self, category: Category) -> bool {
        match category {
            Category::Email => self.redact_email,
            Category::Phone => self.redact_phone,
            Category::Name => self.redact_name,
            Category::Address => self.redact_address,
            Category::IdNumber => self.redact_id_number,
            Category::CardNumber => self.redact_card_number,
            Category::Other => false,
        }
    }

    pub fn enabled_categories(&self) -> Vec<Category> {
        Category::CONFIGURABLE
            .iter()
            .copied()
            .filter(|c| self.is_enabled(*c))
            .collect()
    }

    /// Enable only the given categories.
    pub fn only(categories: &[Category]) -> Self {
        let mut config = Self::default();
        for category in Category::CONFIGURABLE {
            config.set_enabled(category, categories.contains(&category));
        }
        config
    }

    pub fn set_enabled(&mut self, category: Category, on: bool) {
        match category {
            Category::Email => self.redact_email = on,
            Category::Phone => self.redact_phone = on,
            Category::Name => self.redact_name = on,
            Category::Address => self.redact_address = on,
            Category::IdNumber => self.redact_id_number = on,
            Category::CardNumber => self.redact_card_number = on,
            Category::Other => {}
        }
    }
}

/// Paths to all Redline data directories.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataPaths {
    /// Root data directory (e.g., `data/`).
    pub root: PathBuf,
    /// Staging area for uploaded documents (`data/uploads/`).
    pub uploads: PathBuf,
    /// Rendered redacted documents (`data/exports/`).
    pub exports: PathBuf,
    /// Oracle provider configuration (`data/oracle-config.json`).
    pub oracle_config_file: PathBuf,
}

impl DataPaths {
    /// Create data paths from a root directory. Creates directories if needed.
    pub fn new(root: impl AsRef<Path>) -> std::io::Result<Self> {
        let root = root.as_ref().to_path_buf();
        let paths = Self {
            uploads: root.join("uploads"),
            exports: root.join("exports"),
            oracle_config_file: root.join("oracle-config.json"),
            root,
        };
        paths.ensure_dirs()?;
        Ok(paths)
    }

    fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.uploads)?;
        std::fs::create_dir_all(&self.exports)?;
        Ok(())
    }
}

/// Process-wide server configuration, read once at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedlineConfig {
    /// HTTP server port.
    pub port: u16,
    /// Data directory paths.
    pub data_paths: DataPaths,
    /// Refuse to start without a usable remote judge.
    pub require_oracle: bool,
}

impl RedlineConfig {
    /// Create configuration from environment and defaults.
    pub fn from_env(data_dir: impl AsRef<Path>) -> std::io::Result<Self> {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8000);

        let require_oracle = std::env::var("REDLINE_REQUIRE_ORACLE")
            .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        let data_paths = DataPaths::new(data_dir)?;

        Ok(Self {
            port,
            data_paths,
            require_oracle,
        })
    }
}
