//! Judge configuration persistence and provider selection.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::types::{OracleConfigResponse, OracleConfigUpdate, Provider};

pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-3-5-haiku-20241022";
pub const DEFAULT_GROQ_MODEL: &str = "llama-3.3-70b-versatile";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";

/// Stored judge configuration (persisted to oracle-config.json).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OracleConfig {
    #[serde(default = "default_preferred")]
    pub preferred_provider: String,
    #[serde(default)]
    pub openai_api_key: Option<String>,
    #[serde(default)]
    pub anthropic_api_key: Option<String>,
    #[serde(default)]
    pub groq_api_key: Option<String>,
    #[serde(default)]
    pub gemini_api_key: Option<String>,
    #[serde(default = "default_openai_model")]
    pub openai_model: String,
    #[serde(default = "default_anthropic_model")]
    pub anthropic_model: String,
    #[serde(default = "default_groq_model")]
    pub groq_model: String,
    #[serde(default = "default_gemini_model")]
    pub gemini_model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    /// Path to config file for saving.
    #[serde(skip)]
    pub config_path: PathBuf,
}

fn default_preferred() -> String {
    "auto".into()
}
fn default_openai_model() -> String {
    DEFAULT_OPENAI_MODEL.into()
}
fn default_anthropic_model() -> String {
    DEFAULT_ANTHROPIC_MODEL.into()
}
fn default_groq_model() -> String {
    DEFAULT_GROQ_MODEL.into()
}
fn default_gemini_model() -> String {
    DEFAULT_GEMINI_MODEL.into()
}
fn default_temperature() -> f64 {
    0.1
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            preferred_provider: "auto".into(),
            openai_api_key: None,
            anthropic_api_key: None,
            groq_api_key: None,
            gemini_api_key: None,
            openai_model: DEFAULT_OPENAI_MODEL.into(),
            anthropic_model: DEFAULT_ANTHROPIC_MODEL.into(),
            groq_model: DEFAULT_GROQ_MODEL.into(),
            gemini_model: DEFAULT_GEMINI_MODEL.into(),
            temperature: default_temperature(),
            config_path: PathBuf::new(),
        }
    }
}

/// Blank keys count as unset.
fn non_empty(key: &Option<String>) -> Option<&String> {
    key.as_ref().filter(|k| !k.trim().is_empty())
}

impl OracleConfig {
    /// Load config from file, falling back to env vars and defaults.
    pub fn load(config_path: &Path) -> Self {
        let mut config: OracleConfig = std::fs::read_to_string(config_path)
            .ok()
            .and_then(|s| serde_json::from_str(&s).ok())
            .unwrap_or_default();

        config.config_path = config_path.to_path_buf();

        // Env vars as fallback for API keys
        if config.openai_api_key.is_none() {
            config.openai_api_key = std::env::var("OPENAI_API_KEY").ok();
        }
        if config.anthropic_api_key.is_none() {
            config.anthropic_api_key = std::env::var("ANTHROPIC_API_KEY").ok();
        }
        if config.groq_api_key.is_none() {
            config.groq_api_key = std::env::var("GROQ_API_KEY").ok();
        }
        if config.gemini_api_key.is_none() {
            config.gemini_api_key = std::env::var("GEMINI_API_KEY").ok();
        }

        config
    }

    /// Save config to disk.
    pub fn save(&self) -> Result<(), std::io::Error> {
        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(&self.config_path, json)?;
        info!("Saved judge config to {}", self.config_path.display());
        Ok(())
    }

    /// Apply an update, merging with existing config.
    pub fn apply_update(&mut self, update: &OracleConfigUpdate) {
        if let Some(p) = &update.preferred_provider {
            self.preferred_provider = p.clone();
        }
        if let Some(k) = &update.openai_api_key {
            self.openai_api_key = Some(k.clone());
        }
        if let Some(k) = &update.anthropic_api_key {
            self.anthropic_api_key = Some(k.clone());
        }
        if let Some(k) = &update.groq_api_key {
            self.groq_api_key = Some(k.clone());
        }
        if let Some(k) = &update.gemini_api_key {
            self.gemini_api_key = Some(k.clone());
        }
        if let Some(m) = &update.openai_model {
            self.openai_model = m.clone();
        }
        if let Some(m) = &update.anthropic_model {
            self.anthropic_model = m.clone();
        }
        if let Some(m) = &update.groq_model {
            self.groq_model = m.clone();
        }
        if let Some(m) = &update.gemini_model {
            self.gemini_model = m.clone();
        }
        if let Some(t) = update.temperature {
            self.temperature = t.clamp(0.0, 2.0);
        }
    }

    fn provider_entry(&self, provider: Provider) -> Option<(Provider, String, String)> {
        let (key, model) = match provider {
            Provider::OpenAI => (&self.openai_api_key, &self.openai_model),
            Provider::Anthropic => (&self.anthropic_api_key, &self.anthropic_model),
            Provider::Groq => (&self.groq_api_key, &self.groq_model),
            Provider::Gemini => (&self.gemini_api_key, &self.gemini_model),
        };
        non_empty(key).map(|k| (provider, model.clone(), k.clone()))
    }

    /// Resolve which provider, model and key to use.
    pub fn resolve_provider(&self) -> Option<(Provider, String, String)> {
        // Explicit preference
        if self.preferred_provider != "auto" {
            return match self.preferred_provider.as_str() {
                "openai" => self.provider_entry(Provider::OpenAI),
                "anthropic" => self.provider_entry(Provider::Anthropic),
                "groq" => self.provider_entry(Provider::Groq),
                "gemini" => self.provider_entry(Provider::Gemini),
                _ => None,
            };
        }

        // Auto mode: Anthropic > Gemini > Groq > OpenAI
        [
            Provider::Anthropic,
            Provider::Gemini,
            Provider::Groq,
            Provider::OpenAI,
        ]
        .into_iter()
        .find_map(|p| self.provider_entry(p))
    }

    /// Build the public config response (no API keys exposed).
    pub fn to_response(&self) -> OracleConfigResponse {
        let resolved = self.resolve_provider();
        OracleConfigResponse {
            preferred_provider: self.preferred_provider.clone(),
            openai_configured: non_empty(&self.openai_api_key).is_some(),
            anthropic_configured: non_empty(&self.anthropic_api_key).is_some(),
            groq_configured: non_empty(&self.groq_api_key).is_some(),
            gemini_configured: non_empty(&self.gemini_api_key).is_some(),
            openai_model: self.openai_model.clone(),
            anthropic_model: self.anthropic_model.clone(),
            groq_model: self.groq_model.clone(),
            gemini_model: self.gemini_model.clone(),
            temperature: self.temperature,
            active_provider: resolved.map(|(p, _, _)| p.to_string()),
        }
    }
}
