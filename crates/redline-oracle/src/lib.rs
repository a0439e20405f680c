//! Semantic judge ("oracle") contract and implementations.
//!
//! The `Oracle` trait is the boundary to an external judge that can
//! confirm candidate spans, propose spans the producers missed, and
//! summarise a redaction. Implementations:
//! - `NullOracle`: confirms everything, discovers nothing
//! - `LlmOracle`: chat-completion judge over OpenAI, Anthropic, Groq or Gemini

pub mod config;
pub mod llm;
pub mod null;
pub mod parse;
pub mod prompts;
pub mod providers;
pub mod summary;
pub mod types;

pub use config::OracleConfig;
pub use llm::LlmOracle;
pub use null::NullOracle;
pub use summary::local_summary;
pub use types::*;

use std::sync::Arc;

use async_trait::async_trait;
use redline_core::{Category, DetectionSet};

/// Failure reported by a judge.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum OracleError {
    /// Quota or rate limit hit; the caller may retry later.
    #[error("rate limited: {0}")]
    RateLimited(String),
    /// Auth, transport or provider failure.
    #[error("unavailable: {0}")]
    Unavailable(String),
    /// The judge answered, but not in a usable shape.
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Answer to a single validation question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub is_pii: bool,
    pub reasoning: String,
}

/// A span proposed by the judge, before any offset checks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawDiscovery {
    /// Category name as the judge spelled it.
    pub category: String,
    pub value: String,
    pub start: Option<i64>,
    pub end: Option<i64>,
    pub confidence: Option<String>,
    pub reasoning: Option<String>,
}

/// Pluggable judge interface.
#[async_trait]
pub trait Oracle: Send + Sync {
    /// Is `candidate` real sensitive data of `category`, given `context`?
    async fn validate(
        &self,
        document: &str,
        candidate: &str,
        category: Category,
        context: &str,
    ) -> Result<Verdict, OracleError>;

    /// Propose spans missing from `current`.
    async fn discover(
        &self,
        document: &str,
        current: &DetectionSet,
    ) -> Result<Vec<RawDiscovery>, OracleError>;

    /// Human-readable summary of what was redacted.
    async fn explain(
        &self,
        document: &str,
        detections: &DetectionSet,
    ) -> Result<String, OracleError>;

    /// Human-readable name for this judge (used in logs and responses).
    fn name(&self) -> &str;
}

/// Create the best available judge for the given configuration.
///
/// Uses the LLM judge when a provider resolves, otherwise `NullOracle`.
pub fn create_oracle(config: &OracleConfig) -> Arc<dyn Oracle> {
    match config.resolve_provider() {
        Some((provider, model, api_key)) => {
            tracing::info!("Using {} judge (model={})", provider, model);
            Arc::new(LlmOracle::new(provider, model, api_key).with_temperature(config.temperature))
        }
        None => {
            tracing::info!("No judge provider configured. Using null judge.");
            Arc::new(NullOracle::new())
        }
    }
}
