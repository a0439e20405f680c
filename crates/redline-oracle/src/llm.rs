//! Remote judge backed by a chat-completion provider.

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use redline_core::{Category, DetectionSet};

use crate::providers::{complete, Sampling};
use crate::types::{ChatMessage, Provider};
use crate::{parse, prompts, Oracle, OracleError, RawDiscovery, Verdict};

const VALIDATE_MAX_TOKENS: usize = 256;
const DISCOVER_MAX_TOKENS: usize = 2048;
const EXPLAIN_MAX_TOKENS: usize = 300;

pub struct LlmOracle {
    client: Client,
    provider: Provider,
    model: String,
    api_key: String,
    temperature: f64,
    label: String,
}

impl LlmOracle {
    pub fn new(provider: Provider, model: impl Into<String>, api_key: impl Into<String>) -> Self {
        let model = model.into();
        Self {
            client: Client::new(),
            label: format!("{}:{}", provider, model),
            provider,
            model,
            api_key: api_key.into(),
            temperature: 0.1,
        }
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    async fn ask(&self, messages: Vec<ChatMessage>, max_tokens: usize) -> Result<String, OracleError> {
        let sampling = Sampling {
            temperature: self.temperature,
            max_tokens,
        };
        complete(
            &self.client,
            self.provider,
            &messages,
            &self.model,
            &self.api_key,
            sampling,
        )
        .await
    }
}

#[async_trait]
impl Oracle for LlmOracle {
    async fn validate(
        &self,
        _document: &str,
        candidate: &str,
        category: Category,
        context: &str,
    ) -> Result<Verdict, OracleError> {
        let answer = self
            .ask(prompts::validation(candidate, category, context), VALIDATE_MAX_TOKENS)
            .await?;
        parse::parse_verdict(&answer)
    }

    async fn discover(
        &self,
        document: &str,
        current: &DetectionSet,
    ) -> Result<Vec<RawDiscovery>, OracleError> {
        let answer = self
            .ask(prompts::discovery(document, current), DISCOVER_MAX_TOKENS)
            .await?;
        let found = parse::parse_discoveries(&answer)?;
        debug!("{} proposed {} additional spans", self.label, found.len());
        Ok(found)
    }

    async fn explain(
        &self,
        _document: &str,
        detections: &DetectionSet,
    ) -> Result<String, OracleError> {
        self.ask(prompts::explanation(detections), EXPLAIN_MAX_TOKENS).await
    }

    fn name(&self) -> &str {
        &self.label
    }
}
