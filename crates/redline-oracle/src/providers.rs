//! One-shot chat completions against external providers.
//!
//! OpenAI, Groq and Gemini share the OpenAI-compatible chat format.
//! Anthropic uses its Messages API, with the system prompt set apart.

use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::types::{ChatMessage, Provider};
use crate::OracleError;

const OPENAI_URL: &str = "https://api.openai.com/v1/chat/completions";
const GROQ_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
const GEMINI_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai/chat/completions";
const ANTHROPIC_URL: &str = "https://api.anthropic.com/v1/messages";

/// Sampling settings shared by every request of one judge.
#[derive(Debug, Clone, Copy)]
pub struct Sampling {
    pub temperature: f64,
    pub max_tokens: usize,
}

/// Map a non-success HTTP response to a judge error.
pub fn classify_status(status: StatusCode, body: &str) -> OracleError {
    let lower = body.to_lowercase();
    if status == StatusCode::TOO_MANY_REQUESTS
        || lower.contains("quota")
        || lower.contains("rate_limit")
        || lower.contains("resource_exhausted")
        || lower.contains("overloaded_error")
    {
        OracleError::RateLimited(format!("API error {}: {}", status, body))
    } else {
        OracleError::Unavailable(format!("API error {}: {}", status, body))
    }
}

fn openai_body(messages: &[ChatMessage], model: &str, sampling: Sampling) -> Value {
    json!({
        "model": model,
        "messages": messages,
        "temperature": sampling.temperature,
        "max_tokens": sampling.max_tokens,
        "stream": false,
    })
}

fn anthropic_body(messages: &[ChatMessage], model: &str, sampling: Sampling) -> Value {
    let conversation: Vec<&ChatMessage> = messages.iter().filter(|m| m.role != "system").collect();
    let mut body = json!({
        "model": model,
        "messages": conversation,
        "temperature": sampling.temperature,
        "max_tokens": sampling.max_tokens,
    });
    if let Some(system) = messages.iter().find(|m| m.role == "system") {
        body["system"] = json!(system.content);
    }
    body
}

/// Text of a successful response body.
fn answer_text(provider: Provider, body: &str) -> Result<String, OracleError> {
    let parsed: Value = serde_json::from_str(body)
        .map_err(|e| OracleError::Malformed(format!("{} response is not JSON: {}", provider, e)))?;

    let text = match provider {
        Provider::Anthropic => parsed["content"]
            .as_array()
            .map(|blocks| {
                blocks
                    .iter()
                    .filter(|b| b["type"] == "text")
                    .filter_map(|b| b["text"].as_str())
                    .collect::<String>()
            })
            .unwrap_or_default(),
        _ => parsed["choices"][0]["message"]["content"]
            .as_str()
            .unwrap_or_default()
            .to_string(),
    };

    let text = text.trim();
    if text.is_empty() {
        return Err(OracleError::Malformed(format!("{} returned an empty answer", provider)));
    }
    Ok(text.to_string())
}

/// Send one completion request and return the answer text.
///
/// An empty answer counts as malformed.
pub async fn complete(
    client: &Client,
    provider: Provider,
    messages: &[ChatMessage],
    model: &str,
    api_key: &str,
    sampling: Sampling,
) -> Result<String, OracleError> {
    let request = match provider {
        Provider::Anthropic => client
            .post(ANTHROPIC_URL)
            .header("x-api-key", api_key)
            .header("anthropic-version", "2023-06-01")
            .json(&anthropic_body(messages, model, sampling)),
        Provider::OpenAI | Provider::Groq | Provider::Gemini => {
            let url = match provider {
                Provider::Groq => GROQ_URL,
                Provider::Gemini => GEMINI_URL,
                _ => OPENAI_URL,
            };
            client
                .post(url)
                .bearer_auth(api_key)
                .json(&openai_body(messages, model, sampling))
        }
    };

    debug!("Requesting {} completion with model {}", provider, model);
    let response = request
        .send()
        .await
        .map_err(|e| OracleError::Unavailable(format!("Request failed: {}", e)))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| OracleError::Unavailable(format!("Response read error: {}", e)))?;

    if !status.is_success() {
        let err = classify_status(status, &body);
        warn!("{} completion failed: {}", provider, err);
        return Err(err);
    }
    answer_text(provider, &body)
}
