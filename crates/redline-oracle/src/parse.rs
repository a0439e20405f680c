//! Tolerant decoding of judge answers.
//!
//! Models wrap JSON in Markdown fences, drop fields and quote numbers.
//! Anything that cannot be read at all is reported as `Malformed`.

use serde_json::Value;

use crate::{OracleError, RawDiscovery, Verdict};

/// Take the body of the first fenced block, if there is one.
pub fn strip_code_fence(text: &str) -> &str {
    let text = text.trim();
    let body = if let Some((_, rest)) = text.split_once("```json") {
        rest
    } else if let Some((_, rest)) = text.split_once("```") {
        rest
    } else {
        return text;
    };
    body.split("```").next().unwrap_or(body).trim()
}

fn decode(text: &str) -> Result<Value, OracleError> {
    serde_json::from_str(strip_code_fence(text))
        .map_err(|e| OracleError::Malformed(format!("invalid JSON: {}", e)))
}

pub fn parse_verdict(text: &str) -> Result<Verdict, OracleError> {
    let value = decode(text)?;
    let object = value
        .as_object()
        .ok_or_else(|| OracleError::Malformed("verdict is not an object".into()))?;

    let is_pii = match object.get("is_pii") {
        None | Some(Value::Null) => true,
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => !matches!(s.trim().to_lowercase().as_str(), "false" | "no"),
        Some(other) => {
            return Err(OracleError::Malformed(format!("is_pii has unexpected value {}", other)))
        }
    };
    let reasoning = object
        .get("reasoning")
        .and_then(Value::as_str)
        .filter(|r| !r.trim().is_empty())
        .unwrap_or("No reasoning provided")
        .to_string();

    Ok(Verdict { is_pii, reasoning })
}

/// Integer offset, also accepted as a numeric string.
fn offset(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn text_field(item: &Value, key: &str) -> Option<String> {
    item.get(key).and_then(Value::as_str).map(str::to_string)
}

/// Items without a string `value` are skipped.
pub fn parse_discoveries(text: &str) -> Result<Vec<RawDiscovery>, OracleError> {
    let value = decode(text)?;
    let items: &[Value] = match &value {
        Value::Array(items) => items.as_slice(),
        Value::Object(map) => match map.get("new_detections") {
            Some(Value::Array(items)) => items.as_slice(),
            None | Some(Value::Null) => &[],
            Some(_) => return Err(OracleError::Malformed("new_detections is not a list".into())),
        },
        _ => return Err(OracleError::Malformed("discovery answer is not an object".into())),
    };

    Ok(items
        .iter()
        .filter_map(|item| {
            let value = text_field(item, "value")?;
            Some(RawDiscovery {
                category: text_field(item, "type")
                    .or_else(|| text_field(item, "category"))
                    .unwrap_or_else(|| "other".into()),
                value,
                start: offset(item.get("start")),
                end: offset(item.get("end")),
                confidence: text_field(item, "confidence"),
                reasoning: text_field(item, "reasoning"),
            })
        })
        .collect())
}
