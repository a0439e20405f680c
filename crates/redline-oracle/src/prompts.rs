//! Prompt construction for the three judge operations.

use redline_core::{Category, DetectionSet};

use crate::types::ChatMessage;

/// Discovery only sees the head of a document.
pub const DISCOVERY_WINDOW: usize = 2000;

const SYSTEM: &str = "You are a PII (Personally Identifiable Information) detection expert. \
Answer only in the JSON format you are asked for.";

/// First `DISCOVERY_WINDOW` characters of `text`.
pub fn document_head(text: &str) -> &str {
    match text.char_indices().nth(DISCOVERY_WINDOW) {
        Some((i, _)) => &text[..i],
        None => text,
    }
}

/// "phone: 2 found, email: 1 found" over non-empty categories.
fn count_summary(detections: &DetectionSet, verb: &str) -> Option<String> {
    let parts: Vec<String> = detections
        .iter()
        .filter(|(_, spans)| !spans.is_empty())
        .map(|(category, spans)| format!("{}: {} {}", category, spans.len(), verb))
        .collect();
    (!parts.is_empty()).then(|| parts.join(", "))
}

pub fn validation(candidate: &str, category: Category, context: &str) -> Vec<ChatMessage> {
    let prompt = format!(
        r#"Context: {context}

Question: Is "{candidate}" actually a {category} that should be redacted?

Consider:
- Is it real PII or a false positive (e.g., example email, book title, field label)?
- Does the context suggest it is not real PII (e.g., "email@example.com is just the name of a training module")?

Respond in JSON format:
{{
    "is_pii": true/false,
    "reasoning": "brief explanation"
}}"#
    );
    vec![ChatMessage::system(SYSTEM), ChatMessage::user(prompt)]
}

pub fn discovery(document: &str, current: &DetectionSet) -> Vec<ChatMessage> {
    let already = count_summary(current, "found").unwrap_or_else(|| "None".into());
    let prompt = format!(
        r#"Text to analyze:
{text}

Already detected:
{already}

Find any additional PII that might have been missed:
- Email addresses
- Phone numbers
- Names (first, last, or full names)
- Physical addresses
- Social Security Numbers
- Credit card numbers
- Usernames or account IDs
- Any other personally identifiable information

Respond in JSON format:
{{
    "new_detections": [
        {{
            "type": "email|phone|name|address|ssn|credit_card|username|other",
            "value": "the detected text",
            "start": character_position,
            "end": character_position,
            "confidence": "high|medium|low",
            "reasoning": "why this is PII"
        }}
    ]
}}"#,
        text = document_head(document),
    );
    vec![ChatMessage::system(SYSTEM), ChatMessage::user(prompt)]
}

pub fn explanation(detections: &DetectionSet) -> Vec<ChatMessage> {
    let found = count_summary(detections, "detected").unwrap_or_else(|| "No PII detected".into());
    let prompt = format!(
        r#"Summarize the PII redaction process for this document.

Detected PII:
{found}

Provide a clear, concise explanation of:
1. What types of PII were found
2. Why they were redacted
3. Any notable patterns or edge cases handled

Keep it brief (2-3 sentences)."#
    );
    vec![ChatMessage::user(prompt)]
}
