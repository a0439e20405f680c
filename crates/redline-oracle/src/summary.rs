use redline_core::DetectionSet;

/// Summary built from per-category counts, used when no judge can explain.
pub fn local_summary(detections: &DetectionSet) -> String {
    let parts: Vec<String> = detections
        .iter()
        .filter(|(_, spans)| !spans.is_empty())
        .map(|(category, spans)| format!("{} {}", spans.len(), category))
        .collect();

    if parts.is_empty() {
        return "No PII detected; the document was left unchanged.".to_string();
    }
    format!(
        "Redacted {} item(s) of PII: {}.",
        detections.total(),
        parts.join(", ")
    )
}
