use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use redline_core::{Category, DetectionSet, Span};

/// A resolved span and the label that replaces it.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedRedaction {
    pub span: Span,
    pub label: String,
}

/// One entry of the applied plan, as reported to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedRedaction {
    pub category: Category,
    pub start: usize,
    pub end: usize,
    pub label: String,
    /// False when the live text no longer matched and the span was left alone.
    pub applied: bool,
}

/// Result of one redaction request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedactionOutcome {
    pub original: String,
    pub redacted: String,
    /// Per-category counts of `detections`, zero counts included.
    pub statistics: BTreeMap<Category, usize>,
    /// Validated and discovered spans, before overlap resolution.
    pub detections: DetectionSet,
    pub explanation: String,
    /// The resolved plan in position order.
    pub redactions: Vec<AppliedRedaction>,
    /// Name of the judge that handled the request.
    pub oracle: String,
}

impl RedactionOutcome {
    pub fn applied_count(&self) -> usize {
        self.redactions.iter().filter(|r| r.applied).count()
    }
}
