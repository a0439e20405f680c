//! Replacement labels for resolved spans.

use std::collections::BTreeMap;

use redline_core::{Category, LabelStyle, RedactionConfig, Span};

use crate::types::PlannedRedaction;

/// Fixed-width opaque replacement.
pub const BLOCK_LABEL: &str = "████████";

const FALLBACK_CUSTOM_LABEL: &str = "[REDACTED]";

/// Attach a label to every span of a resolved plan.
///
/// Indexed labels count from 1 per category in ascending start order,
/// whatever order the spans arrive in. The returned plan is in position
/// order.
pub fn assign_labels(plan: Vec<Span>, config: &RedactionConfig) -> Vec<PlannedRedaction> {
    let mut ordered = plan;
    ordered.sort_by_key(|s| s.start);

    let mut counters: BTreeMap<Category, usize> = BTreeMap::new();
    ordered
        .into_iter()
        .map(|span| {
            let label = match config.label_style {
                LabelStyle::Blocks => BLOCK_LABEL.to_string(),
                LabelStyle::Custom => config
                    .custom_label
                    .clone()
                    .unwrap_or_else(|| FALLBACK_CUSTOM_LABEL.to_string()),
                LabelStyle::Indexed => {
                    let n = counters.entry(span.category).or_default();
                    *n += 1;
                    format!("[{}_{}]", span.category.label(), n)
                }
            };
            PlannedRedaction { span, label }
        })
        .collect()
}
