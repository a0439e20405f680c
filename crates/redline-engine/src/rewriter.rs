//! Applies a labelled plan to the document text.

use tracing::warn;

use redline_core::text::is_valid_range;

use crate::types::{AppliedRedaction, PlannedRedaction};

/// Splice labels into `text`, last span first.
///
/// Each span is re-checked against the working copy right before the
/// splice: the slice must equal or contain the span's value, otherwise the
/// span is skipped and the text under it is left as is. Spans must not
/// overlap. The report is returned in position order.
pub fn rewrite(text: &str, plan: &[PlannedRedaction]) -> (String, Vec<AppliedRedaction>) {
    let mut order: Vec<&PlannedRedaction> = plan.iter().collect();
    order.sort_by_key(|p| std::cmp::Reverse(p.span.start));

    let mut result = text.to_string();
    let mut report = Vec::with_capacity(plan.len());

    for planned in order {
        let span = &planned.span;
        let applied = is_valid_range(&result, span.start, span.end)
            && result[span.start..span.end].contains(span.value.as_str());

        if applied {
            result.replace_range(span.start..span.end, &planned.label);
        } else {
            warn!(
                "Skipping {} span at {}..{}: text no longer matches",
                span.category, span.start, span.end
            );
        }

        report.push(AppliedRedaction {
            category: span.category,
            start: span.start,
            end: span.end,
            label: planned.label.clone(),
            applied,
        });
    }

    report.reverse();
    (result, report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use redline_core::{Category, Confidence, Span};

    fn plan(text: &str, items: &[(Category, &str, &str)]) -> Vec<PlannedRedaction> {
        items
            .iter()
            .map(|(category, needle, label)| {
                let start = text.find(needle).unwrap();
                PlannedRedaction {
                    span: Span::detected(*category, text, start, start + needle.len(), Confidence::High),
                    label: label.to_string(),
                }
            })
            .collect()
    }

    #[test]
    fn test_rewrite_keeps_other_text() {
        let text = "Mail jane@example.com or call 555-123-4567 today.";
        let planned = plan(
            text,
            &[
                (Category::Email, "jane@example.com", "[EMAIL_1]"),
                (Category::Phone, "555-123-4567", "[PHONE_1]"),
            ],
        );
        let (redacted, report) = rewrite(text, &planned);
        assert_eq!(redacted, "Mail [EMAIL_1] or call [PHONE_1] today.");
        assert!(report.iter().all(|r| r.applied));
        assert_eq!(report[0].category, Category::Email);

        let removed: usize = planned.iter().map(|p| p.span.len()).sum();
        let added: usize = planned.iter().map(|p| p.label.len()).sum();
        assert_eq!(redacted.len(), text.len() - removed + added);
    }

    #[test]
    fn test_stale_span_is_skipped() {
        let text = "Call Bob at 555-123-4567.";
        let mut planned = plan(text, &[(Category::Phone, "555-123-4567", "[PHONE_1]")]);
        planned.push(PlannedRedaction {
            span: Span {
                value: "Alice".into(),
                ..Span::detected(Category::Name, text, 5, 8, Confidence::Medium)
            },
            label: "[NAME_1]".into(),
        });
        let (redacted, report) = rewrite(text, &planned);
        assert_eq!(redacted, "Call Bob at [PHONE_1].");
        assert_eq!(report.len(), 2);
        assert!(!report[0].applied);
        assert!(report[1].applied);
    }

    #[test]
    fn test_slice_containing_value_is_applied() {
        let text = "Account: jdoe99!";
        let planned = vec![PlannedRedaction {
            span: Span {
                value: "jdoe99".into(),
                ..Span::detected(Category::Name, text, 9, 16, Confidence::Low)
            },
            label: "[NAME_1]".into(),
        }];
        let (redacted, _) = rewrite(text, &planned);
        assert_eq!(redacted, "Account: [NAME_1]");
    }

    #[test]
    fn test_out_of_range_and_multibyte() {
        let text = "Zoë: zoe@example.com";
        let mut planned = plan(text, &[(Category::Email, "zoe@example.com", "████████")]);
        planned.push(PlannedRedaction {
            span: Span {
                end: 500,
                ..planned[0].span.clone()
            },
            label: "x".into(),
        });
        let (redacted, report) = rewrite(text, &planned[..1]);
        assert_eq!(redacted, "Zoë: ████████");
        assert!(report[0].applied);

        let (untouched, report) = rewrite(text, &planned[1..]);
        assert_eq!(untouched, text);
        assert!(!report[0].applied);
    }
}
