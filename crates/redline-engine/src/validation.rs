//! Candidate validation policy.
//!
//! Non-name candidates are judged one by one. Name candidates are judged
//! as clusters of nearby fragments, and a rejection does not always drop
//! them: a multi-fragment cluster survives on its full-name context, and
//! a lone fragment next to an accepted name survives on the neighbour
//! rule.

use futures::future::try_join_all;
use futures::stream::{self, StreamExt, TryStreamExt};
use tracing::debug;

use redline_core::text::is_valid_range;
use redline_core::{Category, DetectionSet, OverrideRule, Result, Span};
use redline_detect::{group_adjacent, join_group, FRAGMENT_GAP};
use redline_oracle::Verdict;

use crate::adapter::OracleAdapter;

/// Distance, in characters, under which a rejected fragment counts as
/// part of an accepted name.
pub const NEIGHBOR_DISTANCE: usize = 5;

/// Judge calls in flight per category.
pub const MAX_IN_FLIGHT: usize = 4;

/// Validate every candidate. Categories are judged concurrently, with at
/// most `MAX_IN_FLIGHT` calls each; output order follows input order,
/// never completion order.
pub async fn validate_all(adapter: &OracleAdapter<'_>, candidates: DetectionSet) -> Result<DetectionSet> {
    let jobs = candidates
        .iter()
        .map(|(category, spans)| validate_category(adapter, category, spans.to_vec()));
    let validated = try_join_all(jobs).await?;

    let mut set = DetectionSet::new();
    for (category, spans) in validated {
        set.set(category, spans);
    }
    Ok(set)
}

async fn validate_category(
    adapter: &OracleAdapter<'_>,
    category: Category,
    spans: Vec<Span>,
) -> Result<(Category, Vec<Span>)> {
    let before = spans.len();
    let kept = if category == Category::Name {
        validate_names(adapter, spans).await?
    } else {
        validate_individually(adapter, spans).await?
    };
    debug!("{} validation: kept {} of {}", category, kept.len(), before);
    Ok((category, kept))
}

async fn judge(adapter: &OracleAdapter<'_>, span: Span) -> Result<(Span, Verdict)> {
    let verdict = adapter
        .validate(&span.value, span.category, span.start, span.end)
        .await?;
    Ok((span, verdict))
}

async fn validate_individually(adapter: &OracleAdapter<'_>, spans: Vec<Span>) -> Result<Vec<Span>> {
    let judged: Vec<(Span, Verdict)> = stream::iter(spans)
        .map(|s| judge(adapter, s))
        .buffered(MAX_IN_FLIGHT)
        .try_collect()
        .await?;
    Ok(judged
        .into_iter()
        .filter(|(_, v)| v.is_pii)
        .map(|(span, v)| Span {
            reasoning: Some(v.reasoning),
            ..span
        })
        .collect())
}

async fn validate_names(adapter: &OracleAdapter<'_>, spans: Vec<Span>) -> Result<Vec<Span>> {
    // Usernames may have joined the pool after the first merge, so cluster again.
    let document = adapter.document();
    let clusters: Vec<(Span, usize)> = group_adjacent(document, &spans, FRAGMENT_GAP)
        .iter()
        .filter_map(|group| join_group(group).map(|span| (span, group.len())))
        .map(|(span, size)| (with_document_value(span, document), size))
        .collect();

    let judged: Vec<(Span, usize, Verdict)> = stream::iter(clusters)
        .map(|(span, size)| async move { judge(adapter, span).await.map(|(s, v)| (s, size, v)) })
        .buffered(MAX_IN_FLIGHT)
        .try_collect()
        .await?;

    Ok(apply_name_policy(document, judged))
}

/// Re-read a cluster's value from the document, so the judge and the
/// rewriter see the literal text between its first and last fragment.
fn with_document_value(span: Span, document: &str) -> Span {
    if !is_valid_range(document, span.start, span.end) {
        return span;
    }
    Span {
        value: document[span.start..span.end].to_string(),
        ..span
    }
}

/// Decide which judged name clusters survive.
///
/// Input is `(cluster, fragment count, verdict)` in position order;
/// distances are measured in characters of `document`.
pub fn apply_name_policy(document: &str, judged: Vec<(Span, usize, Verdict)>) -> Vec<Span> {
    judged
        .into_iter()
        .fold(Vec::new(), |mut kept: Vec<Span>, (span, size, verdict)| {
            let rule = if verdict.is_pii {
                None
            } else if size > 1 {
                Some(OverrideRule::FullNameContext)
            } else if kept.iter().any(|k| span.is_near(k, NEIGHBOR_DISTANCE, document)) {
                Some(OverrideRule::NeighborRule)
            } else {
                return kept;
            };

            let reasoning = match rule {
                Some(r) => format!("{}: {}", r.reasoning_prefix(), verdict.reasoning),
                None => verdict.reasoning,
            };
            kept.push(Span {
                reasoning: Some(reasoning),
                override_rule: rule,
                ..span
            });
            kept
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use redline_core::Confidence;

    const TEXT: &str = "Dear Ann Lee, Bo wrote to Kim yesterday.";

    fn name(needle: &str) -> Span {
        let start = TEXT.find(needle).unwrap();
        Span::detected(Category::Name, TEXT, start, start + needle.len(), Confidence::Medium)
    }

    fn verdict(is_pii: bool) -> Verdict {
        Verdict {
            is_pii,
            reasoning: "because".into(),
        }
    }

    #[test]
    fn test_cluster_value_is_document_text() {
        let joined = Span {
            value: "Ann Lee Bo".into(),
            ..Span::detected(Category::Name, TEXT, 5, 16, Confidence::Medium)
        };
        assert_eq!(with_document_value(joined, TEXT).value, "Ann Lee, Bo");
    }

    #[test]
    fn test_rejected_full_name_is_kept() {
        let kept = apply_name_policy(TEXT, vec![(name("Ann Lee"), 2, verdict(false))]);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].override_rule, Some(OverrideRule::FullNameContext));
        assert_eq!(kept[0].reasoning.as_deref(), Some("Full name context: because"));
    }

    #[test]
    fn test_rejected_neighbor_is_kept() {
        // "Bo" starts 2 characters after "Ann Lee" ends.
        let kept = apply_name_policy(TEXT, vec![
            (name("Ann Lee"), 2, verdict(true)),
            (name("Bo"), 1, verdict(false)),
        ]);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].override_rule, None);
        assert_eq!(kept[0].reasoning.as_deref(), Some("because"));
        assert_eq!(kept[1].override_rule, Some(OverrideRule::NeighborRule));
        assert!(kept[1].reasoning.as_deref().unwrap().starts_with("Part of full name context"));
    }

    #[test]
    fn test_rejected_lone_fragment_is_dropped() {
        let kept = apply_name_policy(TEXT, vec![
            (name("Ann Lee"), 2, verdict(true)),
            (name("Kim"), 1, verdict(false)),
        ]);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].value, "Ann Lee");
    }

    #[test]
    fn test_neighbor_distance_counts_characters() {
        let judge_pair = |text: &str| {
            let at = |needle: &str| {
                let start = text.find(needle).unwrap();
                Span::detected(Category::Name, text, start, start + needle.len(), Confidence::Medium)
            };
            apply_name_policy(
                text,
                vec![(at("Ann Lee"), 2, verdict(true)), (at("Bo"), 1, verdict(false))],
            )
        };

        // Six characters apart.
        assert_eq!(judge_pair("Ann Lee éééé Bo").len(), 1);
        // Five characters, eight bytes, apart.
        let kept = judge_pair("Ann Lee ééé Bo");
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[1].override_rule, Some(OverrideRule::NeighborRule));
    }

    #[test]
    fn test_neighbor_needs_an_earlier_kept_name() {
        let kept = apply_name_policy(TEXT, vec![
            (name("Bo"), 1, verdict(false)),
            (name("Ann Lee"), 2, verdict(true)),
        ]);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].value, "Ann Lee");
    }
}
