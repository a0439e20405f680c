//! Cross-category overlap resolution.

use std::cmp::Reverse;

use redline_core::Span;

/// Keep a maximal non-overlapping subset, preferring longer spans.
///
/// Spans are visited by length descending, then start ascending (stable
/// for exact ties), and a span is kept only if it overlaps nothing kept
/// before it. The result is in position order.
pub fn resolve(spans: Vec<Span>) -> Vec<Span> {
    let mut ordered = spans;
    ordered.sort_by_key(|s| (Reverse(s.len()), s.start));

    let mut kept: Vec<Span> = ordered.into_iter().fold(Vec::new(), |mut kept, span| {
        if !span.is_empty() && !kept.iter().any(|k: &Span| k.overlaps(&span)) {
            kept.push(span);
        }
        kept
    });
    kept.sort_by_key(|s| s.start);
    kept
}
