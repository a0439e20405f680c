//! Name fragment merging.
//!
//! Entity recognizers usually report "Emily" and "Johnson" separately.
//! Fragments that sit within a few characters of each other are grouped
//! and joined into one compound span.

use redline_core::{Category, Span};

/// Largest gap, in characters, between two fragments of one name.
pub const FRAGMENT_GAP: isize = 5;

/// Group spans of `text`, sorted by start, into runs whose consecutive
/// character gap is at most `max_gap`. The gap is measured from the
/// furthest end seen so far in the run, so grouping is transitive.
pub fn group_adjacent(text: &str, spans: &[Span], max_gap: isize) -> Vec<Vec<Span>> {
    let mut sorted = spans.to_vec();
    sorted.sort_by_key(|s| (s.start, s.end));

    sorted.into_iter().fold(Vec::new(), |mut groups: Vec<Vec<Span>>, span| {
        let joins = groups
            .last()
            .and_then(|group| group.iter().max_by_key(|s| s.end))
            .is_some_and(|tail| tail.gap_to(&span, text) <= max_gap);
        match groups.last_mut() {
            Some(group) if joins => group.push(span),
            _ => groups.push(vec![span]),
        }
        groups
    })
}

/// Collapse a group into one span: values joined by a single space,
/// from the first start to the furthest end.
///
/// Returns `None` for an empty group.
pub fn join_group(group: &[Span]) -> Option<Span> {
    let first = group.first()?;
    if group.len() == 1 {
        return Some(first.clone());
    }
    let value = group
        .iter()
        .map(|s| s.value.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    let end = group.iter().map(|s| s.end).max().unwrap_or(first.end);
    Some(Span {
        category: Category::Name,
        value,
        end,
        reasoning: None,
        override_rule: None,
        ..first.clone()
    })
}

/// Merge adjacent name fragments of `text` into compound spans.
pub fn merge_fragments(text: &str, spans: &[Span]) -> Vec<Span> {
    group_adjacent(text, spans, FRAGMENT_GAP)
        .iter()
        .filter_map(|g| join_group(g))
        .collect()
}

/// Add usernames to a merged name pool, skipping any that overlap a name.
pub fn pool_usernames(names: Vec<Span>, usernames: Vec<Span>) -> Vec<Span> {
    let accepted: Vec<Span> = usernames
        .into_iter()
        .filter(|u| !names.iter().any(|n| n.overlaps(u)))
        .collect();
    names.into_iter().chain(accepted).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use redline_core::Confidence;

    fn frag(text: &str, value: &str) -> Span {
        let start = text.find(value).unwrap();
        Span::detected(Category::Name, text, start, start + value.len(), Confidence::Medium)
    }

    #[test]
    fn test_first_last_merge() {
        let text = "Contact Emily Johnson at emily.j@example.com";
        let merged = merge_fragments(text, &[frag(text, "Johnson"), frag(text, "Emily")]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].value, "Emily Johnson");
        assert_eq!((merged[0].start, merged[0].end), (8, 21));
    }

    #[test]
    fn test_merge_is_transitive() {
        // gaps of 3 and 5; first and last are 13 apart.
        let text = "Anna   Maria     Lopez";
        let spans = [frag(text, "Anna"), frag(text, "Maria"), frag(text, "Lopez")];
        let merged = merge_fragments(text, &spans);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].value, "Anna Maria Lopez");
        assert_eq!(merged[0].end, 22);
    }

    #[test]
    fn test_distant_fragments_stay_apart() {
        let text = "Anna      Bob";
        let merged = merge_fragments(text, &[frag(text, "Anna"), frag(text, "Bob")]);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[1].value, "Bob");
    }

    #[test]
    fn test_gap_measured_in_characters() {
        // Five characters, eleven bytes, between the fragments.
        let text = "Léa ––– Roy";
        let merged = merge_fragments(text, &[frag(text, "Léa"), frag(text, "Roy")]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].end, text.len());
    }

    #[test]
    fn test_groups_sorted_and_empty() {
        assert!(group_adjacent("", &[], FRAGMENT_GAP).is_empty());
        let text = format!("Amy  Lee{}Zed", " ".repeat(32));
        let spans = [frag(&text, "Zed"), frag(&text, "Amy"), frag(&text, "Lee")];
        let groups = group_adjacent(&text, &spans, FRAGMENT_GAP);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].len(), 2);
        assert_eq!(groups[1][0].value, "Zed");
    }

    #[test]
    fn test_usernames_pooled_without_overlap() {
        let text = "Contact Emily Johnson, login name is ejohnson";
        let names = vec![frag(text, "Emily Johnson")];
        let usernames = vec![frag(text, "Johnson"), frag(text, "ejohnson")];
        let pool = pool_usernames(names, usernames);
        let values: Vec<&str> = pool.iter().map(|s| s.value.as_str()).collect();
        assert_eq!(values, vec!["Emily Johnson", "ejohnson"]);
    }
}
