//! Person-name recognition.
//!
//! The `PersonRecognizer` trait abstracts over named-entity recognition.
//! Implementations:
//! - `HeuristicRecognizer`: capitalised-token heuristics, no model needed
//! - anything else the caller injects into `Detector::new`

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

use redline_core::text::char_gap;
use redline_core::{Category, Confidence, Span};

use crate::merge::FRAGMENT_GAP;

/// Trait for person-entity recognizers.
pub trait PersonRecognizer: Send + Sync {
    /// Byte ranges of person entities in `text`.
    fn person_entities(&self, text: &str) -> Vec<(usize, usize)>;

    /// Human-readable name for logs.
    fn name(&self) -> &str;
}

static NAME_TOKEN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b\p{Lu}(?:\p{Ll}+|'\p{Lu}\p{Ll}+)(?:-\p{Lu}\p{Ll}+)?\b").unwrap()
});

static HONORIFICS: &[&str] = &["Mr", "Mrs", "Ms", "Dr", "Prof"];

// Capitalised words that are almost never part of a person's name.
static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        // Honorifics and company suffixes
        "Mr", "Mrs", "Ms", "Dr", "Prof", "Inc", "Corp", "Ltd", "Co",
        // Weekdays and months
        "Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday", "Sunday",
        "January", "February", "March", "April", "May", "June", "July", "August",
        "September", "October", "November", "December",
        // Street suffixes
        "Street", "St", "Avenue", "Ave", "Road", "Rd", "Boulevard", "Blvd", "Lane", "Ln",
        "Drive", "Court", "Ct", "Place", "Pl", "Suite", "Apt",
        // Function words and form labels
        "The", "This", "That", "These", "Those", "And", "But", "Or", "If", "When", "Where",
        "What", "Who", "Why", "How", "Please", "Dear", "Hi", "Hello", "Hey", "Thanks", "Thank",
        "Regards", "Sincerely", "Best", "Contact", "Call", "Email", "Phone", "Address", "Name",
        "Username", "Account", "Login", "User", "Card", "Number", "Note", "Reset",
        // Common sentence openers
        "Then", "Later", "Yesterday", "Today", "Tomorrow", "Also", "After", "Before", "Since",
        "Yes", "No", "We", "They", "He", "She", "It", "My", "Our", "Your", "His", "Her",
        "Their", "To", "For", "From", "In", "On", "At", "With", "Ask", "Send", "Tell", "Meet",
    ]
    .into_iter()
    .collect()
});

/// Recognizer that treats capitalised tokens as name fragments.
///
/// A sentence-initial token only counts when another name token follows
/// it, so "John Smith called." keeps "John" while "Yours truly." drops
/// "Yours". Each token is reported separately; the merger joins them.
#[derive(Debug, Default, Clone)]
pub struct HeuristicRecognizer;

impl HeuristicRecognizer {
    pub fn new() -> Self {
        Self
    }

    /// Token at `start` opens a sentence, unless the previous word is an honorific.
    fn is_sentence_start(text: &str, start: usize) -> bool {
        let before = text[..start].trim_end();
        let Some(last) = before.chars().last() else {
            return true;
        };
        if !matches!(last, '.' | '!' | '?') {
            return false;
        }
        let prev_word = before[..before.len() - last.len_utf8()]
            .rsplit(|c: char| !c.is_alphanumeric())
            .next()
            .unwrap_or("");
        !HONORIFICS.contains(&prev_word)
    }

    /// Whitespace alone, within the fragment gap, separates `end` from the
    /// next name token.
    fn opens_full_name(text: &str, end: usize, next: Option<&(usize, usize)>) -> bool {
        next.is_some_and(|&(next_start, _)| {
            text[end..next_start].chars().all(char::is_whitespace)
                && char_gap(text, end, next_start) <= FRAGMENT_GAP
        })
    }
}

impl PersonRecognizer for HeuristicRecognizer {
    fn person_entities(&self, text: &str) -> Vec<(usize, usize)> {
        let tokens: Vec<(usize, usize)> = NAME_TOKEN_RE
            .find_iter(text)
            .filter(|m| !STOP_WORDS.contains(m.as_str()))
            .map(|m| (m.start(), m.end()))
            .collect();

        tokens
            .iter()
            .enumerate()
            .filter(|&(i, &(start, end))| {
                !Self::is_sentence_start(text, start)
                    || Self::opens_full_name(text, end, tokens.get(i + 1))
            })
            .map(|(_, token)| *token)
            .collect()
    }

    fn name(&self) -> &str {
        "heuristic"
    }
}

/// Name producer: recognizer output trimmed, filtered and de-duplicated.
pub fn detect_names(recognizer: &dyn PersonRecognizer, text: &str) -> Vec<Span> {
    let mut seen = HashSet::new();
    let mut spans = Vec::new();

    for (start, end) in recognizer.person_entities(text) {
        if !redline_core::text::is_valid_range(text, start, end) {
            continue;
        }
        let raw = &text[start..end];
        let trimmed = raw.trim();
        // Skip very short names (probably false positives)
        if trimmed.chars().count() < 2 {
            continue;
        }
        let lead = raw.len() - raw.trim_start().len();
        let start = start + lead;
        let end = start + trimmed.len();
        if !seen.insert((start, end)) {
            continue;
        }
        spans.push(Span::detected(Category::Name, text, start, end, Confidence::Medium));
    }

    spans
}
