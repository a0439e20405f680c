//! Regex span producers, one per category.
//!
//! Each producer scans the whole text and reports spans for its own
//! category only. Producers share nothing but the compiled patterns.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

use redline_core::{Category, Confidence, Span};

// Compiled regex patterns (compiled once, reused).
static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").unwrap());

static PHONE_RES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        // National
        r"\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}",
        // International
        r"\+\d{1,3}[-.\s]?\(?\d{1,4}\)?[-.\s]?\d{1,4}[-.\s]?\d{1,9}",
        r"\d{3}-\d{3}-\d{4}",
        r"\(\d{3}\)\s?\d{3}-\d{4}",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static SSN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d{3}-\d{2}-\d{4}\b|\b\d{3}\s\d{2}\s\d{4}\b").unwrap());

static CARD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:\d{4}[-\s]?){3}\d{4}\b").unwrap());

static ADDRESS_RES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        // With postal code
        r"(?i)\d+\s+[A-Za-z0-9\s]+(?:Street|St|Avenue|Ave|Road|Rd|Boulevard|Blvd|Lane|Ln|Drive|Dr|Court|Ct|Place|Pl)[\s,]+[A-Za-z\s]+,\s*[A-Z]{2}\s+\d{5}(?:-\d{4})?",
        // Without
        r"(?i)\d+\s+[A-Za-z0-9\s]+(?:Street|St|Avenue|Ave|Road|Rd|Boulevard|Blvd|Lane|Ln|Drive|Dr|Court|Ct|Place|Pl)[\s,]+[A-Za-z\s]+,\s*[A-Z]{2}",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static USERNAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:username|user|login|account)\s*(?:is|:)\s+([a-z0-9_]{3,20})\b").unwrap()
});

/// Minimum digits for a phone candidate.
const PHONE_MIN_DIGITS: usize = 10;
/// Exact digit count for a card candidate.
const CARD_DIGITS: usize = 16;
/// Characters inspected on each side of a username for an `@`.
const USERNAME_EMAIL_RADIUS: usize = 10;

fn digit_count(s: &str) -> usize {
    s.chars().filter(|c| c.is_ascii_digit()).count()
}

/// Run several patterns and drop matches at an already-seen `(start, end)`.
fn collect_unique<'a>(
    text: &str,
    patterns: impl IntoIterator<Item = &'a Regex>,
    category: Category,
    keep: impl Fn(&str) -> bool,
) -> Vec<Span> {
    let mut seen = HashSet::new();
    let mut spans = Vec::new();
    for re in patterns {
        for m in re.find_iter(text) {
            if !seen.insert((m.start(), m.end())) {
                continue;
            }
            if keep(m.as_str()) {
                spans.push(Span::detected(category, text, m.start(), m.end(), Confidence::High));
            }
        }
    }
    spans
}

pub fn detect_emails(text: &str) -> Vec<Span> {
    collect_unique(text, [&*EMAIL_RE], Category::Email, |_| true)
}

pub fn detect_phones(text: &str) -> Vec<Span> {
    collect_unique(text, PHONE_RES.iter(), Category::Phone, |m| {
        digit_count(m) >= PHONE_MIN_DIGITS
    })
}

pub fn detect_id_numbers(text: &str) -> Vec<Span> {
    collect_unique(text, [&*SSN_RE], Category::IdNumber, |_| true)
}

pub fn detect_card_numbers(text: &str) -> Vec<Span> {
    collect_unique(text, [&*CARD_RE], Category::CardNumber, |m| {
        digit_count(m) == CARD_DIGITS
    })
}

pub fn detect_addresses(text: &str) -> Vec<Span> {
    collect_unique(text, ADDRESS_RES.iter(), Category::Address, |_| true)
}

/// Account identifiers introduced by a phrase like "username is".
///
/// Only the identifier is reported. Candidates with an `@` nearby are
/// treated as part of an email address and skipped.
pub fn detect_usernames(text: &str) -> Vec<Span> {
    let mut seen = HashSet::new();
    let mut spans = Vec::new();
    for cap in USERNAME_RE.captures_iter(text) {
        let Some(m) = cap.get(1) else { continue };
        if !seen.insert((m.start(), m.end())) {
            continue;
        }
        let nearby = redline_core::text::context_window(
            text,
            m.start(),
            m.end(),
            USERNAME_EMAIL_RADIUS,
        );
        if nearby.contains('@') {
            continue;
        }
        spans.push(Span::detected(Category::Name, text, m.start(), m.end(), Confidence::High));
    }
    spans
}
