//! Candidate spans and the per-category detection set.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::text::{char_gap, CharOffsets};

/// Kinds of sensitive data a span can belong to.
///
/// Ordering is the fixed category order used wherever output must be
/// deterministic (statistics, detection maps, resolver tie-breaks).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Email,
    Phone,
    Name,
    Address,
    IdNumber,
    CardNumber,
    Other,
}

impl Category {
    /// Categories that have a producer and a `redact_*` toggle.
    pub const CONFIGURABLE: [Category; 6] = [
        Category::Email,
        Category::Phone,
        Category::Name,
        Category::Address,
        Category::IdNumber,
        Category::CardNumber,
    ];

    /// Display name used inside indexed labels (`[SSN_1]`).
    pub fn label(&self) -> &'static str {
        match self {
            Category::Email => "EMAIL",
            Category::Phone => "PHONE",
            Category::Name => "NAME",
            Category::Address => "ADDRESS",
            Category::IdNumber => "SSN",
            Category::CardNumber => "CARD",
            Category::Other => "REDACTED",
        }
    }

    /// Parse the loose category names an external judge may return.
    ///
    /// Unknown names map to `Other`.
    pub fn from_wire(name: &str) -> Self {
        match name.trim().to_lowercase().replace(|c: char| c == '-' || c == ' ', "_").as_str() {
            "email" | "emails" => Category::Email,
            "phone" | "phones" | "phone_number" => Category::Phone,
            "name" | "names" | "person" | "username" | "account" => Category::Name,
            "address" | "addresses" => Category::Address,
            "ssn" | "id_number" | "id" => Category::IdNumber,
            "credit_card" | "credit_cards" | "card_number" | "card" => Category::CardNumber,
            _ => Category::Other,
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Email => write!(f, "email"),
            Self::Phone => write!(f, "phone"),
            Self::Name => write!(f, "name"),
            Self::Address => write!(f, "address"),
            Self::IdNumber => write!(f, "id-number"),
            Self::CardNumber => write!(f, "card-number"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// Where a span came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Provenance {
    PatternDetected,
    OracleDiscovered,
}

/// Coarse confidence bucket, matching what the judge reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    #[default]
    Medium,
    Low,
}

impl Confidence {
    pub fn from_wire(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "high" => Confidence::High,
            "low" => Confidence::Low,
            _ => Confidence::Medium,
        }
    }
}

/// Why a name span survived a rejection from the judge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverrideRule {
    /// A multi-fragment name group; the full name keeps the group.
    FullNameContext,
    /// A single fragment sitting next to an accepted name.
    NeighborRule,
}

impl OverrideRule {
    pub fn reasoning_prefix(&self) -> &'static str {
        match self {
            OverrideRule::FullNameContext => "Full name context",
            OverrideRule::NeighborRule => "Part of full name context",
        }
    }
}

/// A labelled range `[start, end)` of the original document.
///
/// Offsets are bytes while a document moves through the engine and are
/// converted to characters (`to_char_offsets`) when reported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub category: Category,
    /// Text at `[start, end)` when the span was produced.
    pub value: String,
    pub start: usize,
    pub end: usize,
    pub confidence: Confidence,
    pub provenance: Provenance,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
    #[serde(default, rename = "override", skip_serializing_if = "Option::is_none")]
    pub override_rule: Option<OverrideRule>,
}

impl Span {
    /// Build a pattern-detected span whose value is read from `text`.
    ///
    /// Callers pass offsets that came from a match against `text`.
    pub fn detected(
        category: Category,
        text: &str,
        start: usize,
        end: usize,
        confidence: Confidence,
    ) -> Self {
        Self {
            category,
            value: text[start..end].to_string(),
            start,
            end,
            confidence,
            provenance: Provenance::PatternDetected,
            reasoning: None,
            override_rule: None,
        }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True when the two ranges share at least one position.
    pub fn overlaps(&self, other: &Span) -> bool {
        !(self.end <= other.start || other.end <= self.start)
    }

    /// Signed distance in characters of `text` from the end of `self` to
    /// the start of `next`. Negative when they overlap.
    pub fn gap_to(&self, next: &Span, text: &str) -> isize {
        char_gap(text, self.end, next.start)
    }

    /// Either edge of `other` lies within `distance` characters of the
    /// opposite edge of `self`.
    pub fn is_near(&self, other: &Span, distance: usize, text: &str) -> bool {
        let d = distance as isize;
        other.gap_to(self, text).abs() <= d || self.gap_to(other, text).abs() <= d
    }

    /// Same span with byte offsets replaced by character offsets.
    pub fn to_char_offsets(self, offsets: &CharOffsets) -> Span {
        let start = offsets.to_char(self.start).unwrap_or(self.start);
        let end = offsets.to_char(self.end).unwrap_or(self.end);
        Span { start, end, ..self }
    }
}

/// Spans grouped by category. Within a category the order is discovery order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DetectionSet {
    spans: BTreeMap<Category, Vec<Span>>,
}

impl DetectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, span: Span) {
        self.spans.entry(span.category).or_default().push(span);
    }

    /// Replace all spans of one category.
    pub fn set(&mut self, category: Category, spans: Vec<Span>) {
        self.spans.insert(category, spans);
    }

    pub fn get(&self, category: Category) -> &[Span] {
        self.spans.get(&category).map(Vec::as_slice).unwrap_or(&[])
    }

    /// An identical `(start, end)` already exists in `category`.
    pub fn contains_range(&self, category: Category, start: usize, end: usize) -> bool {
        self.get(category)
            .iter()
            .any(|s| s.start == start && s.end == end)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, &[Span])> {
        self.spans.iter().map(|(c, s)| (*c, s.as_slice()))
    }

    /// All spans, flattened in category order.
    pub fn all_spans(&self) -> impl Iterator<Item = &Span> {
        self.spans.values().flatten()
    }

    /// Apply `f` to every span, keeping categories and order.
    pub fn map_spans(self, mut f: impl FnMut(Span) -> Span) -> DetectionSet {
        let spans = self
            .spans
            .into_iter()
            .map(|(c, spans)| (c, spans.into_iter().map(&mut f).collect()))
            .collect();
        DetectionSet { spans }
    }

    pub fn total(&self) -> usize {
        self.spans.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Count per configurable category, zero counts included.
    pub fn counts(&self) -> BTreeMap<Category, usize> {
        Category::CONFIGURABLE
            .iter()
            .map(|c| (*c, self.get(*c).len()))
            .collect()
    }

    /// Drop every category the predicate rejects.
    pub fn retain_categories(&mut self, mut keep: impl FnMut(Category) -> bool) {
        self.spans.retain(|c, _| keep(*c));
    }
}

impl FromIterator<Span> for DetectionSet {
    fn from_iter<I: IntoIterator<Item = Span>>(iter: I) -> Self {
        let mut set = DetectionSet::new();
        for span in iter {
            set.push(span);
        }
        set
    }
}
