//! Candidate span detection.
//!
//! Regex producers cover structured categories (email, phone, SSN, card,
//! address, account names). Person names come from an injected
//! `PersonRecognizer`, and name fragments plus usernames are merged into
//! one pool for the name category.

pub mod merge;
pub mod names;
pub mod patterns;

pub use merge::{group_adjacent, join_group, merge_fragments, pool_usernames, FRAGMENT_GAP};
pub use names::{HeuristicRecognizer, PersonRecognizer};

use std::sync::Arc;

use redline_core::{Category, DetectionSet, RedactionConfig, Span};
use tracing::debug;

/// Runs every enabled producer over a document.
///
/// Holds no per-document state; one instance serves concurrent requests.
pub struct Detector {
    recognizer: Arc<dyn PersonRecognizer>,
}

impl Detector {
    pub fn new(recognizer: Arc<dyn PersonRecognizer>) -> Self {
        Self { recognizer }
    }

    /// Detector backed by the built-in heuristic name recognizer.
    pub fn with_heuristics() -> Self {
        Self::new(Arc::new(HeuristicRecognizer::new()))
    }

    pub fn recognizer_name(&self) -> &str {
        self.recognizer.name()
    }

    /// Candidate spans for every enabled category. Disabled producers
    /// are not invoked.
    pub fn detect(&self, text: &str, config: &RedactionConfig) -> DetectionSet {
        let mut set = DetectionSet::new();
        for category in config.enabled_categories() {
            let spans = self.produce(category, text);
            debug!("{} producer: {} candidates", category, spans.len());
            set.set(category, spans);
        }
        set
    }

    fn produce(&self, category: Category, text: &str) -> Vec<Span> {
        match category {
            Category::Email => patterns::detect_emails(text),
            Category::Phone => patterns::detect_phones(text),
            Category::IdNumber => patterns::detect_id_numbers(text),
            Category::CardNumber => patterns::detect_card_numbers(text),
            Category::Address => patterns::detect_addresses(text),
            Category::Name => {
                let names = names::detect_names(self.recognizer.as_ref(), text);
                let merged = merge::merge_fragments(text, &names);
                pool_usernames(merged, patterns::detect_usernames(text))
            }
            Category::Other => Vec::new(),
        }
    }
}

impl Default for Detector {
    fn default() -> Self {
        Self::with_heuristics()
    }
}
