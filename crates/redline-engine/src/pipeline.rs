//! The redaction pipeline.

use std::sync::Arc;

use sha2::{Digest, Sha256};
use tracing::{debug, info};

use redline_core::text::{is_valid_range, CharOffsets};
use redline_core::{DetectionSet, RedactionConfig, Result};
use redline_detect::Detector;
use redline_oracle::Oracle;

use crate::adapter::OracleAdapter;
use crate::labels::assign_labels;
use crate::resolver::resolve;
use crate::rewriter::rewrite;
use crate::types::{AppliedRedaction, RedactionOutcome};
use crate::validation::validate_all;

/// Short, stable document identifier for logs. Never log the text itself.
pub fn fingerprint(text: &str) -> String {
    let digest = Sha256::digest(text.as_bytes());
    hex::encode(&digest[..6])
}

/// Detector plus judge, shared by every request.
///
/// Holds no per-document state, so one instance may serve many requests
/// at once.
pub struct Redactor {
    detector: Detector,
    oracle: Arc<dyn Oracle>,
}

impl Redactor {
    pub fn new(detector: Detector, oracle: Arc<dyn Oracle>) -> Self {
        info!(
            recognizer = detector.recognizer_name(),
            oracle = oracle.name(),
            "Redactor ready"
        );
        Self { detector, oracle }
    }

    pub fn oracle_name(&self) -> &str {
        self.oracle.name()
    }

    /// Redact `text` according to `config`.
    ///
    /// Fails before any detection on invalid settings. A fatal judge error
    /// at any step aborts the request with no partial output. Offsets in
    /// the outcome count characters of `text`.
    pub async fn redact(&self, text: &str, config: &RedactionConfig) -> Result<RedactionOutcome> {
        config.validate()?;

        let doc = fingerprint(text);
        info!(doc = %doc, bytes = text.len(), oracle = self.oracle.name(), "Redaction started");

        let candidates = self.detector.detect(text, config);
        debug!(doc = %doc, "{} candidates from producers", candidates.total());

        let adapter = OracleAdapter::new(self.oracle.as_ref(), text);
        let mut detections = validate_all(&adapter, candidates).await?;

        for span in adapter.discover(&detections, config).await? {
            if !detections.contains_range(span.category, span.start, span.end) {
                detections.push(span);
            }
        }
        detections.retain_categories(|c| config.is_enabled(c));
        let statistics = detections.counts();

        let plan = resolve(
            detections
                .all_spans()
                .filter(|s| is_valid_range(text, s.start, s.end))
                .cloned()
                .collect(),
        );
        let labelled = assign_labels(plan, config);
        let (redacted, redactions) = rewrite(text, &labelled);

        let explanation = adapter.explain(&detections).await?;

        let offsets = adapter.offsets();
        let outcome = RedactionOutcome {
            original: text.to_string(),
            redacted,
            statistics,
            detections: in_characters(detections, offsets),
            explanation,
            redactions: redactions
                .into_iter()
                .map(|r| AppliedRedaction {
                    start: offsets.to_char(r.start).unwrap_or(r.start),
                    end: offsets.to_char(r.end).unwrap_or(r.end),
                    ..r
                })
                .collect(),
            oracle: self.oracle.name().to_string(),
        };

        info!(
            doc = %doc,
            detections = outcome.detections.total(),
            planned = outcome.redactions.len(),
            applied = outcome.applied_count(),
            "Redaction finished"
        );
        Ok(outcome)
    }
}

fn in_characters(detections: DetectionSet, offsets: &CharOffsets) -> DetectionSet {
    detections.map_spans(|s| s.to_char_offsets(offsets))
}
