//! Boundary between the engine and a judge.
//!
//! Maps judge failures into the core error taxonomy and applies the
//! fail-safe defaults: an unreadable verdict keeps the candidate, an
//! unreadable discovery adds nothing, an unreadable explanation is
//! replaced by a local summary.

use tracing::{debug, warn};

use redline_core::text::{context_window, CharOffsets};
use redline_core::{
    Category, Confidence, DetectionSet, Error, Provenance, RedactionConfig, Result, Span,
};
use redline_oracle::{local_summary, Oracle, OracleError, RawDiscovery, Verdict};

/// Characters of context sent on each side of a candidate.
pub const CONTEXT_RADIUS: usize = 100;

/// Convert a fatal judge error. `Malformed` never reaches here in practice.
pub fn oracle_error(err: OracleError) -> Error {
    match err {
        OracleError::RateLimited(msg) => Error::OracleRateLimited(msg),
        OracleError::Unavailable(msg) => Error::OracleUnavailable(msg),
        OracleError::Malformed(msg) => Error::Internal(format!("unhandled judge answer: {}", msg)),
    }
}

/// Request-scoped view of a judge over one document.
pub struct OracleAdapter<'a> {
    oracle: &'a dyn Oracle,
    document: &'a str,
    offsets: CharOffsets,
}

impl<'a> OracleAdapter<'a> {
    pub fn new(oracle: &'a dyn Oracle, document: &'a str) -> Self {
        Self {
            oracle,
            document,
            offsets: CharOffsets::new(document),
        }
    }

    pub fn document(&self) -> &'a str {
        self.document
    }

    /// Character boundaries of the document, shared with the caller.
    pub fn offsets(&self) -> &CharOffsets {
        &self.offsets
    }

    /// Ask whether `candidate` at `[start, end)` is sensitive.
    pub async fn validate(
        &self,
        candidate: &str,
        category: Category,
        start: usize,
        end: usize,
    ) -> Result<Verdict> {
        let context = context_window(self.document, start, end, CONTEXT_RADIUS);
        match self
            .oracle
            .validate(self.document, candidate, category, context)
            .await
        {
            Ok(verdict) => Ok(verdict),
            Err(OracleError::Malformed(msg)) => {
                warn!("Unreadable verdict for {} candidate, keeping it: {}", category, msg);
                Ok(Verdict {
                    is_pii: true,
                    reasoning: format!("Judge answer unreadable; kept as PII ({})", msg),
                })
            }
            Err(e) => Err(oracle_error(e)),
        }
    }

    /// Spans the judge proposes beyond `current`, already located,
    /// mapped to a category and gated by `config`.
    pub async fn discover(
        &self,
        current: &DetectionSet,
        config: &RedactionConfig,
    ) -> Result<Vec<Span>> {
        let raw = match self.oracle.discover(self.document, current).await {
            Ok(raw) => raw,
            Err(OracleError::Malformed(msg)) => {
                warn!("Unreadable discovery answer, ignoring it: {}", msg);
                return Ok(Vec::new());
            }
            Err(e) => return Err(oracle_error(e)),
        };

        let proposed = raw.len();
        let spans: Vec<Span> = raw
            .into_iter()
            .filter_map(|d| self.to_span(d))
            .filter(|s| config.is_enabled(s.category))
            .collect();
        debug!("Discovery: {} proposed, {} usable", proposed, spans.len());
        Ok(spans)
    }

    /// Summary of the final detections.
    pub async fn explain(&self, detections: &DetectionSet) -> Result<String> {
        match self.oracle.explain(self.document, detections).await {
            Ok(text) if !text.trim().is_empty() => Ok(text.trim().to_string()),
            Ok(_) => Ok(local_summary(detections)),
            Err(OracleError::Malformed(msg)) => {
                warn!("Unreadable explanation, using local summary: {}", msg);
                Ok(local_summary(detections))
            }
            Err(e) => Err(oracle_error(e)),
        }
    }

    fn to_span(&self, raw: RawDiscovery) -> Option<Span> {
        let (start, end) = locate(self.document, &self.offsets, &raw)?;
        let category = match Category::from_wire(&raw.category) {
            Category::Other => Category::Name,
            c => c,
        };
        Some(Span {
            category,
            value: self.document[start..end].to_string(),
            start,
            end,
            confidence: raw
                .confidence
                .as_deref()
                .map(Confidence::from_wire)
                .unwrap_or_default(),
            provenance: Provenance::OracleDiscovered,
            reasoning: raw.reasoning.filter(|r| !r.is_empty()),
            override_rule: None,
        })
    }
}

/// Byte offsets for a discovered value.
///
/// The judge reports character offsets. They are used only when the text
/// they cover, trimmed, is exactly the trimmed value; otherwise the first
/// literal occurrence is used. `None` when the value is empty or absent.
pub fn locate(document: &str, offsets: &CharOffsets, raw: &RawDiscovery) -> Option<(usize, usize)> {
    let value = raw.value.trim();
    if value.is_empty() {
        return None;
    }
    let reported = match (raw.start, raw.end) {
        (Some(s), Some(e)) => usize::try_from(s).ok().zip(usize::try_from(e).ok()),
        _ => None,
    }
    .and_then(|(s, e)| Some((offsets.to_byte(s)?, offsets.to_byte(e)?)));

    if let Some((start, end)) = reported {
        if let Some(slice) = document.get(start..end) {
            if slice.trim() == value {
                let start = start + (slice.len() - slice.trim_start().len());
                return Some((start, start + value.len()));
            }
        }
    }
    document.find(value).map(|pos| (pos, pos + value.len()))
}
