//! Judge that never calls out.

use async_trait::async_trait;
use redline_core::{Category, DetectionSet};

use crate::summary::local_summary;
use crate::{Oracle, OracleError, RawDiscovery, Verdict};

/// Confirms every candidate and discovers nothing.
///
/// Used when no provider is configured; output then equals what the
/// producers found.
#[derive(Debug, Default, Clone)]
pub struct NullOracle;

impl NullOracle {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Oracle for NullOracle {
    async fn validate(
        &self,
        _document: &str,
        _candidate: &str,
        _category: Category,
        _context: &str,
    ) -> Result<Verdict, OracleError> {
        Ok(Verdict {
            is_pii: true,
            reasoning: "No judge configured; pattern match accepted".into(),
        })
    }

    async fn discover(
        &self,
        _document: &str,
        _current: &DetectionSet,
    ) -> Result<Vec<RawDiscovery>, OracleError> {
        Ok(Vec::new())
    }

    async fn explain(
        &self,
        _document: &str,
        detections: &DetectionSet,
    ) -> Result<String, OracleError> {
        Ok(local_summary(detections))
    }

    fn name(&self) -> &str {
        "null"
    }
}
