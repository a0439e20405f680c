//! End-to-end redaction behaviour with scripted judges.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use redline_core::{
    Category, DetectionSet, Error, LabelStyle, OverrideRule, Provenance, RedactionConfig,
};
use redline_detect::Detector;
use redline_engine::{RedactionOutcome, Redactor};
use redline_oracle::{NullOracle, Oracle, OracleError, RawDiscovery, Verdict};

#[derive(Default)]
struct Scripted {
    reject: Vec<&'static str>,
    malformed: Vec<&'static str>,
    discoveries: Vec<RawDiscovery>,
    validate_error: Option<OracleError>,
    explain_error: Option<OracleError>,
    calls: AtomicUsize,
}

#[async_trait]
impl Oracle for Scripted {
    async fn validate(
        &self,
        _document: &str,
        candidate: &str,
        _category: Category,
        context: &str,
    ) -> Result<Verdict, OracleError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        assert!(context.contains(candidate));
        if let Some(err) = &self.validate_error {
            return Err(err.clone());
        }
        if self.malformed.iter().any(|m| *m == candidate) {
            return Err(OracleError::Malformed("not JSON".into()));
        }
        Ok(Verdict {
            is_pii: !self.reject.iter().any(|r| *r == candidate),
            reasoning: "scripted".into(),
        })
    }

    async fn discover(
        &self,
        _document: &str,
        _current: &DetectionSet,
    ) -> Result<Vec<RawDiscovery>, OracleError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.discoveries.clone())
    }

    async fn explain(&self, _document: &str, _detections: &DetectionSet) -> Result<String, OracleError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.explain_error {
            Some(err) => Err(err.clone()),
            None => Ok("scripted summary".into()),
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

fn discovery(category: &str, value: &str, offsets: Option<(i64, i64)>) -> RawDiscovery {
    RawDiscovery {
        category: category.into(),
        value: value.into(),
        start: offsets.map(|o| o.0),
        end: offsets.map(|o| o.1),
        confidence: Some("high".into()),
        reasoning: Some("looks personal".into()),
    }
}

fn null_redactor() -> Redactor {
    Redactor::new(Detector::default(), Arc::new(NullOracle::new()))
}

fn scripted(oracle: Scripted) -> (Redactor, Arc<Scripted>) {
    let oracle = Arc::new(oracle);
    (Redactor::new(Detector::default(), oracle.clone()), oracle)
}

/// Characters `[start, end)` of `text`.
fn chars(text: &str, start: usize, end: usize) -> String {
    text.chars().skip(start).take(end - start).collect()
}

/// Rebuild the redacted text from the original and the applied plan.
fn assert_verbatim_outside(outcome: &RedactionOutcome) {
    let total = outcome.original.chars().count();
    let mut expected = String::new();
    let mut cursor = 0;
    for r in outcome.redactions.iter().filter(|r| r.applied) {
        expected.push_str(&chars(&outcome.original, cursor, r.start));
        expected.push_str(&r.label);
        cursor = r.end;
    }
    expected.push_str(&chars(&outcome.original, cursor, total));
    assert_eq!(outcome.redacted, expected);
}

fn assert_length_accounting(outcome: &RedactionOutcome) {
    let applied = outcome.redactions.iter().filter(|r| r.applied);
    let removed: usize = applied.clone().map(|r| r.end - r.start).sum();
    let added: usize = applied.map(|r| r.label.chars().count()).sum();
    assert_eq!(
        outcome.redacted.chars().count(),
        outcome.original.chars().count() - removed + added
    );
}

fn assert_no_overlap(outcome: &RedactionOutcome) {
    for (i, a) in outcome.redactions.iter().enumerate() {
        for b in &outcome.redactions[i + 1..] {
            assert!(a.end <= b.start || b.end <= a.start, "{:?} overlaps {:?}", a, b);
        }
    }
}

#[tokio::test]
async fn test_merge_example() {
    let text = "Contact Emily Johnson at emily.j@example.com";
    let outcome = null_redactor().redact(text, &RedactionConfig::default()).await.unwrap();

    assert_eq!(outcome.redacted, "Contact [NAME_1] at [EMAIL_1]");
    let names = outcome.detections.get(Category::Name);
    assert_eq!(names.len(), 1);
    assert_eq!(names[0].value, "Emily Johnson");
    assert_eq!((names[0].start, names[0].end), (8, 21));
    assert_eq!(outcome.statistics[&Category::Email], 1);
    assert_eq!(outcome.oracle, "null");
}

#[tokio::test]
async fn test_mixed_document_invariants() {
    let text = "Hi, reach jane.doe@example.com or 555-123-4567. SSN 123-45-6789, card 4111-1111-1111-1111.";
    let outcome = null_redactor().redact(text, &RedactionConfig::default()).await.unwrap();

    assert_eq!(
        outcome.redacted,
        "Hi, reach [EMAIL_1] or [PHONE_1]. SSN [SSN_1], card [CARD_1]."
    );
    assert_verbatim_outside(&outcome);
    assert_length_accounting(&outcome);
    assert_no_overlap(&outcome);
}

#[tokio::test]
async fn test_offsets_count_characters() {
    let text = "José wrote to jose@example.com";
    let outcome = null_redactor().redact(text, &RedactionConfig::default()).await.unwrap();

    assert_eq!(outcome.redacted, "José wrote to [EMAIL_1]");
    let email = &outcome.detections.get(Category::Email)[0];
    assert_eq!((email.start, email.end), (14, 30));
    assert_eq!((outcome.redactions[0].start, outcome.redactions[0].end), (14, 30));
    assert_verbatim_outside(&outcome);
    assert_length_accounting(&outcome);
}

#[tokio::test]
async fn test_sentence_opening_names_are_redacted_whole() {
    let outcome = null_redactor()
        .redact("John Smith called.", &RedactionConfig::default())
        .await
        .unwrap();
    assert_eq!(outcome.redacted, "[NAME_1] called.");

    let text = "John Smith called yesterday. Then Mary Jones replied.";
    let outcome = null_redactor().redact(text, &RedactionConfig::default()).await.unwrap();
    assert_eq!(outcome.redacted, "[NAME_1] called yesterday. Then [NAME_2] replied.");
}

#[tokio::test]
async fn test_clean_text_is_unchanged() {
    let text = "the weather is mild today, nothing to report.";
    let outcome = null_redactor().redact(text, &RedactionConfig::default()).await.unwrap();

    assert_eq!(outcome.redacted, text);
    assert_eq!(outcome.statistics.len(), 6);
    assert!(outcome.statistics.values().all(|n| *n == 0));
    assert!(outcome.redactions.is_empty());
    assert!(outcome.explanation.starts_with("No PII detected"));
}

#[tokio::test]
async fn test_full_address_wins_over_inner_spans() {
    let text = "123 Main St, Springfield, IL 62704";
    let outcome = null_redactor().redact(text, &RedactionConfig::default()).await.unwrap();

    assert_eq!(outcome.redacted, "[ADDRESS_1]");
    assert_eq!(outcome.redactions.len(), 1);
    assert_eq!(outcome.redactions[0].category, Category::Address);
    assert_eq!((outcome.redactions[0].start, outcome.redactions[0].end), (0, text.len()));
}

#[tokio::test]
async fn test_indexed_labels_follow_position_not_discovery_order() {
    let text = format!("{:<10}555-123-4567{:<28}555-987-6543", "call", " or");
    let (redactor, _) = scripted(Scripted {
        // Discovered out of order and duplicating a producer span.
        discoveries: vec![
            discovery("phone", "555-987-6543", Some((50, 62))),
            discovery("phone", "555-123-4567", Some((10, 22))),
        ],
        ..Default::default()
    });
    let outcome = redactor.redact(&text, &RedactionConfig::default()).await.unwrap();

    assert_eq!(outcome.detections.get(Category::Phone).len(), 2);
    assert_eq!(outcome.redactions[0].start, 10);
    assert_eq!(outcome.redactions[0].label, "[PHONE_1]");
    assert_eq!(outcome.redactions[1].start, 50);
    assert_eq!(outcome.redactions[1].label, "[PHONE_2]");
}

#[tokio::test]
async fn test_malformed_verdict_keeps_candidate() {
    let (redactor, _) = scripted(Scripted {
        malformed: vec!["jane@example.com"],
        ..Default::default()
    });
    let outcome = redactor
        .redact("Write to jane@example.com.", &RedactionConfig::default())
        .await
        .unwrap();

    assert_eq!(outcome.redacted, "Write to [EMAIL_1].");
    let email = &outcome.detections.get(Category::Email)[0];
    assert!(email.reasoning.as_deref().unwrap().starts_with("Judge answer unreadable"));
}

#[tokio::test]
async fn test_rejected_candidate_is_dropped() {
    let (redactor, _) = scripted(Scripted {
        reject: vec!["555-123-4567"],
        ..Default::default()
    });
    let text = "Sample number 555-123-4567 appears in the manual.";
    let outcome = redactor.redact(text, &RedactionConfig::default()).await.unwrap();

    assert_eq!(outcome.redacted, text);
    assert_eq!(outcome.statistics[&Category::Phone], 0);
    assert_eq!(outcome.explanation, "scripted summary");
}

#[tokio::test]
async fn test_rejected_lone_name_is_dropped() {
    let (redactor, _) = scripted(Scripted {
        reject: vec!["Emily Johnson"],
        ..Default::default()
    });
    let text = "Contact Emily Johnson today.";
    let outcome = redactor.redact(text, &RedactionConfig::default()).await.unwrap();

    assert_eq!(outcome.redacted, text);
    assert!(outcome.detections.get(Category::Name).is_empty());
}

#[tokio::test]
async fn test_rejected_name_cluster_is_kept() {
    // The username and the merged name sit 2 characters apart and are
    // judged as one cluster.
    let (redactor, _) = scripted(Scripted {
        reject: vec!["jsmith (John Smith"],
        ..Default::default()
    });
    let outcome = redactor
        .redact("Reset account: jsmith (John Smith) today.", &RedactionConfig::default())
        .await
        .unwrap();

    assert_eq!(outcome.redacted, "Reset account: [NAME_1]) today.");
    let names = outcome.detections.get(Category::Name);
    assert_eq!(names.len(), 1);
    assert_eq!((names[0].start, names[0].end), (15, 33));
    assert_eq!(names[0].override_rule, Some(OverrideRule::FullNameContext));
    assert_eq!(names[0].reasoning.as_deref(), Some("Full name context: scripted"));
}

#[tokio::test]
async fn test_discoveries_are_located_and_mapped() {
    let text = "Emily's handle is eh_77 and passport X1234567.";
    let (redactor, _) = scripted(Scripted {
        discoveries: vec![
            discovery("username", "eh_77", None),
            discovery("passport", "X1234567", Some((0, 3))),
            discovery("ssn", "999-00-1111", Some((5, 16))),
        ],
        ..Default::default()
    });
    let outcome = redactor.redact(text, &RedactionConfig::default()).await.unwrap();

    assert_eq!(outcome.redacted, "Emily's handle is [NAME_1] and passport [NAME_2].");
    let names = outcome.detections.get(Category::Name);
    assert_eq!(names.len(), 2);
    assert!(names.iter().all(|s| s.provenance == Provenance::OracleDiscovered));
    assert_eq!(outcome.statistics[&Category::IdNumber], 0);
}

#[tokio::test]
async fn test_discovered_character_offsets_on_accented_text() {
    // The second "ab-991" starts at character 26, byte 28.
    let text = "ab-991 alt, größe 42, neu ab-991";
    let (redactor, _) = scripted(Scripted {
        discoveries: vec![discovery("username", "ab-991", Some((26, 32)))],
        ..Default::default()
    });
    let outcome = redactor.redact(text, &RedactionConfig::default()).await.unwrap();

    assert_eq!(outcome.redacted, "ab-991 alt, größe 42, neu [NAME_1]");
    let names = outcome.detections.get(Category::Name);
    assert_eq!(names.len(), 1);
    assert_eq!((names[0].start, names[0].end), (26, 32));
    assert_eq!(names[0].value, "ab-991");
}

#[tokio::test]
async fn test_wide_discovery_offsets_do_not_swallow_document() {
    let text = "Ask Jordan at 555-987-6543 about the Q3 report.";
    let (redactor, _) = scripted(Scripted {
        discoveries: vec![discovery("name", "Jordan", Some((0, text.len() as i64)))],
        ..Default::default()
    });
    let outcome = redactor.redact(text, &RedactionConfig::default()).await.unwrap();

    assert_eq!(outcome.redacted, "Ask [NAME_1] at [PHONE_1] about the Q3 report.");
    let names = outcome.detections.get(Category::Name);
    assert_eq!(names.len(), 1);
    assert_eq!((names[0].start, names[0].end), (4, 10));
    assert_no_overlap(&outcome);
}

#[tokio::test]
async fn test_disabled_category_gates_discoveries() {
    let text = "Mail jane@example.com or call 555-123-4567.";
    let (redactor, _) = scripted(Scripted {
        discoveries: vec![discovery("phone", "555-123-4567", None)],
        ..Default::default()
    });
    let config = RedactionConfig::only(&[Category::Email]);
    let outcome = redactor.redact(text, &config).await.unwrap();

    assert_eq!(outcome.redacted, "Mail [EMAIL_1] or call 555-123-4567.");
    assert!(outcome.detections.get(Category::Phone).is_empty());
    assert_eq!(outcome.statistics[&Category::Phone], 0);
}

#[tokio::test]
async fn test_overlapping_discovery_is_resolved() {
    let text = "Contact Emily Johnson at emily.j@example.com";
    let (redactor, _) = scripted(Scripted {
        discoveries: vec![discovery("other", "Johnson at emily", None)],
        ..Default::default()
    });
    let outcome = redactor.redact(text, &RedactionConfig::default()).await.unwrap();

    assert_no_overlap(&outcome);
    assert_verbatim_outside(&outcome);
    assert_length_accounting(&outcome);
    // The discovery overlaps the longer email and is dropped.
    let categories: Vec<Category> = outcome.redactions.iter().map(|r| r.category).collect();
    assert_eq!(categories, vec![Category::Name, Category::Email]);
    assert_eq!(outcome.redacted, "Contact [NAME_1] at [EMAIL_1]");
}

#[tokio::test]
async fn test_rate_limit_is_surfaced() {
    let (redactor, _) = scripted(Scripted {
        validate_error: Some(OracleError::RateLimited("quota exceeded".into())),
        ..Default::default()
    });
    let err = redactor
        .redact("Write to jane@example.com.", &RedactionConfig::default())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::OracleRateLimited(_)));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_unavailable_explain_aborts_request() {
    let (redactor, _) = scripted(Scripted {
        explain_error: Some(OracleError::Unavailable("401".into())),
        ..Default::default()
    });
    let err = redactor
        .redact("Write to jane@example.com.", &RedactionConfig::default())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::OracleUnavailable(_)));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_malformed_explanation_uses_local_summary() {
    let (redactor, _) = scripted(Scripted {
        explain_error: Some(OracleError::Malformed("empty".into())),
        ..Default::default()
    });
    let outcome = redactor
        .redact("Write to jane@example.com.", &RedactionConfig::default())
        .await
        .unwrap();
    assert_eq!(outcome.explanation, "Redacted 1 item(s) of PII: 1 email.");
}

#[tokio::test]
async fn test_invalid_settings_rejected_before_detection() {
    let (redactor, oracle) = scripted(Scripted::default());
    let config = RedactionConfig {
        label_style: LabelStyle::Custom,
        custom_label: None,
        ..Default::default()
    };
    let err = redactor
        .redact("Write to jane@example.com.", &config)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Config(_)));
    assert_eq!(oracle.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_concurrent_requests_are_independent() {
    let redactor = Arc::new(null_redactor());
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let redactor = Arc::clone(&redactor);
            tokio::spawn(async move {
                let text = format!("Ticket {i}: reach me at user{i}@example.com");
                redactor.redact(&text, &RedactionConfig::default()).await
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        let outcome = handle.await.unwrap().unwrap();
        assert_eq!(outcome.redacted, format!("Ticket {i}: reach me at [EMAIL_1]"));
    }
}
