//! Redaction engine.
//!
//! Turns candidate spans from the detectors and the judge into one
//! non-overlapping, labelled rewrite of the document:
//! validate → discover → resolve → label → rewrite → explain.

pub mod adapter;
pub mod labels;
pub mod pipeline;
pub mod resolver;
pub mod rewriter;
pub mod types;
pub mod validation;

pub use adapter::OracleAdapter;
pub use labels::{assign_labels, BLOCK_LABEL};
pub use pipeline::{fingerprint, Redactor};
pub use resolver::resolve;
pub use rewriter::rewrite;
pub use types::{AppliedRedaction, PlannedRedaction, RedactionOutcome};
