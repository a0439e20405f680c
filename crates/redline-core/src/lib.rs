//! Redline Core — span model, redaction settings, configuration, errors.

pub mod config;
pub mod error;
pub mod span;
pub mod text;

pub use config::{DataPaths, LabelStyle, RedactionConfig, RedlineConfig};
pub use error::{Error, Result};
pub use span::{Category, Confidence, DetectionSet, OverrideRule, Provenance, Span};
