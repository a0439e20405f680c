//! Document collaborators around the redaction engine.
//!
//! `extract` turns an uploaded file (text or PDF) into plain text before
//! redaction; `render` and `render_bytes` turn redacted text back into a
//! downloadable text or PDF document.

pub mod file;
pub mod pdf;
pub mod render;

pub use file::{extract, FileType};
pub use render::{export_name, render, render_bytes, OutputFormat};
