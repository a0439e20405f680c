use std::path::{Path, PathBuf};

use chrono::Utc;
use uuid::Uuid;

use redline_core::{Error, Result};

/// Document format for redacted output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Pdf,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Text => "txt",
            Self::Pdf => "pdf",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Text => "text/plain; charset=utf-8",
            Self::Pdf => "application/pdf",
        }
    }
}

/// Fresh download name, like `redacted-20240501-101500-1a2b3c4d.pdf`.
pub fn export_name(format: OutputFormat) -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!(
        "redacted-{}-{}.{}",
        Utc::now().format("%Y%m%d-%H%M%S"),
        &id[..8],
        format.extension()
    )
}

/// Redacted text encoded as a document of `format`.
pub fn render_bytes(redacted_text: &str, format: OutputFormat) -> Result<Vec<u8>> {
    match format {
        OutputFormat::Text => Ok(redacted_text.as_bytes().to_vec()),
        OutputFormat::Pdf => crate::pdf::render(redacted_text),
    }
}

/// Write redacted text to a fresh file in `dir` and return its path.
pub fn render(redacted_text: &str, dir: &Path, format: OutputFormat) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .map_err(|e| Error::Render(format!("cannot create {}: {}", dir.display(), e)))?;

    let path = dir.join(export_name(format));
    let bytes = render_bytes(redacted_text, format)?;
    std::fs::write(&path, bytes)
        .map_err(|e| Error::Render(format!("cannot write {}: {}", path.display(), e)))?;
    tracing::info!("Rendered redacted document {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_writes_unique_files() {
        let dir = tempfile::tempdir().unwrap();
        let exports = dir.path().join("exports");
        let a = render("Mail [EMAIL_1]", &exports, OutputFormat::Text).unwrap();
        let b = render("Mail [EMAIL_1]", &exports, OutputFormat::Text).unwrap();

        assert_ne!(a, b);
        assert_eq!(std::fs::read_to_string(&a).unwrap(), "Mail [EMAIL_1]");
        let name = a.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("redacted-"));
        assert!(name.ends_with(".txt"));
    }

    #[test]
    fn test_pdf_output() {
        let dir = tempfile::tempdir().unwrap();
        let path = render("Mail [EMAIL_1]", dir.path(), OutputFormat::Pdf).unwrap();
        assert_eq!(path.extension().unwrap(), "pdf");
        assert!(std::fs::read(&path).unwrap().starts_with(b"%PDF"));
        assert!(export_name(OutputFormat::Pdf).ends_with(".pdf"));
    }
}
