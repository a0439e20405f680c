//! File text extraction for various formats.

use std::path::Path;

use redline_core::{Error, Result};

/// Supported file types for text extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    PlainText,
    Markdown,
    Code,
    Json,
    Pdf,
    Binary,
    Unknown,
}

impl FileType {
    /// Detect file type from extension.
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "txt" | "text" | "log" | "csv" | "tsv" | "eml" => Self::PlainText,
            "md" | "mdx" => Self::Markdown,
            "py" | "js" | "ts" | "tsx" | "jsx" | "rs" | "go" | "java" | "cpp" | "c" | "h"
            | "hpp" | "cs" | "rb" | "php" | "swift" | "kt" | "scala" | "sh" | "bash" | "zsh"
            | "yaml" | "yml" | "toml" | "ini" | "cfg" | "conf" | "xml" | "html" | "css"
            | "scss" | "sql" => Self::Code,
            "json" => Self::Json,
            "pdf" => Self::Pdf,
            "doc" | "docx" | "odt" | "rtf" | "xls" | "xlsx" | "png" | "jpg" | "jpeg" | "gif"
            | "zip" => Self::Binary,
            _ => Self::Unknown,
        }
    }

    /// Check if this is a text-based file type.
    pub fn is_text(&self) -> bool {
        matches!(
            self,
            Self::PlainText | Self::Markdown | Self::Code | Self::Json
        )
    }
}

fn no_text(path: &Path) -> Error {
    Error::Extraction(format!("no extractable text in {}", path.display()))
}

/// More than one control character in ten means binary.
fn looks_binary(content: &str) -> bool {
    content
        .chars()
        .filter(|c| c.is_control() && *c != '\n' && *c != '\r' && *c != '\t')
        .count()
        > content.len() / 10
}

/// Extract the text content of a document.
///
/// Fails with `Extraction` when the file cannot be read as text or holds
/// nothing but whitespace.
pub fn extract(path: &Path) -> Result<String> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("");
    let file_type = FileType::from_extension(ext);

    let content = match file_type {
        FileType::PlainText | FileType::Markdown | FileType::Code => read_text(path)?,
        FileType::Json => extract_json(path)?,
        FileType::Pdf => crate::pdf::extract_text(path)?,
        FileType::Binary => {
            tracing::warn!("Unsupported document format: {}", path.display());
            return Err(Error::Extraction(format!(
                "unsupported document format '{}'; upload text or PDF",
                ext.to_lowercase()
            )));
        }
        FileType::Unknown => {
            // Try reading as text
            let content = std::fs::read_to_string(path).map_err(|_| no_text(path))?;
            if looks_binary(&content) {
                return Err(no_text(path));
            }
            content
        }
    };

    if content.trim().is_empty() {
        return Err(no_text(path));
    }
    tracing::debug!("Extracted {} bytes from {}", content.len(), path.display());
    Ok(content)
}

fn read_text(path: &Path) -> Result<String> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(content),
        Err(e) if e.kind() == std::io::ErrorKind::InvalidData => Err(no_text(path)),
        Err(e) => Err(Error::Io(e)),
    }
}

/// JSON documents are pretty-printed so every value sits on its own line.
fn extract_json(path: &Path) -> Result<String> {
    let content = read_text(path)?;
    match serde_json::from_str::<serde_json::Value>(&content) {
        Ok(value) => Ok(serde_json::to_string_pretty(&value)?),
        // Not valid JSON: redact it as written
        Err(_) => Ok(content),
    }
}
