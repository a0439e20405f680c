//! PDF text extraction and redacted PDF layout.

use std::path::Path;

use printpdf::{BuiltinFont, Mm, PdfDocument};

use redline_core::{Error, Result};

// US Letter, one-inch side and top margins, quarter-inch bottom margin.
const PAGE_WIDTH: Mm = Mm(215.9);
const PAGE_HEIGHT: Mm = Mm(279.4);
const MARGIN: Mm = Mm(25.4);
const BOTTOM_MARGIN: Mm = Mm(6.35);

const FONT_SIZE: f32 = 11.0;
const LINE_HEIGHT: f32 = 4.9;
const PARAGRAPH_GAP: f32 = 5.08;
/// Helvetica at 11pt fits about this many characters across the text column.
const WRAP_COLUMNS: usize = 85;

/// Text of every page that has any, pages separated by a blank line.
pub fn extract_text(path: &Path) -> Result<String> {
    let doc = lopdf::Document::load(path)
        .map_err(|e| Error::Extraction(format!("cannot read PDF {}: {}", path.display(), e)))?;

    let mut pages = Vec::new();
    for number in doc.get_pages().keys() {
        match doc.extract_text(&[*number]) {
            Ok(text) if !text.trim().is_empty() => pages.push(text.trim().to_string()),
            Ok(_) => {}
            Err(e) => tracing::warn!("Skipping page {} of {}: {}", number, path.display(), e),
        }
    }
    Ok(pages.join("\n\n"))
}

/// Lay out redacted text as a PDF: one paragraph per blank-line-separated
/// block, lines wrapped to the text column, new pages as needed.
pub fn render(redacted_text: &str) -> Result<Vec<u8>> {
    let (doc, page, layer) = PdfDocument::new("Redacted document", PAGE_WIDTH, PAGE_HEIGHT, "text");
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| Error::Render(format!("cannot load font: {}", e)))?;

    let mut layer = doc.get_page(page).get_layer(layer);
    let top = PAGE_HEIGHT.0 - MARGIN.0;
    let mut y = top;

    for paragraph in redacted_text.split("\n\n").filter(|p| !p.trim().is_empty()) {
        for line in paragraph.lines().flat_map(|l| wrap(l, WRAP_COLUMNS)) {
            if y - LINE_HEIGHT < BOTTOM_MARGIN.0 {
                let (page, next) = doc.add_page(PAGE_WIDTH, PAGE_HEIGHT, "text");
                layer = doc.get_page(page).get_layer(next);
                y = top;
            }
            layer.use_text(latin1(&line), FONT_SIZE, MARGIN, Mm(y), &font);
            y -= LINE_HEIGHT;
        }
        y -= PARAGRAPH_GAP;
    }

    doc.save_to_bytes()
        .map_err(|e| Error::Render(format!("cannot write PDF: {}", e)))
}

/// Greedy word wrap at `columns` characters. Words longer than a line are
/// split. An empty line stays one empty line.
fn wrap(line: &str, columns: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut width = 0;

    for word in line.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > columns {
            if width > 0 {
                lines.push(std::mem::take(&mut current));
                width = 0;
            }
            lines.push(word.drain(..columns).collect());
        }
        if width > 0 && width + 1 + word.len() > columns {
            lines.push(std::mem::take(&mut current));
            width = 0;
        }
        if width > 0 {
            current.push(' ');
            width += 1;
        }
        width += word.len();
        current.extend(word);
    }
    if width > 0 || lines.is_empty() {
        lines.push(current);
    }
    lines
}

/// Built-in fonts only cover Latin-1. Block labels become `#`, anything
/// else outside the range becomes `?`.
fn latin1(line: &str) -> String {
    line.chars()
        .map(|c| match c {
            '█' => '#',
            c if (c as u32) < 0x100 && !c.is_control() => c,
            _ => '?',
        })
        .collect()
}
