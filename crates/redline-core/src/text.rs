//! Char-boundary-safe helpers over byte offsets.
//!
//! Spans are sliced by byte offset internally. Callers outside the engine
//! count in characters, so `CharOffsets` converts in both directions.

/// `[start, end)` is non-empty, in bounds and on char boundaries of `text`.
pub fn is_valid_range(text: &str, start: usize, end: usize) -> bool {
    start < end && end <= text.len() && text.is_char_boundary(start) && text.is_char_boundary(end)
}

/// Substring around `[start, end)` extended by up to `radius` characters
/// on each side. Returns an empty string for an invalid range.
pub fn context_window(text: &str, start: usize, end: usize, radius: usize) -> &str {
    if !is_valid_range(text, start, end) {
        return "";
    }
    let lo = text[..start]
        .char_indices()
        .rev()
        .take(radius)
        .last()
        .map(|(i, _)| i)
        .unwrap_or(start);
    let hi = text[end..]
        .char_indices()
        .nth(radius)
        .map(|(i, _)| end + i)
        .unwrap_or(text.len());
    &text[lo..hi]
}

/// Signed distance in characters from byte offset `from` to byte offset `to`.
/// Negative when `to` comes first.
pub fn char_gap(text: &str, from: usize, to: usize) -> isize {
    let (lo, hi, sign) = if from <= to { (from, to, 1) } else { (to, from, -1) };
    let count = match text.get(lo..hi) {
        Some(between) => between.chars().count(),
        None => hi - lo,
    };
    sign * count as isize
}

/// Byte position of every character boundary in a document.
#[derive(Debug, Clone)]
pub struct CharOffsets {
    bounds: Vec<usize>,
}

impl CharOffsets {
    pub fn new(text: &str) -> Self {
        let bounds = text
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(text.len()))
            .collect();
        Self { bounds }
    }

    /// Character index of a byte offset; `None` inside a multi-byte char
    /// or past the end.
    pub fn to_char(&self, byte: usize) -> Option<usize> {
        self.bounds.binary_search(&byte).ok()
    }

    /// Byte offset of a character index; `None` past the end.
    pub fn to_byte(&self, char_index: usize) -> Option<usize> {
        self.bounds.get(char_index).copied()
    }
}
