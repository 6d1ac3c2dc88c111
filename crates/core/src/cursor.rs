//! Cursor arithmetic over plain `&str` content.
//!
//! Positions are byte indices that always sit on grapheme cluster
//! boundaries.

use unicode_segmentation::UnicodeSegmentation;

/// Return the byte index of the grapheme cluster immediately to the left
/// of `byte_idx`, or `None` if at the start of the text.
pub fn grapheme_left(text: &str, byte_idx: usize) -> Option<usize> {
    if byte_idx == 0 {
        return None;
    }
    let byte_idx = byte_idx.min(text.len());
    text[..byte_idx]
        .grapheme_indices(true)
        .next_back()
        .map(|(idx, _)| idx)
}

/// Return the byte index just past the grapheme cluster at `byte_idx`, or
/// `None` if at the end of the text.
pub fn grapheme_right(text: &str, byte_idx: usize) -> Option<usize> {
    if byte_idx >= text.len() {
        return None;
    }
    text[byte_idx..]
        .graphemes(true)
        .next()
        .map(|g| byte_idx + g.len())
}

pub fn line_start(text: &str, byte_idx: usize) -> usize {
    text[..byte_idx.min(text.len())]
        .rfind('\n')
        .map_or(0, |i| i + 1)
}

pub fn line_end(text: &str, byte_idx: usize) -> usize {
    let byte_idx = byte_idx.min(text.len());
    text[byte_idx..]
        .find('\n')
        .map_or(text.len(), |i| byte_idx + i)
}

/// Convert a byte index to zero-based (line, column), column in characters.
pub fn line_col(text: &str, byte_idx: usize) -> (usize, usize) {
    let byte_idx = byte_idx.min(text.len());
    let line = text[..byte_idx].matches('\n').count();
    let col = text[line_start(text, byte_idx)..byte_idx].chars().count();
    (line, col)
}

/// Move one line up, keeping the character column where possible.
pub fn line_up(text: &str, byte_idx: usize) -> usize {
    let start = line_start(text, byte_idx);
    if start == 0 {
        return 0;
    }
    let col = text[start..byte_idx].chars().count();
    let prev_start = line_start(text, start - 1);
    column_in_line(text, prev_start, col)
}

/// Move one line down, keeping the character column where possible.
pub fn line_down(text: &str, byte_idx: usize) -> usize {
    let end = line_end(text, byte_idx);
    if end == text.len() {
        return text.len();
    }
    let col = text[line_start(text, byte_idx)..byte_idx].chars().count();
    column_in_line(text, end + 1, col)
}

fn column_in_line(text: &str, start: usize, col: usize) -> usize {
    let end = line_end(text, start);
    text[start..end]
        .char_indices()
        .nth(col)
        .map_or(end, |(i, _)| start + i)
}
