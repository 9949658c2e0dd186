// src/text.rs
//! Boundary helpers for the length limits imposed by Notion.
//!
//! Text is never split inside a code point. Previews are capped in `char`s,
//! while rich text chunks are capped in UTF-16 code units because that is how
//! Notion measures a string.

/// Returns the longest prefix of `text` holding at most `max_chars` characters.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}

/// Returns the longest prefix of `text` whose UTF-16 encoding fits in
/// `max_units` code units. A surrogate pair is never cut in half.
pub fn truncate_utf16(text: &str, max_units: usize) -> &str {
    let mut units = 0;
    for (byte_index, c) in text.char_indices() {
        units += c.len_utf16();
        if units > max_units {
            return &text[..byte_index];
        }
    }
    text
}

/// Splits `text` into consecutive pieces of at most `max_units` UTF-16 code
/// units each.
///
/// Concatenating the pieces reproduces `text` exactly. Empty input yields a
/// single empty piece.
pub fn chunk_utf16(text: &str, max_units: usize) -> Vec<&str> {
    // Below two units an astral character could never be placed
    if text.is_empty() || max_units < 2 {
        return vec![text];
    }

    let mut chunks = Vec::with_capacity(text.len() / max_units + 1);
    let mut rest = text;
    while !rest.is_empty() {
        let head = truncate_utf16(rest, max_units);
        chunks.push(head);
        rest = &rest[head.len()..];
    }
    chunks
}
