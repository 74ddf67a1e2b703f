use docqa_core::{Error, Result};

/// Reject `text` if it is longer than `limit` characters.
pub fn check_input_len(text: &str, limit: usize) -> Result<()> {
    let chars = text.chars().count();
    if chars > limit {
        return Err(Error::EmbeddingInputTooLong { chars, limit });
    }
    Ok(())
}

/// Cut `text` to at most `limit` characters, on a char boundary.
pub fn truncate_to_limit(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
