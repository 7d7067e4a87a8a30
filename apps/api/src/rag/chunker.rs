//! Token-window chunking with overlap.
//!
//! Tokens are Unicode word-boundary segments, whitespace excluded. Each chunk is
//! the slice of the original text spanning its window, so punctuation and line
//! breaks inside a window are preserved.

use unicode_segmentation::UnicodeSegmentation;

use crate::rag::RagError;

pub const DEFAULT_CHUNK_SIZE: usize = 300;
pub const DEFAULT_CHUNK_OVERLAP: usize = 50;

/// Splits `text` into windows of `chunk_size` tokens, each starting
/// `chunk_size - overlap` tokens after the previous one. Deterministic.
pub fn split_into_chunks(
    text: &str,
    chunk_size: usize,
    overlap: usize,
) -> Result<Vec<String>, RagError> {
    if chunk_size == 0 {
        return Err(RagError::InvalidChunking("chunk size must be positive".to_string()));
    }
    if overlap >= chunk_size {
        return Err(RagError::InvalidChunking(format!(
            "overlap ({overlap}) must be smaller than chunk size ({chunk_size})"
        )));
    }

    let tokens: Vec<(usize, &str)> = text
        .split_word_bound_indices()
        .filter(|(_, token)| !token.trim().is_empty())
        .collect();

    let stride = chunk_size - overlap;
    let mut chunks = Vec::new();
    let mut start = 0;
    while start < tokens.len() {
        let end = (start + chunk_size).min(tokens.len());
        let (first_offset, _) = tokens[start];
        let (last_offset, last_token) = tokens[end - 1];
        chunks.push(text[first_offset..last_offset + last_token.len()].to_string());

        if end == tokens.len() {
            break;
        }
        start += stride;
    }

    Ok(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered_words(n: usize) -> String {
        (0..n).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn test_short_text_is_one_chunk() {
        let chunks = split_into_chunks("Senior engineer at Acme.", 300, 50).unwrap();
        assert_eq!(chunks, vec!["Senior engineer at Acme."]);
    }

    #[test]
    fn test_empty_text_has_no_chunks() {
        assert!(split_into_chunks("   \n\t ", 300, 50).unwrap().is_empty());
    }

    #[test]
    fn test_windows_overlap() {
        let text = numbered_words(10);
        let chunks = split_into_chunks(&text, 4, 1).unwrap();
        assert_eq!(chunks, vec!["w0 w1 w2 w3", "w3 w4 w5 w6", "w6 w7 w8 w9"]);
    }

    #[test]
    fn test_final_window_may_be_short() {
        let text = numbered_words(6);
        let chunks = split_into_chunks(&text, 4, 2).unwrap();
        assert_eq!(chunks, vec!["w0 w1 w2 w3", "w2 w3 w4 w5"]);

        let chunks = split_into_chunks(&numbered_words(7), 4, 1).unwrap();
        assert_eq!(chunks, vec!["w0 w1 w2 w3", "w3 w4 w5 w6"]);

        let chunks = split_into_chunks(&numbered_words(8), 4, 1).unwrap();
        assert_eq!(chunks.last().unwrap(), "w6 w7");
    }

    #[test]
    fn test_is_deterministic() {
        let text = numbered_words(1000);
        let a = split_into_chunks(&text, DEFAULT_CHUNK_SIZE, DEFAULT_CHUNK_OVERLAP).unwrap();
        let b = split_into_chunks(&text, DEFAULT_CHUNK_SIZE, DEFAULT_CHUNK_OVERLAP).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 4);
    }

    #[test]
    fn test_preserves_original_text_inside_window() {
        let chunks = split_into_chunks("Rust,  Go;\nPython", 10, 2).unwrap();
        assert_eq!(chunks, vec!["Rust,  Go;\nPython"]);
    }

    #[test]
    fn test_rejects_invalid_parameters() {
        assert!(matches!(split_into_chunks("a b", 0, 0), Err(RagError::InvalidChunking(_))));
        assert!(matches!(split_into_chunks("a b", 5, 5), Err(RagError::InvalidChunking(_))));
    }
}
