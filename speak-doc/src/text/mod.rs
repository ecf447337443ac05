//! Text processing for TTS: language detection, chunking and duration estimates.

pub mod chunker;
pub mod duration;
pub mod language;

pub use chunker::{DEFAULT_MAX_LENGTH, chunk_text, process_text};
pub use duration::{estimate_seconds, format_duration};
pub use language::{classify, classify_with_threshold, diacritic_density};

/// A chunk of text ready for TTS processing.
#[derive(Debug, Clone, PartialEq)]
pub struct TextChunk {
    /// Position in playback order
    pub index: usize,
    /// The text content
    pub text: String,
}

impl TextChunk {
    /// Create a new text chunk.
    pub fn new(index: usize, text: String) -> Self {
        Self { index, text }
    }

    /// Length in characters.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_chunk_creation() {
        let chunk = TextChunk::new(1, "Cześć".to_string());
        assert_eq!(chunk.index, 1);
        assert_eq!(chunk.text, "Cześć");
        assert_eq!(chunk.char_len(), 5);
    }
}
