//! Text chunking for TTS processing.

use once_cell::sync::Lazy;
use regex::Regex;

use super::TextChunk;

/// Default maximum segment length in characters.
pub const DEFAULT_MAX_LENGTH: usize = 200;

/// A sentence is everything up to and including a run of `.`, `!` or `?`;
/// text after the last terminator is its own run.
static SENTENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^.!?]*[.!?]+|[^.!?]+$").expect("sentence pattern is valid"));

/// Split text into sentence runs. Concatenating the runs gives back `text`.
fn split_sentences(text: &str) -> Vec<&str> {
    let runs: Vec<&str> = SENTENCE.find_iter(text).map(|m| m.as_str()).collect();
    if runs.is_empty() { vec![text] } else { runs }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Split text into segments of at most `max_length` characters.
///
/// Whole sentences are packed greedily into each segment. A single sentence
/// longer than the limit is cut into fixed-size pieces.
///
/// # Arguments
/// * `text` - The text to chunk
/// * `max_length` - Maximum segment length in characters (default: 200)
///
/// # Returns
/// Segments in source order; empty when `text` has no content.
pub fn chunk_text(text: &str, max_length: usize) -> Vec<String> {
    let max_length = max_length.max(1);

    let mut packed = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for sentence in split_sentences(text) {
        let sentence_len = char_len(sentence);
        if current_len + sentence_len > max_length {
            flush(&mut packed, &current);
            current = sentence.to_string();
            current_len = sentence_len;
        } else {
            current.push_str(sentence);
            current_len += sentence_len;
        }
    }
    flush(&mut packed, &current);

    let mut chunks = Vec::with_capacity(packed.len());
    for segment in packed {
        if char_len(&segment) > max_length {
            chunks.extend(hard_split(&segment, max_length));
        } else {
            chunks.push(segment);
        }
    }

    chunks
}

/// Push the trimmed buffer unless nothing but whitespace is left.
fn flush(chunks: &mut Vec<String>, buffer: &str) {
    let trimmed = buffer.trim();
    if !trimmed.is_empty() {
        chunks.push(trimmed.to_string());
    }
}

/// Hard split text at exact positions (last resort).
fn hard_split(text: &str, max_length: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(max_length)
        .map(|piece| piece.iter().collect())
        .collect()
}

/// Process a document's text into TTS-ready chunks.
///
/// # Arguments
/// * `text` - The document text
/// * `max_length` - Maximum segment length (default: 200)
///
/// # Returns
/// List of `TextChunk` objects, indexed in playback order.
pub fn process_text(text: &str, max_length: usize) -> Vec<TextChunk> {
    chunk_text(text, max_length)
        .into_iter()
        .enumerate()
        .map(|(index, text)| TextChunk::new(index, text))
        .collect()
}
