//! Sequential synthesis of text chunks.
//!
//! Segments are submitted one at a time, in order, and each request is
//! awaited before the next one is issued.

use anyhow::{Context, Result};
use tts_client::{Language, SpeechGenerator, TtsConfig, generate_with_retry};

use crate::text::TextChunk;

/// Settings for one narration run.
pub struct Narration<'a> {
    pub generator: &'a dyn SpeechGenerator,
    pub language: Language,
    pub config: &'a TtsConfig,
    pub max_retries: u32,
}

impl Narration<'_> {
    /// Synthesize `chunks` in order, handing each result to `on_audio`.
    ///
    /// Stops at the first chunk that still fails after retries.
    ///
    /// # Returns
    /// The values produced by `on_audio`, in chunk order.
    pub async fn run<T, F>(&self, chunks: &[TextChunk], mut on_audio: F) -> Result<Vec<T>>
    where
        F: FnMut(&TextChunk, Vec<u8>) -> Result<T>,
    {
        let mut results = Vec::with_capacity(chunks.len());

        for chunk in chunks {
            log::debug!(
                "Requesting segment {} ({} chars): {}",
                chunk.index,
                chunk.char_len(),
                preview(&chunk.text)
            );

            let audio = generate_with_retry(
                self.generator,
                &chunk.text,
                self.language,
                self.config,
                self.max_retries,
            )
            .await
            .with_context(|| {
                format!(
                    "{} failed on segment {}: \"{}\"",
                    self.generator.name(),
                    chunk.index,
                    preview(&chunk.text)
                )
            })?;

            log::debug!("Segment {} returned {} bytes", chunk.index, audio.len());
            results.push(on_audio(chunk, audio)?);
        }

        Ok(results)
    }
}

/// First few words of a segment for log lines.
fn preview(text: &str) -> String {
    const PREVIEW_CHARS: usize = 30;
    if text.chars().count() <= PREVIEW_CHARS {
        text.to_string()
    } else {
        let head: String = text.chars().take(PREVIEW_CHARS).collect();
        format!("{}...", head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::process_text;
    use tts_client::{MockGenerator, TtsError};

    fn narration<'a>(generator: &'a MockGenerator, config: &'a TtsConfig) -> Narration<'a> {
        Narration {
            generator,
            language: Language::En,
            config,
            max_retries: 1,
        }
    }

    #[tokio::test]
    async fn test_segments_submitted_in_order() {
        let generator = MockGenerator::always_succeeds();
        let config = TtsConfig::default();
        let chunks = process_text("One. Two. Three. Four.", 6);

        let sizes = narration(&generator, &config)
            .run(&chunks, |chunk, audio| Ok((chunk.index, audio.len())))
            .await
            .unwrap();

        assert_eq!(generator.received(), vec!["One.", "Two.", "Three.", "Four."]);
        assert_eq!(sizes, vec![(0, 4), (1, 4), (2, 6), (3, 5)]);
    }

    #[tokio::test]
    async fn test_transient_failure_is_retried() {
        let generator = MockGenerator::fails_then_succeeds(
            1,
            TtsError::ServerOverloaded {
                message: "busy".to_string(),
            },
        );
        let config = TtsConfig::default();
        let chunks = process_text("Only one.", 200);

        let results = narration(&generator, &config)
            .run(&chunks, |_, audio| Ok(audio))
            .await
            .unwrap();

        assert_eq!(results, vec![b"Only one.".to_vec()]);
        assert_eq!(generator.call_count(), 2);
    }

    #[tokio::test]
    async fn test_stops_at_first_failure() {
        let generator =
            MockGenerator::always_fails(TtsError::SynthesisFailed("model crashed".to_string()));
        let config = TtsConfig::default();
        let chunks = process_text("First. Second.", 7);

        let err = narration(&generator, &config)
            .run(&chunks, |_, audio| Ok(audio))
            .await
            .unwrap_err();

        assert_eq!(generator.call_count(), 1);
        let message = format!("{:#}", err);
        assert!(message.contains("segment 0"), "{}", message);
        assert!(message.contains("model crashed"), "{}", message);
    }

    #[tokio::test]
    async fn test_sink_error_aborts() {
        let generator = MockGenerator::always_succeeds();
        let config = TtsConfig::default();
        let chunks = process_text("A. B. C.", 2);

        let result: Result<Vec<()>> = narration(&generator, &config)
            .run(&chunks, |chunk, _| {
                if chunk.index == 1 {
                    anyhow::bail!("disk full")
                }
                Ok(())
            })
            .await;

        assert!(result.is_err());
        assert_eq!(generator.call_count(), 2);
    }

    #[test]
    fn test_preview() {
        assert_eq!(preview("short"), "short");
        let long = "ż".repeat(40);
        assert_eq!(preview(&long), format!("{}...", "ż".repeat(30)));
    }
}
