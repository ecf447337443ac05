//! Integration tests for the document -> segments -> audio pipeline
//!
//! Speech is produced by the mock generator, which echoes the segment text
//! back as its "audio", so the written files can be checked directly.

use speak_doc::output::{MANIFEST_FILE, OutputDir};
use speak_doc::text::{self, process_text};
use speak_doc::{Narration, read_document};
use tempfile::TempDir;
use tts_client::{
    AudioFormat, Language, MockGenerator, SpeechGenerator, TtsConfig, TtsError, select_backend,
};

const POLISH: &str = "Litwo! Ojczyzno moja! ty jesteś jak zdrowie. \
Ile cię trzeba cenić, ten tylko się dowie, kto cię stracił. \
Dziś piękność twą w całej ozdobie widzę i opisuję, bo tęsknię po tobie.";

const ENGLISH: &str = "It was the best of times, it was the worst of times. \
It was the age of wisdom, it was the age of foolishness. \
It was the epoch of belief, it was the epoch of incredulity.";

#[test]
fn test_language_selects_backend() {
    assert_eq!(text::classify(POLISH), Language::Pl);
    assert_eq!(text::classify(ENGLISH), Language::En);

    assert_eq!(select_backend(text::classify(POLISH)).name(), "Piper");
    assert_eq!(select_backend(text::classify(ENGLISH)).name(), "Kokoro");
}

#[test]
fn test_document_chunks_respect_limit() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("pan-tadeusz.txt");
    std::fs::write(&path, POLISH).unwrap();

    let document = read_document(&path).unwrap();
    let chunks = process_text(&document.text, 60);

    assert!(chunks.len() > 1);
    for chunk in &chunks {
        assert!(chunk.char_len() <= 60, "segment too long: {:?}", chunk.text);
    }
    assert_eq!(chunks[0].text, "Litwo! Ojczyzno moja! ty jesteś jak zdrowie.");
}

#[tokio::test]
async fn test_narrate_to_directory() {
    let dir = TempDir::new().unwrap();
    let generator = MockGenerator::always_succeeds().with_format(AudioFormat::Mp3);
    let config = TtsConfig::default();
    let chunks = process_text(ENGLISH, 80);

    let out = OutputDir::create(&dir.path().join("out"), AudioFormat::Mp3).unwrap();
    let narration = Narration {
        generator: &generator,
        language: Language::En,
        config: &config,
        max_retries: 0,
    };

    let records = narration
        .run(&chunks, |chunk, audio| out.write_segment(chunk, &audio))
        .await
        .unwrap();

    assert_eq!(records.len(), chunks.len());
    for (record, chunk) in records.iter().zip(&chunks) {
        let written = std::fs::read_to_string(out.path().join(&record.file)).unwrap();
        assert_eq!(written, chunk.text);
        assert!(record.file.ends_with(".mp3"));
    }
    assert!(!out.path().join(MANIFEST_FILE).exists());
}

#[tokio::test]
async fn test_failure_leaves_earlier_segments() {
    let dir = TempDir::new().unwrap();
    let generator = MockGenerator::succeeds_then_fails(
        1,
        TtsError::ApiError {
            engine: "Kokoro",
            message: "Unauthorized".to_string(),
            status_code: Some(401),
        },
    );
    let config = TtsConfig::default();
    let chunks = process_text(ENGLISH, 80);
    assert!(chunks.len() > 2);

    let out = OutputDir::create(dir.path(), AudioFormat::Wav).unwrap();
    let narration = Narration {
        generator: &generator,
        language: Language::En,
        config: &config,
        max_retries: 3,
    };

    let result = narration
        .run(&chunks, |chunk, audio| out.write_segment(chunk, &audio))
        .await;

    assert!(result.is_err());
    assert_eq!(generator.call_count(), 2);
    assert!(out.path().join("segment_000.wav").exists());
    assert!(!out.path().join("segment_001.wav").exists());
}

#[tokio::test]
async fn test_failure_on_first_segment_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let generator = MockGenerator::always_fails(TtsError::SynthesisFailed(
        "model crashed".to_string(),
    ));
    let config = TtsConfig::default();
    let chunks = process_text(POLISH, 80);

    let out = OutputDir::create(dir.path(), AudioFormat::Wav).unwrap();
    let narration = Narration {
        generator: &generator,
        language: Language::Pl,
        config: &config,
        max_retries: 3,
    };

    let result = narration
        .run(&chunks, |chunk, audio| out.write_segment(chunk, &audio))
        .await;

    assert!(result.is_err());
    assert_eq!(generator.call_count(), 1);
    assert!(!out.path().join("segment_000.wav").exists());
}

#[test]
fn test_duration_estimate_for_document() {
    let estimate = text::format_duration(text::estimate_seconds(ENGLISH.chars().count()));
    assert_eq!(estimate, "0:11");
}
