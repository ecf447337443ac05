//! Text-to-speech backends for speak-doc
//!
//! Provides one interface over the speech engines used per language:
//! - Piper (Polish), via a Piper HTTP server or the local `piper` executable
//! - Kokoro (English), via an OpenAI-compatible `/v1/audio/speech` endpoint

pub mod backends;
pub mod config;
pub mod error;
pub mod generator;

pub use backends::{Backend, KokoroBackend, MockGenerator, PiperBackend, select_backend};
pub use config::TtsConfig;
pub use error::{Result, TtsError};
pub use generator::{AudioFormat, Language, SpeechGenerator, generate_with_retry};
