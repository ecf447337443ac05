use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::config::TtsConfig;
use crate::error::{Result, TtsError};

/// Languages the speech backends are selected for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Language {
    En,
    Pl,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::En => "EN",
            Self::Pl => "PL",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = TtsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "en" | "english" => Ok(Self::En),
            "pl" | "polish" => Ok(Self::Pl),
            _ => Err(TtsError::ConfigError(format!(
                "Unknown language: {} (expected EN or PL)",
                s
            ))),
        }
    }
}

/// Container format of the bytes a backend returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    Wav,
    Mp3,
}

impl AudioFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Wav => "wav",
            Self::Mp3 => "mp3",
        }
    }
}

/// Anything that can turn a piece of text into encoded audio.
#[async_trait]
pub trait SpeechGenerator: Send + Sync {
    /// Synthesize `text` and return the encoded audio bytes.
    async fn generate(&self, text: &str, language: Language, config: &TtsConfig)
    -> Result<Vec<u8>>;

    /// Backend name for display
    fn name(&self) -> &'static str;

    /// Format of the bytes returned by `generate`
    fn audio_format(&self) -> AudioFormat;
}

/// Longest `Retry-After` wait honoured between attempts.
pub const MAX_RETRY_WAIT_SECS: u64 = 60;

/// Seconds to wait before retrying after `error`.
fn retry_wait(error: &TtsError) -> Option<u64> {
    match error {
        TtsError::RateLimited {
            retry_after: Some(secs),
        } => Some((*secs).min(MAX_RETRY_WAIT_SECS)),
        _ => None,
    }
}

/// Call `generate`, retrying transient failures up to `max_retries` extra times.
pub async fn generate_with_retry(
    generator: &dyn SpeechGenerator,
    text: &str,
    language: Language,
    config: &TtsConfig,
    max_retries: u32,
) -> Result<Vec<u8>> {
    let attempts = max_retries + 1;
    let mut attempt = 0;

    loop {
        attempt += 1;
        match generator.generate(text, language, config).await {
            Ok(audio) => return Ok(audio),
            Err(e) if e.is_retryable() && attempt < attempts => {
                log::warn!(
                    "{} generation failed (attempt {}/{}): {}",
                    generator.name(),
                    attempt,
                    attempts,
                    e
                );
                if let Some(secs) = retry_wait(&e) {
                    tokio::time::sleep(std::time::Duration::from_secs(secs)).await;
                }
            }
            Err(e) => return Err(e),
        }
    }
}
