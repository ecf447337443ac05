use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{Result, TtsError};

pub const DEFAULT_PIPER_VOICE: &str = "pl_PL-gosia-medium";
pub const DEFAULT_KOKORO_URL: &str = "http://localhost:8880/v1/audio/speech";
pub const DEFAULT_KOKORO_VOICE: &str = "af_bella";

/// Environment variable consulted when no Kokoro API key is configured.
pub const KOKORO_API_KEY_ENV: &str = "KOKORO_API_KEY";

const MIN_RATE: f32 = 0.25;
const MAX_RATE: f32 = 4.0;

/// Settings shared by every speech backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TtsConfig {
    /// Piper HTTP server URL. Empty means run the local `piper` executable.
    pub piper_url: String,

    /// Piper voice id, e.g. `pl_PL-gosia-medium`
    pub piper_voice: String,

    /// Path to the `piper` executable (looked up on PATH when unset)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub piper_binary: Option<PathBuf>,

    /// Directory holding `<voice>.onnx` models for local Piper
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voices_dir: Option<PathBuf>,

    /// Kokoro OpenAI-compatible speech endpoint
    pub kokoro_url: String,

    /// Optional bearer token for Kokoro
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kokoro_api_key: Option<String>,

    /// Kokoro voice id, e.g. `af_bella`
    pub kokoro_voice: String,

    /// Speaking rate multiplier (1.0 = normal)
    pub rate: f32,
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            piper_url: String::new(),
            piper_voice: DEFAULT_PIPER_VOICE.to_string(),
            piper_binary: None,
            voices_dir: None,
            kokoro_url: DEFAULT_KOKORO_URL.to_string(),
            kokoro_api_key: None,
            kokoro_voice: DEFAULT_KOKORO_VOICE.to_string(),
            rate: 1.0,
        }
    }
}

impl TtsConfig {
    /// Set the speaking rate, clamped to the range both engines accept.
    pub fn with_rate(mut self, rate: f32) -> Self {
        self.rate = clamp_rate(rate);
        self
    }

    /// Whether Piper should be reached over HTTP rather than run locally.
    pub fn piper_uses_server(&self) -> bool {
        self.piper_url.trim().starts_with("http")
    }

    /// Piper voice, falling back to the default when left blank.
    pub fn piper_voice(&self) -> &str {
        non_blank(&self.piper_voice).unwrap_or(DEFAULT_PIPER_VOICE)
    }

    /// Kokoro voice, falling back to the default when left blank.
    pub fn kokoro_voice(&self) -> &str {
        non_blank(&self.kokoro_voice).unwrap_or(DEFAULT_KOKORO_VOICE)
    }

    /// Directory searched for local Piper voice models.
    ///
    /// Defaults to `<data dir>/speak-doc/voices`.
    pub fn voices_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.voices_dir {
            return Ok(dir.clone());
        }
        dirs::data_dir()
            .map(|d| d.join("speak-doc").join("voices"))
            .ok_or_else(|| TtsError::ConfigError("Could not determine data directory".into()))
    }

    /// Kokoro API key from config, falling back to `KOKORO_API_KEY`.
    pub fn kokoro_api_key(&self) -> Option<String> {
        if let Some(key) = self.kokoro_api_key.as_deref().and_then(non_blank) {
            return Some(key.to_string());
        }
        std::env::var(KOKORO_API_KEY_ENV)
            .ok()
            .filter(|k| !k.trim().is_empty())
    }
}

/// Clamp a speaking rate into the supported range.
pub fn clamp_rate(rate: f32) -> f32 {
    rate.clamp(MIN_RATE, MAX_RATE)
}

fn non_blank(s: &str) -> Option<&str> {
    let trimmed = s.trim();
    if trimmed.is_empty() { None } else { Some(trimmed) }
}
