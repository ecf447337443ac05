//! Kokoro backend
//!
//! Kokoro-FastAPI and similar servers implement the OpenAI
//! `/v1/audio/speech` endpoint.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use super::read_audio_response;
use crate::config::{TtsConfig, clamp_rate};
use crate::error::{Result, TtsError};
use crate::generator::{AudioFormat, Language, SpeechGenerator};

const ENGINE: &str = "Kokoro";
const MODEL: &str = "kokoro";

#[derive(Debug, Serialize, PartialEq)]
pub struct SpeechRequest<'a> {
    pub model: &'a str,
    pub input: &'a str,
    pub voice: &'a str,
    pub response_format: &'a str,
    pub speed: f32,
}

impl<'a> SpeechRequest<'a> {
    pub fn new(text: &'a str, config: &'a TtsConfig) -> Self {
        Self {
            model: MODEL,
            input: text,
            voice: config.kokoro_voice(),
            response_format: AudioFormat::Mp3.extension(),
            speed: clamp_rate(config.rate),
        }
    }
}

/// Kokoro speech backend (MP3 output).
pub struct KokoroBackend {
    client: Client,
}

impl KokoroBackend {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }
}

impl Default for KokoroBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SpeechGenerator for KokoroBackend {
    async fn generate(
        &self,
        text: &str,
        _language: Language,
        config: &TtsConfig,
    ) -> Result<Vec<u8>> {
        let url = config.kokoro_url.trim();
        if url.is_empty() {
            return Err(TtsError::MissingEndpoint {
                engine: ENGINE,
                setting: "tts.kokoro_url",
            });
        }

        let body = SpeechRequest::new(text, config);
        log::debug!("Kokoro request: voice={} speed={}", body.voice, body.speed);

        let mut request = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .json(&body);

        if let Some(key) = config.kokoro_api_key() {
            request = request.header("Authorization", format!("Bearer {}", key));
        }

        let response = request.send().await?;
        read_audio_response(ENGINE, response).await
    }

    fn name(&self) -> &'static str {
        ENGINE
    }

    fn audio_format(&self) -> AudioFormat {
        AudioFormat::Mp3
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body() {
        let config = TtsConfig::default().with_rate(1.25);
        let body = serde_json::to_value(SpeechRequest::new("Hello there.", &config)).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "model": "kokoro",
                "input": "Hello there.",
                "voice": "af_bella",
                "response_format": "mp3",
                "speed": 1.25,
            })
        );
    }

    #[test]
    fn test_request_uses_configured_voice() {
        let config = TtsConfig {
            kokoro_voice: "bm_george".to_string(),
            ..TtsConfig::default()
        };
        assert_eq!(SpeechRequest::new("x", &config).voice, "bm_george");
    }

    #[tokio::test]
    async fn test_empty_url_is_reported() {
        let config = TtsConfig {
            kokoro_url: " ".to_string(),
            ..TtsConfig::default()
        };
        let result = KokoroBackend::new()
            .generate("Hello.", Language::En, &config)
            .await;
        assert!(matches!(
            result,
            Err(TtsError::MissingEndpoint {
                engine: "Kokoro",
                ..
            })
        ));
    }
}
