//! Speech backend implementations

mod kokoro;
pub mod mock;
mod piper;

pub use kokoro::{KokoroBackend, SpeechRequest};
pub use mock::MockGenerator;
pub use piper::{PiperBackend, PiperRuntime, model_path, server_url};

use async_trait::async_trait;
use reqwest::{Response, StatusCode, header};

use crate::config::TtsConfig;
use crate::error::{Result, TtsError};
use crate::generator::{AudioFormat, Language, SpeechGenerator};

/// The two engines, chosen by document language.
pub enum Backend {
    Piper(PiperBackend),
    Kokoro(KokoroBackend),
}

impl Backend {
    /// Backend that reads `language`: Piper for Polish, Kokoro for English.
    pub fn for_language(language: Language) -> Self {
        match language {
            Language::Pl => Self::Piper(PiperBackend::new()),
            Language::En => Self::Kokoro(KokoroBackend::new()),
        }
    }

    fn inner(&self) -> &dyn SpeechGenerator {
        match self {
            Self::Piper(b) => b,
            Self::Kokoro(b) => b,
        }
    }
}

/// Create the backend for a detected language.
pub fn select_backend(language: Language) -> Backend {
    Backend::for_language(language)
}

#[async_trait]
impl SpeechGenerator for Backend {
    async fn generate(
        &self,
        text: &str,
        language: Language,
        config: &TtsConfig,
    ) -> Result<Vec<u8>> {
        self.inner().generate(text, language, config).await
    }

    fn name(&self) -> &'static str {
        self.inner().name()
    }

    fn audio_format(&self) -> AudioFormat {
        self.inner().audio_format()
    }
}

/// Turn an HTTP response into audio bytes, mapping failures to `TtsError`.
pub(crate) async fn read_audio_response(
    engine: &'static str,
    response: Response,
) -> Result<Vec<u8>> {
    let status = response.status();
    if !status.is_success() {
        let retry_after = response
            .headers()
            .get(header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok());
        let body = response.text().await.unwrap_or_default();
        return Err(status_error(engine, status, retry_after, &body));
    }

    let audio = response.bytes().await?;
    if audio.is_empty() {
        return Err(TtsError::ApiError {
            engine,
            message: "empty audio response".to_string(),
            status_code: Some(status.as_u16()),
        });
    }
    Ok(audio.to_vec())
}

fn status_error(
    engine: &'static str,
    status: StatusCode,
    retry_after: Option<u64>,
    body: &str,
) -> TtsError {
    let reason = status.canonical_reason().unwrap_or("Unknown status");
    let message = if body.trim().is_empty() {
        reason.to_string()
    } else {
        format!("{}: {}", reason, body.trim())
    };

    match status {
        StatusCode::TOO_MANY_REQUESTS => TtsError::RateLimited { retry_after },
        StatusCode::SERVICE_UNAVAILABLE => TtsError::ServerOverloaded { message },
        _ => TtsError::ApiError {
            engine,
            message,
            status_code: Some(status.as_u16()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_selection() {
        let polish = select_backend(Language::Pl);
        assert!(matches!(polish, Backend::Piper(_)));
        assert_eq!(polish.name(), "Piper");
        assert_eq!(polish.audio_format(), AudioFormat::Wav);

        let english = select_backend(Language::En);
        assert!(matches!(english, Backend::Kokoro(_)));
        assert_eq!(english.name(), "Kokoro");
        assert_eq!(english.audio_format(), AudioFormat::Mp3);
    }

    #[test]
    fn test_status_mapping() {
        assert!(matches!(
            status_error("Kokoro", StatusCode::TOO_MANY_REQUESTS, Some(12), ""),
            TtsError::RateLimited {
                retry_after: Some(12)
            }
        ));
        assert!(matches!(
            status_error("Piper", StatusCode::SERVICE_UNAVAILABLE, None, "warming up"),
            TtsError::ServerOverloaded { .. }
        ));

        match status_error("Kokoro", StatusCode::BAD_REQUEST, None, "unknown voice") {
            TtsError::ApiError {
                engine,
                message,
                status_code,
            } => {
                assert_eq!(engine, "Kokoro");
                assert_eq!(message, "Bad Request: unknown voice");
                assert_eq!(status_code, Some(400));
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[tokio::test]
    async fn test_backend_delegates_errors() {
        let config = TtsConfig {
            kokoro_url: String::new(),
            ..TtsConfig::default()
        };
        let result = select_backend(Language::En)
            .generate("Hi.", Language::En, &config)
            .await;
        assert!(matches!(result, Err(TtsError::MissingEndpoint { .. })));
    }
}
