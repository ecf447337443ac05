use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TtsError {
    #[error("No endpoint configured for {engine}. Set `{setting}` in the config.")]
    MissingEndpoint {
        engine: &'static str,
        setting: &'static str,
    },

    #[error("Speech engine not available: {0}")]
    EngineUnavailable(String),

    #[error("Voice model '{voice}' not found at {}. Download the .onnx and .onnx.json files there.", path.display())]
    VoiceModelMissing { voice: String, path: PathBuf },

    #[error("Synthesis failed: {0}")]
    SynthesisFailed(String),

    #[error("Invalid endpoint URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Rate limit exceeded{}", .retry_after.map(|s| format!(". Retry after {} seconds", s)).unwrap_or_default())]
    RateLimited { retry_after: Option<u64> },

    #[error("Server overloaded (HTTP 503): {message}")]
    ServerOverloaded { message: String },

    #[error("{engine} error{}: {message}", status_code.map(|c| format!(" (HTTP {})", c)).unwrap_or_default())]
    ApiError {
        engine: &'static str,
        message: String,
        status_code: Option<u16>,
    },

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl TtsError {
    /// Whether another attempt at the same request could succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::RateLimited { .. } | Self::ServerOverloaded { .. } => true,
            Self::Request(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, TtsError>;
