//! Mock speech generator for testing
//!
//! Returns the request text as the "audio" bytes so callers can check what
//! was submitted, and can be told to fail a number of times first.

use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::config::TtsConfig;
use crate::error::{Result, TtsError};
use crate::generator::{AudioFormat, Language, SpeechGenerator};

/// A mock generator for testing retry and sequencing behavior
pub struct MockGenerator {
    /// Calls before this index succeed
    fail_from: usize,
    /// Calls before this index (and from `fail_from`) fail
    fail_count: AtomicUsize,
    /// Current call count
    call_count: AtomicUsize,
    /// Error to return on failure (None = always succeed)
    fail_with: Mutex<Option<TtsError>>,
    /// Texts received, in call order
    received: Mutex<Vec<String>>,
    format: AudioFormat,
}

impl MockGenerator {
    fn build(fail_from: usize, fail_count: usize, fail_with: Option<TtsError>) -> Self {
        Self {
            fail_from,
            fail_count: AtomicUsize::new(fail_count),
            call_count: AtomicUsize::new(0),
            fail_with: Mutex::new(fail_with),
            received: Mutex::new(Vec::new()),
            format: AudioFormat::Wav,
        }
    }

    /// Create a generator that always succeeds
    pub fn always_succeeds() -> Self {
        Self::build(0, 0, None)
    }

    /// Create a generator that always fails with the given error
    pub fn always_fails(error: TtsError) -> Self {
        Self::build(0, usize::MAX, Some(error))
    }

    /// Create a generator that fails `n` times with the given error, then succeeds
    pub fn fails_then_succeeds(n: usize, error: TtsError) -> Self {
        Self::build(0, n, Some(error))
    }

    /// Create a generator that succeeds `n` times, then always fails with the given error
    pub fn succeeds_then_fails(n: usize, error: TtsError) -> Self {
        Self::build(n, usize::MAX, Some(error))
    }

    /// Report a different audio format
    pub fn with_format(mut self, format: AudioFormat) -> Self {
        self.format = format;
        self
    }

    /// Get the number of times generate() was called
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Texts passed to generate(), including failed calls
    pub fn received(&self) -> Vec<String> {
        self.received.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl SpeechGenerator for MockGenerator {
    async fn generate(
        &self,
        text: &str,
        _language: Language,
        _config: &TtsConfig,
    ) -> Result<Vec<u8>> {
        let call_num = self.call_count.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut received) = self.received.lock() {
            received.push(text.to_string());
        }

        if call_num >= self.fail_from && call_num < self.fail_count.load(Ordering::SeqCst) {
            if let Ok(error) = self.fail_with.lock() {
                if let Some(err) = error.as_ref() {
                    return Err(clone_error(err));
                }
            }
        }

        Ok(text.as_bytes().to_vec())
    }

    fn name(&self) -> &'static str {
        "mock"
    }

    fn audio_format(&self) -> AudioFormat {
        self.format
    }
}

/// Clone a TtsError (needed because TtsError doesn't implement Clone)
fn clone_error(err: &TtsError) -> TtsError {
    match err {
        TtsError::MissingEndpoint { engine, setting } => TtsError::MissingEndpoint {
            engine: *engine,
            setting: *setting,
        },
        TtsError::EngineUnavailable(s) => TtsError::EngineUnavailable(s.clone()),
        TtsError::VoiceModelMissing { voice, path } => TtsError::VoiceModelMissing {
            voice: voice.clone(),
            path: path.clone(),
        },
        TtsError::SynthesisFailed(s) => TtsError::SynthesisFailed(s.clone()),
        TtsError::InvalidUrl { url, reason } => TtsError::InvalidUrl {
            url: url.clone(),
            reason: reason.clone(),
        },
        TtsError::RateLimited { retry_after } => TtsError::RateLimited {
            retry_after: *retry_after,
        },
        TtsError::ServerOverloaded { message } => TtsError::ServerOverloaded {
            message: message.clone(),
        },
        TtsError::ApiError {
            engine,
            message,
            status_code,
        } => TtsError::ApiError {
            engine: *engine,
            message: message.clone(),
            status_code: *status_code,
        },
        TtsError::ConfigError(s) => TtsError::ConfigError(s.clone()),
        // Transport and IO errors can't be cloned
        TtsError::Request(_) => TtsError::SynthesisFailed("request error (mock)".to_string()),
        TtsError::Io(e) => TtsError::Io(std::io::Error::new(e.kind(), e.to_string())),
    }
}
