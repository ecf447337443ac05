//! Piper backend
//!
//! Talks to a Piper HTTP server when `piper_url` is set, otherwise runs the
//! local `piper` executable as a subprocess.

use async_trait::async_trait;
use reqwest::{Client, Url};
use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::{ChildStdin, Command};
use tokio::sync::OnceCell;

use super::read_audio_response;
use crate::config::{TtsConfig, clamp_rate};
use crate::error::{Result, TtsError};
use crate::generator::{AudioFormat, Language, SpeechGenerator};

const ENGINE: &str = "Piper";

/// Resolved local engine: executable plus voice model.
#[derive(Debug)]
pub struct PiperRuntime {
    pub binary: PathBuf,
    pub model: PathBuf,
    pub voice: String,
}

impl PiperRuntime {
    /// Find the executable and voice model described by `config`.
    pub fn locate(config: &TtsConfig) -> Result<Self> {
        let binary = match &config.piper_binary {
            Some(path) => {
                if !path.exists() {
                    return Err(TtsError::EngineUnavailable(format!(
                        "piper not found at specified path: {}",
                        path.display()
                    )));
                }
                path.clone()
            }
            None => which::which("piper").map_err(|_| {
                TtsError::EngineUnavailable(
                    "piper not found on PATH. Install it from https://github.com/rhasspy/piper or set tts.piper_url to a Piper server".into(),
                )
            })?,
        };

        let voice = config.piper_voice().to_string();
        let model = model_path(&config.voices_dir()?, &voice);
        if !model.exists() {
            return Err(TtsError::VoiceModelMissing { voice, path: model });
        }

        log::debug!(
            "Piper runtime: binary={} model={}",
            binary.display(),
            model.display()
        );

        Ok(Self {
            binary,
            model,
            voice,
        })
    }
}

/// Path of the `.onnx` model for `voice` inside `voices_dir`.
pub fn model_path(voices_dir: &Path, voice: &str) -> PathBuf {
    voices_dir.join(format!("{}.onnx", voice))
}

/// Build the GET URL for a Piper HTTP server request.
///
/// A `voice` already present in the configured URL is left alone.
pub fn server_url(config: &TtsConfig, text: &str) -> Result<Url> {
    let base = config.piper_url.trim();
    let mut url = Url::parse(base).map_err(|e| TtsError::InvalidUrl {
        url: base.to_string(),
        reason: e.to_string(),
    })?;

    let has_voice = url.query_pairs().any(|(key, _)| key == "voice");
    {
        let mut pairs = url.query_pairs_mut();
        pairs.append_pair("text", text);
        pairs.append_pair("output_file", "false");
        if !has_voice {
            pairs.append_pair("voice", config.piper_voice());
        }
    }

    Ok(url)
}

/// Piper's `--length_scale` is a duration multiplier, the inverse of rate.
fn length_scale(rate: f32) -> f32 {
    1.0 / clamp_rate(rate)
}

/// Piper speech backend (WAV output).
pub struct PiperBackend {
    client: Client,
    runtime: OnceCell<PiperRuntime>,
}

impl PiperBackend {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            runtime: OnceCell::new(),
        }
    }

    /// The local runtime, located on first use.
    ///
    /// Concurrent first callers share one initialization; a failed attempt
    /// leaves the cell empty so the next call tries again.
    pub async fn runtime(&self, config: &TtsConfig) -> Result<&PiperRuntime> {
        self.runtime
            .get_or_try_init(|| async {
                log::info!("Initializing local Piper engine...");
                PiperRuntime::locate(config)
            })
            .await
    }

    async fn generate_via_server(&self, text: &str, config: &TtsConfig) -> Result<Vec<u8>> {
        let url = server_url(config, text)?;
        log::debug!("Piper server request: {}", url);

        let response = self.client.get(url).send().await?;
        read_audio_response(ENGINE, response).await
    }

    async fn generate_locally(&self, text: &str, config: &TtsConfig) -> Result<Vec<u8>> {
        let runtime = self.runtime(config).await?;
        let output = tempfile::Builder::new()
            .prefix("speak-doc-")
            .suffix(".wav")
            .tempfile()?;

        let mut child = Command::new(&runtime.binary)
            .arg("--model")
            .arg(&runtime.model)
            .arg("--output_file")
            .arg(output.path())
            .arg("--length_scale")
            .arg(format!("{:.3}", length_scale(config.rate)))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                TtsError::EngineUnavailable(format!(
                    "Failed to execute {}: {}",
                    runtime.binary.display(),
                    e
                ))
            })?;

        // Piper treats every input line as an utterance
        let line = text.replace(['\r', '\n'], " ");
        let fed = match child.stdin.take() {
            Some(stdin) => feed_stdin(stdin, &line).await,
            None => Ok(()),
        };

        let result = child.wait_with_output().await?;
        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(TtsError::SynthesisFailed(format!(
                "piper exited with {}: {}",
                result.status,
                stderr.trim()
            )));
        }
        match fed {
            Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
                log::debug!("piper closed stdin early: {}", e);
            }
            other => other?,
        }

        let audio = tokio::fs::read(output.path()).await?;
        if audio.is_empty() {
            return Err(TtsError::SynthesisFailed(format!(
                "piper produced no audio for voice {}",
                runtime.voice
            )));
        }
        Ok(audio)
    }
}

/// Write one line of input and close stdin.
async fn feed_stdin(mut stdin: ChildStdin, line: &str) -> io::Result<()> {
    stdin.write_all(line.as_bytes()).await?;
    stdin.write_all(b"\n").await?;
    stdin.shutdown().await
}

impl Default for PiperBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SpeechGenerator for PiperBackend {
    async fn generate(
        &self,
        text: &str,
        _language: Language,
        config: &TtsConfig,
    ) -> Result<Vec<u8>> {
        if config.piper_uses_server() {
            self.generate_via_server(text, config).await
        } else {
            self.generate_locally(text, config).await
        }
    }

    fn name(&self) -> &'static str {
        ENGINE
    }

    fn audio_format(&self) -> AudioFormat {
        AudioFormat::Wav
    }
}
