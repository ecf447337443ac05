//! speak-doc configuration management.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tts_client::TtsConfig;

use crate::text::DEFAULT_MAX_LENGTH;
use crate::text::language::DEFAULT_PL_THRESHOLD;

const DEFAULT_MAX_RETRIES: u32 = 2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeakDocConfig {
    /// Maximum characters per TTS segment
    #[serde(default = "default_max_chunk_length")]
    pub max_chunk_length: usize,

    /// Diacritic density above which text is treated as Polish
    #[serde(default = "default_pl_threshold")]
    pub pl_threshold: f64,

    /// Extra attempts for transient backend failures
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Speech backend settings
    #[serde(default)]
    pub tts: TtsConfig,
}

fn default_max_chunk_length() -> usize {
    DEFAULT_MAX_LENGTH
}

fn default_pl_threshold() -> f64 {
    DEFAULT_PL_THRESHOLD
}

fn default_max_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}

impl Default for SpeakDocConfig {
    fn default() -> Self {
        Self {
            max_chunk_length: default_max_chunk_length(),
            pl_threshold: default_pl_threshold(),
            max_retries: default_max_retries(),
            tts: TtsConfig::default(),
        }
    }
}

impl SpeakDocConfig {
    /// Get the config file path: ~/.config/cli-programs/speak-doc.toml
    pub fn config_path() -> Result<PathBuf> {
        let home = std::env::var("HOME").or_else(|_| std::env::var("USERPROFILE"))?;
        Ok(PathBuf::from(home)
            .join(".config")
            .join("cli-programs")
            .join("speak-doc.toml"))
    }

    /// Load config from file, returning default if file doesn't exist
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)?;
        Self::parse(&content)
    }

    /// Parse config from TOML text
    pub fn parse(content: &str) -> Result<Self> {
        let config: SpeakDocConfig = toml::from_str(content)?;
        Ok(config)
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }
}
