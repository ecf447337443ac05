//! Output directory layout: one audio file per segment plus a run manifest.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tts_client::{AudioFormat, Language};

use crate::document::DocumentKind;
use crate::text::TextChunk;

pub const MANIFEST_FILE: &str = "manifest.json";

/// Record of a single synthesized segment.
#[derive(Debug, Clone, Serialize)]
pub struct SegmentRecord {
    pub index: usize,
    pub text: String,
    /// File name relative to the output directory
    pub file: String,
    pub bytes: usize,
}

/// Description of a completed run, written next to the audio files.
#[derive(Debug, Clone, Serialize)]
pub struct Manifest {
    pub source: String,
    pub kind: DocumentKind,
    pub language: Language,
    pub backend: String,
    pub format: AudioFormat,
    pub max_chunk_length: usize,
    pub char_count: usize,
    /// Estimated reading time of the whole document, `m:ss`
    pub estimated_duration: String,
    pub total_segments: usize,
    pub generated_at: DateTime<Utc>,
    pub segments: Vec<SegmentRecord>,
}

/// Writes segment audio into a directory.
pub struct OutputDir {
    dir: PathBuf,
    format: AudioFormat,
}

impl OutputDir {
    /// Create (if needed) the output directory.
    pub fn create(dir: &Path, format: AudioFormat) -> Result<Self> {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory {}", dir.display()))?;
        Ok(Self {
            dir: dir.to_path_buf(),
            format,
        })
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }

    /// File name for a segment, e.g. `segment_007.mp3`.
    pub fn segment_file_name(&self, index: usize) -> String {
        format!("segment_{:03}.{}", index, self.format.extension())
    }

    /// Write one segment's audio and return its record.
    pub fn write_segment(&self, chunk: &TextChunk, audio: &[u8]) -> Result<SegmentRecord> {
        let file = self.segment_file_name(chunk.index);
        let path = self.dir.join(&file);
        fs::write(&path, audio).with_context(|| format!("Failed to write {}", path.display()))?;

        Ok(SegmentRecord {
            index: chunk.index,
            text: chunk.text.clone(),
            file,
            bytes: audio.len(),
        })
    }

    /// Write the run manifest.
    pub fn write_manifest(&self, manifest: &Manifest) -> Result<PathBuf> {
        let path = self.dir.join(MANIFEST_FILE);
        let file = File::create(&path).context("Failed to create manifest file")?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, manifest).context("Failed to write manifest JSON")?;
        Ok(path)
    }
}

/// Default output directory: `<input stem>_audio` beside the input, or `speak-doc_audio`.
pub fn default_output_dir(input: Option<&Path>) -> PathBuf {
    match input.and_then(|p| p.file_stem().map(|stem| (p, stem))) {
        Some((path, stem)) if path.as_os_str() != crate::document::STDIN_PATH => {
            path.with_file_name(format!("{}_audio", stem.to_string_lossy()))
        }
        _ => PathBuf::from("speak-doc_audio"),
    }
}
