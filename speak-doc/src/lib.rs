//! speak-doc: turn documents into spoken audio.
//!
//! The text pipeline (language detection, sentence-aware chunking and
//! duration estimates) lives in [`text`]; [`narrator`] submits the resulting
//! segments to a speech backend one at a time.

pub mod config;
pub mod document;
pub mod narrator;
pub mod output;
pub mod text;

pub use config::SpeakDocConfig;
pub use document::{Document, DocumentKind, read_document};
pub use narrator::Narration;
pub use text::{TextChunk, chunk_text, classify, format_duration};
