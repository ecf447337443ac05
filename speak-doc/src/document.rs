// Document loading and text extraction

use anyhow::{Context, Result};
use serde::Serialize;
use std::io::Read;
use std::path::Path;

/// Input path that means "read from stdin".
pub const STDIN_PATH: &str = "-";

const PDF_MAGIC: &[u8] = b"%PDF";

/// How the text was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Pdf,
    Text,
}

/// A loaded document
#[derive(Debug, Clone)]
pub struct Document {
    /// File name, `stdin` or `inline`
    pub name: String,
    pub kind: DocumentKind,
    /// Extracted plain text
    pub text: String,
}

impl Document {
    /// Wrap text given directly on the command line
    pub fn inline(text: &str) -> Result<Self> {
        Self::from_text("inline".to_string(), DocumentKind::Text, text.to_string())
    }

    fn from_text(name: String, kind: DocumentKind, text: String) -> Result<Self> {
        if text.trim().is_empty() {
            anyhow::bail!("No text found in {}", name);
        }
        Ok(Self { name, kind, text })
    }

    /// Number of characters in the text
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    /// Approximate word count
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}

/// Load a PDF or text document from a path, or stdin for `-`
pub fn read_document(path: &Path) -> Result<Document> {
    if path.as_os_str() == STDIN_PATH {
        let mut bytes = Vec::new();
        std::io::stdin()
            .read_to_end(&mut bytes)
            .context("Failed to read stdin")?;
        return parse_bytes("stdin".to_string(), is_pdf_path(path), &bytes);
    }

    if !path.exists() {
        anyhow::bail!("File not found: {}", path.display());
    }

    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    parse_bytes(name, is_pdf_path(path), &bytes)
}

/// Decode raw bytes, sniffing for PDF content when the name doesn't say
fn parse_bytes(name: String, pdf_by_name: bool, bytes: &[u8]) -> Result<Document> {
    if pdf_by_name || bytes.starts_with(PDF_MAGIC) {
        let text = extract_pdf_text(bytes)
            .with_context(|| format!("Failed to extract text from PDF {}", name))?;
        log::debug!("Extracted {} bytes of text from {}", text.len(), name);
        Document::from_text(name, DocumentKind::Pdf, text)
    } else {
        let text = String::from_utf8_lossy(bytes).into_owned();
        Document::from_text(name, DocumentKind::Text, text)
    }
}

fn is_pdf_path(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false)
}

/// Extract plain text from PDF bytes, one blank line between pages
fn extract_pdf_text(bytes: &[u8]) -> Result<String> {
    let raw = pdf_extract::extract_text_from_mem(bytes)
        .map_err(|e| anyhow::anyhow!("{}", e))?;
    Ok(normalize_pages(&raw))
}

/// Turn form-feed page breaks into blank lines and drop trailing spaces
fn normalize_pages(raw: &str) -> String {
    raw.split('\u{c}')
        .map(|page| {
            page.lines()
                .map(str::trim_end)
                .collect::<Vec<_>>()
                .join("\n")
        })
        .filter(|page| !page.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_read_text_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "Ala ma kota. Kot ma Alę.").unwrap();

        let doc = read_document(&path).unwrap();
        assert_eq!(doc.name, "notes.txt");
        assert_eq!(doc.kind, DocumentKind::Text);
        assert_eq!(doc.text, "Ala ma kota. Kot ma Alę.");
        assert_eq!(doc.word_count(), 6);
        assert_eq!(doc.char_count(), 24);
    }

    #[test]
    fn test_missing_file() {
        let err = read_document(Path::new("/nonexistent/book.txt")).unwrap_err();
        assert!(err.to_string().contains("File not found"));
    }

    #[test]
    fn test_empty_file_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.txt");
        std::fs::write(&path, " \n\t").unwrap();

        let err = read_document(&path).unwrap_err();
        assert!(err.to_string().contains("No text found"));
    }

    #[test]
    fn test_invalid_utf8_is_lossy() {
        let doc = parse_bytes("odd.txt".to_string(), false, b"caf\xe9 au lait").unwrap();
        assert!(doc.text.starts_with("caf"));
        assert!(doc.text.ends_with(" au lait"));
    }

    #[test]
    fn test_broken_pdf_reports_error() {
        let err = parse_bytes("bad.txt".to_string(), false, b"%PDF-1.4 garbage").unwrap_err();
        assert!(err.to_string().contains("Failed to extract text from PDF bad.txt"));
    }

    #[test]
    fn test_pdf_detection_by_extension() {
        assert!(is_pdf_path(Path::new("report.PDF")));
        assert!(is_pdf_path(Path::new("a/b/report.pdf")));
        assert!(!is_pdf_path(Path::new("report.txt")));
        assert!(!is_pdf_path(Path::new("-")));
    }

    #[test]
    fn test_normalize_pages() {
        let raw = "Page one  \nline two\u{c}\n\u{c}Page three";
        assert_eq!(normalize_pages(raw), "Page one\nline two\n\nPage three");
    }

    #[test]
    fn test_inline_document() {
        let doc = Document::inline("Hello.").unwrap();
        assert_eq!(doc.name, "inline");
        assert!(Document::inline("   ").is_err());
    }
}
