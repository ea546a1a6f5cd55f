//! Document loading and text extraction.
//!
//! PDFs go through `pdf-extract`; anything else is read as plain text.
//! Extraction hands the chunker a single text string; page boundaries
//! survive only as a page count on the document.

use std::fs;
use std::path::Path;

use thiserror::Error;
use uuid::Uuid;

use crate::core::errors::ApiError;

/// Extracted text plus its origin. One document is active at a time;
/// ingesting a new one replaces it wholesale.
#[derive(Debug, Clone)]
pub struct Document {
    pub id: String,
    /// File path or name the text came from.
    pub source: String,
    pub text: String,
    pub pages: Option<usize>,
}

impl Document {
    pub fn from_text(source: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            source: source.into(),
            text: text.into(),
            pages: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to read {path}: {reason}")]
    Unreadable { path: String, reason: String },
    #[error("no text could be extracted from {0}")]
    NoText(String),
    #[error("chunking produced no chunks for {0}")]
    NoChunks(String),
}

impl From<IngestError> for ApiError {
    fn from(err: IngestError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

/// Load a document from disk and extract its text.
pub fn load(path: &Path) -> Result<Document, IngestError> {
    let source = path.display().to_string();

    let is_pdf = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));

    let (text, pages) = if is_pdf {
        let bytes = fs::read(path).map_err(|err| IngestError::Unreadable {
            path: source.clone(),
            reason: err.to_string(),
        })?;
        extract_pdf(&bytes, &source)?
    } else {
        let text = fs::read_to_string(path).map_err(|err| IngestError::Unreadable {
            path: source.clone(),
            reason: err.to_string(),
        })?;
        (text, None)
    };

    if text.trim().is_empty() {
        return Err(IngestError::NoText(source));
    }

    Ok(Document {
        id: Uuid::new_v4().to_string(),
        source,
        text,
        pages,
    })
}

/// Extract text from PDF bytes. pdf-extract returns the whole document as
/// one string with form feeds separating pages.
fn extract_pdf(bytes: &[u8], source: &str) -> Result<(String, Option<usize>), IngestError> {
    let text = pdf_extract::extract_text_from_mem(bytes).map_err(|err| IngestError::Unreadable {
        path: source.to_string(),
        reason: err.to_string(),
    })?;

    let pages = text
        .split('\x0C')
        .filter(|page| !page.trim().is_empty())
        .count();

    Ok((text, Some(pages.max(1))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_plain_text_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("notes.txt");
        let mut file = std::fs::File::create(&path).expect("create");
        writeln!(file, "Alpha. Beta. Gamma.").expect("write");

        let document = load(&path).expect("load");
        assert!(document.text.contains("Alpha. Beta. Gamma."));
        assert_eq!(document.pages, None);
        assert!(document.source.ends_with("notes.txt"));
    }

    #[test]
    fn missing_file_is_unreadable() {
        let err = load(Path::new("/definitely/not/here.txt")).unwrap_err();
        assert!(matches!(err, IngestError::Unreadable { .. }));
    }

    #[test]
    fn blank_file_has_no_text() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("blank.txt");
        std::fs::write(&path, "  \n\t\n").expect("write");

        let err = load(&path).unwrap_err();
        assert!(matches!(err, IngestError::NoText(_)));
    }

    #[test]
    fn from_text_assigns_fresh_ids() {
        let a = Document::from_text("a.txt", "text");
        let b = Document::from_text("a.txt", "text");
        assert_ne!(a.id, b.id);
    }
}
