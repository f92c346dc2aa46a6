//! Text extraction by file type
//!
//! PDFs are read page by page with lopdf; a page whose text cannot be
//! decoded contributes nothing rather than failing the document. Plain text
//! and markdown are read as UTF-8 verbatim.

use crate::error::AcquireError;
use lopdf::Document;
use shared_types::{DocumentReference, DocumentText};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Pdf,
    PlainText,
    Markdown,
}

impl FileType {
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "pdf" => Some(FileType::Pdf),
            "txt" => Some(FileType::PlainText),
            "md" | "markdown" => Some(FileType::Markdown),
            _ => None,
        }
    }

    pub fn from_reference(reference: &DocumentReference) -> Result<Self, AcquireError> {
        reference
            .extension()
            .and_then(|ext| Self::from_extension(&ext))
            .ok_or_else(|| AcquireError::UnsupportedFileType(reference.file_name().to_string()))
    }
}

pub fn extract_text(file_type: FileType, path: &Path) -> Result<DocumentText, AcquireError> {
    match file_type {
        FileType::Pdf => extract_pdf(path),
        FileType::PlainText | FileType::Markdown => extract_utf8(path),
    }
}

/// Concatenate per-page text in page order
pub fn extract_pdf(path: &Path) -> Result<DocumentText, AcquireError> {
    let doc = Document::load(path)
        .map_err(|e| AcquireError::Extraction(format!("Failed to parse PDF: {}", e)))?;

    let pages = doc.get_pages();
    let mut text = String::new();

    for &page_number in pages.keys() {
        match doc.extract_text(&[page_number]) {
            Ok(page_text) => text.push_str(&page_text),
            Err(e) => {
                tracing::debug!(page_number, error = %e, "No extractable text on page, using empty text")
            }
        }
    }

    tracing::info!(pages = pages.len(), characters = text.len(), "Extracted PDF text");
    Ok(DocumentText::new(text, pages.len()))
}

pub fn extract_utf8(path: &Path) -> Result<DocumentText, AcquireError> {
    let bytes = std::fs::read(path)?;
    let text = String::from_utf8(bytes)
        .map_err(|e| AcquireError::Extraction(format!("Document is not valid UTF-8: {}", e)))?;
    Ok(DocumentText::plain(text))
}
