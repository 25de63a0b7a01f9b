//! Document text extraction and uploaded-paper parsing.

use std::path::Path;

use examprep_core::model::{normalize_term, PaperSet, Question};

use crate::error::SourceError;
use crate::parse::{extract_year, numbered_questions};

/// Pulls plain text out of a binary document.
///
/// Implementations are synchronous and may be CPU-heavy; async callers run
/// them on the blocking pool.
pub trait DocumentTextExtractor: Send + Sync {
    /// Extract the text of at most `max_pages` pages, in page order.
    fn extract(&self, bytes: &[u8], max_pages: usize) -> Result<String, SourceError>;
}

/// PDF text extraction backed by `lopdf`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfTextExtractor;

impl DocumentTextExtractor for PdfTextExtractor {
    fn extract(&self, bytes: &[u8], max_pages: usize) -> Result<String, SourceError> {
        let doc = lopdf::Document::load_mem(bytes)
            .map_err(|e| SourceError::Extraction(format!("failed to open PDF: {e}")))?;

        let pages: Vec<u32> = doc.get_pages().keys().copied().take(max_pages).collect();
        if pages.is_empty() {
            return Err(SourceError::Extraction("PDF has no pages".into()));
        }

        // A page that fails to decode is skipped rather than failing the document.
        let chunks: Vec<String> = pages
            .iter()
            .filter_map(|&page| match doc.extract_text(&[page]) {
                Ok(text) => Some(text),
                Err(e) => {
                    tracing::debug!(page, error = %e, "skipping unreadable PDF page");
                    None
                }
            })
            .filter(|text| !text.trim().is_empty())
            .collect();
        Ok(chunks.join("\n"))
    }
}

/// Whether bytes start with the PDF magic number.
pub fn looks_like_pdf(bytes: &[u8]) -> bool {
    bytes.starts_with(b"%PDF-")
}

/// Read an uploaded document from disk as text. PDFs go through `extractor`;
/// anything else must be UTF-8.
pub fn read_document(
    path: &Path,
    extractor: &dyn DocumentTextExtractor,
    max_pages: usize,
) -> Result<String, SourceError> {
    let bytes = std::fs::read(path)
        .map_err(|e| SourceError::Extraction(format!("cannot read {}: {e}", path.display())))?;
    let is_pdf = looks_like_pdf(&bytes)
        || path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
    if is_pdf {
        extractor.extract(&bytes, max_pages)
    } else {
        String::from_utf8(bytes)
            .map_err(|_| SourceError::Extraction(format!("{} is not UTF-8 text", path.display())))
    }
}

/// Build a paper set from uploaded document text.
///
/// Questions are found by their leading numbers. The year comes from `hint`
/// (typically the file name), then from the text itself, else 0. Uploaded
/// questions carry no gold answer.
pub fn paper_set_from_document(text: &str, subject: &str, term: &str, hint: &str) -> PaperSet {
    let year = extract_year(hint).or_else(|| extract_year(text)).unwrap_or(0);
    let term = normalize_term(term);
    let prefix = if year == 0 {
        "u".to_string()
    } else {
        year.to_string()
    };

    numbered_questions(text)
        .into_iter()
        .enumerate()
        .map(|(i, text)| Question {
            id: format!("{prefix}-{}", i + 1),
            year,
            subject: subject.trim().to_string(),
            term: term.clone(),
            text,
            kind: "general".into(),
            choices: None,
            answer: None,
        })
        .collect()
}
