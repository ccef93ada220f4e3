//! Text extraction: turns an uploaded résumé into compact plain text.
//!
//! Two container formats are understood: DOCX (paragraph oriented) and PDF
//! (page oriented). Extraction never aborts a batch: a failing document is
//! reported back as skipped and the remaining documents carry on.

use bytes::Bytes;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

pub mod docx;
pub mod pdf;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("unsupported document format: {0}")]
    UnsupportedFormat(String),

    #[error("Error reading DOCX file: {0}")]
    Docx(String),

    #[error("Error reading PDF file: {0}")]
    Pdf(String),

    #[error("no extractable text")]
    Empty,
}

/// Supported upload formats, keyed by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Docx,
    Pdf,
}

impl DocumentFormat {
    pub fn from_filename(filename: &str) -> Result<Self, ExtractionError> {
        let lower = filename.to_lowercase();
        if lower.ends_with(".docx") {
            Ok(DocumentFormat::Docx)
        } else if lower.ends_with(".pdf") {
            Ok(DocumentFormat::Pdf)
        } else {
            Err(ExtractionError::UnsupportedFormat(filename.to_string()))
        }
    }
}

/// A document as received from the operator, before extraction.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub filename: String,
    pub bytes: Bytes,
}

impl UploadedDocument {
    pub fn new(filename: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            filename: filename.into(),
            bytes: bytes.into(),
        }
    }
}

/// A document dropped from the batch, with the reason shown to the operator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedDocument {
    pub filename: String,
    pub message: String,
}

/// Progress notification emitted after each document is processed.
#[derive(Debug, Clone, Copy)]
pub struct ExtractionProgress<'a> {
    pub completed: usize,
    pub total: usize,
    pub filename: &'a str,
}

impl ExtractionProgress<'_> {
    pub fn fraction(&self) -> f32 {
        if self.total == 0 {
            return 1.0;
        }
        self.completed as f32 / self.total as f32
    }
}

/// Result of extracting a whole batch.
#[derive(Debug, Default)]
pub struct ExtractionBatch {
    /// `(filename, normalized text)` in upload order.
    pub candidates: Vec<(String, String)>,
    pub skipped: Vec<SkippedDocument>,
}

/// Extracts raw text from `bytes` according to `format`. No normalization.
pub fn extract_text(format: DocumentFormat, bytes: &[u8]) -> Result<String, ExtractionError> {
    match format {
        DocumentFormat::Docx => docx::extract_docx_text(bytes),
        DocumentFormat::Pdf => pdf::extract_pdf_text(bytes),
    }
}

/// Collapses every whitespace run (newlines included) into one space and trims.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Detects the format from the filename, extracts and normalizes.
pub fn extract_document(filename: &str, bytes: &[u8]) -> Result<String, ExtractionError> {
    let format = DocumentFormat::from_filename(filename)?;
    let raw = catch_parser_panic(format, || extract_text(format, bytes))?;
    let text = normalize_whitespace(&raw);
    if text.is_empty() {
        return Err(ExtractionError::Empty);
    }
    Ok(text)
}

/// Runs a parser, turning a panic into an ordinary extraction error for
/// `format`. docx-rs and lopdf both unwrap internally on corrupt input.
fn catch_parser_panic<F>(format: DocumentFormat, parse: F) -> Result<String, ExtractionError>
where
    F: FnOnce() -> Result<String, ExtractionError> + std::panic::UnwindSafe,
{
    std::panic::catch_unwind(parse).unwrap_or_else(|_| {
        let message = "parser panicked".to_string();
        Err(match format {
            DocumentFormat::Docx => ExtractionError::Docx(message),
            DocumentFormat::Pdf => ExtractionError::Pdf(message),
        })
    })
}

/// Extracts every document sequentially, calling `on_progress` after each one.
pub fn extract_all<F>(documents: &[UploadedDocument], mut on_progress: F) -> ExtractionBatch
where
    F: FnMut(ExtractionProgress<'_>),
{
    let total = documents.len();
    let mut batch = ExtractionBatch::default();

    for (i, document) in documents.iter().enumerate() {
        match extract_document(&document.filename, &document.bytes) {
            Ok(text) => {
                debug!(
                    filename = %document.filename,
                    chars = text.chars().count(),
                    "extracted document text"
                );
                batch.candidates.push((document.filename.clone(), text));
            }
            Err(e) => {
                warn!(filename = %document.filename, "skipping document: {e}");
                batch.skipped.push(SkippedDocument {
                    filename: document.filename.clone(),
                    message: e.to_string(),
                });
            }
        }

        on_progress(ExtractionProgress {
            completed: i + 1,
            total,
            filename: &document.filename,
        });
    }

    batch
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_filename_is_case_insensitive() {
        assert_eq!(
            DocumentFormat::from_filename("Jane_Doe.PDF").unwrap(),
            DocumentFormat::Pdf
        );
        assert_eq!(
            DocumentFormat::from_filename("cv.Docx").unwrap(),
            DocumentFormat::Docx
        );
    }

    #[test]
    fn test_format_rejects_other_extensions() {
        assert!(DocumentFormat::from_filename("resume.doc").is_err());
        assert!(DocumentFormat::from_filename("resume.txt").is_err());
        assert!(DocumentFormat::from_filename("pdf").is_err());
    }

    #[test]
    fn test_normalize_collapses_newlines_and_tabs() {
        assert_eq!(normalize_whitespace("Hello\nWorld"), "Hello World");
        assert_eq!(
            normalize_whitespace("  Senior\t\tEngineer \r\n\n Rust  "),
            "Senior Engineer Rust"
        );
    }

    #[test]
    fn test_normalize_empty_and_blank() {
        assert_eq!(normalize_whitespace(""), "");
        assert_eq!(normalize_whitespace(" \n\t "), "");
    }

    #[test]
    fn test_extract_document_garbage_pdf_is_error() {
        let result = extract_document("broken.pdf", b"definitely not a pdf");
        assert!(matches!(result, Err(ExtractionError::Pdf(_))));
    }

    #[test]
    fn test_extract_document_garbage_docx_is_error() {
        let result = extract_document("broken.docx", b"definitely not a zip");
        assert!(matches!(result, Err(ExtractionError::Docx(_))));
    }

    #[test]
    fn test_extract_all_skips_failures_and_reports_progress() {
        let documents = vec![
            UploadedDocument::new("good.docx", docx::tests::build_docx(&["Jane Doe", "Rust"])),
            UploadedDocument::new("bad.pdf", b"garbage".to_vec()),
        ];

        let mut seen = Vec::new();
        let batch = extract_all(&documents, |p| {
            seen.push((p.completed, p.total, p.filename.to_string()))
        });

        assert_eq!(
            batch.candidates,
            vec![("good.docx".to_string(), "Jane Doe Rust".to_string())]
        );
        assert_eq!(batch.skipped.len(), 1);
        assert_eq!(batch.skipped[0].filename, "bad.pdf");
        assert!(!batch.skipped[0].message.is_empty());
        assert_eq!(
            seen,
            vec![
                (1, 2, "good.docx".to_string()),
                (2, 2, "bad.pdf".to_string())
            ]
        );
    }

    #[test]
    fn test_extract_all_treats_blank_document_as_skipped() {
        let documents = vec![UploadedDocument::new(
            "blank.docx",
            docx::tests::build_docx(&["", "   "]),
        )];
        let batch = extract_all(&documents, |_| {});
        assert!(batch.candidates.is_empty());
        assert_eq!(batch.skipped[0].message, "no extractable text");
    }

    #[test]
    fn test_parser_panic_becomes_format_error() {
        let docx = catch_parser_panic(DocumentFormat::Docx, || panic!("invalid checksum"));
        assert!(matches!(docx, Err(ExtractionError::Docx(m)) if m == "parser panicked"));

        let pdf = catch_parser_panic(DocumentFormat::Pdf, || panic!("bad xref"));
        assert!(matches!(pdf, Err(ExtractionError::Pdf(_))));
    }

    #[test]
    fn test_extract_all_skips_corrupt_docx_next_to_good_one() {
        let documents = vec![
            UploadedDocument::new("alice.docx", docx::tests::build_docx(&["Alice", "Rust"])),
            UploadedDocument::new("corrupt.docx", docx::tests::corrupt_docx(&["Bob", "Java"])),
        ];

        let batch = extract_all(&documents, |_| {});

        assert_eq!(
            batch.candidates,
            vec![("alice.docx".to_string(), "Alice Rust".to_string())]
        );
        assert_eq!(batch.skipped.len(), 1);
        assert_eq!(batch.skipped[0].filename, "corrupt.docx");
        assert!(batch.skipped[0].message.starts_with("Error reading DOCX file"));
    }

    #[test]
    fn test_progress_fraction() {
        let p = ExtractionProgress {
            completed: 1,
            total: 4,
            filename: "a.pdf",
        };
        assert!((p.fraction() - 0.25).abs() < f32::EPSILON);
    }
}
