use lopdf::Document;
use tracing::debug;

use crate::extraction::ExtractionError;

/// Extracts text page by page in page order.
///
/// A page lopdf cannot decode contributes an empty string. When no page
/// yields any text, `pdf-extract` gets one attempt on the whole document
/// since it copes with more font encodings.
pub fn extract_pdf_text(bytes: &[u8]) -> Result<String, ExtractionError> {
    let doc = Document::load_mem(bytes).map_err(|e| ExtractionError::Pdf(e.to_string()))?;

    let pages: Vec<Option<String>> = doc
        .get_pages()
        .into_keys()
        .map(|page_number| doc.extract_text(&[page_number]).ok())
        .collect();

    let text = join_pages(pages);
    if !text.trim().is_empty() {
        return Ok(text);
    }

    // pdf-extract panics on some malformed font tables
    match std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes)) {
        Ok(Ok(fallback)) => Ok(fallback),
        Ok(Err(e)) => {
            debug!("pdf-extract fallback produced nothing: {e}");
            Ok(text)
        }
        Err(_) => {
            debug!("pdf-extract fallback panicked");
            Ok(text)
        }
    }
}

/// Concatenates per-page text; pages without text count as empty.
pub fn join_pages<I>(pages: I) -> String
where
    I: IntoIterator<Item = Option<String>>,
{
    pages.into_iter().flatten().collect()
}
