//! PDF text extraction backed by `lopdf`.

use std::path::Path;

use log::{debug, warn};

use super::PdfTextExtractor;

#[derive(Debug, Default, Clone, Copy)]
pub struct LopdfTextExtractor;

/// Joins per-page text with blank lines, dropping pages without text.
pub fn join_pages(pages: &[String]) -> String {
    pages
        .iter()
        .map(|page| page.trim())
        .filter(|page| !page.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

impl PdfTextExtractor for LopdfTextExtractor {
    fn extract_text(&self, path: &Path) -> Result<String, String> {
        let document = lopdf::Document::load(path)
            .map_err(|err| format!("failed to read {}: {err}", path.display()))?;
        if document.is_encrypted() {
            return Err("the document is encrypted".to_string());
        }

        let page_numbers: Vec<u32> = document.get_pages().keys().copied().collect();
        if page_numbers.is_empty() {
            return Err("the document has no pages".to_string());
        }

        let mut pages = Vec::with_capacity(page_numbers.len());
        for page_number in &page_numbers {
            match document.extract_text(&[*page_number]) {
                Ok(text) => pages.push(text),
                Err(err) => warn!(
                    "Skipping page {} of {}: {}",
                    page_number,
                    path.display(),
                    err
                ),
            }
        }

        let text = join_pages(&pages);
        if text.is_empty() {
            return Err("no extractable text found (scanned document?)".to_string());
        }
        debug!(
            "Extracted {} chars from {} page(s) of {}",
            text.chars().count(),
            page_numbers.len(),
            path.display()
        );
        Ok(text)
    }
}
