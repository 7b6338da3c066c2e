use std::path::Path;

use mupdf::{Document, TextPageFlags};

use unredact_core::{BackendError, PdfBackend};

/// MuPDF-based implementation of [`PdfBackend`].
///
/// This crate is the sole AGPL island: it isolates the mupdf dependency
/// (which is AGPL-3.0) so that non-PDF code paths do not transitively
/// depend on it.
///
/// Text is read from MuPDF's structured text layer, which is built from the
/// page's text-drawing operators alone. Filled rectangles or images painted
/// over the text afterwards do not remove it from that layer, which is what
/// makes overlay-only redactions recoverable.
///
/// Ligatures and whitespace are kept as drawn, and characters lying entirely
/// outside the page's MediaBox are dropped, the same defaults PyMuPDF uses
/// for plain-text extraction.
#[derive(Debug, Default, Clone, Copy)]
pub struct MupdfBackend;

impl MupdfBackend {
    pub fn new() -> Self {
        Self
    }

    fn text_flags() -> TextPageFlags {
        TextPageFlags::PRESERVE_LIGATURES
            | TextPageFlags::PRESERVE_WHITESPACE
            | TextPageFlags::CLIP
    }
}

impl PdfBackend for MupdfBackend {
    fn extract_pages(&self, path: &Path) -> Result<Vec<String>, BackendError> {
        let path_str = path
            .to_str()
            .ok_or_else(|| BackendError::OpenError("invalid path encoding".into()))?;

        let document =
            Document::open(path_str).map_err(|e| BackendError::OpenError(e.to_string()))?;

        if document
            .needs_password()
            .map_err(|e| BackendError::OpenError(e.to_string()))?
        {
            return Err(BackendError::OpenError("document is encrypted".into()));
        }

        let mut pages_text = Vec::new();

        for page_result in document
            .pages()
            .map_err(|e| BackendError::ExtractionError(e.to_string()))?
        {
            let page = page_result.map_err(|e| BackendError::ExtractionError(e.to_string()))?;
            let text_page = page
                .to_text_page(Self::text_flags())
                .map_err(|e| BackendError::ExtractionError(e.to_string()))?;

            // One output line per stext line, blocks in reading order
            let mut page_text = String::new();
            for block in text_page.blocks() {
                for line in block.lines() {
                    let line_text: String = line
                        .chars()
                        .map(|c| c.char().unwrap_or('\u{FFFD}'))
                        .collect();
                    page_text.push_str(&line_text);
                    page_text.push('\n');
                }
            }
            pages_text.push(page_text.trim().to_string());
        }

        tracing::debug!(path = %path.display(), pages = pages_text.len(), "extracted text layer");

        // `document` is dropped (closed) here, before the caller writes output
        Ok(pages_text)
    }
}
