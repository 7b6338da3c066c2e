use std::path::Path;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("failed to open PDF: {0}")]
    OpenError(String),
    #[error("failed to extract text: {0}")]
    ExtractionError(String),
}

/// Trait for PDF text extraction backends.
///
/// Implementors read the text layer of every page regardless of what is drawn
/// over it; the recovery step (output layout, skip rules) lives in
/// [`crate::recovery`].
pub trait PdfBackend: Send + Sync {
    /// Extract the text of each page in document order.
    ///
    /// The returned vector has one entry per page, each trimmed of
    /// surrounding whitespace. Pages without text yield an empty string.
    fn extract_pages(&self, path: &Path) -> Result<Vec<String>, BackendError>;
}
