use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

pub mod locate;

// Re-export domain types for convenience
pub use locate::{MatchMode, find_pdfs, is_pdf_path};
pub use unredact_core::{BatchSummary, PdfBackend, TaskResult};

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("cannot resolve {}: {}", .path.display(), .source)]
    Resolve {
        path: PathBuf,
        source: std::io::Error,
    },
    #[cfg(not(feature = "pdf"))]
    #[error("PDF support not compiled in (enable the `pdf` feature of unredact-ingest)")]
    NoPdfSupport,
}

/// The PDF backend used for real runs (MuPDF).
#[cfg(feature = "pdf")]
pub fn default_backend() -> Result<Arc<dyn PdfBackend>, IngestError> {
    Ok(Arc::new(unredact_pdf_mupdf::MupdfBackend::new()))
}

#[cfg(not(feature = "pdf"))]
pub fn default_backend() -> Result<Arc<dyn PdfBackend>, IngestError> {
    Err(IngestError::NoPdfSupport)
}

/// Make `path` absolute, resolving symlinks when it exists.
///
/// A nonexistent path is still made absolute (against the current
/// directory) rather than rejected; locating it later simply finds nothing.
pub fn resolve_path(path: &Path) -> Result<PathBuf, IngestError> {
    match std::fs::canonicalize(path) {
        Ok(p) => Ok(p),
        Err(_) => std::path::absolute(path).map_err(|source| IngestError::Resolve {
            path: path.to_path_buf(),
            source,
        }),
    }
}
