use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// How file extensions are compared when scanning directories.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MatchMode {
    /// `.pdf`, `.PDF`, `.Pdf`, ... all match.
    #[default]
    CaseInsensitive,
    /// Only a literal lower-case `.pdf` suffix matches.
    CaseSensitive,
}

impl MatchMode {
    pub fn from_case_sensitive(case_sensitive: bool) -> Self {
        if case_sensitive {
            MatchMode::CaseSensitive
        } else {
            MatchMode::CaseInsensitive
        }
    }

    fn matches(self, path: &Path) -> bool {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return false;
        };
        match self {
            MatchMode::CaseInsensitive => ext.eq_ignore_ascii_case("pdf"),
            MatchMode::CaseSensitive => ext == "pdf",
        }
    }
}

/// Returns true if `path` names a PDF by extension (case-insensitive).
pub fn is_pdf_path(path: &Path) -> bool {
    MatchMode::CaseInsensitive.matches(path)
}

/// Find the PDFs to process under `path`.
///
/// - A regular file with a `.pdf` extension (any case) is returned alone;
///   its parent directory is not scanned.
/// - Anything else is walked recursively and every regular file matching
///   `mode` is returned, sorted. Symlinks to files are returned under their
///   own path; symlinked directories are not descended.
/// - A nonexistent path yields an empty list.
///
/// Only file names are inspected; no file is opened.
pub fn find_pdfs(path: &Path, mode: MatchMode) -> Vec<PathBuf> {
    if path.is_file() && is_pdf_path(path) {
        return vec![path.to_path_buf()];
    }

    let mut pdfs: Vec<PathBuf> = WalkDir::new(path)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(e) => Some(e),
            Err(err) => {
                tracing::debug!(error = %err, "skipping unreadable entry");
                None
            }
        })
        .filter(|e| is_file_entry(e) && mode.matches(e.path()))
        .map(|e| e.into_path())
        .collect();

    pdfs.sort();
    tracing::debug!(root = %path.display(), found = pdfs.len(), "located PDFs");
    pdfs
}

fn is_file_entry(entry: &walkdir::DirEntry) -> bool {
    let ft = entry.file_type();
    ft.is_file() || (ft.is_symlink() && entry.path().is_file())
}
