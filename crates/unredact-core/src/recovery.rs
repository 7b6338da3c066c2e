//! Writing recovered text to the output tree.
//!
//! Each PDF maps to `<output_root>/<relative dir>/<stem>_RECOVERED.txt`, where
//! the relative directory is the PDF's parent relative to the input root.
//! Files are always overwritten, never appended to.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::backend::{BackendError, PdfBackend};
use crate::{FailureReason, TaskResult};

/// Suffix appended to the PDF stem to name the recovered text file.
pub const RECOVERED_SUFFIX: &str = "_RECOVERED.txt";

#[derive(Error, Debug)]
pub enum RecoveryError {
    #[error("No extractable text")]
    NoExtractableText,
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error("failed to write {}: {}", .path.display(), .source)]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl From<RecoveryError> for FailureReason {
    fn from(err: RecoveryError) -> Self {
        match err {
            RecoveryError::NoExtractableText => FailureReason::NoExtractableText,
            other => FailureReason::Error(other.to_string()),
        }
    }
}

/// `report.pdf` → `report_RECOVERED.txt`.
pub fn recovered_file_name(pdf_path: &Path) -> String {
    let stem = pdf_path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    format!("{stem}{RECOVERED_SUFFIX}")
}

/// Compute where the recovered text for `pdf_path` is written.
///
/// The PDF's directory relative to `input_root` is recreated under
/// `output_root`. A single-file input (`pdf_path == input_root`) or a path
/// outside `input_root` lands directly in `output_root`.
pub fn output_path_for(input_root: &Path, output_root: &Path, pdf_path: &Path) -> PathBuf {
    let relative_dir = pdf_path
        .strip_prefix(input_root)
        .ok()
        .and_then(Path::parent)
        .unwrap_or_else(|| Path::new(""));
    output_root
        .join(relative_dir)
        .join(recovered_file_name(pdf_path))
}

/// True if at least one page has text left after trimming.
pub fn has_recoverable_text(pages: &[String]) -> bool {
    pages.iter().any(|p| !p.trim().is_empty())
}

/// Render pages as `--- PAGE N ---` sections separated by blank lines.
pub fn render_pages(pages: &[String]) -> String {
    let mut out = String::new();
    for (i, text) in pages.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let _ = writeln!(out, "--- PAGE {} ---", i + 1);
        out.push_str(text);
        out.push('\n');
    }
    out
}

/// Write the recovered pages for one PDF, returning the output file path.
///
/// Nothing is written when every page is empty.
pub fn write_recovered(
    input_root: &Path,
    output_root: &Path,
    pdf_path: &Path,
    pages: &[String],
) -> Result<PathBuf, RecoveryError> {
    if !has_recoverable_text(pages) {
        return Err(RecoveryError::NoExtractableText);
    }

    let out_file = output_path_for(input_root, output_root, pdf_path);
    if let Some(parent) = out_file.parent() {
        std::fs::create_dir_all(parent).map_err(|source| RecoveryError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    std::fs::write(&out_file, render_pages(pages)).map_err(|source| RecoveryError::Write {
        path: out_file.clone(),
        source,
    })?;

    Ok(out_file)
}

/// Extract one PDF and write its recovered text.
///
/// Never fails: every error is folded into the returned [`TaskResult`].
pub fn recover_pdf(
    backend: &dyn PdfBackend,
    input_root: &Path,
    output_root: &Path,
    pdf_path: &Path,
) -> TaskResult {
    tracing::debug!(path = %pdf_path.display(), "extracting");

    let attempt = backend
        .extract_pages(pdf_path)
        .map_err(RecoveryError::from)
        .and_then(|pages| {
            write_recovered(input_root, output_root, pdf_path, &pages)
                .map(|output| (output, pages.len()))
        });

    match attempt {
        Ok((output, pages)) => {
            tracing::info!(path = %pdf_path.display(), output = %output.display(), pages, "recovered");
            TaskResult::recovered(pdf_path.to_path_buf(), output, pages)
        }
        Err(err) => {
            let reason = FailureReason::from(err);
            tracing::warn!(path = %pdf_path.display(), reason = %reason, "not recovered");
            TaskResult::failed(pdf_path.to_path_buf(), reason)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Outcome;
    use crate::mock::MockBackend;

    fn pages(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn file_name_uses_stem() {
        assert_eq!(
            recovered_file_name(Path::new("/in/memo.final.pdf")),
            "memo.final_RECOVERED.txt"
        );
    }

    #[test]
    fn output_path_mirrors_relative_dir() {
        let out = output_path_for(
            Path::new("/in"),
            Path::new("/out"),
            Path::new("/in/2019/court/filing.pdf"),
        );
        assert_eq!(out, PathBuf::from("/out/2019/court/filing_RECOVERED.txt"));
    }

    #[test]
    fn output_path_top_level_file() {
        let out = output_path_for(Path::new("/in"), Path::new("/out"), Path::new("/in/a.pdf"));
        assert_eq!(out, PathBuf::from("/out/a_RECOVERED.txt"));
    }

    #[test]
    fn output_path_single_file_input() {
        let out = output_path_for(
            Path::new("/in/a.pdf"),
            Path::new("/out"),
            Path::new("/in/a.pdf"),
        );
        assert_eq!(out, PathBuf::from("/out/a_RECOVERED.txt"));
    }

    #[test]
    fn output_path_outside_input_root() {
        let out = output_path_for(
            Path::new("/in"),
            Path::new("/out"),
            Path::new("/elsewhere/deep/x.pdf"),
        );
        assert_eq!(out, PathBuf::from("/out/x_RECOVERED.txt"));
    }

    #[test]
    fn render_matches_page_layout() {
        let text = render_pages(&pages(&["CONFIDENTIAL", ""]));
        assert_eq!(text, "--- PAGE 1 ---\nCONFIDENTIAL\n\n--- PAGE 2 ---\n\n");
    }

    #[test]
    fn render_single_page() {
        assert_eq!(
            render_pages(&pages(&["line one\nline two"])),
            "--- PAGE 1 ---\nline one\nline two\n"
        );
    }

    #[test]
    fn recoverable_text_detection() {
        assert!(!has_recoverable_text(&[]));
        assert!(!has_recoverable_text(&pages(&["", "  \n"])));
        assert!(has_recoverable_text(&pages(&["", "x"])));
    }

    #[test]
    fn write_skips_empty_documents() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in");
        let output = dir.path().join("out");
        let err = write_recovered(&input, &output, &input.join("b.pdf"), &pages(&["", ""]))
            .unwrap_err();
        assert!(matches!(err, RecoveryError::NoExtractableText));
        assert_eq!(err.to_string(), "No extractable text");
        assert!(!output.exists());
    }

    #[test]
    fn write_creates_dirs_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in");
        let output = dir.path().join("out");
        let pdf = input.join("nested").join("a.pdf");

        let path = write_recovered(&input, &output, &pdf, &pages(&["first run"])).unwrap();
        assert_eq!(path, output.join("nested").join("a_RECOVERED.txt"));

        write_recovered(&input, &output, &pdf, &pages(&["second"])).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "--- PAGE 1 ---\nsecond\n");
    }

    #[test]
    fn write_reports_blocked_directory() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in");
        let output = dir.path().join("out");
        // A regular file where the mirrored directory should go
        std::fs::create_dir_all(&output).unwrap();
        std::fs::write(output.join("sub"), b"not a dir").unwrap();

        let err = write_recovered(&input, &output, &input.join("sub/a.pdf"), &pages(&["x"]))
            .unwrap_err();
        assert!(matches!(err, RecoveryError::Write { .. }));
        assert!(err.to_string().starts_with("failed to write"));
    }

    #[test]
    fn recover_pdf_folds_backend_errors() {
        let dir = tempfile::tempdir().unwrap();
        let backend = MockBackend::new().with_error("c.pdf", "no objects found");
        let pdf = dir.path().join("c.pdf");

        let result = recover_pdf(&backend, dir.path(), &dir.path().join("out"), &pdf);
        assert!(!result.is_success());
        assert_eq!(result.source, pdf);
        let msg = result.error_message().unwrap();
        assert!(msg.contains("no objects found"), "got {msg}");
    }

    #[test]
    fn recover_pdf_folds_write_errors() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        std::fs::write(&out, b"a file, not a directory").unwrap();
        let backend = MockBackend::new().with_pages("a.pdf", &["text"]);

        let result = recover_pdf(&backend, dir.path(), &out, &dir.path().join("a.pdf"));
        match &result.outcome {
            Outcome::Failed(FailureReason::Error(msg)) => {
                assert!(msg.starts_with("failed to write"), "got {msg}");
            }
            other => panic!("expected write failure, got {other:?}"),
        }
    }

    #[test]
    fn recover_pdf_success() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        let backend = MockBackend::new().with_pages("a.pdf", &["CONFIDENTIAL", ""]);
        let pdf = dir.path().join("a.pdf");

        let result = recover_pdf(&backend, dir.path(), &out, &pdf);
        match &result.outcome {
            Outcome::Recovered { output, pages } => {
                assert_eq!(*pages, 2);
                assert_eq!(output, &out.join("a_RECOVERED.txt"));
            }
            other => panic!("expected recovery, got {other:?}"),
        }
        assert_eq!(result.error_message(), None);
    }
}
