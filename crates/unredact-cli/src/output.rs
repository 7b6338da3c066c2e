use std::io::{self, Write};
use std::path::{Path, PathBuf};

use indicatif::ProgressBar;
use owo_colors::OwoColorize;
use tracing_subscriber::fmt::MakeWriter;
use unredact_core::BatchSummary;

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

/// Print the status lines shown before processing starts.
pub fn print_run_header(
    w: &mut dyn Write,
    pdf_count: usize,
    threads: usize,
    output_root: &Path,
    color: ColorMode,
) -> io::Result<()> {
    let marker = if color.enabled() {
        "[*]".cyan().to_string()
    } else {
        "[*]".to_string()
    };
    writeln!(w, "{} Found {} PDFs", marker, pdf_count)?;
    writeln!(w, "{} Threads: {}", marker, threads)?;
    writeln!(w, "{} Output root: {}", marker, output_root.display())?;
    Ok(())
}

/// Print the PDFs a dry run would process.
pub fn print_dry_run(w: &mut dyn Write, pdfs: &[PathBuf], color: ColorMode) -> io::Result<()> {
    if color.enabled() {
        writeln!(w, "{} {} PDFs would be processed\n", "DRY RUN:".bold().cyan(), pdfs.len())?;
    } else {
        writeln!(w, "DRY RUN: {} PDFs would be processed\n", pdfs.len())?;
    }
    for pdf in pdfs {
        writeln!(w, "  {}", pdf.display())?;
    }
    Ok(())
}

/// Print the final counts and every failure with its reason.
pub fn print_summary(w: &mut dyn Write, summary: &BatchSummary, color: ColorMode) -> io::Result<()> {
    writeln!(w)?;
    if color.enabled() {
        writeln!(w, "{}", "=== SUMMARY ===".bold())?;
    } else {
        writeln!(w, "=== SUMMARY ===")?;
    }
    writeln!(w, "Processed: {}", summary.processed())?;

    let failed = summary.failed();
    if color.enabled() {
        writeln!(w, "{} {}", "Recovered:".green(), summary.recovered())?;
        if failed > 0 {
            writeln!(w, "{} {}", "Failed:".red(), failed)?;
        } else {
            writeln!(w, "Failed: {}", failed)?;
        }
    } else {
        writeln!(w, "Recovered: {}", summary.recovered())?;
        writeln!(w, "Failed: {}", failed)?;
    }

    let mut failures: Vec<_> = summary.failures().collect();
    failures.sort_by(|a, b| a.0.cmp(b.0));
    for (path, reason) in failures {
        if color.enabled() {
            writeln!(w, "{} {}: {}", "[FAIL]".red(), path.display(), reason)?;
        } else {
            writeln!(w, "[FAIL] {}: {}", path.display(), reason)?;
        }
    }
    Ok(())
}

/// A `tracing` writer that hides the progress bar while a log line is
/// written to stderr, so the two never interleave.
#[derive(Clone)]
pub struct BarWriter {
    bar: ProgressBar,
}

impl BarWriter {
    pub fn new(bar: ProgressBar) -> Self {
        Self { bar }
    }
}

impl Write for BarWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bar.suspend(|| io::stderr().write(buf))
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()
    }
}

impl<'a> MakeWriter<'a> for BarWriter {
    type Writer = BarWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
