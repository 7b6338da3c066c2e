use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::mpsc;

pub mod backend;
pub mod config_file;
pub mod mock;
pub mod pool;
pub mod recovery;

// Re-export for convenience
pub use backend::{BackendError, PdfBackend};
pub use pool::RecoveryPool;
pub use recovery::{RecoveryError, output_path_for, recover_pdf, render_pages, write_recovered};

/// Why a PDF produced no output file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// Every page was empty after trimming (e.g. an image-only scan).
    NoExtractableText,
    /// The PDF could not be read, the output could not be written, or the
    /// task itself died.
    Error(String),
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::NoExtractableText => f.write_str("No extractable text"),
            FailureReason::Error(msg) => f.write_str(msg),
        }
    }
}

/// Final state of one recovery task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Recovered { output: PathBuf, pages: usize },
    Failed(FailureReason),
}

/// Result of processing a single PDF.
#[derive(Debug, Clone)]
pub struct TaskResult {
    pub source: PathBuf,
    pub outcome: Outcome,
}

impl TaskResult {
    pub fn recovered(source: PathBuf, output: PathBuf, pages: usize) -> Self {
        Self {
            source,
            outcome: Outcome::Recovered { output, pages },
        }
    }

    pub fn failed(source: PathBuf, reason: FailureReason) -> Self {
        Self {
            source,
            outcome: Outcome::Failed(reason),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, Outcome::Recovered { .. })
    }

    /// The failure message, or `None` for a recovered PDF.
    pub fn error_message(&self) -> Option<String> {
        match &self.outcome {
            Outcome::Recovered { .. } => None,
            Outcome::Failed(reason) => Some(reason.to_string()),
        }
    }
}

/// Roots shared by every task in a batch.
#[derive(Debug, Clone)]
pub struct Config {
    /// The path the user asked to scan (a directory, or the PDF itself).
    pub input_root: PathBuf,
    /// Directory the mirrored `_RECOVERED.txt` tree is written under.
    pub output_root: PathBuf,
    pub num_workers: usize,
}

/// One fewer than the logical CPU count, never below one.
pub fn default_threads() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .saturating_sub(1)
        .max(1)
}

/// Aggregated results of a batch, in completion order.
#[derive(Debug, Clone, Default)]
pub struct BatchSummary {
    pub results: Vec<TaskResult>,
}

impl BatchSummary {
    pub fn processed(&self) -> usize {
        self.results.len()
    }

    pub fn recovered(&self) -> usize {
        self.results.iter().filter(|r| r.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.processed() - self.recovered()
    }

    pub fn failures(&self) -> impl Iterator<Item = (&Path, &FailureReason)> {
        self.results.iter().filter_map(|r| match &r.outcome {
            Outcome::Failed(reason) => Some((r.source.as_path(), reason)),
            Outcome::Recovered { .. } => None,
        })
    }
}

/// Split `pdfs` into those that own their output path and collision
/// failures for the rest.
///
/// Two PDFs map to the same output file when their names differ only in
/// extension case (`memo.pdf`, `memo.PDF`). The first one in `pdfs` keeps
/// the path; later ones fail instead of overwriting it.
pub fn claim_output_paths(
    pdfs: Vec<PathBuf>,
    config: &Config,
) -> (Vec<PathBuf>, Vec<TaskResult>) {
    let mut owners: HashMap<PathBuf, PathBuf> = HashMap::with_capacity(pdfs.len());
    let mut claimed = Vec::with_capacity(pdfs.len());
    let mut collisions = Vec::new();

    for pdf in pdfs {
        let out = output_path_for(&config.input_root, &config.output_root, &pdf);
        match owners.get(&out) {
            Some(first) => {
                let reason = FailureReason::Error(format!(
                    "output path collides with {}",
                    first.display()
                ));
                tracing::warn!(path = %pdf.display(), output = %out.display(), "output path collision");
                collisions.push(TaskResult::failed(pdf, reason));
            }
            None => {
                owners.insert(out, pdf.clone());
                claimed.push(pdf);
            }
        }
    }

    (claimed, collisions)
}

/// Recover every PDF in `pdfs` using a pool of `config.num_workers` workers.
///
/// `on_result` is called once per PDF as each task completes. Returns after
/// all tasks have finished; a failing (or panicking) task never stops the
/// others.
pub async fn run_batch<F>(
    pdfs: Vec<PathBuf>,
    backend: Arc<dyn PdfBackend>,
    config: Config,
    mut on_result: F,
) -> BatchSummary
where
    F: FnMut(&TaskResult),
{
    let total = pdfs.len();
    let num_workers = config.num_workers.max(1);
    let (pdfs, collisions) = claim_output_paths(pdfs, &config);

    let mut results = Vec::with_capacity(total);
    for result in collisions {
        on_result(&result);
        results.push(result);
    }

    let (result_tx, mut result_rx) = mpsc::unbounded_channel();
    let pool = RecoveryPool::new(backend, Arc::new(config), num_workers, result_tx);

    for pdf in pdfs {
        pool.submit(pdf).await;
    }
    pool.close();

    while let Some(result) = result_rx.recv().await {
        on_result(&result);
        results.push(result);
    }

    pool.shutdown().await;

    tracing::debug!(total, received = results.len(), "batch complete");
    BatchSummary { results }
}
