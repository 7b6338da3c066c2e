//! Fixed-size worker pool for per-PDF recovery.
//!
//! Architecture: `num_workers` worker tasks share one job queue. Each worker
//! takes a PDF path, runs extraction and writing on the blocking thread pool
//! (MuPDF is synchronous), and sends the [`TaskResult`] to a results channel.
//! Results therefore arrive in completion order, not submission order.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinHandle};

use crate::backend::PdfBackend;
use crate::recovery::recover_pdf;
use crate::{Config, FailureReason, TaskResult};

/// A pool of worker tasks that recover text from PDFs.
///
/// Submit paths via [`submit()`](RecoveryPool::submit); results are delivered
/// on the `result_tx` channel passed to [`new()`](RecoveryPool::new).
pub struct RecoveryPool {
    job_tx: async_channel::Sender<PathBuf>,
    pool_handle: JoinHandle<()>,
}

impl RecoveryPool {
    /// Create a new pool with `num_workers` workers (at least one).
    pub fn new(
        backend: Arc<dyn PdfBackend>,
        config: Arc<Config>,
        num_workers: usize,
        result_tx: mpsc::UnboundedSender<TaskResult>,
    ) -> Self {
        let (job_tx, job_rx) = async_channel::unbounded::<PathBuf>();

        let pool_handle = tokio::spawn(async move {
            let mut worker_handles = Vec::with_capacity(num_workers.max(1));

            for worker in 0..num_workers.max(1) {
                worker_handles.push(tokio::spawn(worker_loop(
                    worker,
                    job_rx.clone(),
                    Arc::clone(&backend),
                    Arc::clone(&config),
                    result_tx.clone(),
                )));
            }

            // Workers hold the only remaining clones, so the results channel
            // closes once the last worker exits.
            drop(job_rx);
            drop(result_tx);

            for h in worker_handles {
                let _ = h.await;
            }
        });

        Self {
            job_tx,
            pool_handle,
        }
    }

    /// Get a cloneable sender for submitting jobs from multiple tasks.
    pub fn sender(&self) -> async_channel::Sender<PathBuf> {
        self.job_tx.clone()
    }

    /// Submit a PDF to the pool.
    pub async fn submit(&self, pdf_path: PathBuf) {
        let _ = self.job_tx.send(pdf_path).await;
    }

    /// Stop accepting jobs. Queued jobs are still processed.
    pub fn close(&self) {
        self.job_tx.close();
    }

    /// Close the pool and wait for all workers to finish.
    pub async fn shutdown(self) {
        self.job_tx.close();
        let _ = self.pool_handle.await;
    }
}

async fn worker_loop(
    worker: usize,
    rx: async_channel::Receiver<PathBuf>,
    backend: Arc<dyn PdfBackend>,
    config: Arc<Config>,
    result_tx: mpsc::UnboundedSender<TaskResult>,
) {
    while let Ok(pdf_path) = rx.recv().await {
        tracing::debug!(worker, path = %pdf_path.display(), "task started");

        let backend = Arc::clone(&backend);
        let config = Arc::clone(&config);
        let path = pdf_path.clone();
        let result = tokio::task::spawn_blocking(move || {
            recover_pdf(
                backend.as_ref(),
                &config.input_root,
                &config.output_root,
                &path,
            )
        })
        .await
        .unwrap_or_else(|e| {
            let reason = FailureReason::Error(join_error_message(e));
            tracing::warn!(path = %pdf_path.display(), reason = %reason, "task aborted");
            TaskResult::failed(pdf_path, reason)
        });

        if result_tx.send(result).is_err() {
            tracing::debug!(worker, "result receiver dropped, stopping");
            break;
        }
    }
}

fn join_error_message(e: JoinError) -> String {
    if !e.is_panic() {
        return format!("task join error: {e}");
    }
    let payload = e.into_panic();
    let detail = payload
        .downcast_ref::<String>()
        .cloned()
        .or_else(|| payload.downcast_ref::<&str>().map(|s| s.to_string()))
        .unwrap_or_else(|| "unknown panic".to_string());
    format!("worker panicked: {detail}")
}
