//! Concurrent chunking of many files.
//!
//! A fixed pool of workers pulls file indices from a shared cursor and runs
//! each file's pipeline on the blocking thread pool. Files share no mutable
//! state; only the completed counter and the progress callback sit behind a
//! mutex.

use crate::chunker::{chunk, ChunkingStats};
use crate::config::{BatchOptions, BatchProgress, ChunkOptions};
use crate::error::{ChunkerError, Result};
use crate::types::CodeChunk;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// One file to chunk
#[derive(Debug, Clone)]
pub struct FileInput {
    pub filepath: String,
    pub code: String,
    /// Replaces the batch defaults for this file when set
    pub options: Option<ChunkOptions>,
}

impl FileInput {
    pub fn new(filepath: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            filepath: filepath.into(),
            code: code.into(),
            options: None,
        }
    }

    pub fn with_options(mut self, options: ChunkOptions) -> Self {
        self.options = Some(options);
        self
    }
}

/// Outcome for one file of a batch
#[derive(Debug)]
pub struct BatchResult {
    pub filepath: String,
    pub result: Result<Vec<CodeChunk>>,
}

impl BatchResult {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    pub fn chunks(&self) -> Option<&[CodeChunk]> {
        self.result.as_deref().ok()
    }

    pub fn error(&self) -> Option<&ChunkerError> {
        self.result.as_ref().err()
    }
}

struct BatchState {
    files: Vec<FileInput>,
    options: BatchOptions,
    cursor: AtomicUsize,
    completed: Mutex<usize>,
}

impl BatchState {
    fn new(files: Vec<FileInput>, options: BatchOptions) -> Self {
        Self {
            files,
            options,
            cursor: AtomicUsize::new(0),
            completed: Mutex::new(0),
        }
    }

    fn worker_count(&self) -> usize {
        self.options.concurrency.max(1).min(self.files.len())
    }

    /// Claim the next unprocessed file, unless the batch was cancelled
    fn next_job(&self, cancel: &CancellationToken) -> Option<usize> {
        if cancel.is_cancelled() {
            return None;
        }
        let index = self.cursor.fetch_add(1, Ordering::Relaxed);
        (index < self.files.len()).then_some(index)
    }

    fn process(&self, index: usize) -> Result<Vec<CodeChunk>> {
        let file = &self.files[index];
        let options = file.options.as_ref().unwrap_or(&self.options.chunk);
        let chunks = chunk(&file.filepath, &file.code, Some(options))?;
        log::debug!("{}: {}", file.filepath, ChunkingStats::from_chunks(&chunks));
        Ok(chunks)
    }

    fn report(&self, filepath: &str, success: bool) {
        let mut completed = self.completed.lock().unwrap_or_else(PoisonError::into_inner);
        *completed += 1;
        if let Some(callback) = &self.options.on_progress {
            callback(BatchProgress {
                completed: *completed,
                total: self.files.len(),
                filepath: filepath.to_string(),
                success,
            });
        }
    }

    fn completed(&self) -> usize {
        *self.completed.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Run one file on the blocking pool and report its completion
async fn run_job(state: &Arc<BatchState>, index: usize) -> BatchResult {
    let job_state = Arc::clone(state);
    let filepath = state.files[index].filepath.clone();

    let result = tokio::task::spawn_blocking(move || job_state.process(index))
        .await
        .unwrap_or_else(|e| {
            log::warn!("Chunking task for {filepath} failed: {e}");
            Err(ChunkerError::TaskFailed(e.to_string()))
        });

    state.report(&filepath, result.is_ok());
    BatchResult { filepath, result }
}

/// Chunk every file, returning results in input order
pub async fn chunk_batch(files: Vec<FileInput>, options: BatchOptions) -> Vec<BatchResult> {
    chunk_batch_with_cancel(files, options, CancellationToken::new()).await
}

/// Like [`chunk_batch`], stopping early once `cancel` fires.
///
/// Files already being chunked finish normally; files never started get a
/// [`ChunkerError::Cancelled`] entry.
pub async fn chunk_batch_with_cancel(
    files: Vec<FileInput>,
    options: BatchOptions,
    cancel: CancellationToken,
) -> Vec<BatchResult> {
    let total = files.len();
    let state = Arc::new(BatchState::new(files, options));

    let mut workers = JoinSet::new();
    for _ in 0..state.worker_count() {
        let state = Arc::clone(&state);
        let cancel = cancel.clone();
        workers.spawn(async move {
            let mut finished = Vec::new();
            while let Some(index) = state.next_job(&cancel) {
                finished.push((index, run_job(&state, index).await));
            }
            finished
        });
    }

    let mut slots: Vec<Option<BatchResult>> = (0..total).map(|_| None).collect();
    while let Some(joined) = workers.join_next().await {
        match joined {
            Ok(finished) => {
                for (index, result) in finished {
                    slots[index] = Some(result);
                }
            }
            Err(e) => log::warn!("Batch worker failed: {e}"),
        }
    }

    log::debug!(
        "Batch finished: {}/{} files processed",
        state.completed(),
        total
    );

    slots
        .into_iter()
        .enumerate()
        .map(|(index, slot)| {
            slot.unwrap_or_else(|| BatchResult {
                filepath: state.files[index].filepath.clone(),
                result: Err(if cancel.is_cancelled() {
                    ChunkerError::Cancelled
                } else {
                    ChunkerError::TaskFailed("batch worker stopped early".to_string())
                }),
            })
        })
        .collect()
}

/// Chunk every file, delivering results in completion order.
///
/// Must be called from within a tokio runtime. The receiver yields one
/// result per file and closes when the batch is done.
pub fn chunk_batch_stream(files: Vec<FileInput>, options: BatchOptions) -> mpsc::Receiver<BatchResult> {
    chunk_batch_stream_with_cancel(files, options, CancellationToken::new())
}

/// Like [`chunk_batch_stream`]; after `cancel` fires no new file is started
/// and the stream ends without entries for the skipped files.
pub fn chunk_batch_stream_with_cancel(
    files: Vec<FileInput>,
    options: BatchOptions,
    cancel: CancellationToken,
) -> mpsc::Receiver<BatchResult> {
    let state = Arc::new(BatchState::new(files, options));
    let worker_count = state.worker_count();
    let (tx, rx) = mpsc::channel(worker_count.max(1));

    let mut workers = JoinSet::new();
    for _ in 0..worker_count {
        let state = Arc::clone(&state);
        let cancel = cancel.clone();
        let tx = tx.clone();
        workers.spawn(async move {
            while let Some(index) = state.next_job(&cancel) {
                let result = run_job(&state, index).await;
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    sent = tx.send(result) => {
                        if sent.is_err() {
                            // receiver dropped
                            break;
                        }
                    }
                }
            }
        });
    }
    drop(tx);

    tokio::spawn(async move {
        while let Some(joined) = workers.join_next().await {
            if let Err(e) = joined {
                log::warn!("Batch worker failed: {e}");
            }
        }
        log::debug!(
            "Batch stream finished: {}/{} files processed",
            state.completed(),
            state.files.len()
        );
    });

    rx
}
