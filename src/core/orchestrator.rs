//! Flatten orchestration
//!
//! `Flattener` owns the lifecycle of one flatten operation. The synchronous
//! path walks the tree on the caller's thread. The asynchronous path splits
//! the tree into chunks and spawns one OS thread per chunk; workers push
//! their results onto a lock-free queue that the caller drains after
//! `join`, or while polling `is_running`.
//!
//! Every worker records itself as finished through a drop guard, so a worker
//! that returns an error or panics still counts as finished and `join`
//! always terminates.

use crate::config::FlattenConfig;
use crate::core::{group_into_chunks, Chunk, CopyResult, CopyTask};
use crate::error::{collect_errors, FlattenError, Result};
use crate::fs::{ensure_target_dir, list_immediate_entries, require_directory, scan_tree};
use crate::progress::ProgressReporter;
use crossbeam::queue::SegQueue;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError, TryLockError};
use std::thread::{self, JoinHandle};
use std::time::Instant;

/// State shared between the workers of one asynchronous flatten
#[derive(Debug, Default)]
pub struct SessionState {
    /// Results from all workers, in completion order
    results: SegQueue<CopyResult>,
    /// Workers that have exited
    finished: Mutex<HashSet<usize>>,
    /// Mirror of `finished.len()` readable without the lock
    finished_count: AtomicUsize,
}

impl SessionState {
    fn mark_finished(&self, worker: usize) {
        let mut finished = self.finished.lock().unwrap_or_else(PoisonError::into_inner);
        if finished.insert(worker) {
            self.finished_count.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// Number of workers that have exited
    pub fn finished_count(&self) -> usize {
        self.finished_count.load(Ordering::SeqCst)
    }

    /// Whether `worker` has exited
    pub fn is_finished(&self, worker: usize) -> bool {
        self.finished
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&worker)
    }
}

/// Records the worker as finished when dropped, including during unwinding
struct CompletionGuard {
    worker: usize,
    state: Arc<SessionState>,
}

impl Drop for CompletionGuard {
    fn drop(&mut self) {
        self.state.mark_finished(self.worker);
    }
}

/// Worker body: copies every file of a chunk into the flat target
pub struct ChunkWorker {
    id: usize,
    target: PathBuf,
    state: Arc<SessionState>,
    progress: Option<Arc<ProgressReporter>>,
}

impl ChunkWorker {
    /// Worker identifier within its session
    pub fn id(&self) -> usize {
        self.id
    }

    /// Process all directories of `chunk`, returning the number of files seen
    pub fn copy_chunk(&self, chunk: &Chunk) -> Result<usize> {
        let mut processed = 0;

        for dir in chunk.directories() {
            processed += copy_directory(dir, &self.target, |result| {
                if let Some(progress) = &self.progress {
                    progress.record(&result);
                }
                self.state.results.push(result);
            })?;
        }

        tracing::debug!(
            "Worker {} processed {} files from {} directories",
            self.id,
            processed,
            chunk.len()
        );

        Ok(processed)
    }
}

/// Copy the immediate files of `dir` into `target`, handing each result to `sink`
fn copy_directory(dir: &Path, target: &Path, mut sink: impl FnMut(CopyResult)) -> Result<usize> {
    let listing = list_immediate_entries(dir)?;
    let count = listing.files.len();

    for file in listing.files {
        let result = CopyTask::new(file, target)?.execute()?;
        sink(result);
    }

    Ok(count)
}

/// One asynchronous flatten in flight (or joined)
struct Session {
    state: Arc<SessionState>,
    handles: Vec<(usize, JoinHandle<Result<usize>>)>,
    spawned: usize,
    next_worker_id: usize,
    done: bool,
}

impl Session {
    fn new() -> Self {
        Self {
            state: Arc::new(SessionState::default()),
            handles: Vec::new(),
            spawned: 0,
            next_worker_id: 0,
            done: false,
        }
    }

    fn is_running(&self) -> bool {
        self.state.finished_count() < self.spawned
    }

    fn allocate_worker_id(&mut self) -> usize {
        let id = self.next_worker_id;
        self.next_worker_id += 1;
        id
    }
}

/// Flattens a directory tree into a single directory
pub struct Flattener {
    config: FlattenConfig,
    progress: Option<Arc<ProgressReporter>>,
    session: Option<Session>,
}

impl Flattener {
    /// Create a new flattener
    pub fn new(config: FlattenConfig) -> Self {
        Self {
            config,
            progress: None,
            session: None,
        }
    }

    /// Create a flattener for `source` into `target` with default settings
    pub fn from_paths(source: impl Into<PathBuf>, target: impl Into<PathBuf>) -> Self {
        Self::new(FlattenConfig::new(source, target))
    }

    /// Override the maximum number of workers (0 = auto-detect)
    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.config.max_workers = max_workers;
        self
    }

    /// Set progress reporter
    pub fn with_progress(mut self, progress: ProgressReporter) -> Self {
        self.progress = Some(Arc::new(progress));
        self
    }

    /// Configuration in use
    pub fn config(&self) -> &FlattenConfig {
        &self.config
    }

    /// Flatten on the calling thread, returning results in tree-walk order
    pub fn flatten_sync(&self) -> Result<Vec<CopyResult>> {
        let start_time = Instant::now();
        require_directory(&self.config.source)?;
        ensure_target_dir(&self.config.target)?;

        let scan = scan_tree(&self.config.source)?;
        if let Some(progress) = &self.progress {
            progress.set_total_files(scan.file_count as u64);
        }

        let mut results = Vec::with_capacity(scan.file_count);
        for dir in &scan.directories {
            copy_directory(dir, &self.config.target, |result| {
                if let Some(progress) = &self.progress {
                    progress.record(&result);
                }
                results.push(result);
            })?;
        }

        tracing::info!(
            "Flattened {} files from {} in {:.2?}",
            results.len(),
            self.config.source.display(),
            start_time.elapsed()
        );

        Ok(results)
    }

    /// Start an asynchronous flatten and return without waiting
    ///
    /// Results left undrained from a previous, already joined session are
    /// discarded.
    pub fn start_async(&mut self) -> Result<()> {
        if self.is_running() {
            return Err(FlattenError::AlreadyRunning);
        }

        require_directory(&self.config.source)?;
        ensure_target_dir(&self.config.target)?;

        let max_workers = self.config.effective_workers();
        let scan = scan_tree(&self.config.source)?;
        let chunks = group_into_chunks(scan.directories, max_workers);

        if let Some(progress) = &self.progress {
            progress.set_total_files(scan.file_count as u64);
        }

        tracing::info!(
            "Flattening {} into {}: {} files in {} chunks (max {} workers)",
            self.config.source.display(),
            self.config.target.display(),
            scan.file_count,
            chunks.len(),
            max_workers
        );

        let session = self.session.insert(Session::new());

        for chunk in chunks.into_iter().filter(|c| !c.is_empty()) {
            let worker = ChunkWorker {
                id: session.allocate_worker_id(),
                target: self.config.target.clone(),
                state: Arc::clone(&session.state),
                progress: self.progress.clone(),
            };
            let id = worker.id();

            let handle = thread::Builder::new()
                .name(format!("flatten-worker-{}", id))
                .spawn(move || {
                    let _guard = CompletionGuard {
                        worker: worker.id,
                        state: Arc::clone(&worker.state),
                    };
                    worker.copy_chunk(&chunk)
                })
                .map_err(|e| FlattenError::ThreadPoolError(format!("Failed to spawn worker {}: {}", id, e)))?;

            session.handles.push((id, handle));
            session.spawned += 1;
        }

        Ok(())
    }

    /// Run a single chunk on the calling thread within the current session
    ///
    /// Results land on the same queue the spawned workers use.
    pub fn copy_chunk(&mut self, chunk: &Chunk) -> Result<usize> {
        ensure_target_dir(&self.config.target)?;

        let session = self.session.get_or_insert_with(Session::new);
        let worker = ChunkWorker {
            id: session.allocate_worker_id(),
            target: self.config.target.clone(),
            state: Arc::clone(&session.state),
            progress: self.progress.clone(),
        };

        worker.copy_chunk(chunk)
    }

    /// Whether spawned workers are still copying
    ///
    /// `false` before any asynchronous flatten was started.
    pub fn is_running(&self) -> bool {
        self.session.as_ref().is_some_and(Session::is_running)
    }

    /// Whether the finished-worker lock is currently held
    pub fn is_locked(&self) -> bool {
        self.session.as_ref().is_some_and(|session| {
            matches!(session.state.finished.try_lock(), Err(TryLockError::WouldBlock))
        })
    }

    /// Block until every spawned worker has exited
    ///
    /// All results are on the queue once this returns, including those a
    /// failing worker produced before its error. Worker errors and panics
    /// are aggregated into the returned error.
    pub fn join(&mut self) -> Result<()> {
        let Some(session) = self.session.as_mut() else {
            return Ok(());
        };

        let mut errors = Vec::new();

        for (id, handle) in session.handles.drain(..) {
            match handle.join() {
                Ok(Ok(processed)) => {
                    tracing::debug!("Worker {} finished ({} files)", id, processed);
                }
                Ok(Err(e)) => {
                    tracing::warn!("Worker {} failed: {}", id, e);
                    errors.push(FlattenError::worker(id, e));
                }
                Err(payload) => {
                    let message = panic_message(payload.as_ref());
                    tracing::warn!("Worker {} panicked: {}", id, message);
                    errors.push(FlattenError::WorkerPanicked { worker: id, message });
                }
            }
        }

        session.done = true;

        if let Some(progress) = &self.progress {
            if errors.is_empty() {
                progress.finish_success("Flatten complete");
            } else {
                progress.finish_error("Flatten finished with errors");
            }
        }

        collect_errors(errors)
    }

    /// Whether the current session has been joined
    pub fn is_done(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.done)
    }

    /// Number of workers spawned by the current session
    pub fn spawned_workers(&self) -> usize {
        self.session.as_ref().map_or(0, |s| s.spawned)
    }

    /// Number of workers that have exited
    pub fn finished_workers(&self) -> usize {
        self.session.as_ref().map_or(0, |s| s.state.finished_count())
    }

    /// Results waiting to be drained
    pub fn pending_results(&self) -> usize {
        self.session.as_ref().map_or(0, |s| s.state.results.len())
    }

    /// Pop one result without blocking
    pub fn try_pop_result(&self) -> Option<CopyResult> {
        self.session.as_ref().and_then(|s| s.state.results.pop())
    }

    /// Pop every result currently queued
    pub fn drain_results(&self) -> Vec<CopyResult> {
        std::iter::from_fn(|| self.try_pop_result()).collect()
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Flatten `source` into `target` on the calling thread
pub fn flatten_sync(source: &Path, target: &Path) -> Result<Vec<CopyResult>> {
    Flattener::from_paths(source, target).flatten_sync()
}

/// Flatten `source` into `target` with up to `max_workers` threads and wait
pub fn flatten_parallel(source: &Path, target: &Path, max_workers: usize) -> Result<Vec<CopyResult>> {
    let mut flattener = Flattener::from_paths(source, target).with_max_workers(max_workers);
    flattener.start_async()?;
    flattener.join()?;
    Ok(flattener.drain_results())
}
