//! Background durable-sync worker
//!
//! Moves buffered writes from a write-back medium to its backing stores off
//! the caller's thread. Every request gets a [`SyncToken`]; callers decide
//! whether to wait.
//!
//! ## Worker loop
//!
//! ```text
//! request(Persist) ──┐
//! note_append()  ────┼──► channel ──► worker thread
//! interval elapsed ──┘                   │
//!                                        ├─ drain queued Persist requests
//!                                        ├─ one sync_to_durable(Persist)
//!                                        └─ complete every drained token
//! shutdown() ──► final Persist ──► join
//! ```
//!
//! On a synchronous medium, or in [`DurabilityMode::None`], no thread is
//! started and persist requests complete immediately.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use keepsake_core::{Error, IoOp, Result, SyncCompleter, SyncDirection, SyncToken};
use keepsake_storage::StorageMedium;
use parking_lot::Mutex;
use tracing::{debug, error, info, warn};

use crate::mode::DurabilityMode;

enum Message {
    Sync {
        direction: SyncDirection,
        completer: Option<SyncCompleter>,
    },
    Shutdown,
}

struct Running {
    tx: Sender<Message>,
    handle: JoinHandle<Result<()>>,
}

/// Counters describing worker activity
#[derive(Debug, Default)]
pub struct SyncStats {
    flushes: AtomicU64,
    failures: AtomicU64,
    coalesced: AtomicU64,
}

impl SyncStats {
    /// Persist passes that reached the medium
    pub fn flushes(&self) -> u64 {
        self.flushes.load(Ordering::Relaxed)
    }

    /// Persist passes that failed
    pub fn failures(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }

    /// Requests answered by a flush issued for an earlier request
    pub fn coalesced(&self) -> u64 {
        self.coalesced.load(Ordering::Relaxed)
    }
}

/// Durable-sync worker for one storage medium
pub struct SyncWorker {
    medium: Arc<dyn StorageMedium>,
    mode: DurabilityMode,
    running: Mutex<Option<Running>>,
    closed: std::sync::atomic::AtomicBool,
    pending_appends: Arc<AtomicUsize>,
    stats: Arc<SyncStats>,
}

impl SyncWorker {
    /// Start a worker for `medium` under `mode`
    ///
    /// Spawns the `keepsake-sync` thread only when the medium is write-back
    /// and the mode persists anything.
    pub fn start(medium: Arc<dyn StorageMedium>, mode: DurabilityMode) -> Result<Self> {
        let pending_appends = Arc::new(AtomicUsize::new(0));
        let stats = Arc::new(SyncStats::default());

        let running = if medium.is_write_back() && mode.persists() {
            let (tx, rx) = mpsc::channel();
            let worker = WorkerLoop {
                medium: medium.clone(),
                mode,
                rx,
                backlog: VecDeque::new(),
                pending_appends: pending_appends.clone(),
                stats: stats.clone(),
                last_flush: Instant::now(),
            };
            let handle = thread::Builder::new()
                .name("keepsake-sync".to_string())
                .spawn(move || worker.run())
                .map_err(|e| Error::io(IoOp::Sync, "sync worker", e))?;
            info!(medium = %medium.kind(), mode = %mode, "Started sync worker");
            Some(Running { tx, handle })
        } else {
            debug!(medium = %medium.kind(), mode = %mode, "Sync worker runs inline");
            None
        };

        Ok(Self {
            medium,
            mode,
            running: Mutex::new(running),
            closed: std::sync::atomic::AtomicBool::new(false),
            pending_appends,
            stats,
        })
    }

    /// Durability mode of this worker
    pub fn mode(&self) -> DurabilityMode {
        self.mode
    }

    /// Whether a background thread is running
    pub fn is_threaded(&self) -> bool {
        self.running.lock().is_some()
    }

    /// Appends recorded since the last persist pass (Batched mode)
    pub fn pending_appends(&self) -> usize {
        self.pending_appends.load(Ordering::Acquire)
    }

    /// Worker counters
    pub fn stats(&self) -> &SyncStats {
        &self.stats
    }

    /// Request a sync in `direction`
    ///
    /// Never blocks. The token resolves once a sync pass covering this
    /// request has finished.
    pub fn request(&self, direction: SyncDirection) -> SyncToken {
        if self.closed.load(Ordering::Acquire) {
            return SyncToken::ready(Err(Error::Closed));
        }
        if direction == SyncDirection::Persist && !self.mode.persists() {
            debug!("Persist request ignored in none mode");
            return SyncToken::ready(Ok(()));
        }
        if !self.medium.is_write_back() {
            return SyncToken::ready(Ok(()));
        }

        let running = self.running.lock();
        let Some(running) = running.as_ref() else {
            // Write-back medium without a worker: only loads reach here.
            return SyncToken::ready(self.medium.sync_to_durable(direction));
        };
        let (completer, token) = SyncToken::pending();
        let message = Message::Sync {
            direction,
            completer: Some(completer),
        };
        if running.tx.send(message).is_err() {
            error!("Sync worker is gone, request dropped");
            return SyncToken::ready(Err(Error::SyncAborted));
        }
        token
    }

    /// Record a successful append and apply the mode's sync policy
    ///
    /// Returns the token of the sync issued for this append, if any.
    pub fn note_append(&self) -> Option<SyncToken> {
        match self.mode {
            DurabilityMode::None | DurabilityMode::Manual => None,
            DurabilityMode::AfterWrite | DurabilityMode::Strict => {
                Some(self.request(SyncDirection::Persist))
            }
            DurabilityMode::Batched { .. } => {
                let running = self.running.lock();
                // Synchronous media have nothing to batch.
                let Some(running) = running.as_ref() else {
                    return None;
                };
                let pending = self.pending_appends.fetch_add(1, Ordering::AcqRel) + 1;
                let batch = self.mode.batch_size().unwrap_or(1);
                if pending >= batch {
                    debug!(pending, "Batch size reached, flushing");
                    let _ = running.tx.send(Message::Sync {
                        direction: SyncDirection::Persist,
                        completer: None,
                    });
                }
                None
            }
        }
    }

    /// Stop the worker after a final persist pass
    ///
    /// Idempotent; later calls return `Ok(())`. Requests made after shutdown
    /// resolve with [`Error::Closed`].
    pub fn shutdown(&self) -> Result<()> {
        self.closed.store(true, Ordering::Release);
        let Some(running) = self.running.lock().take() else {
            return Ok(());
        };

        // A failed send means the worker already exited; join reports why.
        let _ = running.tx.send(Message::Shutdown);
        let result = match running.handle.join() {
            Ok(result) => result,
            Err(_) => {
                error!("Sync worker panicked");
                return Err(Error::SyncAborted);
            }
        };
        match &result {
            Ok(()) => info!(flushes = self.stats.flushes(), "Sync worker stopped"),
            Err(e) => warn!(error = %e, "Final sync failed"),
        }
        result
    }
}

impl Drop for SyncWorker {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            warn!(error = %e, "Sync worker shutdown on drop failed");
        }
    }
}

struct WorkerLoop {
    medium: Arc<dyn StorageMedium>,
    mode: DurabilityMode,
    rx: Receiver<Message>,
    backlog: VecDeque<Message>,
    pending_appends: Arc<AtomicUsize>,
    stats: Arc<SyncStats>,
    last_flush: Instant,
}

impl WorkerLoop {
    /// Serve requests until shutdown; returns the final persist outcome
    fn run(mut self) -> Result<()> {
        loop {
            let Some(message) = self.next_message() else {
                // All senders dropped without a shutdown message.
                return self.persist();
            };

            match message {
                Message::Sync {
                    direction: SyncDirection::Persist,
                    completer,
                } => {
                    let mut completers: Vec<SyncCompleter> = completer.into_iter().collect();
                    self.drain_persist_requests(&mut completers);
                    let result = self.persist();
                    for completer in completers {
                        completer.complete(result.clone());
                    }
                }
                Message::Sync {
                    direction: SyncDirection::Load,
                    completer,
                } => {
                    let result = self.medium.sync_to_durable(SyncDirection::Load);
                    if let Some(completer) = completer {
                        completer.complete(result);
                    }
                }
                Message::Shutdown => {
                    let mut completers = Vec::new();
                    self.drain_persist_requests(&mut completers);
                    let result = self.persist();
                    for waiting in completers {
                        waiting.complete(result.clone());
                    }
                    return result;
                }
            }
        }
    }

    /// Next message, flushing on the batch interval while idle
    fn next_message(&mut self) -> Option<Message> {
        if let Some(message) = self.backlog.pop_front() {
            return Some(message);
        }
        let Some(interval) = self.mode.flush_interval() else {
            return self.rx.recv().ok();
        };
        loop {
            let deadline = self.last_flush + interval;
            let wait = deadline.saturating_duration_since(Instant::now());
            match self.rx.recv_timeout(wait) {
                Ok(message) => return Some(message),
                Err(RecvTimeoutError::Timeout) => {
                    if self.pending_appends.load(Ordering::Acquire) > 0 {
                        if let Err(e) = self.persist() {
                            warn!(error = %e, "Interval sync failed");
                        }
                    } else {
                        self.last_flush = Instant::now();
                    }
                }
                Err(RecvTimeoutError::Disconnected) => return None,
            }
        }
    }

    /// Fold queued persist requests into the pass about to run
    fn drain_persist_requests(&mut self, completers: &mut Vec<SyncCompleter>) {
        while let Ok(next) = self.rx.try_recv() {
            match next {
                Message::Sync {
                    direction: SyncDirection::Persist,
                    completer,
                } => {
                    if completer.is_some() {
                        self.stats.coalesced.fetch_add(1, Ordering::Relaxed);
                    }
                    completers.extend(completer);
                }
                other => {
                    self.backlog.push_back(other);
                    break;
                }
            }
        }
    }

    fn persist(&mut self) -> Result<()> {
        let pending = self.pending_appends.swap(0, Ordering::AcqRel);
        self.last_flush = Instant::now();
        let result = self.medium.sync_to_durable(SyncDirection::Persist);
        self.stats.flushes.fetch_add(1, Ordering::Relaxed);
        match &result {
            Ok(()) => debug!(pending, "Persist pass complete"),
            Err(e) => {
                self.stats.failures.fetch_add(1, Ordering::Relaxed);
                warn!(error = %e, "Persist pass failed");
            }
        }
        result
    }
}
