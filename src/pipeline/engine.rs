//! Playback engine - owns the pending queue, display buffer and pacing state
//!
//! ## Architecture
//!
//! ```text
//! poller ──ingest()──► pending queue ──drain loop (paced)──► display buffer ──snapshot()──► UI
//! ```
//!
//! The poller and the drain loop only meet at the pending queue. Both sides
//! take the same short-lived mutex, never across an `.await`.
//!
//! The drain loop is single-flight: an `AtomicBool` is claimed with a
//! compare-and-set before a loop is spawned, and the loop releases it while
//! still holding the state lock when it finds the queue empty. An ingest that
//! lands after that point therefore always wins the next compare-and-set.

use super::config::PipelineConfig;
use super::display::DisplayBuffer;
use super::ingestion::{ingest_batch, IngestReport};
use super::pacing::{PacingConfig, PacingState};
use super::types::TxRecord;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tokio::time::{sleep, Duration};

/// Latest load signals fed in from the data source
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NetworkSignals {
    pub tps: f64,
    pub latency_ms: f64,
}

struct PipelineState {
    pending: VecDeque<TxRecord>,
    display: DisplayBuffer,
    watermark: Option<u64>,
    signals: NetworkSignals,
    last_delay_ms: u64,
    stopped: bool,
}

struct Shared {
    state: Mutex<PipelineState>,
    processing: AtomicBool,
    shutdown_tx: watch::Sender<bool>,
    pacing: PacingConfig,
}

impl Shared {
    fn lock_state(&self) -> MutexGuard<'_, PipelineState> {
        // Every critical section leaves the state consistent, so a panic
        // elsewhere does not invalidate it.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Handle to the adaptive playback pipeline
///
/// Cloning is cheap; all clones drive the same queue and buffer.
#[derive(Clone)]
pub struct PlaybackPipeline {
    shared: Arc<Shared>,
}

impl Default for PlaybackPipeline {
    fn default() -> Self {
        Self::new(PipelineConfig::default())
    }
}

impl PlaybackPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(PipelineState {
                    pending: VecDeque::new(),
                    display: DisplayBuffer::new(config.display_capacity),
                    watermark: None,
                    signals: NetworkSignals::default(),
                    last_delay_ms: 0,
                    stopped: false,
                }),
                processing: AtomicBool::new(false),
                shutdown_tx,
                pacing: config.pacing.normalized(),
            }),
        }
    }

    /// Deduplicate `batch` and append the new records to the pending queue
    ///
    /// Kicks the drain loop when anything was appended. After `stop` the
    /// batch is dropped and an empty report is returned.
    pub fn ingest(&self, batch: Vec<TxRecord>) -> IngestReport {
        let report = {
            let mut state = self.shared.lock_state();
            if state.stopped {
                return IngestReport {
                    watermark: state.watermark,
                    ..Default::default()
                };
            }
            let PipelineState {
                pending,
                display,
                watermark,
                ..
            } = &mut *state;
            ingest_batch(batch, pending, display, watermark)
        };

        if report.appended > 0 || report.rejected > 0 {
            log::debug!(
                "Ingested batch: +{} queued, {} duplicate, {} rejected (watermark {:?})",
                report.appended,
                report.duplicates,
                report.rejected,
                report.watermark
            );
        }

        if report.appended > 0 {
            self.start();
        }
        report
    }

    /// Request the drain loop
    ///
    /// Spawns a loop only if none is running; otherwise a no-op. Must be
    /// called from within a tokio runtime for the loop to run.
    pub fn start(&self) {
        if self.shared.lock_state().stopped {
            return;
        }

        if self
            .shared
            .processing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            log::trace!("Drain loop already running");
            return;
        }

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let shared = self.shared.clone();
                handle.spawn(drain_loop(shared));
            }
            Err(e) => {
                log::warn!("Cannot start drain loop outside a tokio runtime: {}", e);
                self.shared.processing.store(false, Ordering::Release);
            }
        }
    }

    /// Shut the pipeline down
    ///
    /// Once this returns the display buffer is frozen: a sleeping drain loop
    /// wakes and exits without publishing. Idempotent.
    pub fn stop(&self) {
        {
            let mut state = self.shared.lock_state();
            if state.stopped {
                return;
            }
            state.stopped = true;
        }
        self.shared.shutdown_tx.send_replace(true);
        log::info!("Playback pipeline stopped");
    }

    /// Copy of the display buffer, most recent first
    pub fn snapshot(&self) -> Vec<TxRecord> {
        self.shared.lock_state().display.snapshot()
    }

    pub fn pacing_state(&self) -> PacingState {
        let state = self.shared.lock_state();
        PacingState {
            queue_length: state.pending.len(),
            last_delay_ms: state.last_delay_ms,
            is_processing: self.is_processing(),
        }
    }

    pub fn pending_len(&self) -> usize {
        self.shared.lock_state().pending.len()
    }

    /// Highest block number accounted for, used to resume polling
    pub fn watermark(&self) -> Option<u64> {
        self.shared.lock_state().watermark
    }

    pub fn signals(&self) -> NetworkSignals {
        self.shared.lock_state().signals
    }

    pub fn set_tps(&self, tps: f64) {
        self.shared.lock_state().signals.tps = tps;
    }

    pub fn set_network_latency(&self, latency_ms: f64) {
        self.shared.lock_state().signals.latency_ms = latency_ms;
    }

    pub fn is_processing(&self) -> bool {
        self.shared.processing.load(Ordering::Acquire)
    }

    pub fn is_stopped(&self) -> bool {
        self.shared.lock_state().stopped
    }
}

/// Release pending records one at a time until the queue runs dry
async fn drain_loop(shared: Arc<Shared>) {
    let mut shutdown = shared.shutdown_tx.subscribe();
    let mut released = 0u64;
    log::debug!("Drain loop started");

    loop {
        let delay_ms = {
            let mut state = shared.lock_state();
            if state.stopped {
                shared.processing.store(false, Ordering::Release);
                break;
            }

            let queue_length = state.pending.len();
            if queue_length == 0 {
                shared.processing.store(false, Ordering::Release);
                break;
            }

            // Delay first, so the record only leaves the queue once it can be published
            let delay_ms = shared.pacing.compute_delay(
                queue_length,
                state.signals.latency_ms,
                state.signals.tps,
            );
            let Some(record) = state.pending.pop_front() else {
                shared.processing.store(false, Ordering::Release);
                break;
            };

            let hash = record.hash.clone();
            if state.display.publish(record) {
                released += 1;
                log::trace!("Released {} (queue {}, next in {}ms)", hash, queue_length - 1, delay_ms);
            } else {
                log::debug!("Skipped {}: already displayed", hash);
            }
            state.last_delay_ms = delay_ms;
            delay_ms
        };

        tokio::select! {
            _ = sleep(Duration::from_millis(delay_ms)) => {}
            _ = shutdown.changed() => {
                log::debug!("Drain loop interrupted by shutdown");
            }
        }
    }

    log::debug!("Drain loop idle after releasing {} records", released);
}
