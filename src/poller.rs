//! Poller - the periodic fetch trigger feeding the playback pipeline
//!
//! Three timers share one `select!` loop:
//! - transactions (default 3s): fetch from the watermark, ingest, measure latency
//! - metrics (default 10s): refresh TPS for the pacing controller
//! - blocks (default 15s): refresh the recent blocks panel
//!
//! When a page reports `has_more`, follow-up pages are fetched right away
//! (at most `MAX_FOLLOW_UP_PAGES`) instead of waiting for the next tick.
//!
//! A failed fetch never touches the pipeline. The error is stored for the UI
//! and the next tick retries; polling is already interval based, so there is
//! no backoff.

use crate::config::Config;
use crate::pipeline::engine::PlaybackPipeline;
use crate::pipeline::ingestion::IngestReport;
use crate::source::{SourceError, TransactionSource};
use crate::state::DashboardState;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, RwLock};
use tokio::time::{interval, Instant, MissedTickBehavior};

/// Number of blocks shown in the recent blocks panel
pub const RECENT_BLOCKS_LIMIT: usize = 5;

/// Extra pages fetched in one tick while the source reports a backlog
pub const MAX_FOLLOW_UP_PAGES: usize = 5;

/// Result of one transaction poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagePoll {
    pub report: IngestReport,
    /// Source reported more transactions beyond this page
    pub has_more: bool,
    /// First block the source has not delivered yet
    pub next_block: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollerConfig {
    pub poll_interval: Duration,
    pub metrics_interval: Duration,
    pub blocks_interval: Duration,
    pub batch_limit: usize,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(3_000),
            metrics_interval: Duration::from_millis(10_000),
            blocks_interval: Duration::from_millis(15_000),
            batch_limit: 20,
        }
    }
}

impl From<&Config> for PollerConfig {
    fn from(config: &Config) -> Self {
        Self {
            poll_interval: config.poll_interval,
            metrics_interval: config.metrics_interval,
            blocks_interval: config.blocks_interval,
            batch_limit: config.batch_limit,
        }
    }
}

/// Fetch one page beyond the watermark and ingest it
pub async fn poll_transactions(
    source: &dyn TransactionSource,
    pipeline: &PlaybackPipeline,
    state: &RwLock<DashboardState>,
    batch_limit: usize,
) -> Result<PagePoll, SourceError> {
    let from_block = pipeline.watermark().unwrap_or(0);
    let started = Instant::now();

    match source.fetch_transactions(from_block, batch_limit).await {
        Ok(page) => {
            let latency_ms = started.elapsed().as_secs_f64() * 1000.0;
            pipeline.set_network_latency(latency_ms);

            let fetched = page.transactions.len();
            let (has_more, next_block) = (page.has_more, page.next_block);
            let report = pipeline.ingest(page.transactions);
            state.write().await.record_page(&report, latency_ms);

            if report.appended > 0 {
                log::debug!(
                    "Polled {} txs from block {}: {} queued (pending {}, {:.0}ms)",
                    fetched,
                    from_block,
                    report.appended,
                    pipeline.pending_len(),
                    latency_ms
                );
            }
            Ok(PagePoll {
                report,
                has_more,
                next_block,
            })
        }
        Err(e) => {
            log::warn!("Failed to fetch transactions from block {}: {}", from_block, e);
            state.write().await.record_error(e.to_string());
            Err(e)
        }
    }
}

/// Poll transactions, then keep fetching while the source has a backlog
///
/// Stops early on a failed fetch or a page that adds nothing, since the
/// watermark would not move and the same page would come back. Returns the
/// number of pages fetched successfully.
pub async fn poll_until_caught_up(
    source: &dyn TransactionSource,
    pipeline: &PlaybackPipeline,
    state: &RwLock<DashboardState>,
    batch_limit: usize,
) -> usize {
    let mut pages = 0;
    while let Ok(poll) = poll_transactions(source, pipeline, state, batch_limit).await {
        pages += 1;
        if !poll.has_more || poll.report.appended == 0 || pages > MAX_FOLLOW_UP_PAGES {
            break;
        }
        log::debug!(
            "Source has more beyond block {}, fetching follow-up page",
            poll.next_block
        );
    }
    pages
}

/// Refresh network metrics and feed TPS into the pacing signals
pub async fn poll_metrics(
    source: &dyn TransactionSource,
    pipeline: &PlaybackPipeline,
    state: &RwLock<DashboardState>,
) -> Result<(), SourceError> {
    match source.fetch_metrics().await {
        Ok(metrics) => {
            pipeline.set_tps(metrics.tps);
            state.write().await.set_metrics(metrics);
            Ok(())
        }
        Err(e) => {
            log::warn!("Failed to fetch metrics: {}", e);
            state.write().await.record_error(e.to_string());
            Err(e)
        }
    }
}

pub async fn poll_blocks(
    source: &dyn TransactionSource,
    state: &RwLock<DashboardState>,
) -> Result<(), SourceError> {
    match source.fetch_recent_blocks(RECENT_BLOCKS_LIMIT).await {
        Ok(blocks) => {
            state.write().await.set_recent_blocks(blocks);
            Ok(())
        }
        Err(e) => {
            log::warn!("Failed to fetch recent blocks: {}", e);
            state.write().await.record_error(e.to_string());
            Err(e)
        }
    }
}

/// Run all polling timers until `shutdown` flips to true
///
/// Every timer fires once immediately so the dashboard fills on startup.
pub async fn run_poller(
    source: Arc<dyn TransactionSource>,
    pipeline: PlaybackPipeline,
    state: Arc<RwLock<DashboardState>>,
    config: PollerConfig,
    mut shutdown: watch::Receiver<bool>,
) {
    log::info!("🔄 Starting poller ({} source)", source.name());
    log::info!("   ├─ Transactions every {}ms (limit {})", config.poll_interval.as_millis(), config.batch_limit);
    log::info!("   ├─ Metrics every {}ms", config.metrics_interval.as_millis());
    log::info!("   └─ Blocks every {}ms", config.blocks_interval.as_millis());

    let mut tx_timer = interval(config.poll_interval);
    let mut metrics_timer = interval(config.metrics_interval);
    let mut blocks_timer = interval(config.blocks_interval);
    for timer in [&mut tx_timer, &mut metrics_timer, &mut blocks_timer] {
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
    }

    loop {
        if *shutdown.borrow() {
            break;
        }

        tokio::select! {
            _ = tx_timer.tick() => {
                poll_until_caught_up(source.as_ref(), &pipeline, &state, config.batch_limit).await;
            }
            _ = metrics_timer.tick() => {
                let _ = poll_metrics(source.as_ref(), &pipeline, &state).await;
            }
            _ = blocks_timer.tick() => {
                let _ = poll_blocks(source.as_ref(), &state).await;
            }
            changed = shutdown.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }

    log::info!("Poller stopped");
}
