use {
    crate::pipeline::{
        ingestion::IngestReport,
        types::{BlockSummary, NetworkMetrics},
    },
    chrono::{DateTime, Utc},
};

/// Everything the dashboard shows besides the playback window itself
///
/// Written by the poller, read by the UI. The playback window lives in
/// `PlaybackPipeline` and is read through `snapshot()`.
#[derive(Debug, Clone, Default)]
pub struct DashboardState {
    metrics: NetworkMetrics,
    recent_blocks: Vec<BlockSummary>,
    /// Message from the most recent failed fetch, cleared by the next good page
    last_error: Option<String>,
    last_updated: Option<DateTime<Utc>>,
    /// Round-trip time of the last transaction fetch
    latency_ms: f64,
    pages_fetched: u64,
    queued_total: u64,
    rejected_total: u64,
}

impl DashboardState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successful transaction poll
    pub fn record_page(&mut self, report: &IngestReport, latency_ms: f64) {
        self.last_error = None;
        self.last_updated = Some(Utc::now());
        self.latency_ms = latency_ms;
        self.pages_fetched += 1;
        self.queued_total += report.appended as u64;
        self.rejected_total += report.rejected as u64;
    }

    /// Record a failed fetch; queues are left alone, the next tick retries
    pub fn record_error(&mut self, message: String) {
        self.last_error = Some(message);
    }

    pub fn set_metrics(&mut self, metrics: NetworkMetrics) {
        self.metrics = metrics;
    }

    pub fn set_recent_blocks(&mut self, blocks: Vec<BlockSummary>) {
        self.recent_blocks = blocks;
    }

    pub fn metrics(&self) -> &NetworkMetrics {
        &self.metrics
    }

    pub fn recent_blocks(&self) -> &[BlockSummary] {
        &self.recent_blocks
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.last_updated
    }

    pub fn latency_ms(&self) -> f64 {
        self.latency_ms
    }

    pub fn pages_fetched(&self) -> u64 {
        self.pages_fetched
    }

    pub fn queued_total(&self) -> u64 {
        self.queued_total
    }

    pub fn rejected_total(&self) -> u64 {
        self.rejected_total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_clears_error() {
        let mut state = DashboardState::new();
        state.record_error("connection refused".to_string());
        assert_eq!(state.last_error(), Some("connection refused"));

        let report = IngestReport {
            appended: 3,
            duplicates: 1,
            rejected: 1,
            watermark: Some(9),
        };
        state.record_page(&report, 42.0);

        assert_eq!(state.last_error(), None);
        assert!(state.last_updated().is_some());
        assert_eq!(state.latency_ms(), 42.0);
        assert_eq!(state.pages_fetched(), 1);
        assert_eq!(state.queued_total(), 3);
        assert_eq!(state.rejected_total(), 1);
    }
}
