//! # Adaptive Playback Pipeline
//!
//! Smooths bursty polled batches into a steady stream of records for the UI.
//!
//! ```text
//! batch ──► ingestion (dedup) ──► pending queue ──► engine drain loop ──► display buffer
//!                                                     ▲
//!                                                 pacing::compute_delay
//! ```
//!
//! ## Module Organization
//!
//! - `types` - `TxRecord` and read-side helpers (kind, metrics, blocks)
//! - `ingestion` - deduplicating append into the pending queue
//! - `pacing` - pure delay computation and pacing diagnostics
//! - `display` - bounded most-recent-first buffer
//! - `engine` - `PlaybackPipeline`, the owner of all mutable state
//! - `config` - named pipeline parameters

pub mod config;
pub mod display;
pub mod engine;
pub mod ingestion;
pub mod pacing;
pub mod types;

pub use config::PipelineConfig;
pub use display::{DisplayBuffer, DISPLAY_CAPACITY};
pub use engine::{NetworkSignals, PlaybackPipeline};
pub use ingestion::IngestReport;
pub use pacing::{
    compute_delay, PacingConfig, PacingConfigError, PacingState, BASE_DELAY_MS, MAX_DELAY_MS,
    MIN_DELAY_MS,
};
pub use types::{BlockSummary, NetworkActivity, NetworkMetrics, TxKind, TxRecord};
