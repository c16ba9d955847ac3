//! Data source boundary
//!
//! The dashboard only consumes what a `TransactionSource` hands it. Two
//! implementations ship with the crate:
//!
//! - `HttpSource` - JSON API backend (transactions, metrics, blocks, search)
//! - `DemoSource` - offline synthetic bursts for demos and local runs

pub mod demo;
pub mod http;

use crate::pipeline::types::{BlockSummary, NetworkMetrics, TxRecord};
use async_trait::async_trait;

pub use demo::DemoSource;
pub use http::HttpSource;

/// Error surfaced by a data source; always transient from the pipeline's view
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("source responded with HTTP {0}")]
    Status(reqwest::StatusCode),

    #[error("source reported an error: {0}")]
    Api(String),

    #[error("malformed response: {0}")]
    Decode(String),
}

pub type SourceResult<T> = Result<T, SourceError>;

/// One page of transactions at or beyond a block
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionPage {
    pub transactions: Vec<TxRecord>,
    pub next_block: u64,
    pub has_more: bool,
}

#[async_trait]
pub trait TransactionSource: Send + Sync {
    /// Transactions with `block_number >= from_block`, at most `limit`
    async fn fetch_transactions(&self, from_block: u64, limit: usize) -> SourceResult<TransactionPage>;

    async fn fetch_metrics(&self) -> SourceResult<NetworkMetrics>;

    async fn fetch_recent_blocks(&self, limit: usize) -> SourceResult<Vec<BlockSummary>>;

    /// Transactions sent from or to `address`
    async fn search_by_address(&self, address: &str, limit: usize) -> SourceResult<Vec<TxRecord>>;

    /// Short name for logs
    fn name(&self) -> &str;
}
