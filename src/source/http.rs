//! HTTP JSON backend
//!
//! Every endpoint answers with the same envelope:
//!
//! ```json
//! { "status": "success", "data": { ... } }
//! { "status": "error", "message": "..." }
//! ```
//!
//! Endpoints used:
//! - `GET /api/transactions?fromBlock={n}&limit={k}`
//! - `GET /api/metrics`
//! - `GET /api/blocks/recent?limit={k}`
//! - `GET /api/transactions/by-address/{address}?limit={k}`

use super::{SourceError, SourceResult, TransactionPage, TransactionSource};
use crate::pipeline::types::{BlockSummary, NetworkMetrics, TxRecord};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    status: String,
    data: Option<T>,
    message: Option<String>,
}

/// Transaction as sent by the backend; every field may be missing
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawTransaction {
    hash: Option<String>,
    block_number: Option<u64>,
    from: Option<String>,
    to: Option<String>,
    value: Option<serde_json::Value>,
    input: Option<String>,
    gas_used: Option<u64>,
    timestamp: Option<f64>,
}

impl From<RawTransaction> for TxRecord {
    /// Missing hashes become empty strings; the ingestor rejects those.
    fn from(raw: RawTransaction) -> Self {
        let value = match raw.value {
            Some(serde_json::Value::String(s)) => s,
            Some(serde_json::Value::Number(n)) => n.to_string(),
            _ => "0".to_string(),
        };

        TxRecord {
            hash: raw.hash.unwrap_or_default(),
            block_number: raw.block_number.unwrap_or(0),
            from: raw.from.unwrap_or_default(),
            to: raw.to.filter(|to| !to.is_empty()),
            value,
            input: raw.input,
            gas_used: raw.gas_used,
            timestamp: raw.timestamp.map(|t| t as i64),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TransactionsData {
    transactions: Vec<RawTransaction>,
    #[serde(default)]
    pagination: Option<Pagination>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Pagination {
    next_block: u64,
    has_more: bool,
}

#[derive(Debug, Deserialize)]
struct MetricsData {
    metrics: NetworkMetrics,
}

#[derive(Debug, Deserialize)]
struct BlocksData {
    blocks: Vec<BlockSummary>,
}

/// `TransactionSource` backed by the dashboard JSON API
pub struct HttpSource {
    base_url: String,
    client: reqwest::Client,
}

impl HttpSource {
    pub fn new(base_url: &str, timeout: Duration) -> SourceResult<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> SourceResult<T> {
        let url = format!("{}{}", self.base_url, path);
        let response = self.client.get(&url).query(query).send().await?;

        if !response.status().is_success() {
            return Err(SourceError::Status(response.status()));
        }

        let body = response.text().await?;
        parse_envelope(&body)
    }
}

fn parse_envelope<T: DeserializeOwned>(body: &str) -> SourceResult<T> {
    let envelope: Envelope<T> =
        serde_json::from_str(body).map_err(|e| SourceError::Decode(e.to_string()))?;

    if envelope.status != "success" {
        return Err(SourceError::Api(
            envelope
                .message
                .unwrap_or_else(|| format!("status '{}'", envelope.status)),
        ));
    }

    envelope
        .data
        .ok_or_else(|| SourceError::Decode("missing data field".to_string()))
}

fn into_page(data: TransactionsData, from_block: u64) -> TransactionPage {
    let transactions: Vec<TxRecord> = data.transactions.into_iter().map(TxRecord::from).collect();

    let (next_block, has_more) = match data.pagination {
        Some(p) => (p.next_block, p.has_more),
        None => {
            let next = transactions
                .iter()
                .map(|tx| tx.block_number + 1)
                .max()
                .unwrap_or(from_block);
            (next, false)
        }
    };

    TransactionPage {
        transactions,
        next_block,
        has_more,
    }
}

#[async_trait]
impl TransactionSource for HttpSource {
    async fn fetch_transactions(&self, from_block: u64, limit: usize) -> SourceResult<TransactionPage> {
        let data: TransactionsData = self
            .get(
                "/api/transactions",
                &[("fromBlock", from_block.to_string()), ("limit", limit.to_string())],
            )
            .await?;
        Ok(into_page(data, from_block))
    }

    async fn fetch_metrics(&self) -> SourceResult<NetworkMetrics> {
        let data: MetricsData = self.get("/api/metrics", &[]).await?;
        Ok(data.metrics)
    }

    async fn fetch_recent_blocks(&self, limit: usize) -> SourceResult<Vec<BlockSummary>> {
        let data: BlocksData = self
            .get("/api/blocks/recent", &[("limit", limit.to_string())])
            .await?;
        Ok(data.blocks)
    }

    async fn search_by_address(&self, address: &str, limit: usize) -> SourceResult<Vec<TxRecord>> {
        let path = format!("/api/transactions/by-address/{}", address.trim());
        let data: TransactionsData = self.get(&path, &[("limit", limit.to_string())]).await?;
        Ok(data.transactions.into_iter().map(TxRecord::from).collect())
    }

    fn name(&self) -> &str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_transactions_page() {
        let body = r#"{
            "status": "success",
            "data": {
                "transactions": [
                    {"hash": "0xaa", "blockNumber": 12, "from": "0x1", "to": "0x2",
                     "value": "1000", "input": "0x", "gasUsed": 21000, "timestamp": 1700000000.5,
                     "isContract": false},
                    {"blockNumber": 13, "from": "0x3", "value": 7}
                ],
                "pagination": {"nextBlock": 14, "hasMore": true}
            }
        }"#;

        let data: TransactionsData = parse_envelope(body).unwrap();
        let page = into_page(data, 10);

        assert_eq!(page.next_block, 14);
        assert!(page.has_more);
        assert_eq!(page.transactions.len(), 2);

        let first = &page.transactions[0];
        assert_eq!(first.hash, "0xaa");
        assert_eq!(first.gas_used, Some(21000));
        assert_eq!(first.timestamp, Some(1_700_000_000));

        let second = &page.transactions[1];
        assert!(!second.has_identity());
        assert_eq!(second.value, "7");
        assert_eq!(second.to, None);
    }

    #[test]
    fn test_page_without_pagination() {
        let body = r#"{"status":"success","data":{"transactions":[
            {"hash":"0x1","blockNumber":4},{"hash":"0x2","blockNumber":9}]}}"#;
        let data: TransactionsData = parse_envelope(body).unwrap();
        let page = into_page(data, 3);
        assert_eq!(page.next_block, 10);
        assert!(!page.has_more);

        let empty: TransactionsData =
            parse_envelope(r#"{"status":"success","data":{"transactions":[]}}"#).unwrap();
        assert_eq!(into_page(empty, 3).next_block, 3);
    }

    #[test]
    fn test_error_envelope() {
        let result: SourceResult<MetricsData> =
            parse_envelope(r#"{"status":"error","message":"hypersync down"}"#);
        match result {
            Err(SourceError::Api(message)) => assert_eq!(message, "hypersync down"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_garbage_body() {
        let result: SourceResult<MetricsData> = parse_envelope("<html>502</html>");
        assert!(matches!(result, Err(SourceError::Decode(_))));
    }

    #[test]
    fn test_parse_metrics_and_blocks() {
        let metrics: MetricsData = parse_envelope(
            r#"{"status":"success","data":{"metrics":{"tps":3.5,"block_height":1200,
            "validators":100,"avg_block_time":0.5,"network_activity":"Medium"}}}"#,
        )
        .unwrap();
        assert_eq!(metrics.metrics.tps, 3.5);
        assert_eq!(metrics.metrics.block_height, 1200);
        assert_eq!(metrics.metrics.tps_10s, 0.0);

        let blocks: BlocksData = parse_envelope(
            r#"{"status":"success","data":{"blocks":[{"number":5,"hash":"0xb",
            "transaction_count":3,"gas_utilization":41.5,"size":2048,"timestamp":1}]}}"#,
        )
        .unwrap();
        assert_eq!(blocks.blocks[0].number, 5);
        assert_eq!(blocks.blocks[0].transaction_count, 3);
    }

    #[test]
    fn test_base_url_is_normalized() {
        let source = HttpSource::new("http://localhost:3001/", Duration::from_secs(1)).unwrap();
        assert_eq!(source.base_url(), "http://localhost:3001");
    }
}
