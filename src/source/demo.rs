//! Offline synthetic source
//!
//! Produces bursty traffic across advancing blocks: most polls return a
//! handful of transactions, some return a full page. A fraction of every
//! batch re-delivers recently seen hashes, like an overlapping block window
//! from a real backend would.

use super::{SourceResult, TransactionPage, TransactionSource};
use crate::pipeline::types::{BlockSummary, NetworkMetrics, NetworkActivity, TxRecord};
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

const HISTORY_LIMIT: usize = 500;
const BURST_PROBABILITY: f64 = 0.25;
const REDELIVERY_PROBABILITY: f64 = 0.15;
const POLL_WINDOW_SECS: f64 = 3.0;
const GENESIS_BLOCK: u64 = 1_000_000;

const INPUT_SAMPLES: [&str; 7] = [
    "0x",
    "0x",
    "0x38ed17390000000000000000000000000000000000000000000000000de0b6b3a7640000",
    "0x40c10f19000000000000000000000000a0b86991c6218b36c1d19d4a2e9eb0ce3606eb48",
    "0x42966c680000000000000000000000000000000000000000000000000000000000000064",
    "0xa694fc3a0000000000000000000000000000000000000000000000056bc75e2d63100000",
    "0xa9059cbb000000000000000000000000c02aaa39b223fe8d0a0e5c4f27ead9083c756cc2",
];

struct DemoState {
    rng: StdRng,
    head: u64,
    history: VecDeque<TxRecord>,
    last_batch_size: usize,
}

/// `TransactionSource` that fabricates plausible traffic
pub struct DemoSource {
    state: Mutex<DemoState>,
}

impl Default for DemoSource {
    fn default() -> Self {
        Self::from_rng(StdRng::from_entropy())
    }
}

impl DemoSource {
    /// Deterministic source for tests and reproducible demos
    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    fn from_rng(rng: StdRng) -> Self {
        Self {
            state: Mutex::new(DemoState {
                rng,
                head: GENESIS_BLOCK,
                history: VecDeque::with_capacity(HISTORY_LIMIT),
                last_batch_size: 0,
            }),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, DemoState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn random_hex<const N: usize>(rng: &mut StdRng) -> String {
    let bytes: [u8; N] = std::array::from_fn(|_| rng.gen());
    format!("0x{}", hex::encode(bytes))
}

fn random_record(rng: &mut StdRng, block_number: u64) -> TxRecord {
    let input = INPUT_SAMPLES[rng.gen_range(0..INPUT_SAMPLES.len())];
    let to = if rng.gen_bool(0.05) {
        None
    } else {
        Some(random_hex::<20>(rng))
    };
    let value_wei = rng.gen_range(0u128..5_000_000_000_000_000_000);

    TxRecord {
        hash: random_hex::<32>(rng),
        block_number,
        from: random_hex::<20>(rng),
        to,
        value: value_wei.to_string(),
        input: Some(input.to_string()),
        gas_used: Some(rng.gen_range(21_000..400_000)),
        timestamp: Some(chrono::Utc::now().timestamp()),
    }
}

#[async_trait]
impl TransactionSource for DemoSource {
    async fn fetch_transactions(&self, from_block: u64, limit: usize) -> SourceResult<TransactionPage> {
        let mut guard = self.lock();
        let state = &mut *guard;

        state.head += state.rng.gen_range(1..=3);
        let first_block = from_block.max(state.head.saturating_sub(2)).min(state.head);

        let fresh = if state.rng.gen_bool(BURST_PROBABILITY) {
            limit
        } else {
            state.rng.gen_range(0..=limit.min(4))
        };

        let mut transactions = Vec::with_capacity(fresh + 2);
        for _ in 0..fresh {
            let block = state.rng.gen_range(first_block..=state.head);
            transactions.push(random_record(&mut state.rng, block));
        }
        transactions.sort_by_key(|tx| tx.block_number);

        if !state.history.is_empty() && state.rng.gen_bool(REDELIVERY_PROBABILITY) {
            let idx = state.rng.gen_range(0..state.history.len());
            transactions.insert(0, state.history[idx].clone());
        }

        for tx in &transactions {
            if !state.history.iter().any(|seen| seen.hash == tx.hash) {
                state.history.push_front(tx.clone());
            }
        }
        state.history.truncate(HISTORY_LIMIT);
        state.last_batch_size = fresh;

        Ok(TransactionPage {
            transactions,
            next_block: state.head + 1,
            // A full burst leaves a backlog behind it
            has_more: limit > 0 && fresh == limit,
        })
    }

    async fn fetch_metrics(&self) -> SourceResult<NetworkMetrics> {
        let state = self.lock();
        let tps = state.last_batch_size as f64 / POLL_WINDOW_SECS;

        Ok(NetworkMetrics {
            tps,
            tps_10s: tps,
            tps_30s: tps,
            tps_60s: tps,
            blocks_per_minute: 60.0 / 1.5,
            block_height: state.head,
            validators: 100,
            avg_block_time: 1.5,
            network_activity: Some(NetworkActivity::from_tps(tps).label().to_string()),
        })
    }

    async fn fetch_recent_blocks(&self, limit: usize) -> SourceResult<Vec<BlockSummary>> {
        let mut guard = self.lock();
        let DemoState { rng, head, history, .. } = &mut *guard;
        let head = *head;
        let now = chrono::Utc::now().timestamp();

        let blocks = (0..limit as u64)
            .take_while(|offset| *offset < head)
            .map(|offset| {
                let number = head - offset;
                let transaction_count = history
                    .iter()
                    .filter(|tx| tx.block_number == number)
                    .count() as u64;
                BlockSummary {
                    number,
                    hash: random_hex::<32>(rng),
                    timestamp: now - offset as i64,
                    transaction_count,
                    gas_utilization: rng.gen_range(5.0..95.0),
                    size: rng.gen_range(800..64_000),
                }
            })
            .collect();

        Ok(blocks)
    }

    async fn search_by_address(&self, address: &str, limit: usize) -> SourceResult<Vec<TxRecord>> {
        let needle = address.trim().to_lowercase();
        let state = self.lock();

        Ok(state
            .history
            .iter()
            .filter(|tx| {
                tx.from.to_lowercase() == needle
                    || tx.to.as_deref().map(str::to_lowercase).as_deref() == Some(needle.as_str())
            })
            .take(limit)
            .cloned()
            .collect())
    }

    fn name(&self) -> &str {
        "demo"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[tokio::test]
    async fn test_pages_stay_at_or_beyond_from_block() {
        let source = DemoSource::with_seed(7);
        let mut from_block = 0;
        let mut seen = HashSet::new();

        for _ in 0..50 {
            let page = source.fetch_transactions(from_block, 20).await.unwrap();
            assert!(page.transactions.len() <= 21);
            if page.has_more {
                assert!(page.transactions.len() >= 20);
            }
            for tx in &page.transactions {
                assert!(tx.has_identity());
                assert_eq!(tx.hash.len(), 66);
                // only re-deliveries may sit below the requested block
                assert!(tx.block_number >= from_block || seen.contains(&tx.hash));
            }
            seen.extend(page.transactions.into_iter().map(|tx| tx.hash));
            from_block = page.next_block;
        }
    }

    #[tokio::test]
    async fn test_redelivers_known_hashes() {
        let source = DemoSource::with_seed(42);
        let mut seen = HashSet::new();
        let mut repeats = 0;

        for _ in 0..200 {
            let page = source.fetch_transactions(0, 10).await.unwrap();
            for tx in page.transactions {
                if !seen.insert(tx.hash) {
                    repeats += 1;
                }
            }
        }
        assert!(repeats > 0);
    }

    #[tokio::test]
    async fn test_search_finds_sender() {
        let source = DemoSource::with_seed(3);
        let mut page = source.fetch_transactions(0, 20).await.unwrap();
        while page.transactions.is_empty() {
            page = source.fetch_transactions(0, 20).await.unwrap();
        }

        let sender = page.transactions[0].from.to_uppercase().replace("0X", "0x");
        let found = source.search_by_address(&sender, 10).await.unwrap();
        assert!(found.iter().any(|tx| tx.hash == page.transactions[0].hash));
    }

    #[tokio::test]
    async fn test_recent_blocks_descend() {
        let source = DemoSource::with_seed(1);
        source.fetch_transactions(0, 5).await.unwrap();

        let blocks = source.fetch_recent_blocks(5).await.unwrap();
        assert_eq!(blocks.len(), 5);
        assert!(blocks.windows(2).all(|w| w[0].number == w[1].number + 1));

        let metrics = source.fetch_metrics().await.unwrap();
        assert_eq!(metrics.block_height, blocks[0].number);
    }
}
