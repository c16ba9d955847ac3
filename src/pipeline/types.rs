//! Core data types for the playback pipeline
//!
//! `TxRecord` is the unit that flows source -> pending queue -> display buffer.
//! Everything else in this module is read-side helpers used by the UI.

use serde::{Deserialize, Serialize};

/// One observed transaction
///
/// Identity is the `hash` alone. Records are cloned between the pending queue
/// and the display buffer, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxRecord {
    pub hash: String,
    pub block_number: u64,
    pub from: String,
    pub to: Option<String>,
    /// Decimal string in base units (wei)
    pub value: String,
    pub input: Option<String>,
    #[serde(default)]
    pub gas_used: Option<u64>,
    #[serde(default)]
    pub timestamp: Option<i64>,
}

impl TxRecord {
    /// A record is admissible only if it carries a non-empty hash
    pub fn has_identity(&self) -> bool {
        !self.hash.trim().is_empty()
    }

    /// True when the call data is more than the empty `0x` marker
    pub fn is_contract_call(&self) -> bool {
        self.input
            .as_deref()
            .map(|input| input.len() > 2)
            .unwrap_or(false)
    }

    /// First four bytes of the call data, if the input is well-formed hex
    pub fn selector(&self) -> Option<[u8; 4]> {
        let input = self.input.as_deref()?;
        let hex_body = input.strip_prefix("0x").unwrap_or(input);
        if hex_body.len() < 8 {
            return None;
        }
        let bytes = hex::decode(hex_body.get(..8)?).ok()?;
        bytes.try_into().ok()
    }

    pub fn kind(&self) -> TxKind {
        TxKind::classify(self)
    }
}

/// Coarse classification of a transaction by its call data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TxKind {
    Transfer,
    Swap,
    Mint,
    Burn,
    Stake,
    Other,
}

const SWAP_SELECTORS: [[u8; 4]; 3] = [
    [0x38, 0xed, 0x17, 0x39], // swapExactTokensForTokens
    [0x88, 0x03, 0xdb, 0xee], // swapTokensForExactTokens
    [0xfb, 0x3b, 0xdb, 0x41], // swapETHForExactTokens
];
const MINT_SELECTOR: [u8; 4] = [0x40, 0xc1, 0x0f, 0x19];
const BURN_SELECTOR: [u8; 4] = [0x42, 0x96, 0x6c, 0x68];
const STAKE_SELECTOR: [u8; 4] = [0xa6, 0x94, 0xfc, 0x3a];

impl TxKind {
    pub fn classify(record: &TxRecord) -> Self {
        if !record.is_contract_call() {
            return TxKind::Transfer;
        }

        let input = record
            .input
            .as_deref()
            .unwrap_or_default()
            .to_lowercase();
        let selector = record.selector();
        let matches = |needle: &str, sel: &[u8; 4]| {
            input.contains(needle) || selector.as_ref() == Some(sel)
        };

        if input.contains("swap") || selector.map_or(false, |s| SWAP_SELECTORS.contains(&s)) {
            TxKind::Swap
        } else if matches("mint", &MINT_SELECTOR) {
            TxKind::Mint
        } else if matches("burn", &BURN_SELECTOR) {
            TxKind::Burn
        } else if matches("stake", &STAKE_SELECTOR) {
            TxKind::Stake
        } else {
            TxKind::Other
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TxKind::Transfer => "Transfer",
            TxKind::Swap => "Swap",
            TxKind::Mint => "Mint",
            TxKind::Burn => "Burn",
            TxKind::Stake => "Stake",
            TxKind::Other => "Other",
        }
    }
}

/// Network-wide metrics reported by the data source
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkMetrics {
    pub tps: f64,
    pub tps_10s: f64,
    pub tps_30s: f64,
    pub tps_60s: f64,
    pub blocks_per_minute: f64,
    pub block_height: u64,
    pub validators: u64,
    pub avg_block_time: f64,
    pub network_activity: Option<String>,
}

/// Activity bucket derived from TPS
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkActivity {
    Low,
    Medium,
    High,
}

impl NetworkActivity {
    pub fn from_tps(tps: f64) -> Self {
        if tps > 5.0 {
            NetworkActivity::High
        } else if tps > 1.0 {
            NetworkActivity::Medium
        } else {
            NetworkActivity::Low
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            NetworkActivity::Low => "Low",
            NetworkActivity::Medium => "Medium",
            NetworkActivity::High => "High",
        }
    }
}

impl NetworkMetrics {
    /// Activity as reported by the source, falling back to the TPS buckets
    pub fn activity_label(&self) -> String {
        self.network_activity
            .clone()
            .unwrap_or_else(|| NetworkActivity::from_tps(self.tps).label().to_string())
    }
}

/// Summary of a recently produced block
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockSummary {
    pub number: u64,
    pub hash: String,
    pub timestamp: i64,
    pub transaction_count: u64,
    pub gas_utilization: f64,
    pub size: u64,
}

#[cfg(test)]
pub(crate) fn make_record(hash: &str, block_number: u64) -> TxRecord {
    TxRecord {
        hash: hash.to_string(),
        block_number,
        from: "0x1111111111111111111111111111111111111111".to_string(),
        to: Some("0x2222222222222222222222222222222222222222".to_string()),
        value: "1000000000000000000".to_string(),
        input: None,
        gas_used: None,
        timestamp: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_input(input: &str) -> TxRecord {
        TxRecord {
            input: Some(input.to_string()),
            ..make_record("0xabc", 1)
        }
    }

    #[test]
    fn test_kind_classification() {
        assert_eq!(make_record("0xabc", 1).kind(), TxKind::Transfer);
        assert_eq!(with_input("0x").kind(), TxKind::Transfer);
        assert_eq!(with_input("0x38ed1739000000").kind(), TxKind::Swap);
        assert_eq!(with_input("0xFB3BDB41ffff").kind(), TxKind::Swap);
        assert_eq!(with_input("0x40c10f19aa").kind(), TxKind::Mint);
        assert_eq!(with_input("0x42966c68").kind(), TxKind::Burn);
        assert_eq!(with_input("0xa694fc3a0001").kind(), TxKind::Stake);
        assert_eq!(with_input("0xdeadbeef").kind(), TxKind::Other);
    }

    #[test]
    fn test_selector_requires_hex() {
        assert_eq!(with_input("0xzzzzzzzz").selector(), None);
        assert_eq!(with_input("0x1234").selector(), None);
        assert_eq!(
            with_input("0xa9059cbb0000").selector(),
            Some([0xa9, 0x05, 0x9c, 0xbb])
        );
    }

    #[test]
    fn test_identity_check() {
        assert!(make_record("0xabc", 1).has_identity());
        assert!(!make_record("", 1).has_identity());
        assert!(!make_record("   ", 1).has_identity());
    }

    #[test]
    fn test_activity_buckets() {
        assert_eq!(NetworkActivity::from_tps(0.0), NetworkActivity::Low);
        assert_eq!(NetworkActivity::from_tps(1.0), NetworkActivity::Low);
        assert_eq!(NetworkActivity::from_tps(3.2), NetworkActivity::Medium);
        assert_eq!(NetworkActivity::from_tps(5.1), NetworkActivity::High);

        let metrics = NetworkMetrics { tps: 7.0, ..Default::default() };
        assert_eq!(metrics.activity_label(), "High");
    }

    #[test]
    fn test_record_json_shape() {
        let json = r#"{"hash":"0x01","blockNumber":42,"from":"0xf","to":null,"value":"5","input":"0x"}"#;
        let record: TxRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.block_number, 42);
        assert_eq!(record.to, None);
        assert_eq!(record.gas_used, None);
    }
}
