// Renderer module - formatting utilities
// Layout and widgets live in layout.rs

use crate::pipeline::types::TxKind;
use ratatui::style::Color;

const WEI_PER_UNIT: u128 = 1_000_000_000_000_000_000;
const DISPLAY_DECIMALS: u32 = 6;

/// Shorten a hash or address to `0x1234...abcd`
pub fn format_address(address: Option<&str>) -> String {
    match address {
        None | Some("") => "N/A".to_string(),
        Some(addr) if addr.len() <= 12 || !addr.is_ascii() => addr.to_string(),
        Some(addr) => format!("{}...{}", &addr[..6], &addr[addr.len() - 4..]),
    }
}

pub fn format_hash(hash: &str) -> String {
    format_address(Some(hash))
}

/// Format a base-unit decimal string as MON with 6 decimals
///
/// Integer math keeps full precision for values beyond f64's range.
pub fn format_value(value: &str) -> String {
    match value.trim().parse::<u128>() {
        Ok(wei) => {
            let whole = wei / WEI_PER_UNIT;
            let frac = (wei % WEI_PER_UNIT) / 10u128.pow(18 - DISPLAY_DECIMALS);
            format!("{}.{:06} MON", whole, frac)
        }
        Err(_) => match value.trim().parse::<f64>() {
            Ok(wei) => format!("{:.6} MON", wei / 1e18),
            Err(_) => "N/A".to_string(),
        },
    }
}

pub fn kind_color(kind: TxKind) -> Color {
    match kind {
        TxKind::Transfer => Color::Green,
        TxKind::Swap => Color::Magenta,
        TxKind::Mint => Color::Blue,
        TxKind::Burn => Color::Red,
        TxKind::Stake => Color::LightGreen,
        TxKind::Other => Color::Gray,
    }
}
