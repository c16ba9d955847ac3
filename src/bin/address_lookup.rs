//! Address Lookup - one-shot search of transactions by address
//!
//! Prints every transaction the configured source returns for an address,
//! newest first, as a plain text table.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --bin address_lookup -- --address <ADDRESS> [--limit 50]
//! ```
//!
//! ## Environment Variables
//!
//! - `TXFLOW_API_URL` - API endpoint (default: http://localhost:3001)
//! - `TXFLOW_DEMO` - search the synthetic demo feed instead
//! - `RUST_LOG` - Log level (default: info)

use dotenv::dotenv;
use txflow::{
    config::Config,
    source::{demo::DemoSource, http::HttpSource, TransactionSource},
    ui::renderer::{format_address, format_hash, format_value},
};

const DEFAULT_LIMIT: usize = 50;

struct LookupArgs {
    address: String,
    limit: usize,
}

impl LookupArgs {
    fn from_args() -> Result<Self, Box<dyn std::error::Error>> {
        let args: Vec<String> = std::env::args().collect();

        let address = args
            .windows(2)
            .find(|w| w[0] == "--address")
            .map(|w| w[1].trim().to_string())
            .filter(|a| !a.is_empty())
            .ok_or("Missing --address argument. Usage: address_lookup --address <ADDRESS>")?;

        let limit = match args.windows(2).find(|w| w[0] == "--limit") {
            Some(w) => w[1]
                .parse::<usize>()
                .map_err(|_| format!("Invalid --limit value '{}'", w[1]))?,
            None => DEFAULT_LIMIT,
        };

        Ok(Self { address, limit })
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let args = LookupArgs::from_args()?;
    let config = Config::from_env()?;

    let source: Box<dyn TransactionSource> = if config.demo {
        Box::new(DemoSource::default())
    } else {
        Box::new(HttpSource::new(&config.api_url, config.request_timeout)?)
    };

    log::info!("🔍 Searching {} for {}", source.name(), args.address);
    let mut transactions = source.search_by_address(&args.address, args.limit).await?;
    transactions.sort_by(|a, b| b.block_number.cmp(&a.block_number));

    if transactions.is_empty() {
        println!("No transactions found for {}", args.address);
        return Ok(());
    }

    println!(
        "{:<14} {:<14} {:<14} {:>22} {:>10} {:<9}",
        "Hash", "From", "To", "Value", "Block", "Type"
    );
    for tx in &transactions {
        println!(
            "{:<14} {:<14} {:<14} {:>22} {:>10} {:<9}",
            format_hash(&tx.hash),
            format_address(Some(&tx.from)),
            format_address(tx.to.as_deref()),
            format_value(&tx.value),
            tx.block_number,
            tx.kind().label()
        );
    }
    log::info!("✅ {} transactions", transactions.len());

    Ok(())
}
