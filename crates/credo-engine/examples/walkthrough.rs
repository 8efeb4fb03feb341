//! Walkthrough - a full lifecycle against the in-memory ports
//!
//! Run with `cargo run -p credo-engine --example walkthrough`.

use std::sync::Arc;

use anyhow::Result;
use credo_common::Asset;
use credo_engine::{
    EngineConfig, InMemoryGateway, LendingEngine, ManualClock, StaticRateOracle,
};
use credo_ledger::SECONDS_PER_YEAR;
use tracing_subscriber::EnvFilter;

const UNIT: u128 = 1_000_000_000_000_000_000; // one 18-decimal asset unit

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let gateway = Arc::new(InMemoryGateway::new());
    let clock = Arc::new(ManualClock::new(0));
    let engine = LendingEngine::new(
        "owner",
        EngineConfig::load()?,
        Arc::new(StaticRateOracle::identity()),
        gateway.clone(),
        clock.clone(),
    );
    let mut events = engine.subscribe();

    // Bob seeds the pool; Alice supplies and later borrows against ALPHA
    engine.supply("bob", Asset::Native, 100 * UNIT, 100 * UNIT).await?;
    engine.supply("alice", Asset::Native, 10 * UNIT, 10 * UNIT).await?;

    gateway.fund("alice", Asset::TokenAlpha, 12 * UNIT);
    engine
        .borrow("alice", Asset::Native, 10 * UNIT, Asset::TokenAlpha, 12 * UNIT, 0)
        .await?;
    println!(
        "disbursed net of fee: {}",
        Asset::Native.format_amount(gateway.balance_of("alice", Asset::Native))
    );

    engine.repay("alice", 10 * UNIT).await?;
    println!(
        "collateral returned: {}",
        Asset::TokenAlpha.format_amount(gateway.balance_of("alice", Asset::TokenAlpha))
    );
    println!("alice credit score: {}", engine.credit_score_of("alice"));

    // A year of yield on Alice's supply position
    clock.advance(SECONDS_PER_YEAR as i64);
    if let Some(pos) = engine.accrued_supply_position("alice", Asset::Native)? {
        println!(
            "after one year: principal {}, interest {}",
            Asset::Native.format_amount(pos.principal),
            Asset::Native.format_amount(pos.accrued_interest)
        );
    }

    while let Ok(record) = events.try_recv() {
        println!("event: {}", serde_json::to_string(&record)?);
    }
    Ok(())
}
