//! Engine configuration

use anyhow::Result;
use credo_common::ParameterSet;
use serde::{Deserialize, Serialize};

/// Lending engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Annual supply yield in basis points
    pub supply_earn_bps: u32,
    /// Upfront borrow fee in basis points
    pub borrow_fee_bps: u32,
    /// Required collateral ratio in basis points
    pub borrow_collateral_bps: u32,
    /// Broadcast buffer size for domain events
    pub event_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let params = ParameterSet::default();
        Self {
            supply_earn_bps: params.supply_earn_bps,
            borrow_fee_bps: params.borrow_fee_bps,
            borrow_collateral_bps: params.borrow_collateral_bps,
            event_capacity: 256,
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables
    pub fn load() -> Result<Self> {
        // Try to load .env file
        let _ = dotenvy::dotenv();

        let mut cfg = Self::default();

        if let Ok(val) = std::env::var("CREDO_SUPPLY_EARN_BPS") {
            if let Ok(v) = val.parse() {
                cfg.supply_earn_bps = v;
            }
        }
        if let Ok(val) = std::env::var("CREDO_BORROW_FEE_BPS") {
            if let Ok(v) = val.parse() {
                cfg.borrow_fee_bps = v;
            }
        }
        if let Ok(val) = std::env::var("CREDO_BORROW_COLLATERAL_BPS") {
            if let Ok(v) = val.parse() {
                cfg.borrow_collateral_bps = v;
            }
        }
        if let Ok(val) = std::env::var("CREDO_EVENT_CAPACITY") {
            if let Ok(v) = val.parse() {
                cfg.event_capacity = v;
            }
        }

        Ok(cfg)
    }

    /// Initial parameter set for the engine's parameter store
    pub fn parameter_set(&self) -> ParameterSet {
        ParameterSet {
            supply_earn_bps: self.supply_earn_bps,
            borrow_fee_bps: self.borrow_fee_bps,
            borrow_collateral_bps: self.borrow_collateral_bps,
        }
    }
}
