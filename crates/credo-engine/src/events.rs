//! Domain events for external consumption (indexers, UIs)
//!
//! Events describe committed operations only; a rejected call emits nothing.

use credo_common::{Amount, Asset};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A committed ledger operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LedgerEvent {
    Supplied {
        user: String,
        asset: Asset,
        amount: Amount,
        /// Score after the +1 supply bump
        credit_score: u64,
    },
    Withdrawn {
        user: String,
        asset: Asset,
        amount: Amount,
    },
    Borrowed {
        user: String,
        borrow_asset: Asset,
        borrow_amount: Amount,
        collateral_asset: Asset,
        collateral_amount: Amount,
    },
    Repaid {
        user: String,
        borrow_asset: Asset,
        amount: Amount,
    },
}

/// Event with delivery metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Unique event id
    pub id: Uuid,
    /// Emission timestamp (Unix milliseconds)
    pub at_ms: i64,
    pub event: LedgerEvent,
}

impl EventRecord {
    pub fn new(event: LedgerEvent) -> Self {
        Self {
            id: Uuid::new_v4(),
            at_ms: chrono::Utc::now().timestamp_millis(),
            event,
        }
    }
}
