//! Supply and borrow position records
//!
//! A [`SupplyPosition`] exists per (user, asset) from the first supply on and
//! is never deleted; a fully withdrawn position stays behind as a zero-valued
//! record. A [`BorrowPosition`] is a single reusable slot per user: closed
//! means `borrowed_amount == 0`, and a closed slot never holds collateral.

use crate::types::asset::Asset;
use crate::Amount;
use serde::{Deserialize, Serialize};

/// A user's supply position in one asset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplyPosition {
    /// Base units supplied, net of withdrawals
    pub principal: Amount,

    /// Interest credited but not yet withdrawn
    pub accrued_interest: Amount,

    /// Timestamp (seconds) of the last accrual computation
    pub last_update_time: i64,
}

impl SupplyPosition {
    /// Create an empty position anchored at `now`
    pub fn new(now: i64) -> Self {
        Self {
            principal: 0,
            accrued_interest: 0,
            last_update_time: now,
        }
    }

    /// Total withdrawable value (principal + accrued interest)
    #[inline]
    pub fn available(&self) -> Amount {
        self.principal + self.accrued_interest
    }
}

/// A user's collateralized borrow slot
///
/// At most one borrow may be open per user; the slot is reset on full
/// repayment and reused for the next borrow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BorrowPosition {
    /// Asset borrowed from the pool
    pub borrow_asset: Asset,

    /// Asset locked as collateral (always distinct from `borrow_asset`)
    pub collateral_asset: Asset,

    /// Base units of collateral locked
    pub collateral_amount: Amount,

    /// Base units owed (full borrow amount, fee not deducted from debt)
    pub borrowed_amount: Amount,

    /// Timestamp (seconds) the borrow was opened
    pub opened_at: i64,
}

impl BorrowPosition {
    /// Whether the slot currently holds an open borrow
    #[inline]
    pub fn is_open(&self) -> bool {
        self.borrowed_amount > 0
    }

    /// Reset the slot to the closed state, leaving no dangling collateral
    pub fn close(&mut self) {
        self.borrowed_amount = 0;
        self.collateral_amount = 0;
    }
}
