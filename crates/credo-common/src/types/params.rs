//! Engine parameters - owner-mutable basis-point rates
//!
//! Parameters are read at the time of each operation. A change applies to
//! future accrual and to borrows opened after the change; interest already
//! credited is never restated.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// The basis-point rates consumed by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterSet {
    /// Annual yield paid on supplied assets
    pub supply_earn_bps: u32,

    /// Upfront fee retained by the pool on each borrow
    pub borrow_fee_bps: u32,

    /// Required collateral value as bps of borrowed value (12000 = 120%)
    pub borrow_collateral_bps: u32,
}

impl Default for ParameterSet {
    fn default() -> Self {
        // Launch parameters: 8% supply yield, 10% borrow fee, 120% collateral
        Self {
            supply_earn_bps: 800,
            borrow_fee_bps: 1_000,
            borrow_collateral_bps: 12_000,
        }
    }
}

/// Shared, internally synchronized parameter storage
///
/// Authorization is not enforced here; the engine performs the owner check
/// before delegating a write.
#[derive(Debug)]
pub struct ParameterStore {
    inner: RwLock<ParameterSet>,
}

impl ParameterStore {
    pub fn new(params: ParameterSet) -> Self {
        Self {
            inner: RwLock::new(params),
        }
    }

    /// Snapshot of the current parameter values
    pub fn current(&self) -> ParameterSet {
        *self.inner.read()
    }

    pub fn supply_earn_bps(&self) -> u32 {
        self.inner.read().supply_earn_bps
    }

    pub fn borrow_fee_bps(&self) -> u32 {
        self.inner.read().borrow_fee_bps
    }

    pub fn borrow_collateral_bps(&self) -> u32 {
        self.inner.read().borrow_collateral_bps
    }

    pub fn set_supply_earn_bps(&self, bps: u32) {
        self.inner.write().supply_earn_bps = bps;
    }

    pub fn set_borrow_fee_bps(&self, bps: u32) {
        self.inner.write().borrow_fee_bps = bps;
    }

    pub fn set_borrow_collateral_bps(&self, bps: u32) {
        self.inner.write().borrow_collateral_bps = bps;
    }
}

impl Default for ParameterStore {
    fn default() -> Self {
        Self::new(ParameterSet::default())
    }
}
