//! # Credo Ledger
//!
//! Value-bearing state for the Credo lending ledger.
//!
//! ## Components
//!
//! - [`accrual`]: Pure time-weighted interest computation
//! - [`PositionLedger`]: Exclusive owner of supply/borrow positions and
//!   per-asset pool liquidity
//! - [`CreditScoreTracker`]: Monotone per-user reputation counters
//!
//! The ledger exposes plan (read-only) and commit variants of its fallible
//! operations so the engine can order external transfers between validation
//! and the final state write without ever needing a rollback.

pub mod accrual;
pub mod credit;
pub mod positions;

pub use accrual::{accrue, Accrual, SECONDS_PER_YEAR};
pub use credit::CreditScoreTracker;
pub use positions::{PositionLedger, SupplyOutcome, WithdrawOutcome};
