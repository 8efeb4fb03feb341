//! # Credo Common
//!
//! Shared types, errors, and fixed-point math for the Credo lending ledger.
//!
//! ## Core Types
//!
//! - [`Asset`]: Enumerated asset identifiers with registry metadata
//! - [`SupplyPosition`]: Per-(user, asset) principal and accrued interest
//! - [`BorrowPosition`]: Per-user collateralized borrow slot
//! - [`ParameterSet`]/[`ParameterStore`]: Basis-point rates read by the engine
//!
//! ## Math
//!
//! - [`bps`]: Basis-point arithmetic (integer multiply-before-divide,
//!   truncation toward zero)

pub mod bps;
pub mod error;
pub mod types;

// Re-export commonly used types at crate root
pub use bps::{apply_bps, BPS_SCALE};
pub use error::{CredoError, LendError, Result};
pub use types::{
    asset::{Asset, AssetInfo, AssetKind},
    params::{ParameterSet, ParameterStore},
    position::{BorrowPosition, SupplyPosition},
};

/// Credo version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Base-unit amount type used for all internal accounting
pub type Amount = u128;

/// Credit-score delta awarded for a supply
pub const SUPPLY_CREDIT_DELTA: u64 = 1;

/// Credit-score delta awarded for a full repayment
pub const REPAY_CREDIT_DELTA: u64 = 2;
