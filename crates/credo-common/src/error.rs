//! Error types for the Credo lending ledger
//!
//! Provides a unified error type plus the domain error taxonomy surfaced by
//! every ledger and engine operation. Each rejection carries its own variant
//! so calling layers can react to the specific cause rather than a generic
//! failure.

use crate::Amount;
use thiserror::Error;

/// Result type alias using CredoError
pub type Result<T> = std::result::Result<T, CredoError>;

/// Unified error type for Credo operations
#[derive(Debug, Error)]
pub enum CredoError {
    // Lending domain errors
    #[error("Lending error: {0}")]
    Lend(#[from] LendError),

    // Price oracle errors
    #[error("Oracle error: {0}")]
    Oracle(String),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Lending domain errors
///
/// All variants are raised synchronously, before any state mutation: a
/// rejected operation leaves the ledger exactly as it found it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LendError {
    #[error("Amount must be greater than zero")]
    InvalidAmount,

    #[error("Attached native value {attached} does not match declared amount {declared}")]
    ValueMismatch { declared: Amount, attached: Amount },

    #[error("Asset transfer failed: {0}")]
    TransferFailed(String),

    #[error("Insufficient balance: requested {requested}, available {available}")]
    InsufficientBalance {
        requested: Amount,
        available: Amount,
    },

    #[error("Insufficient pool liquidity: requested {requested}, available {available}")]
    InsufficientLiquidity {
        requested: Amount,
        available: Amount,
    },

    #[error("Insufficient collateral: required {required}, posted {posted}")]
    InsufficientCollateral { required: Amount, posted: Amount },

    #[error("A borrow position is already open for this account")]
    BorrowAlreadyOpen,

    #[error("An asset cannot collateralize itself")]
    SameAssetCollateral,

    #[error("No open borrow position for this account")]
    NoOpenBorrow,

    #[error("Exact repayment required: owed {owed}, offered {offered}")]
    ExactAmountRequired { owed: Amount, offered: Amount },

    #[error("Caller is not the engine owner")]
    Unauthorized,

    #[error("Amount arithmetic overflow")]
    Overflow,

    #[error("Clock went backwards: last update at {last}, now {now}")]
    ClockDrift { last: i64, now: i64 },
}

impl From<std::io::Error> for CredoError {
    fn from(err: std::io::Error) -> Self {
        CredoError::Internal(err.to_string())
    }
}
