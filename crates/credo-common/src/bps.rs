//! Basis-point arithmetic
//!
//! All rate math in Credo is integer-only: multiply before dividing, truncate
//! toward zero. The multiply-first ordering keeps full precision until the
//! single final division, so results are bit-reproducible and never
//! under-charge through intermediate truncation.

use crate::error::LendError;
use crate::Amount;

/// Basis-point scale: 10000 bps = 100%
pub const BPS_SCALE: u128 = 10_000;

/// Apply a basis-point rate to an amount: `amount * bps / 10000`.
///
/// Overflow of the intermediate product is an error, never a wrap.
pub fn apply_bps(amount: Amount, bps: u32) -> Result<Amount, LendError> {
    amount
        .checked_mul(bps as u128)
        .map(|scaled| scaled / BPS_SCALE)
        .ok_or(LendError::Overflow)
}
