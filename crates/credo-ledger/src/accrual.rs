//! Interest accrual - pure time-weighted yield computation
//!
//! Interest added over an interval is
//! `floor(principal * rate_bps * elapsed / (10000 * SECONDS_PER_YEAR))`,
//! computed entirely in integers with the multiplications performed before
//! the single division. Never truncate the rate on its own: dividing
//! `rate_bps / 10000` first would floor sub-percent rates to zero.

use credo_common::bps::BPS_SCALE;
use credo_common::{Amount, LendError, SupplyPosition};

/// Seconds in a (non-leap) year, the accrual period base
pub const SECONDS_PER_YEAR: u128 = 365 * 24 * 60 * 60;

/// Result of an accrual computation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Accrual {
    /// Interest added by this computation
    pub added: Amount,
    /// New accrued-interest total for the position
    pub accrued_interest: Amount,
    /// New last-update timestamp (always the `now` passed in)
    pub last_update_time: i64,
}

/// Accrue interest on a supply position up to `now`.
///
/// Pure with respect to its inputs; the caller applies the result. A `now`
/// before the position's last update is an internal error: the clock feeding
/// the ledger must be monotonic. `elapsed == 0` adds zero interest, so
/// re-invocation within the same instant never double-accrues.
pub fn accrue(position: &SupplyPosition, rate_bps: u32, now: i64) -> Result<Accrual, LendError> {
    if now < position.last_update_time {
        return Err(LendError::ClockDrift {
            last: position.last_update_time,
            now,
        });
    }

    let elapsed = (now - position.last_update_time) as u128;
    let added = position
        .principal
        .checked_mul(rate_bps as u128)
        .and_then(|v| v.checked_mul(elapsed))
        .map(|v| v / (BPS_SCALE * SECONDS_PER_YEAR))
        .ok_or(LendError::Overflow)?;

    let accrued_interest = position
        .accrued_interest
        .checked_add(added)
        .ok_or(LendError::Overflow)?;

    Ok(Accrual {
        added,
        accrued_interest,
        last_update_time: now,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position(principal: Amount, accrued: Amount, last_update: i64) -> SupplyPosition {
        SupplyPosition {
            principal,
            accrued_interest: accrued,
            last_update_time: last_update,
        }
    }

    #[test]
    fn test_full_year_at_8_percent() {
        let pos = position(10_000, 0, 0);
        let acc = accrue(&pos, 800, SECONDS_PER_YEAR as i64).unwrap();
        assert_eq!(acc.added, 800);
        assert_eq!(acc.accrued_interest, 800);
        assert_eq!(acc.last_update_time, SECONDS_PER_YEAR as i64);
    }

    #[test]
    fn test_half_year_truncates() {
        let pos = position(1_000, 0, 0);
        // 8% over half a year = 40 exactly
        let acc = accrue(&pos, 800, (SECONDS_PER_YEAR / 2) as i64).unwrap();
        assert_eq!(acc.added, 40);
    }

    #[test]
    fn test_zero_elapsed_is_idempotent() {
        let pos = position(10_000, 123, 5_000);
        let acc = accrue(&pos, 800, 5_000).unwrap();
        assert_eq!(acc.added, 0);
        assert_eq!(acc.accrued_interest, 123);
    }

    #[test]
    fn test_monotone_between_calls() {
        let pos = position(1_000_000, 0, 0);
        let first = accrue(&pos, 800, 1_000).unwrap();

        let advanced = position(1_000_000, first.accrued_interest, first.last_update_time);
        let second = accrue(&advanced, 800, 2_000).unwrap();
        assert!(second.accrued_interest >= first.accrued_interest);
    }

    #[test]
    fn test_clock_going_backwards_is_rejected() {
        let pos = position(1_000, 0, 5_000);
        let err = accrue(&pos, 800, 4_999).unwrap_err();
        assert_eq!(
            err,
            LendError::ClockDrift {
                last: 5_000,
                now: 4_999
            }
        );
    }

    #[test]
    fn test_zero_principal_accrues_nothing() {
        let pos = position(0, 0, 0);
        let acc = accrue(&pos, 800, SECONDS_PER_YEAR as i64).unwrap();
        assert_eq!(acc.added, 0);
    }

    #[test]
    fn test_sub_percent_rate_keeps_precision() {
        // 0.5% (50 bps) over a full year on 10_000 = 50; a rate-first
        // division would have floored the rate to zero.
        let pos = position(10_000, 0, 0);
        let acc = accrue(&pos, 50, SECONDS_PER_YEAR as i64).unwrap();
        assert_eq!(acc.added, 50);
    }
}
