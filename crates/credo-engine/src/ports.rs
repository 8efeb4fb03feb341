//! Collaborator ports - price oracle, asset gateway, and clock
//!
//! The engine talks to the outside world through these traits. Production
//! deployments plug in real price feeds and transfer rails; the in-memory
//! implementations here back tests and the walkthrough demo.

use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use credo_common::{Amount, Asset, CredoError, LendError, Result};
use dashmap::DashMap;

/// Asset-value conversion, treated as an external pure function.
///
/// The engine uses the result verbatim in the collateral formula and does
/// no independent validation.
#[async_trait]
pub trait PriceOracle: Send + Sync {
    async fn convert(&self, amount: Amount, from: Asset, to: Asset) -> Result<Amount>;
}

/// Fixed-ratio oracle backed by a rate table
///
/// Rates are directional `(numerator, denominator)` pairs; converting an
/// asset to itself is always the identity.
#[derive(Debug, Default)]
pub struct StaticRateOracle {
    rates: DashMap<(Asset, Asset), (Amount, Amount)>,
}

impl StaticRateOracle {
    /// Oracle that only knows the identity conversion
    pub fn identity() -> Self {
        Self::default()
    }

    /// Add a directional rate: `amount_to = amount_from * num / den`
    pub fn with_rate(self, from: Asset, to: Asset, num: Amount, den: Amount) -> Self {
        self.rates.insert((from, to), (num, den));
        self
    }
}

#[async_trait]
impl PriceOracle for StaticRateOracle {
    async fn convert(&self, amount: Amount, from: Asset, to: Asset) -> Result<Amount> {
        if from == to {
            return Ok(amount);
        }
        let (num, den) = *self
            .rates
            .get(&(from, to))
            .ok_or_else(|| CredoError::Oracle(format!("no rate configured for {from}->{to}")))?;
        if den == 0 {
            return Err(CredoError::Oracle(format!("zero denominator for {from}->{to}")));
        }
        amount
            .checked_mul(num)
            .map(|v| v / den)
            .ok_or_else(|| CredoError::Lend(LendError::Overflow))
    }
}

/// External asset movement: token pulls into custody and outbound transfers.
///
/// Native value entering the engine rides on the call itself (the `attached`
/// parameter of the public operations) and never goes through `pull`; all
/// outbound movement, native or token, goes through `push`.
#[async_trait]
pub trait AssetGateway: Send + Sync {
    /// Pull pre-approved tokens from `from` into engine custody
    async fn pull(&self, from: &str, asset: Asset, amount: Amount) -> Result<()>;

    /// Transfer `amount` of `asset` out to `to`
    async fn push(&self, to: &str, asset: Asset, amount: Amount) -> Result<()>;
}

/// In-memory gateway tracking per-user external balances
#[derive(Debug, Default)]
pub struct InMemoryGateway {
    balances: DashMap<(String, Asset), Amount>,
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a user's external balance
    pub fn fund(&self, user: &str, asset: Asset, amount: Amount) {
        let mut entry = self.balances.entry((user.to_string(), asset)).or_insert(0);
        *entry = entry.saturating_add(amount);
    }

    /// A user's current external balance
    pub fn balance_of(&self, user: &str, asset: Asset) -> Amount {
        self.balances
            .get(&(user.to_string(), asset))
            .map(|b| *b)
            .unwrap_or(0)
    }
}

#[async_trait]
impl AssetGateway for InMemoryGateway {
    async fn pull(&self, from: &str, asset: Asset, amount: Amount) -> Result<()> {
        let mut entry = self
            .balances
            .entry((from.to_string(), asset))
            .or_insert(0);
        if *entry < amount {
            return Err(CredoError::Lend(LendError::TransferFailed(format!(
                "{from} holds {} of {asset}, needs {amount}",
                *entry
            ))));
        }
        *entry -= amount;
        Ok(())
    }

    async fn push(&self, to: &str, asset: Asset, amount: Amount) -> Result<()> {
        let mut entry = self.balances.entry((to.to_string(), asset)).or_insert(0);
        *entry = entry
            .checked_add(amount)
            .ok_or_else(|| CredoError::Lend(LendError::TransferFailed("balance overflow".into())))?;
        Ok(())
    }
}

/// Time source for accrual; must be monotonic
pub trait Clock: Send + Sync {
    /// Seconds since the Unix epoch
    fn now(&self) -> i64;
}

/// Wall-clock time
#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }
}

/// Hand-driven clock for tests and demos
#[derive(Debug)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    pub fn new(start: i64) -> Self {
        Self {
            now: AtomicI64::new(start),
        }
    }

    /// Move time forward by `secs`
    pub fn advance(&self, secs: i64) {
        self.now.fetch_add(secs, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}
