//! Lending engine - the public state machine
//!
//! The engine orchestrates the ledger, credit tracker, parameter store, and
//! external ports. It owns no value-bearing state itself.
//!
//! Every mutating operation is atomic: validation happens first, external
//! transfers next, and the ledger commit last, all while holding a single
//! op-guard so no two operations interleave and no caller ever observes a
//! half-applied one. Errors are raised before anything is written; there is
//! no rollback path because there is never anything to roll back.

use std::sync::Arc;

use credo_common::{
    apply_bps, Amount, Asset, BorrowPosition, CredoError, LendError, ParameterSet, ParameterStore,
    Result, SupplyPosition, REPAY_CREDIT_DELTA,
};
use credo_ledger::{CreditScoreTracker, PositionLedger, WithdrawOutcome};
use tokio::sync::{broadcast, Mutex};
use tracing::{info, instrument, warn};

use crate::config::EngineConfig;
use crate::events::{EventRecord, LedgerEvent};
use crate::ports::{AssetGateway, Clock, PriceOracle};

/// Public orchestrator over the lending ledger
pub struct LendingEngine {
    owner: String,
    params: ParameterStore,
    ledger: PositionLedger,
    credit: CreditScoreTracker,
    oracle: Arc<dyn PriceOracle>,
    gateway: Arc<dyn AssetGateway>,
    clock: Arc<dyn Clock>,
    events: broadcast::Sender<EventRecord>,
    /// Serializes all mutating operations
    op_guard: Mutex<()>,
}

impl LendingEngine {
    /// Create an engine owned by `owner` with the given collaborators
    pub fn new(
        owner: impl Into<String>,
        config: EngineConfig,
        oracle: Arc<dyn PriceOracle>,
        gateway: Arc<dyn AssetGateway>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let (events, _) = broadcast::channel(config.event_capacity);
        Self {
            owner: owner.into(),
            params: ParameterStore::new(config.parameter_set()),
            ledger: PositionLedger::new(),
            credit: CreditScoreTracker::new(),
            oracle,
            gateway,
            clock,
            events,
            op_guard: Mutex::new(()),
        }
    }

    /// Subscribe to committed-operation events
    pub fn subscribe(&self) -> broadcast::Receiver<EventRecord> {
        self.events.subscribe()
    }

    /// Supply `amount` of `asset` to the pool.
    ///
    /// Native supplies must attach exactly `amount`; token supplies attach
    /// nothing and are pulled through the gateway. The credit bump the
    /// deposit earns comes back from the ledger and is forwarded to the
    /// score tracker.
    #[instrument(skip(self))]
    pub async fn supply(
        &self,
        user: &str,
        asset: Asset,
        amount: Amount,
        attached: Amount,
    ) -> Result<SupplyPosition> {
        if amount == 0 {
            return Err(LendError::InvalidAmount.into());
        }
        let _guard = self.op_guard.lock().await;

        self.collect(user, asset, amount, attached).await?;

        let rate = self.params.supply_earn_bps();
        let outcome = self.ledger.supply(user, asset, amount, rate, self.clock.now())?;
        let credit_score = self.credit.bump(user, outcome.credit_delta);

        info!(user, %asset, amount, credit_score, "supply accepted");
        self.emit(LedgerEvent::Supplied {
            user: user.to_string(),
            asset,
            amount,
            credit_score,
        });
        Ok(outcome.position)
    }

    /// Withdraw `amount` of `asset`, paid interest-first.
    #[instrument(skip(self))]
    pub async fn withdraw(
        &self,
        user: &str,
        asset: Asset,
        amount: Amount,
    ) -> Result<WithdrawOutcome> {
        if amount == 0 {
            return Err(LendError::InvalidAmount.into());
        }
        let _guard = self.op_guard.lock().await;

        let rate = self.params.supply_earn_bps();
        let now = self.clock.now();

        // Full validation before any value moves
        self.ledger.plan_withdraw(user, asset, amount, rate, now)?;
        self.gateway.push(user, asset, amount).await?;
        let outcome = self.ledger.withdraw(user, asset, amount, rate, now)?;

        info!(user, %asset, amount, "withdrawal accepted");
        self.emit(LedgerEvent::Withdrawn {
            user: user.to_string(),
            asset,
            amount,
        });
        Ok(outcome)
    }

    /// Borrow `borrow_amount` against posted collateral.
    ///
    /// The posted collateral must cover
    /// `convert(borrow_amount) * collateral_bps / 10000` exactly or better.
    /// The upfront fee is deducted from the disbursement and retained by the
    /// pool; the full `borrow_amount` is owed.
    #[instrument(skip(self))]
    pub async fn borrow(
        &self,
        user: &str,
        borrow_asset: Asset,
        borrow_amount: Amount,
        collateral_asset: Asset,
        collateral_amount: Amount,
        attached: Amount,
    ) -> Result<BorrowPosition> {
        if borrow_amount == 0 {
            return Err(LendError::InvalidAmount.into());
        }
        let _guard = self.op_guard.lock().await;

        let converted = self
            .oracle
            .convert(borrow_amount, borrow_asset, collateral_asset)
            .await?;
        let required = apply_bps(converted, self.params.borrow_collateral_bps())
            .map_err(CredoError::from)?;
        if collateral_amount < required {
            warn!(user, required, posted = collateral_amount, "collateral short");
            return Err(LendError::InsufficientCollateral {
                required,
                posted: collateral_amount,
            }
            .into());
        }
        self.ledger
            .check_borrow(user, borrow_asset, borrow_amount, collateral_asset)?;

        // Lock the collateral, then disburse net of the fee
        self.collect(user, collateral_asset, collateral_amount, attached)
            .await?;
        let fee = apply_bps(borrow_amount, self.params.borrow_fee_bps())?;
        let net = borrow_amount.checked_sub(fee).ok_or(LendError::Overflow)?;
        self.gateway.push(user, borrow_asset, net).await?;

        let position = self.ledger.open_borrow(
            user,
            borrow_asset,
            borrow_amount,
            collateral_asset,
            collateral_amount,
            fee,
            self.clock.now(),
        )?;

        info!(
            user,
            %borrow_asset,
            borrow_amount,
            fee,
            %collateral_asset,
            collateral_amount,
            "borrow opened"
        );
        self.emit(LedgerEvent::Borrowed {
            user: user.to_string(),
            borrow_asset,
            borrow_amount,
            collateral_asset,
            collateral_amount,
        });
        Ok(position)
    }

    /// Repay the open borrow in full and reclaim the collateral.
    ///
    /// Repayment is all-or-nothing: exactly `borrowed_amount` must be
    /// transferred. Awards a +2 credit bump. Returns the closed position as
    /// it stood before the reset.
    #[instrument(skip(self))]
    pub async fn repay(&self, user: &str, attached: Amount) -> Result<BorrowPosition> {
        let _guard = self.op_guard.lock().await;

        let open = self
            .ledger
            .borrow_position(user)
            .filter(|b| b.is_open())
            .ok_or(LendError::NoOpenBorrow)?;

        if open.borrow_asset.is_native() {
            if attached != open.borrowed_amount {
                return Err(LendError::ExactAmountRequired {
                    owed: open.borrowed_amount,
                    offered: attached,
                }
                .into());
            }
        } else {
            if attached != 0 {
                return Err(LendError::ValueMismatch {
                    declared: 0,
                    attached,
                }
                .into());
            }
            self.gateway
                .pull(user, open.borrow_asset, open.borrowed_amount)
                .await?;
        }

        // Release collateral, then commit the close
        self.gateway
            .push(user, open.collateral_asset, open.collateral_amount)
            .await?;
        let closed = self.ledger.close_borrow(user)?;
        let credit_score = self.credit.bump(user, REPAY_CREDIT_DELTA);

        info!(
            user,
            borrow_asset = %closed.borrow_asset,
            repaid = closed.borrowed_amount,
            credit_score,
            "borrow repaid"
        );
        self.emit(LedgerEvent::Repaid {
            user: user.to_string(),
            borrow_asset: closed.borrow_asset,
            amount: closed.borrowed_amount,
        });
        Ok(closed)
    }

    // ---- Admin setters (owner-gated, effective from the next operation) ----

    pub fn set_supply_earn_bps(&self, caller: &str, bps: u32) -> Result<()> {
        self.ensure_owner(caller)?;
        self.params.set_supply_earn_bps(bps);
        info!(caller, bps, "supply earn rate updated");
        Ok(())
    }

    pub fn set_borrow_fee_bps(&self, caller: &str, bps: u32) -> Result<()> {
        self.ensure_owner(caller)?;
        self.params.set_borrow_fee_bps(bps);
        info!(caller, bps, "borrow fee updated");
        Ok(())
    }

    pub fn set_borrow_collateral_bps(&self, caller: &str, bps: u32) -> Result<()> {
        self.ensure_owner(caller)?;
        self.params.set_borrow_collateral_bps(bps);
        info!(caller, bps, "collateral ratio updated");
        Ok(())
    }

    // ---- Read-only query surface ----

    /// Supply position as last committed (no fresh accrual)
    pub fn supply_position(&self, user: &str, asset: Asset) -> Option<SupplyPosition> {
        self.ledger.supply_position(user, asset)
    }

    /// Supply position with interest accrued up to now at the current rate
    pub fn accrued_supply_position(
        &self,
        user: &str,
        asset: Asset,
    ) -> Result<Option<SupplyPosition>> {
        self.ledger
            .accrued_position(user, asset, self.params.supply_earn_bps(), self.clock.now())
            .map_err(CredoError::from)
    }

    pub fn borrow_position(&self, user: &str) -> Option<BorrowPosition> {
        self.ledger.borrow_position(user)
    }

    pub fn available_liquidity(&self, asset: Asset) -> Amount {
        self.ledger.available_liquidity(asset)
    }

    /// Cumulative upfront borrow fees retained in `asset`
    pub fn collected_fees(&self, asset: Asset) -> Amount {
        self.ledger.collected_fees(asset)
    }

    pub fn credit_score_of(&self, user: &str) -> u64 {
        self.credit.score_of(user)
    }

    pub fn parameters(&self) -> ParameterSet {
        self.params.current()
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    // ---- Internals ----

    /// Validate and execute inbound funding for `amount` of `asset`.
    ///
    /// Native assets ride on the call as attached value and must match the
    /// declared amount exactly; token assets must attach nothing and are
    /// pulled through the gateway.
    async fn collect(
        &self,
        from: &str,
        asset: Asset,
        amount: Amount,
        attached: Amount,
    ) -> Result<()> {
        if asset.is_native() {
            if attached != amount {
                return Err(LendError::ValueMismatch {
                    declared: amount,
                    attached,
                }
                .into());
            }
            Ok(())
        } else {
            if attached != 0 {
                return Err(LendError::ValueMismatch {
                    declared: 0,
                    attached,
                }
                .into());
            }
            self.gateway.pull(from, asset, amount).await
        }
    }

    fn ensure_owner(&self, caller: &str) -> Result<()> {
        if caller != self.owner {
            return Err(LendError::Unauthorized.into());
        }
        Ok(())
    }

    fn emit(&self, event: LedgerEvent) {
        // A send error only means nobody is subscribed
        let _ = self.events.send(EventRecord::new(event));
    }
}
