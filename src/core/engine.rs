//! The collateralization engine.
//!
//! Owns the collateral pool and both token ledgers, and is the only component
//! allowed to change token supplies. Every operation follows the same shape:
//! read the price once, validate everything, compute all outcomes, then apply
//! the mutations. Once the first mutation lands, nothing can fail, so state is
//! all-or-nothing by construction.

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::core::collateral::{CollateralAmount, CollateralPool};
use crate::core::config::EngineParams;
use crate::core::ledger::{AccountId, TokenAmount, TokenLedger};
use crate::error::{Error, Result};
use crate::oracle::price_feed::{Price, PriceSource};
use crate::utils::constants::{MAX_PEG_SUPPLY, PEG_DECIMALS};
use crate::utils::math::{
    amount_after_fee, collateral_for_value, collateral_value_cents, collateralization_ratio,
    fraction_bps, proportional_shares, safe_sub,
};
use crate::utils::validation::validate_non_zero;

// ═══════════════════════════════════════════════════════════════════════════════
// OPERATION OUTCOMES
// ═══════════════════════════════════════════════════════════════════════════════

/// Result of a successful peg mint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintOutcome {
    /// Gross value of the deposited collateral in cents
    pub gross_value: TokenAmount,
    /// Fee retained by the pool in cents
    pub fee: TokenAmount,
    /// Peg units actually minted (gross minus fee)
    pub minted: TokenAmount,
}

/// Result of a successful peg burn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BurnOutcome {
    /// Peg units burned
    pub burned: TokenAmount,
    /// Collateral released to the caller
    pub collateral_out: CollateralAmount,
}

/// Result of a successful surplus buffer deposit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BufferDepositOutcome {
    /// Value of the deposited collateral in cents
    pub deposit_value: TokenAmount,
    /// Surplus shares minted to the depositor
    pub shares_minted: TokenAmount,
}

/// Result of a successful surplus buffer withdrawal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BufferWithdrawOutcome {
    /// Surplus shares burned
    pub shares_burned: TokenAmount,
    /// Collateral released to the caller
    pub collateral_out: CollateralAmount,
}

// ═══════════════════════════════════════════════════════════════════════════════
// ENGINE EVENTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Record of an engine-level operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineEvent {
    /// Peg units minted against deposited collateral
    PegMinted {
        /// Minting account
        account: AccountId,
        /// Collateral deposited
        collateral_in: CollateralAmount,
        /// Price used for valuation
        price: Price,
        /// Outcome amounts
        outcome: MintOutcome,
    },
    /// Peg units burned for released collateral
    PegBurned {
        /// Burning account
        account: AccountId,
        /// Price used for valuation
        price: Price,
        /// Outcome amounts
        outcome: BurnOutcome,
    },
    /// Collateral added to the surplus buffer
    BufferDeposited {
        /// Depositing account
        account: AccountId,
        /// Collateral deposited
        collateral_in: CollateralAmount,
        /// Price used for valuation
        price: Price,
        /// Outcome amounts
        outcome: BufferDepositOutcome,
    },
    /// Surplus value withdrawn from the buffer
    BufferWithdrawn {
        /// Withdrawing account
        account: AccountId,
        /// Value withdrawn in cents
        value: TokenAmount,
        /// Price used for valuation
        price: Price,
        /// Outcome amounts
        outcome: BufferWithdrawOutcome,
    },
}

// ═══════════════════════════════════════════════════════════════════════════════
// ENGINE STATE SNAPSHOT
// ═══════════════════════════════════════════════════════════════════════════════

/// Serializable snapshot of the engine's full state, minus the price source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineState {
    /// Engine parameters
    pub params: EngineParams,
    /// Collateral pool
    pub pool: CollateralPool,
    /// Peg token ledger
    pub peg: TokenLedger,
    /// Surplus share ledger
    pub shares: TokenLedger,
}

impl EngineState {
    /// Serialize to bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode::serialize(self).map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Deserialize from bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        bincode::deserialize(bytes).map_err(|e| Error::Deserialization(e.to_string()))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// COLLATERALIZATION ENGINE
// ═══════════════════════════════════════════════════════════════════════════════

/// The collateralization engine: one collateral pool backing a peg token,
/// with a surplus share token absorbing the excess.
///
/// Generic over the price source so tests can drive prices directly.
#[derive(Debug)]
pub struct CollateralizationEngine<P: PriceSource> {
    params: EngineParams,
    price_source: P,
    pool: CollateralPool,
    peg: TokenLedger,
    shares: TokenLedger,
    events: Vec<EngineEvent>,
    max_events: usize,
}

impl<P: PriceSource> CollateralizationEngine<P> {
    /// Create a new engine with validated parameters
    pub fn new(params: EngineParams, price_source: P) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            params,
            price_source,
            pool: CollateralPool::new(),
            peg: TokenLedger::new("StableCoin", "STC", PEG_DECIMALS)
                .with_supply_cap(MAX_PEG_SUPPLY),
            shares: TokenLedger::new("DepositorCoin", "DPC", PEG_DECIMALS),
            events: Vec::new(),
            max_events: 1000,
        })
    }

    /// Restore an engine from a state snapshot
    pub fn from_state(state: EngineState, price_source: P) -> Result<Self> {
        state.params.validate()?;
        Ok(Self {
            params: state.params,
            price_source,
            pool: state.pool,
            peg: state.peg,
            shares: state.shares,
            events: Vec::new(),
            max_events: 1000,
        })
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // QUERIES
    // ═══════════════════════════════════════════════════════════════════════════

    /// Engine parameters
    pub fn params(&self) -> &EngineParams {
        &self.params
    }

    /// The collateral pool
    pub fn pool(&self) -> &CollateralPool {
        &self.pool
    }

    /// The peg token ledger
    pub fn peg(&self) -> &TokenLedger {
        &self.peg
    }

    /// The surplus share ledger
    pub fn shares(&self) -> &TokenLedger {
        &self.shares
    }

    /// Mutable peg ledger, for transfers and approvals
    pub fn peg_mut(&mut self) -> &mut TokenLedger {
        &mut self.peg
    }

    /// Mutable share ledger, for transfers and approvals
    pub fn shares_mut(&mut self) -> &mut TokenLedger {
        &mut self.shares
    }

    /// Recent engine events
    pub fn recent_events(&self) -> &[EngineEvent] {
        &self.events
    }

    /// Current collateralization ratio as a percentage.
    /// `u64::MAX` when no peg units are outstanding.
    pub fn collateralization_ratio(&self) -> Result<u64> {
        let price = self.price_source.current()?;
        collateralization_ratio(
            self.pool.total().base(),
            price.cents(),
            self.peg.total_supply().cents(),
        )
    }

    /// Current surplus value in cents: pool value minus outstanding peg.
    /// Negative surpluses (deficits) report as zero.
    pub fn surplus_value(&self) -> Result<TokenAmount> {
        let price = self.price_source.current()?;
        let pool_value = collateral_value_cents(self.pool.total().base(), price.cents())?;
        Ok(TokenAmount::from_cents(
            pool_value.saturating_sub(self.peg.total_supply().cents()),
        ))
    }

    /// Snapshot the engine state for persistence
    pub fn snapshot(&self) -> EngineState {
        EngineState {
            params: self.params.clone(),
            pool: self.pool.clone(),
            peg: self.peg.clone(),
            shares: self.shares.clone(),
        }
    }

    /// Verify internal consistency of pool and ledgers
    pub fn audit(&self) -> bool {
        self.pool.audit()
            && self.peg.verify_supply_invariant()
            && self.shares.verify_supply_invariant()
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // PEG OPERATIONS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Deposit collateral and mint peg units at the current price.
    ///
    /// The mint fee is deducted from the gross value; the fee's worth of
    /// collateral stays in the pool as retained surplus.
    pub fn mint(
        &mut self,
        account: AccountId,
        collateral_in: CollateralAmount,
    ) -> Result<MintOutcome> {
        validate_non_zero(collateral_in.base())?;
        let price = self.price_source.current()?;

        let gross_value = collateral_value_cents(collateral_in.base(), price.cents())?;
        let fee = fraction_bps(gross_value, self.params.fee_rate_bps)?;
        let minted = amount_after_fee(gross_value, self.params.fee_rate_bps)?;

        // All checks before any mutation
        self.peg.can_mint(minted)?;

        self.pool.deposit(collateral_in)?;
        self.peg.mint(account, TokenAmount::from_cents(minted))?;

        let outcome = MintOutcome {
            gross_value: TokenAmount::from_cents(gross_value),
            fee: TokenAmount::from_cents(fee),
            minted: TokenAmount::from_cents(minted),
        };
        info!(
            account = %account,
            collateral_in = %collateral_in,
            price = %price,
            minted = %outcome.minted,
            fee = %outcome.fee,
            "minted peg units"
        );
        self.add_event(EngineEvent::PegMinted {
            account,
            collateral_in,
            price,
            outcome,
        });
        Ok(outcome)
    }

    /// Burn peg units and release the equivalent collateral at the current
    /// price. No fee is charged on the way out.
    pub fn burn(&mut self, account: AccountId, peg_amount: TokenAmount) -> Result<BurnOutcome> {
        validate_non_zero(peg_amount.cents())?;
        let price = self.price_source.current()?;

        let balance = self.peg.balance_of(&account);
        if balance < peg_amount {
            return Err(Error::InsufficientBalance {
                required: peg_amount.cents(),
                available: balance.cents(),
            });
        }

        let collateral_out =
            CollateralAmount::from_base(collateral_for_value(peg_amount.cents(), price.cents())?);
        if let Err(e) = self.pool.can_withdraw(collateral_out) {
            // The pool cannot cover a liability it issued
            warn!(
                account = %account,
                requested = %collateral_out,
                available = %self.pool.total(),
                "collateral shortfall on burn"
            );
            return Err(e);
        }

        self.peg.burn(account, peg_amount)?;
        self.pool.withdraw(collateral_out)?;

        let outcome = BurnOutcome {
            burned: peg_amount,
            collateral_out,
        };
        info!(
            account = %account,
            burned = %peg_amount,
            price = %price,
            collateral_out = %collateral_out,
            "burned peg units"
        );
        self.add_event(EngineEvent::PegBurned {
            account,
            price,
            outcome,
        });
        Ok(outcome)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // SURPLUS BUFFER OPERATIONS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Deposit collateral into the surplus buffer and receive surplus shares.
    ///
    /// When no shares exist, this is the bootstrap deposit: it must be at
    /// least `min_buffer_ratio_bps` of the current pool, and shares are
    /// issued one per cent of deposit value. Afterwards, shares are issued
    /// pro rata against the pre-deposit surplus value.
    pub fn deposit_surplus_buffer(
        &mut self,
        account: AccountId,
        collateral_in: CollateralAmount,
    ) -> Result<BufferDepositOutcome> {
        validate_non_zero(collateral_in.base())?;
        let price = self.price_source.current()?;

        let deposit_value = collateral_value_cents(collateral_in.base(), price.cents())?;
        let share_supply = self.shares.total_supply().cents();

        let shares_minted = if share_supply == 0 {
            let minimum = self.bootstrap_minimum()?;
            if collateral_in < minimum {
                return Err(Error::InitialCollateralRatio {
                    minimum: minimum.base(),
                });
            }
            // Bootstrap: one share per cent of deposit value
            deposit_value
        } else {
            let pool_value = collateral_value_cents(self.pool.total().base(), price.cents())?;
            let surplus = pool_value.saturating_sub(self.peg.total_supply().cents());
            if surplus == 0 {
                warn!(pool_value, peg_supply = self.peg.total_supply().cents(),
                    "buffer deposit with no surplus to price against");
                return Err(Error::SurplusDepleted);
            }
            proportional_shares(deposit_value, share_supply, surplus)?
        };

        validate_non_zero(shares_minted)?;
        self.shares.can_mint(shares_minted)?;

        self.pool.deposit(collateral_in)?;
        self.shares
            .mint(account, TokenAmount::from_cents(shares_minted))?;

        let outcome = BufferDepositOutcome {
            deposit_value: TokenAmount::from_cents(deposit_value),
            shares_minted: TokenAmount::from_cents(shares_minted),
        };
        info!(
            account = %account,
            collateral_in = %collateral_in,
            price = %price,
            shares_minted = %outcome.shares_minted,
            "surplus buffer deposit"
        );
        self.add_event(EngineEvent::BufferDeposited {
            account,
            collateral_in,
            price,
            outcome,
        });
        Ok(outcome)
    }

    /// Withdraw surplus value from the buffer, burning shares pro rata and
    /// releasing the equivalent collateral.
    ///
    /// `value` is denominated in cents of the unit of account, capped at the
    /// current surplus.
    pub fn withdraw_surplus_buffer(
        &mut self,
        account: AccountId,
        value: TokenAmount,
    ) -> Result<BufferWithdrawOutcome> {
        validate_non_zero(value.cents())?;
        let price = self.price_source.current()?;

        let pool_value = collateral_value_cents(self.pool.total().base(), price.cents())?;
        let surplus = pool_value.saturating_sub(self.peg.total_supply().cents());
        if value.cents() > surplus {
            return Err(Error::InsufficientSurplus {
                requested: value.cents(),
                available: surplus,
            });
        }

        let share_supply = self.shares.total_supply().cents();
        let shares_burned = proportional_shares(value.cents(), share_supply, surplus)?;
        validate_non_zero(shares_burned)?;

        let balance = self.shares.balance_of(&account);
        if balance.cents() < shares_burned {
            return Err(Error::InsufficientBalance {
                required: shares_burned,
                available: balance.cents(),
            });
        }

        let collateral_out =
            CollateralAmount::from_base(collateral_for_value(value.cents(), price.cents())?);
        self.pool.can_withdraw(collateral_out)?;

        // Releasing at most the surplus can never touch the peg backing
        let remaining_value = safe_sub(pool_value, value.cents())?;
        if remaining_value < self.peg.total_supply().cents() {
            return Err(Error::InvariantViolation(format!(
                "buffer withdrawal would leave pool value {} below peg supply {}",
                remaining_value,
                self.peg.total_supply().cents()
            )));
        }

        self.shares
            .burn(account, TokenAmount::from_cents(shares_burned))?;
        self.pool.withdraw(collateral_out)?;

        let outcome = BufferWithdrawOutcome {
            shares_burned: TokenAmount::from_cents(shares_burned),
            collateral_out,
        };
        info!(
            account = %account,
            value = %value,
            price = %price,
            shares_burned = %outcome.shares_burned,
            collateral_out = %collateral_out,
            "surplus buffer withdrawal"
        );
        self.add_event(EngineEvent::BufferWithdrawn {
            account,
            value,
            price,
            outcome,
        });
        Ok(outcome)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // INTERNAL
    // ═══════════════════════════════════════════════════════════════════════════

    /// Minimum collateral for the bootstrap buffer deposit:
    /// `min_buffer_ratio_bps` of the current pool. The ratio of pool value
    /// cancels the price, so this is a pure collateral fraction.
    fn bootstrap_minimum(&self) -> Result<CollateralAmount> {
        Ok(CollateralAmount::from_base(fraction_bps(
            self.pool.total().base(),
            self.params.min_buffer_ratio_bps,
        )?))
    }

    fn add_event(&mut self, event: EngineEvent) {
        self.events.push(event);
        if self.events.len() > self.max_events {
            self.events.drain(0..self.events.len() - self.max_events);
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SHARED ENGINE
// ═══════════════════════════════════════════════════════════════════════════════

/// Thread-safe handle around a [`CollateralizationEngine`].
///
/// All operations serialize through one mutex; a poisoned lock surfaces as
/// [`Error::Lock`] rather than panicking the caller.
#[derive(Debug)]
pub struct SharedEngine<P: PriceSource> {
    inner: Arc<Mutex<CollateralizationEngine<P>>>,
}

impl<P: PriceSource> Clone for SharedEngine<P> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<P: PriceSource> SharedEngine<P> {
    /// Wrap an engine in a shared handle
    pub fn new(engine: CollateralizationEngine<P>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(engine)),
        }
    }

    /// Run a closure against the locked engine
    pub fn with<R>(&self, f: impl FnOnce(&mut CollateralizationEngine<P>) -> R) -> Result<R> {
        let mut guard = self.inner.lock().map_err(|_| Error::Lock)?;
        Ok(f(&mut guard))
    }

    /// Mint peg units against deposited collateral
    pub fn mint(&self, account: AccountId, collateral_in: CollateralAmount) -> Result<MintOutcome> {
        self.with(|e| e.mint(account, collateral_in))?
    }

    /// Burn peg units for released collateral
    pub fn burn(&self, account: AccountId, peg_amount: TokenAmount) -> Result<BurnOutcome> {
        self.with(|e| e.burn(account, peg_amount))?
    }

    /// Deposit collateral into the surplus buffer
    pub fn deposit_surplus_buffer(
        &self,
        account: AccountId,
        collateral_in: CollateralAmount,
    ) -> Result<BufferDepositOutcome> {
        self.with(|e| e.deposit_surplus_buffer(account, collateral_in))?
    }

    /// Withdraw surplus value from the buffer
    pub fn withdraw_surplus_buffer(
        &self,
        account: AccountId,
        value: TokenAmount,
    ) -> Result<BufferWithdrawOutcome> {
        self.with(|e| e.withdraw_surplus_buffer(account, value))?
    }

    /// Snapshot the engine state
    pub fn snapshot(&self) -> Result<EngineState> {
        self.with(|e| e.snapshot())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::price_feed::StaticPriceSource;
    use crate::utils::constants::COLLATERAL_BASE_UNIT;

    fn price_4000() -> StaticPriceSource {
        StaticPriceSource::new(Price::from_units(4_000).unwrap())
    }

    fn engine(source: StaticPriceSource) -> CollateralizationEngine<StaticPriceSource> {
        CollateralizationEngine::new(EngineParams::default(), source).unwrap()
    }

    fn alice() -> AccountId {
        AccountId::from_seed(b"alice")
    }

    fn bob() -> AccountId {
        AccountId::from_seed(b"bob")
    }

    #[test]
    fn test_mint_deducts_fee() {
        let mut engine = engine(price_4000());

        let outcome = engine
            .mint(alice(), CollateralAmount::from_units(1))
            .unwrap();
        assert_eq!(outcome.gross_value.cents(), 400_000);
        assert_eq!(outcome.fee.cents(), 12_000);
        assert_eq!(outcome.minted.cents(), 388_000);
        assert_eq!(engine.peg().balance_of(&alice()).cents(), 388_000);
        assert_eq!(engine.pool().total().base(), COLLATERAL_BASE_UNIT);
        assert!(engine.audit());
    }

    #[test]
    fn test_mint_zero_fee_is_gross() {
        let params = EngineParams::default().with_fee_rate_bps(0);
        let mut engine =
            CollateralizationEngine::new(params, price_4000()).unwrap();

        let outcome = engine
            .mint(alice(), CollateralAmount::from_units(1))
            .unwrap();
        assert_eq!(outcome.fee.cents(), 0);
        assert_eq!(outcome.minted.cents(), 400_000);
    }

    #[test]
    fn test_burn_releases_collateral_fee_free() {
        let mut engine = engine(price_4000());
        engine.mint(alice(), CollateralAmount::from_units(1)).unwrap();

        // alice only holds 388,000 cents
        let err = engine
            .burn(alice(), TokenAmount::from_cents(390_000))
            .unwrap_err();
        assert_eq!(
            err,
            Error::InsufficientBalance { required: 390_000, available: 388_000 }
        );

        let outcome = engine
            .burn(alice(), TokenAmount::from_cents(388_000))
            .unwrap();
        assert_eq!(outcome.collateral_out.base(), 97_000_000);
        assert_eq!(engine.peg().total_supply().cents(), 0);
        // The fee's worth of collateral stays behind
        assert_eq!(engine.pool().total().base(), 3_000_000);
        assert!(engine.audit());
    }

    #[test]
    fn test_burn_zero_amount_rejected() {
        let mut engine = engine(price_4000());
        assert_eq!(
            engine.burn(alice(), TokenAmount::ZERO),
            Err(Error::ZeroAmount)
        );
    }

    #[test]
    fn test_bootstrap_deposit_enforces_minimum() {
        let params = EngineParams::default().with_fee_rate_bps(0);
        let mut engine =
            CollateralizationEngine::new(params, price_4000()).unwrap();
        engine.mint(alice(), CollateralAmount::from_units(1)).unwrap();

        // Pool holds 1 unit; 10% minimum = 0.1 collateral units
        let err = engine
            .deposit_surplus_buffer(bob(), CollateralAmount::from_base(5_000_000))
            .unwrap_err();
        assert_eq!(err, Error::InitialCollateralRatio { minimum: 10_000_000 });
        assert_eq!(
            err.to_string(),
            "Initial collateral ratio not met, minimum is 10000000 collateral base units"
        );

        // Exactly the minimum passes
        let outcome = engine
            .deposit_surplus_buffer(bob(), CollateralAmount::from_base(10_000_000))
            .unwrap();
        assert_eq!(outcome.deposit_value.cents(), 40_000);
        assert_eq!(outcome.shares_minted.cents(), 40_000);
    }

    #[test]
    fn test_bootstrap_deposit_issues_one_share_per_cent() {
        let mut engine = engine(price_4000());
        engine.mint(alice(), CollateralAmount::from_units(1)).unwrap();

        // 0.5 units = $2,000 = 200,000 cents of shares
        let outcome = engine
            .deposit_surplus_buffer(bob(), CollateralAmount::from_base(50_000_000))
            .unwrap();
        assert_eq!(outcome.shares_minted.cents(), 200_000);
        assert_eq!(engine.shares().total_supply().cents(), 200_000);
    }

    #[test]
    fn test_proportional_deposit_after_bootstrap() {
        let mut engine = engine(price_4000());
        engine.mint(alice(), CollateralAmount::from_units(1)).unwrap();
        engine
            .deposit_surplus_buffer(bob(), CollateralAmount::from_base(50_000_000))
            .unwrap();

        // Surplus now: pool 1.5 units = $6,000 = 600,000 cents, peg 388,000
        // => 212,000 cents. A $2,000 deposit mints 200,000 * 200,000 / 212,000.
        let outcome = engine
            .deposit_surplus_buffer(alice(), CollateralAmount::from_base(50_000_000))
            .unwrap();
        assert_eq!(outcome.shares_minted.cents(), 200_000u64 * 200_000 / 212_000);
        assert!(engine.audit());
    }

    #[test]
    fn test_deposit_with_depleted_surplus_rejected() {
        let source = price_4000();
        let mut engine = engine(source);
        engine.mint(alice(), CollateralAmount::from_units(1)).unwrap();
        engine
            .deposit_surplus_buffer(bob(), CollateralAmount::from_base(50_000_000))
            .unwrap();

        // Crash the price so the pool is worth no more than the peg supply
        engine
            .price_source
            .set(Price::from_cents(258_666).unwrap());
        let pool_value = collateral_value_cents(
            engine.pool().total().base(),
            258_666,
        )
        .unwrap();
        assert!(pool_value <= engine.peg().total_supply().cents());

        let err = engine
            .deposit_surplus_buffer(alice(), CollateralAmount::from_units(1))
            .unwrap_err();
        assert_eq!(err, Error::SurplusDepleted);
    }

    #[test]
    fn test_buffer_withdrawal() {
        let mut engine = engine(price_4000());
        engine.mint(alice(), CollateralAmount::from_units(1)).unwrap();
        engine
            .deposit_surplus_buffer(bob(), CollateralAmount::from_base(50_000_000))
            .unwrap();

        // Surplus is 212,000 cents against 200,000 shares.
        // Withdrawing $400 burns 40,000 * 200,000 / 212,000 shares and
        // releases 0.1 collateral units.
        let outcome = engine
            .withdraw_surplus_buffer(bob(), TokenAmount::from_cents(40_000))
            .unwrap();
        assert_eq!(outcome.shares_burned.cents(), 40_000u64 * 200_000 / 212_000);
        assert_eq!(outcome.collateral_out.base(), 10_000_000);
        assert!(engine.audit());
    }

    #[test]
    fn test_buffer_withdrawal_capped_at_surplus() {
        let mut engine = engine(price_4000());
        engine.mint(alice(), CollateralAmount::from_units(1)).unwrap();
        engine
            .deposit_surplus_buffer(bob(), CollateralAmount::from_base(50_000_000))
            .unwrap();

        let surplus = engine.surplus_value().unwrap().cents();
        let err = engine
            .withdraw_surplus_buffer(bob(), TokenAmount::from_cents(surplus + 1))
            .unwrap_err();
        assert_eq!(
            err,
            Error::InsufficientSurplus { requested: surplus + 1, available: surplus }
        );
    }

    #[test]
    fn test_failed_operation_leaves_state_untouched() {
        let mut engine = engine(price_4000());
        engine.mint(alice(), CollateralAmount::from_units(1)).unwrap();

        assert!(engine.burn(alice(), TokenAmount::from_cents(500_000)).is_err());
        assert!(engine
            .withdraw_surplus_buffer(alice(), TokenAmount::from_cents(1))
            .is_err());

        assert_eq!(engine.pool().total().base(), COLLATERAL_BASE_UNIT);
        assert_eq!(engine.peg().total_supply().cents(), 388_000);
        assert_eq!(engine.peg().balance_of(&alice()).cents(), 388_000);
        assert_eq!(engine.shares().total_supply().cents(), 0);
        assert!(engine.audit());
    }

    #[test]
    fn test_collateralization_ratio_query() {
        let mut engine = engine(price_4000());
        assert_eq!(engine.collateralization_ratio().unwrap(), u64::MAX);

        engine.mint(alice(), CollateralAmount::from_units(1)).unwrap();
        // $4,000 backing $3,880 of peg = 103%
        assert_eq!(engine.collateralization_ratio().unwrap(), 103);
    }

    #[test]
    fn test_snapshot_restore() {
        let mut engine = engine(price_4000());
        engine.mint(alice(), CollateralAmount::from_units(1)).unwrap();

        let bytes = engine.snapshot().to_bytes().unwrap();
        let state = EngineState::from_bytes(&bytes).unwrap();
        let restored =
            CollateralizationEngine::from_state(state, price_4000()).unwrap();

        assert_eq!(restored.peg().balance_of(&alice()).cents(), 388_000);
        assert_eq!(restored.pool().total().base(), COLLATERAL_BASE_UNIT);
    }

    #[test]
    fn test_shared_engine_serializes_operations() {
        let shared = SharedEngine::new(engine(price_4000()));
        let shared2 = shared.clone();

        shared.mint(alice(), CollateralAmount::from_units(1)).unwrap();
        let supply = shared2.with(|e| e.peg().total_supply()).unwrap();
        assert_eq!(supply.cents(), 388_000);
    }
}
