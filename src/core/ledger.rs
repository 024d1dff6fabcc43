//! Token ledgers for the two engine-controlled units.
//!
//! A [`TokenLedger`] is a dumb counter: total supply, per-holder balances,
//! and allowances. The engine instantiates two of them — one for the peg
//! token and one for the surplus shares — and is the sole caller of
//! `mint`/`burn`. Transfers and approvals are public with conventional
//! semantics.

use std::collections::HashMap;
use std::fmt;

use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

use crate::error::{Error, Result};
use crate::utils::constants::{ACCOUNT_ID_LENGTH, PEG_BASE_UNIT};
use crate::utils::math::{safe_add, safe_sub};

// ═══════════════════════════════════════════════════════════════════════════════
// ACCOUNT ID
// ═══════════════════════════════════════════════════════════════════════════════

/// A 20-byte holder identifier
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AccountId([u8; ACCOUNT_ID_LENGTH]);

impl Serialize for AccountId {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&hex::encode(self.0))
    }
}

impl<'de> Deserialize<'de> for AccountId {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        AccountId::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

impl AccountId {
    /// Create from raw bytes
    pub const fn new(bytes: [u8; ACCOUNT_ID_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Derive deterministically from arbitrary seed bytes
    pub fn from_seed(seed: &[u8]) -> Self {
        let digest = Sha256::digest(seed);
        let mut bytes = [0u8; ACCOUNT_ID_LENGTH];
        bytes.copy_from_slice(&digest[..ACCOUNT_ID_LENGTH]);
        Self(bytes)
    }

    /// Generate a random account identifier
    pub fn random() -> Self {
        let mut bytes = [0u8; ACCOUNT_ID_LENGTH];
        rand::thread_rng().fill(&mut bytes[..]);
        Self(bytes)
    }

    /// Get the identifier as bytes
    pub fn as_bytes(&self) -> &[u8; ACCOUNT_ID_LENGTH] {
        &self.0
    }

    /// Convert to hex string
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from hex string
    pub fn from_hex(s: &str) -> Result<Self> {
        let bytes = hex::decode(s).map_err(|e| Error::InvalidParameter {
            name: "account_id".into(),
            reason: e.to_string(),
        })?;
        if bytes.len() != ACCOUNT_ID_LENGTH {
            return Err(Error::InvalidParameter {
                name: "account_id".into(),
                reason: format!("expected {} bytes, got {}", ACCOUNT_ID_LENGTH, bytes.len()),
            });
        }
        let mut arr = [0u8; ACCOUNT_ID_LENGTH];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl fmt::Debug for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccountId({})", self.to_hex())
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TOKEN AMOUNT
// ═══════════════════════════════════════════════════════════════════════════════

/// Strongly-typed token amount in cents of the unit of account.
///
/// Used for both peg units and surplus shares (1 share ≡ 1 cent at bootstrap).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TokenAmount(u64);

impl TokenAmount {
    /// Zero amount
    pub const ZERO: Self = Self(0);

    /// Create from cents
    pub const fn from_cents(cents: u64) -> Self {
        Self(cents)
    }

    /// Create from whole units of account
    pub fn from_units(units: u64) -> Self {
        Self(units * PEG_BASE_UNIT)
    }

    /// Get raw cents value
    pub fn cents(&self) -> u64 {
        self.0
    }

    /// Check if zero
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checked addition
    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    /// Checked subtraction
    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    /// Saturating subtraction
    pub fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / PEG_BASE_UNIT, self.0 % PEG_BASE_UNIT)
    }
}

impl From<u64> for TokenAmount {
    fn from(cents: u64) -> Self {
        Self(cents)
    }
}

impl From<TokenAmount> for u64 {
    fn from(amount: TokenAmount) -> Self {
        amount.0
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TOKEN EVENTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Type of ledger operation for event logging
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenOperation {
    /// Minting new units (engine only)
    Mint,
    /// Burning units (engine only)
    Burn,
    /// Transfer between holders
    Transfer,
    /// Allowance approval
    Approval,
}

/// Record of a ledger operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenEvent {
    /// Type of operation
    pub operation: TokenOperation,
    /// Sender or owner (None for mint)
    pub from: Option<AccountId>,
    /// Recipient or spender (None for burn)
    pub to: Option<AccountId>,
    /// Amount in cents
    pub amount: TokenAmount,
}

// ═══════════════════════════════════════════════════════════════════════════════
// TOKEN LEDGER
// ═══════════════════════════════════════════════════════════════════════════════

/// Balance ledger for one engine-controlled token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenLedger {
    /// Token name
    pub name: String,
    /// Token symbol
    pub symbol: String,
    /// Decimal places
    pub decimals: u8,
    /// Optional supply cap in cents (None = uncapped)
    supply_cap: Option<u64>,
    /// Total supply in cents
    total_supply: TokenAmount,
    /// Balances by holder
    balances: HashMap<AccountId, TokenAmount>,
    /// Allowances by (owner, spender)
    allowances: HashMap<(AccountId, AccountId), TokenAmount>,
    /// Recent events (bounded)
    events: Vec<TokenEvent>,
    /// Maximum events to keep in memory
    max_events: usize,
}

impl TokenLedger {
    /// Create a new empty ledger
    pub fn new(name: &str, symbol: &str, decimals: u8) -> Self {
        Self {
            name: name.to_string(),
            symbol: symbol.to_string(),
            decimals,
            supply_cap: None,
            total_supply: TokenAmount::ZERO,
            balances: HashMap::new(),
            allowances: HashMap::new(),
            events: Vec::new(),
            max_events: 1000,
        }
    }

    /// Create with a supply cap
    pub fn with_supply_cap(mut self, cap_cents: u64) -> Self {
        self.supply_cap = Some(cap_cents);
        self
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // QUERIES
    // ═══════════════════════════════════════════════════════════════════════════

    /// Get total supply
    pub fn total_supply(&self) -> TokenAmount {
        self.total_supply
    }

    /// Get balance of a holder
    pub fn balance_of(&self, holder: &AccountId) -> TokenAmount {
        self.balances.get(holder).copied().unwrap_or(TokenAmount::ZERO)
    }

    /// Get remaining allowance granted by `owner` to `spender`
    pub fn allowance(&self, owner: &AccountId, spender: &AccountId) -> TokenAmount {
        self.allowances
            .get(&(*owner, *spender))
            .copied()
            .unwrap_or(TokenAmount::ZERO)
    }

    /// Get number of holders with a nonzero balance
    pub fn holder_count(&self) -> usize {
        self.balances.len()
    }

    /// Verify supply invariant (total_supply == sum of all balances)
    pub fn verify_supply_invariant(&self) -> bool {
        let sum: u128 = self.balances.values().map(|b| b.cents() as u128).sum();
        sum == self.total_supply.cents() as u128
    }

    /// Get recent events
    pub fn recent_events(&self) -> &[TokenEvent] {
        &self.events
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // ENGINE-ONLY SUPPLY MUTATIONS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Check that a mint of `amount` cents would succeed, without mutating.
    /// The engine calls this before any state change so a later mint cannot fail.
    pub(crate) fn can_mint(&self, amount: u64) -> Result<()> {
        if amount == 0 {
            return Err(Error::ZeroAmount);
        }
        let new_supply = safe_add(self.total_supply.cents(), amount)?;
        if let Some(cap) = self.supply_cap {
            if new_supply > cap {
                return Err(Error::SupplyCapReached {
                    current: new_supply,
                    max: cap,
                });
            }
        }
        Ok(())
    }

    /// Mint new units to a holder. Engine only.
    pub(crate) fn mint(&mut self, to: AccountId, amount: TokenAmount) -> Result<()> {
        self.can_mint(amount.cents())?;

        let new_supply = safe_add(self.total_supply.cents(), amount.cents())?;
        let new_balance = safe_add(self.balance_of(&to).cents(), amount.cents())?;

        self.balances.insert(to, TokenAmount::from_cents(new_balance));
        self.total_supply = TokenAmount::from_cents(new_supply);

        self.add_event(TokenEvent {
            operation: TokenOperation::Mint,
            from: None,
            to: Some(to),
            amount,
        });

        Ok(())
    }

    /// Burn units from a holder. Engine only; fails if amount exceeds balance.
    pub(crate) fn burn(&mut self, from: AccountId, amount: TokenAmount) -> Result<()> {
        if amount.is_zero() {
            return Err(Error::ZeroAmount);
        }

        let balance = self.balance_of(&from);
        if balance < amount {
            return Err(Error::InsufficientBalance {
                required: amount.cents(),
                available: balance.cents(),
            });
        }

        let new_balance = safe_sub(balance.cents(), amount.cents())?;
        if new_balance == 0 {
            self.balances.remove(&from);
        } else {
            self.balances.insert(from, TokenAmount::from_cents(new_balance));
        }
        self.total_supply = TokenAmount::from_cents(safe_sub(
            self.total_supply.cents(),
            amount.cents(),
        )?);

        self.add_event(TokenEvent {
            operation: TokenOperation::Burn,
            from: Some(from),
            to: None,
            amount,
        });

        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // PUBLIC TRANSFERS AND APPROVALS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Transfer units between holders
    pub fn transfer(&mut self, from: AccountId, to: AccountId, amount: TokenAmount) -> Result<()> {
        if amount.is_zero() {
            return Err(Error::ZeroAmount);
        }

        if from == to {
            return Ok(()); // No-op for self-transfer
        }

        let from_balance = self.balance_of(&from);
        if from_balance < amount {
            return Err(Error::InsufficientBalance {
                required: amount.cents(),
                available: from_balance.cents(),
            });
        }

        let new_to_balance = safe_add(self.balance_of(&to).cents(), amount.cents())?;

        let new_from_balance = safe_sub(from_balance.cents(), amount.cents())?;
        if new_from_balance == 0 {
            self.balances.remove(&from);
        } else {
            self.balances.insert(from, TokenAmount::from_cents(new_from_balance));
        }
        self.balances.insert(to, TokenAmount::from_cents(new_to_balance));

        self.add_event(TokenEvent {
            operation: TokenOperation::Transfer,
            from: Some(from),
            to: Some(to),
            amount,
        });

        Ok(())
    }

    /// Approve a spender to transfer up to `amount` on the owner's behalf.
    /// Overwrites any previous allowance.
    pub fn approve(&mut self, owner: AccountId, spender: AccountId, amount: TokenAmount) {
        if amount.is_zero() {
            self.allowances.remove(&(owner, spender));
        } else {
            self.allowances.insert((owner, spender), amount);
        }

        self.add_event(TokenEvent {
            operation: TokenOperation::Approval,
            from: Some(owner),
            to: Some(spender),
            amount,
        });
    }

    /// Transfer on behalf of `from`, consuming `spender`'s allowance
    pub fn transfer_from(
        &mut self,
        spender: AccountId,
        from: AccountId,
        to: AccountId,
        amount: TokenAmount,
    ) -> Result<()> {
        if amount.is_zero() {
            return Err(Error::ZeroAmount);
        }

        let allowed = self.allowance(&from, &spender);
        if allowed < amount {
            return Err(Error::InsufficientAllowance {
                required: amount.cents(),
                available: allowed.cents(),
            });
        }

        self.transfer(from, to, amount)?;

        let remaining = allowed.saturating_sub(amount);
        if remaining.is_zero() {
            self.allowances.remove(&(from, spender));
        } else {
            self.allowances.insert((from, spender), remaining);
        }

        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // INTERNAL
    // ═══════════════════════════════════════════════════════════════════════════

    /// Add an event (with pruning)
    fn add_event(&mut self, event: TokenEvent) {
        self.events.push(event);
        if self.events.len() > self.max_events {
            self.events.drain(0..self.events.len() - self.max_events);
        }
    }

    /// Serialize to bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode::serialize(self).map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Deserialize from bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        bincode::deserialize(bytes).map_err(|e| Error::Deserialization(e.to_string()))
    }
}
