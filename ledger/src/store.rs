//! The balance store: the single source of truth for every balance.

use crate::error::LedgerError;
use nmr_types::{Address, NmrAmount};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Account balances, total supply, and the amount held in stake escrow.
///
/// Invariant: `Σ balances + escrowed == total_supply`. Every mutation checks
/// all of its arithmetic before writing, so a failed call leaves the store
/// untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerStore {
    /// Non-zero balances only. Accounts drop out of the map when emptied.
    balances: BTreeMap<Address, NmrAmount>,
    total_supply: NmrAmount,
    escrowed: NmrAmount,
}

impl LedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn balance_of(&self, account: &Address) -> NmrAmount {
        self.balances.get(account).copied().unwrap_or(NmrAmount::ZERO)
    }

    pub fn total_supply(&self) -> NmrAmount {
        self.total_supply
    }

    /// Amount locked by active stakes. Counted in total supply, owned by no account.
    pub fn total_escrowed(&self) -> NmrAmount {
        self.escrowed
    }

    /// Number of accounts holding a non-zero balance.
    pub fn account_count(&self) -> usize {
        self.balances.len()
    }

    /// Non-zero balances in address order.
    pub fn accounts(&self) -> impl Iterator<Item = (&Address, &NmrAmount)> {
        self.balances.iter()
    }

    /// Create `amount` new tokens in `to`.
    pub fn mint(&mut self, to: &Address, amount: NmrAmount) -> Result<(), LedgerError> {
        let supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;
        let balance = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;
        self.total_supply = supply;
        self.set_balance(to, balance);
        Ok(())
    }

    /// Move `amount` from `from` to `to`.
    pub fn transfer(
        &mut self,
        from: &Address,
        to: &Address,
        amount: NmrAmount,
    ) -> Result<(), LedgerError> {
        let from_balance = self.debited(from, amount)?;
        if from == to {
            return Ok(());
        }
        let to_balance = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;
        self.set_balance(from, from_balance);
        self.set_balance(to, to_balance);
        Ok(())
    }

    /// Lock `amount` of `from`'s free balance in escrow.
    pub fn escrow(&mut self, from: &Address, amount: NmrAmount) -> Result<(), LedgerError> {
        let from_balance = self.debited(from, amount)?;
        let escrowed = self
            .escrowed
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;
        self.set_balance(from, from_balance);
        self.escrowed = escrowed;
        Ok(())
    }

    /// Return `amount` from escrow to `to`'s free balance. Supply is unchanged.
    pub fn release_escrow(&mut self, to: &Address, amount: NmrAmount) -> Result<(), LedgerError> {
        let escrowed = self.escrow_debited(amount)?;
        let to_balance = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;
        self.escrowed = escrowed;
        self.set_balance(to, to_balance);
        Ok(())
    }

    /// Destroy `amount` held in escrow, reducing total supply.
    pub fn burn_escrow(&mut self, amount: NmrAmount) -> Result<(), LedgerError> {
        let escrowed = self.escrow_debited(amount)?;
        let supply = self
            .total_supply
            .checked_sub(amount)
            .ok_or(LedgerError::Overflow)?;
        self.escrowed = escrowed;
        self.total_supply = supply;
        Ok(())
    }

    /// Recompute the supply invariant from scratch.
    pub fn is_consistent(&self) -> bool {
        let held = self
            .balances
            .values()
            .try_fold(self.escrowed, |acc, b| acc.checked_add(*b));
        held == Some(self.total_supply)
    }

    /// Rebuild a store from raw parts, rejecting inconsistent input.
    pub fn from_parts(
        balances: impl IntoIterator<Item = (Address, NmrAmount)>,
        total_supply: NmrAmount,
        escrowed: NmrAmount,
    ) -> Result<Self, LedgerError> {
        let balances = balances
            .into_iter()
            .filter(|(_, amount)| !amount.is_zero())
            .collect();
        let store = Self {
            balances,
            total_supply,
            escrowed,
        };
        if !store.is_consistent() {
            return Err(LedgerError::Snapshot(
                "balances and escrow do not sum to total supply".into(),
            ));
        }
        Ok(store)
    }

    fn debited(&self, account: &Address, amount: NmrAmount) -> Result<NmrAmount, LedgerError> {
        let available = self.balance_of(account);
        available
            .checked_sub(amount)
            .ok_or(LedgerError::InsufficientBalance {
                account: *account,
                needed: amount.raw(),
                available: available.raw(),
            })
    }

    fn escrow_debited(&self, amount: NmrAmount) -> Result<NmrAmount, LedgerError> {
        self.escrowed
            .checked_sub(amount)
            .ok_or(LedgerError::InsufficientEscrow {
                needed: amount.raw(),
                available: self.escrowed.raw(),
            })
    }

    fn set_balance(&mut self, account: &Address, balance: NmrAmount) {
        if balance.is_zero() {
            self.balances.remove(account);
        } else {
            self.balances.insert(*account, balance);
        }
    }
}
