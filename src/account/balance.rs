//! Balance ledger backing the vault's outgoing transfers

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

use super::types::{Amount, Identity};
use crate::vault::{ValueTransfer, Vault};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BalanceError {
    #[error("Insufficient funds: treasury holds {available}, requested {requested}")]
    InsufficientFunds { available: Amount, requested: Amount },
    #[error("Destination {0} refuses incoming transfers")]
    Refused(Identity),
    #[error("Balance overflow")]
    Overflow,
    #[error("Invalid amount")]
    InvalidAmount,
}

/// Treasury of the guarded account plus the balances of everyone it has paid.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct BalanceLedger {
    treasury: Amount,
    balances: BTreeMap<Identity, Amount>,
    /// Destinations that reject incoming value
    refusing: BTreeSet<Identity>,
}

impl BalanceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn treasury(&self) -> Amount {
        self.treasury
    }

    pub fn balance_of(&self, account: &Identity) -> Amount {
        self.balances.get(account).copied().unwrap_or(0)
    }

    /// Fund the treasury. Returns the new treasury balance.
    pub fn deposit(&mut self, amount: Amount) -> Result<Amount, BalanceError> {
        if amount == 0 {
            return Err(BalanceError::InvalidAmount);
        }
        self.treasury = self
            .treasury
            .checked_add(amount)
            .ok_or(BalanceError::Overflow)?;
        Ok(self.treasury)
    }

    pub fn refuse_incoming(&mut self, account: Identity) {
        self.refusing.insert(account);
    }

    pub fn accept_incoming(&mut self, account: &Identity) {
        self.refusing.remove(account);
    }

    /// Move `amount` from the treasury to `to`. Either both sides change or neither does.
    pub fn pay(&mut self, to: Identity, amount: Amount) -> Result<(), BalanceError> {
        if self.refusing.contains(&to) {
            return Err(BalanceError::Refused(to));
        }
        if self.treasury < amount {
            return Err(BalanceError::InsufficientFunds {
                available: self.treasury,
                requested: amount,
            });
        }
        let credited = self
            .balance_of(&to)
            .checked_add(amount)
            .ok_or(BalanceError::Overflow)?;

        self.treasury -= amount;
        self.balances.insert(to, credited);
        Ok(())
    }
}

impl ValueTransfer for BalanceLedger {
    fn transfer(&mut self, _vault: &mut Vault, destination: Identity, amount: Amount) -> Result<(), String> {
        self.pay(destination, amount).map_err(|e| e.to_string())
    }
}
