//! In-memory fungible ledger.
//!
//! A complete, conservation-preserving implementation of [`FungibleAsset`]
//! backed by hash maps. Hosts without a native token use it directly; tests
//! use it as the asset behind a vault.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use vault_types::Address;

use crate::error::AssetError;
use crate::FungibleAsset;

/// Balances and allowances of a single fungible asset.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenLedger {
    address: Address,
    balances: HashMap<Address, u128>,
    /// `owner -> spender -> remaining allowance`.
    allowances: HashMap<Address, HashMap<Address, u128>>,
    total_supply: u128,
}

impl TokenLedger {
    pub fn new(address: Address) -> Self {
        Self {
            address,
            balances: HashMap::new(),
            allowances: HashMap::new(),
            total_supply: 0,
        }
    }

    /// Create new supply in `to`'s account. Issuance is a concern of whoever
    /// owns the ledger, never of the vault.
    pub fn mint(&mut self, to: &Address, amount: u128) -> Result<(), AssetError> {
        if to.is_zero() {
            return Err(AssetError::ZeroAddress);
        }
        let supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(AssetError::Overflow)?;
        let balance = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(AssetError::Overflow)?;
        self.total_supply = supply;
        self.balances.insert(*to, balance);
        Ok(())
    }

    pub fn total_supply(&self) -> u128 {
        self.total_supply
    }

    fn set_allowance(&mut self, owner: &Address, spender: &Address, amount: u128) {
        self.allowances
            .entry(*owner)
            .or_default()
            .insert(*spender, amount);
    }

    /// Debit `from` and credit `to` in one step. Checks everything before
    /// touching either balance.
    fn move_balance(&mut self, from: &Address, to: &Address, amount: u128) -> Result<(), AssetError> {
        if from.is_zero() || to.is_zero() {
            return Err(AssetError::ZeroAddress);
        }
        let available = self.balance_of(from);
        if available < amount {
            return Err(AssetError::InsufficientBalance {
                needed: amount,
                available,
            });
        }
        if from == to {
            return Ok(());
        }
        let credited = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(AssetError::Overflow)?;
        self.balances.insert(*from, available - amount);
        self.balances.insert(*to, credited);
        Ok(())
    }
}

impl FungibleAsset for TokenLedger {
    fn address(&self) -> Address {
        self.address
    }

    fn balance_of(&self, owner: &Address) -> u128 {
        self.balances.get(owner).copied().unwrap_or(0)
    }

    fn allowance(&self, owner: &Address, spender: &Address) -> u128 {
        self.allowances
            .get(owner)
            .and_then(|spenders| spenders.get(spender))
            .copied()
            .unwrap_or(0)
    }

    fn approve(&mut self, owner: &Address, spender: &Address, amount: u128) -> Result<(), AssetError> {
        if owner.is_zero() || spender.is_zero() {
            return Err(AssetError::ZeroAddress);
        }
        self.set_allowance(owner, spender, amount);
        Ok(())
    }

    fn transfer(&mut self, from: &Address, to: &Address, amount: u128) -> Result<(), AssetError> {
        self.move_balance(from, to, amount)
    }

    fn transfer_from(
        &mut self,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: u128,
    ) -> Result<(), AssetError> {
        let allowed = self.allowance(from, spender);
        if allowed < amount {
            return Err(AssetError::InsufficientAllowance {
                needed: amount,
                available: allowed,
            });
        }
        self.move_balance(from, to, amount)?;
        if allowed != u128::MAX {
            self.set_allowance(from, spender, allowed - amount);
        }
        Ok(())
    }
}
