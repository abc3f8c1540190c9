//! Custody side of the vault: every token movement between depositors and
//! the vault's own account goes through [`VaultLedger`].

use vault_asset::{AssetError, FungibleAsset};
use vault_types::Address;

use crate::error::VaultError;

pub struct VaultLedger<A> {
    asset: A,
    /// The vault's own account on the asset.
    custodian: Address,
}

impl<A: FungibleAsset> VaultLedger<A> {
    pub fn new(asset: A, custodian: Address) -> Self {
        Self { asset, custodian }
    }

    pub fn custodian(&self) -> Address {
        self.custodian
    }

    /// Fail early when `owner` has not approved the vault for `amount`.
    pub fn ensure_allowance(&self, owner: &Address, amount: u128) -> Result<(), VaultError> {
        let available = self.asset.allowance(owner, &self.custodian);
        if available < amount {
            return Err(VaultError::InsufficientAllowance {
                needed: amount,
                available,
            });
        }
        Ok(())
    }

    /// Draw `amount` from `from` into custody using the vault's allowance.
    pub fn pull(&mut self, from: &Address, amount: u128) -> Result<(), AssetError> {
        if amount == 0 {
            return Ok(());
        }
        let custodian = self.custodian;
        self.asset.transfer_from(&custodian, from, &custodian, amount)
    }

    /// Send `amount` out of custody to `to`.
    pub fn push(&mut self, to: &Address, amount: u128) -> Result<(), AssetError> {
        if amount == 0 {
            return Ok(());
        }
        let custodian = self.custodian;
        self.asset.transfer(&custodian, to, amount)
    }

    /// Tokens currently held by the vault.
    pub fn held(&self) -> u128 {
        self.asset.balance_of(&self.custodian)
    }

    pub fn asset(&self) -> &A {
        &self.asset
    }

    pub fn asset_mut(&mut self) -> &mut A {
        &mut self.asset
    }
}
