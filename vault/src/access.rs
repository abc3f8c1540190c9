//! Owner, reward distributor, and the pause switch.

use serde::{Deserialize, Serialize};
use vault_types::Address;

use crate::error::VaultError;

/// Who may do what, and whether principal-moving operations are frozen.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessControl {
    owner: Address,
    reward_distributor: Address,
    paused: bool,
}

impl AccessControl {
    /// The deployer starts out as both owner and reward distributor.
    pub fn new(deployer: Address) -> Self {
        Self {
            owner: deployer,
            reward_distributor: deployer,
            paused: false,
        }
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn reward_distributor(&self) -> Address {
        self.reward_distributor
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn ensure_owner(&self, caller: &Address) -> Result<(), VaultError> {
        if *caller != self.owner {
            tracing::warn!(caller = %caller, "owner-only call rejected");
            return Err(VaultError::Unauthorized(*caller));
        }
        Ok(())
    }

    pub fn ensure_distributor(&self, caller: &Address) -> Result<(), VaultError> {
        if *caller != self.reward_distributor {
            tracing::warn!(caller = %caller, "distributor-only call rejected");
            return Err(VaultError::Unauthorized(*caller));
        }
        Ok(())
    }

    /// Fails with `PausedState` while the vault is paused.
    pub fn ensure_unpaused(&self) -> Result<(), VaultError> {
        if self.paused {
            return Err(VaultError::PausedState);
        }
        Ok(())
    }

    pub fn set_paused(&mut self, caller: &Address, paused: bool) -> Result<(), VaultError> {
        self.ensure_owner(caller)?;
        self.paused = paused;
        Ok(())
    }

    /// Returns the previous distributor.
    pub fn set_reward_distributor(
        &mut self,
        caller: &Address,
        distributor: Address,
    ) -> Result<Address, VaultError> {
        self.ensure_owner(caller)?;
        if distributor.is_zero() {
            return Err(VaultError::ZeroAddress);
        }
        Ok(std::mem::replace(&mut self.reward_distributor, distributor))
    }

    /// Returns the previous owner.
    pub fn transfer_ownership(
        &mut self,
        caller: &Address,
        new_owner: Address,
    ) -> Result<Address, VaultError> {
        self.ensure_owner(caller)?;
        if new_owner.is_zero() {
            return Err(VaultError::ZeroAddress);
        }
        Ok(std::mem::replace(&mut self.owner, new_owner))
    }
}
