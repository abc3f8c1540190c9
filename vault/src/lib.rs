//! Custodial staking vault.
//!
//! Depositors lock a fungible asset for a chosen duration and earn a share
//! of a reward stream proportional to their locked principal over time.
//! Rewards can be claimed, paid out alongside an unlock, or compounded back
//! into a lock.
//!
//! [`StakingVault`] is the entry point. It composes:
//! - [`AccessControl`]: owner, reward distributor, pause switch.
//! - [`RewardAccumulator`]: the global reward-per-unit ledger and settlement.
//! - [`LockBook`]: per-depositor arenas of [`Lock`]s.
//! - [`VaultLedger`]: custody transfers against a [`vault_asset::FungibleAsset`].

pub mod access;
pub mod accumulator;
pub mod book;
pub mod config;
pub mod error;
pub mod events;
pub mod ledger;
pub mod lock;
pub mod math;
pub mod vault;

pub use access::AccessControl;
pub use accumulator::RewardAccumulator;
pub use book::{Depositor, LockBook};
pub use config::{ConfigError, VaultConfig};
pub use error::VaultError;
pub use events::{EventBus, VaultEvent};
pub use ledger::VaultLedger;
pub use lock::Lock;
pub use vault::{CallContext, StakingVault, Withdrawal};
