//! Fundamental types for the staking vault.
//!
//! This crate defines the core types shared across every other crate in the workspace:
//! addresses, timestamps, lock identifiers, and vault parameters.

pub mod address;
pub mod lock_id;
pub mod params;
pub mod time;

pub use address::{Address, AddressParseError};
pub use lock_id::LockId;
pub use params::{
    LockForFunding, ParamsError, VaultParams, REWARD_PER_UNIT_PRECISION, REWARD_PRECISION,
};
pub use time::Timestamp;
