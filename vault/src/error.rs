//! Vault errors.
//!
//! Each variant is a stable failure kind: [`VaultError::kind`] returns the
//! identifier callers match on, independent of the human-readable message.

use thiserror::Error;
use vault_asset::AssetError;
use vault_types::{Address, LockId, ParamsError, Timestamp};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum VaultError {
    #[error("zero address is not allowed here")]
    ZeroAddress,

    #[error("amount must be non-zero")]
    InvalidAmount,

    #[error("lock duration {duration_secs}s outside [{min_secs}s, {max_secs}s]")]
    InvalidPeriod {
        duration_secs: u64,
        min_secs: u64,
        max_secs: u64,
    },

    #[error("insufficient allowance: need {needed}, approved {available}")]
    InsufficientAllowance { needed: u128, available: u128 },

    #[error("vault is paused")]
    PausedState,

    #[error("lock {0} not found or no longer active")]
    LockNotFound(LockId),

    #[error("lock {0} has already expired")]
    LockExpired(LockId),

    #[error("lock {lock_id} would span {span_secs}s, maximum is {max_secs}s")]
    PeriodOverflow {
        lock_id: LockId,
        span_secs: u64,
        max_secs: u64,
    },

    #[error("lock {lock_id} is locked until {unlock_time}")]
    LockNotYetExpired {
        lock_id: LockId,
        unlock_time: Timestamp,
    },

    #[error("lock {lock_id} holds {locked}, cannot unlock {requested}")]
    UnlockAmountExceeds {
        lock_id: LockId,
        requested: u128,
        locked: u128,
    },

    #[error("only {withdrawable} is withdrawable across expired locks, requested {requested}")]
    AggregateUnlockExceeds { requested: u128, withdrawable: u128 },

    #[error("{0} already holds an active lock")]
    DuplicateLock(Address),

    #[error("{0} is not authorized for this operation")]
    Unauthorized(Address),

    #[error("cannot compound {requested}, lock share of rewards is {claimable}")]
    InsufficientRewardForCompound { requested: u128, claimable: u128 },

    #[error("arithmetic overflow in vault accounting")]
    ArithmeticOverflow,

    #[error("clock went backwards: now {now}, last update {last_update}")]
    ClockRegression {
        now: Timestamp,
        last_update: Timestamp,
    },

    #[error("invalid vault parameters: {0}")]
    InvalidParams(#[from] ParamsError),

    #[error("asset transfer failed: {0}")]
    AssetTransfer(AssetError),
}

impl From<AssetError> for VaultError {
    fn from(err: AssetError) -> Self {
        match err {
            AssetError::InsufficientAllowance { needed, available } => {
                VaultError::InsufficientAllowance { needed, available }
            }
            other => VaultError::AssetTransfer(other),
        }
    }
}

impl VaultError {
    /// Stable identifier of the failure kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ZeroAddress => "ZeroAddress",
            Self::InvalidAmount => "InvalidAmount",
            Self::InvalidPeriod { .. } => "InvalidPeriod",
            Self::InsufficientAllowance { .. } => "InsufficientAllowance",
            Self::PausedState => "PausedState",
            Self::LockNotFound(_) => "LockNotFound",
            Self::LockExpired(_) => "LockExpired",
            Self::PeriodOverflow { .. } => "PeriodOverflow",
            Self::LockNotYetExpired { .. } => "LockNotYetExpired",
            Self::UnlockAmountExceeds { .. } => "UnlockAmountExceeds",
            Self::AggregateUnlockExceeds { .. } => "AggregateUnlockExceeds",
            Self::DuplicateLock(_) => "DuplicateLock",
            Self::Unauthorized(_) => "Unauthorized",
            Self::InsufficientRewardForCompound { .. } => "InsufficientRewardForCompound",
            Self::ArithmeticOverflow => "ArithmeticOverflow",
            Self::ClockRegression { .. } => "ClockRegression",
            Self::InvalidParams(_) => "InvalidParams",
            Self::AssetTransfer(_) => "AssetTransfer",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allowance_failures_keep_their_kind() {
        let err: VaultError = AssetError::InsufficientAllowance {
            needed: 10,
            available: 3,
        }
        .into();
        assert_eq!(err.kind(), "InsufficientAllowance");

        let err: VaultError = AssetError::InsufficientBalance {
            needed: 10,
            available: 3,
        }
        .into();
        assert_eq!(err.kind(), "AssetTransfer");
    }

    #[test]
    fn messages_carry_context() {
        let err = VaultError::LockNotYetExpired {
            lock_id: LockId::new(3),
            unlock_time: Timestamp::new(99),
        };
        assert_eq!(err.to_string(), "lock #3 is locked until 99s");
        assert_eq!(err.kind(), "LockNotYetExpired");
    }
}
