//! Vault parameters: lock duration bounds, emission window, lock-mode options.
//!
//! Parameters are fixed at vault construction. Every field has a serde default
//! so a partial TOML table is enough to configure a vault.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fixed-point scale applied to `reward_rate` and `reward_per_unit_stored`.
///
/// Without scaling, `pool / epoch_duration` floors to zero for any pool
/// smaller than the epoch length in seconds.
pub const REWARD_PRECISION: u128 = 1_000_000_000_000;

/// Fixed-point scale applied to `reward_per_unit_stored`.
///
/// Each settlement floors `elapsed × reward_rate / total_principal`, and the
/// floored part is paid to nobody. At this scale the loss per settlement is
/// below one raw unit per 10^18 units of principal.
pub const REWARD_PER_UNIT_PRECISION: u128 = 1_000_000_000_000_000_000;

const DAY_SECS: u64 = 24 * 3600;

/// Whose allowance `lock_for` draws the locked principal from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockForFunding {
    /// `transferFrom(beneficiary -> vault)`: the beneficiary pre-approves the vault.
    #[default]
    Beneficiary,
    /// `transferFrom(caller -> vault)`: the caller pays for someone else's lock.
    Caller,
}

/// Rejected parameter combinations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParamsError {
    #[error("minimum lock duration must be non-zero")]
    ZeroMinDuration,

    #[error("minimum lock duration ({min}s) exceeds maximum ({max}s)")]
    InvertedDurationBounds { min: u64, max: u64 },

    #[error("epoch duration must be non-zero")]
    ZeroEpoch,
}

/// All parameters a vault instance is constructed with.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultParams {
    // ── Lock bounds ─────────────────────────────────────────────────────
    /// Shortest allowed lock, in seconds. Default: 7 days.
    #[serde(default = "default_min_lock_duration")]
    pub min_lock_duration_secs: u64,

    /// Longest allowed span between a lock's start and its unlock time,
    /// in seconds. Extensions are bounded by this too. Default: 4 years.
    #[serde(default = "default_max_lock_duration")]
    pub max_lock_duration_secs: u64,

    // ── Emission ────────────────────────────────────────────────────────
    /// Length of the reward emission window started by each
    /// `notify_reward_amount`. Default: 7 days.
    #[serde(default = "default_epoch_duration")]
    pub epoch_duration_secs: u64,

    // ── Lock modes ──────────────────────────────────────────────────────
    /// When set, a depositor may hold at most one active lock at a time.
    #[serde(default)]
    pub single_lock_mode: bool,

    /// Funding source for `lock_for`.
    #[serde(default)]
    pub lock_for_funding: LockForFunding,
}

fn default_min_lock_duration() -> u64 {
    7 * DAY_SECS
}

fn default_max_lock_duration() -> u64 {
    4 * 365 * DAY_SECS
}

fn default_epoch_duration() -> u64 {
    7 * DAY_SECS
}

impl VaultParams {
    /// Check the invariants every vault relies on.
    pub fn validate(&self) -> Result<(), ParamsError> {
        if self.min_lock_duration_secs == 0 {
            return Err(ParamsError::ZeroMinDuration);
        }
        if self.min_lock_duration_secs > self.max_lock_duration_secs {
            return Err(ParamsError::InvertedDurationBounds {
                min: self.min_lock_duration_secs,
                max: self.max_lock_duration_secs,
            });
        }
        if self.epoch_duration_secs == 0 {
            return Err(ParamsError::ZeroEpoch);
        }
        Ok(())
    }

    /// Whether `duration_secs` is an acceptable length for a new lock.
    pub fn is_valid_lock_duration(&self, duration_secs: u64) -> bool {
        duration_secs >= self.min_lock_duration_secs && duration_secs <= self.max_lock_duration_secs
    }
}

impl Default for VaultParams {
    fn default() -> Self {
        Self {
            min_lock_duration_secs: default_min_lock_duration(),
            max_lock_duration_secs: default_max_lock_duration(),
            epoch_duration_secs: default_epoch_duration(),
            single_lock_mode: false,
            lock_for_funding: LockForFunding::default(),
        }
    }
}
