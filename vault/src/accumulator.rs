//! Time-weighted reward-per-unit accumulator.
//!
//! Rewards are emitted at `reward_rate` per second between a notify and
//! `period_finish`. Instead of visiting every depositor, the accumulator keeps
//! one global `reward_per_unit_stored`: the cumulative reward earned by one
//! unit of principal locked since the vault began. A depositor's earnings
//! since its last settlement are then
//!
//! ```text
//! principal × (reward_per_unit_stored − reward_per_unit_paid) / REWARD_PER_UNIT_PRECISION
//! ```
//!
//! `reward_rate` carries the [`REWARD_PRECISION`] scale and
//! `reward_per_unit_stored` the finer [`REWARD_PER_UNIT_PRECISION`] scale.
//! Settlement must run before any change to a
//! depositor's principal, otherwise the new principal would be credited for
//! time it was not locked.

use serde::{Deserialize, Serialize};
use vault_types::{Timestamp, REWARD_PER_UNIT_PRECISION, REWARD_PRECISION};

use crate::book::Depositor;
use crate::error::VaultError;
use crate::math;

/// Converts a `reward_rate × seconds` product to the per-unit scale.
const RATE_TO_PER_UNIT: u128 = REWARD_PER_UNIT_PRECISION / REWARD_PRECISION;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardAccumulator {
    total_principal: u128,
    /// Scaled reward emitted per second across all principal.
    reward_rate: u128,
    /// Scaled cumulative reward per unit of principal. Never decreases.
    reward_per_unit_stored: u128,
    last_update_time: Timestamp,
    period_finish: Timestamp,
    /// Reward tokens held by the vault and not yet paid out.
    reward_balance: u128,
    /// `add_rewards` top-ups waiting to be folded into the next emission.
    queued_rewards: u128,
}

impl RewardAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total_principal(&self) -> u128 {
        self.total_principal
    }

    pub fn reward_rate(&self) -> u128 {
        self.reward_rate
    }

    pub fn reward_per_unit_stored(&self) -> u128 {
        self.reward_per_unit_stored
    }

    pub fn last_update_time(&self) -> Timestamp {
        self.last_update_time
    }

    pub fn period_finish(&self) -> Timestamp {
        self.period_finish
    }

    pub fn reward_balance(&self) -> u128 {
        self.reward_balance
    }

    pub fn queued_rewards(&self) -> u128 {
        self.queued_rewards
    }

    /// Emission stops at `period_finish`.
    pub fn last_time_applicable(&self, now: Timestamp) -> Timestamp {
        now.min(self.period_finish)
    }

    /// `reward_per_unit_stored` as it would be after settling at `now`.
    pub fn reward_per_unit(&self, now: Timestamp) -> Result<u128, VaultError> {
        let applicable = self.last_time_applicable(now);
        let elapsed = applicable
            .checked_secs_since(self.last_update_time)
            .ok_or(VaultError::ClockRegression {
                now,
                last_update: self.last_update_time,
            })?;
        if self.total_principal == 0 || elapsed == 0 {
            return Ok(self.reward_per_unit_stored);
        }
        // elapsed < 2^64, so the scaled factor stays well inside u128.
        let scaled_elapsed = elapsed as u128 * RATE_TO_PER_UNIT;
        let increment = math::mul_div(self.reward_rate, scaled_elapsed, self.total_principal)?;
        math::add(self.reward_per_unit_stored, increment)
    }

    /// Advance the global accumulator to `now`.
    pub fn settle_global(&mut self, now: Timestamp) -> Result<(), VaultError> {
        self.reward_per_unit_stored = self.reward_per_unit(now)?;
        self.last_update_time = self.last_time_applicable(now);
        Ok(())
    }

    /// Total settled reward of `depositor` against a given per-unit value.
    pub fn earned(&self, depositor: &Depositor, reward_per_unit: u128) -> Result<u128, VaultError> {
        let delta = math::sub(reward_per_unit, depositor.reward_per_unit_paid)?;
        let fresh = math::mul_div(depositor.total_principal(), delta, REWARD_PER_UNIT_PRECISION)?;
        math::add(depositor.accrued_reward, fresh)
    }

    /// What `depositor` would hold after settling at `now`, without mutating.
    pub fn projected_earned(&self, depositor: &Depositor, now: Timestamp) -> Result<u128, VaultError> {
        let reward_per_unit = self.reward_per_unit(now)?;
        self.earned(depositor, reward_per_unit)
    }

    /// Settle globally, then checkpoint `depositor`.
    pub fn settle(&mut self, depositor: &mut Depositor, now: Timestamp) -> Result<(), VaultError> {
        self.settle_global(now)?;
        depositor.accrued_reward = self.earned(depositor, self.reward_per_unit_stored)?;
        depositor.reward_per_unit_paid = self.reward_per_unit_stored;
        Ok(())
    }

    /// Begin a new emission window at `now` funded by `amount`, any
    /// undistributed remainder of the current window, and queued top-ups.
    /// The caller must have settled globally at `now` first.
    ///
    /// Returns the pool spread over the new window.
    pub fn start_epoch(
        &mut self,
        amount: u128,
        now: Timestamp,
        epoch_secs: u64,
    ) -> Result<u128, VaultError> {
        let mut pool = math::add(amount, self.queued_rewards)?;
        if let Some(remaining) = self.period_finish.checked_secs_since(now) {
            let leftover = math::mul_div(remaining as u128, self.reward_rate, REWARD_PRECISION)?;
            pool = math::add(pool, leftover)?;
        }
        let reward_rate = math::mul_div(pool, REWARD_PRECISION, epoch_secs as u128)?;
        let period_finish = now
            .checked_add_secs(epoch_secs)
            .ok_or(VaultError::ArithmeticOverflow)?;
        let reward_balance = math::add(self.reward_balance, amount)?;

        self.reward_rate = reward_rate;
        self.last_update_time = now;
        self.period_finish = period_finish;
        self.reward_balance = reward_balance;
        self.queued_rewards = 0;
        Ok(pool)
    }

    /// Credit a top-up that is claimable at once and emitted from the next
    /// window onward.
    pub fn queue_top_up(&mut self, amount: u128) -> Result<(), VaultError> {
        let reward_balance = math::add(self.reward_balance, amount)?;
        let queued = math::add(self.queued_rewards, amount)?;
        self.reward_balance = reward_balance;
        self.queued_rewards = queued;
        Ok(())
    }

    pub fn add_principal(&mut self, amount: u128) -> Result<(), VaultError> {
        self.total_principal = math::add(self.total_principal, amount)?;
        Ok(())
    }

    pub fn remove_principal(&mut self, amount: u128) -> Result<(), VaultError> {
        self.total_principal = math::sub(self.total_principal, amount)?;
        Ok(())
    }

    /// Reward leaving the pool, either paid out or compounded into principal.
    pub fn pay_out(&mut self, amount: u128) -> Result<(), VaultError> {
        self.reward_balance = math::sub(self.reward_balance, amount)?;
        Ok(())
    }
}
