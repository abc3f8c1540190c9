//! Per-depositor lock arenas.
//!
//! Each [`Depositor`] owns an ordered map of its locks keyed by [`LockId`],
//! plus the reward checkpoint the accumulator settles against. Ids start at
//! 1 and only grow. [`LockId::ALL`] never names a stored lock.
//!
//! Every mutating method validates fully before touching any field, so an
//! `Err` leaves the depositor exactly as it was.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use vault_types::{Address, LockId, Timestamp};

use crate::error::VaultError;
use crate::lock::Lock;
use crate::math;

/// One depositor's locks and reward checkpoint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Depositor {
    address: Address,
    locks: BTreeMap<LockId, Lock>,
    /// Sum of `amount` over active locks.
    total_principal: u128,
    /// Scaled reward-per-unit value at this depositor's last settlement.
    pub(crate) reward_per_unit_paid: u128,
    /// Settled but not yet paid reward.
    pub(crate) accrued_reward: u128,
    next_lock_id: LockId,
}

impl Depositor {
    pub fn new(address: Address) -> Self {
        Self {
            address,
            locks: BTreeMap::new(),
            total_principal: 0,
            reward_per_unit_paid: 0,
            accrued_reward: 0,
            next_lock_id: LockId::FIRST,
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn total_principal(&self) -> u128 {
        self.total_principal
    }

    pub fn accrued_reward(&self) -> u128 {
        self.accrued_reward
    }

    pub fn reward_per_unit_paid(&self) -> u128 {
        self.reward_per_unit_paid
    }

    /// Any lock ever created, including retired ones.
    pub fn lock(&self, id: LockId) -> Option<&Lock> {
        self.locks.get(&id)
    }

    /// Active locks in ascending id order.
    pub fn active_locks(&self) -> impl Iterator<Item = &Lock> {
        self.locks.values().filter(|lock| lock.active)
    }

    pub fn has_active_lock(&self) -> bool {
        self.active_locks().next().is_some()
    }

    /// Principal of active locks whose unlock time has passed.
    pub fn withdrawable(&self, now: Timestamp) -> u128 {
        self.active_locks()
            .filter(|lock| lock.is_expired(now))
            .map(|lock| lock.amount)
            .sum()
    }

    /// Never locked anything and holds no reward. Such a record carries no
    /// information and is not worth storing.
    pub fn is_pristine(&self) -> bool {
        self.locks.is_empty() && self.accrued_reward == 0
    }

    /// The active lock `id`. The aggregate sentinel, unknown ids and retired
    /// locks are all `LockNotFound`.
    pub fn active_lock(&self, id: LockId) -> Result<&Lock, VaultError> {
        self.locks
            .get(&id)
            .filter(|lock| !id.is_aggregate() && lock.active)
            .ok_or(VaultError::LockNotFound(id))
    }

    /// The part of `accrued` attributable to lock `id`:
    /// `accrued × lock.amount / total_principal`, floored.
    pub fn share_of(&self, id: LockId, accrued: u128) -> Result<u128, VaultError> {
        let lock = self.active_lock(id)?;
        if self.total_principal == 0 {
            return Ok(0);
        }
        math::mul_div(accrued, lock.amount, self.total_principal)
    }

    /// Append a new active lock starting at `now`.
    pub fn open_lock(
        &mut self,
        amount: u128,
        now: Timestamp,
        duration_secs: u64,
    ) -> Result<LockId, VaultError> {
        let id = self.next_lock_id;
        let unlock_time = now
            .checked_add_secs(duration_secs)
            .ok_or(VaultError::ArithmeticOverflow)?;
        let next = id.checked_next().ok_or(VaultError::ArithmeticOverflow)?;
        let total = math::add(self.total_principal, amount)?;

        self.locks.insert(
            id,
            Lock {
                id,
                owner: self.address,
                amount,
                start_time: now,
                unlock_time,
                active: true,
            },
        );
        self.next_lock_id = next;
        self.total_principal = total;
        Ok(id)
    }

    /// Top up and/or extend an unexpired lock. Returns the new unlock time.
    pub fn add_to_lock(
        &mut self,
        id: LockId,
        amount: u128,
        extra_secs: u64,
        now: Timestamp,
        max_span_secs: u64,
    ) -> Result<Timestamp, VaultError> {
        let lock = self.active_lock(id)?;
        if lock.is_expired(now) {
            return Err(VaultError::LockExpired(id));
        }
        let unlock_time = lock
            .unlock_time
            .checked_add_secs(extra_secs)
            .ok_or(VaultError::ArithmeticOverflow)?;
        let span_secs = unlock_time
            .checked_secs_since(lock.start_time)
            .ok_or(VaultError::ArithmeticOverflow)?;
        if span_secs > max_span_secs {
            return Err(VaultError::PeriodOverflow {
                lock_id: id,
                span_secs,
                max_secs: max_span_secs,
            });
        }
        let lock_amount = math::add(lock.amount, amount)?;
        let total = math::add(self.total_principal, amount)?;

        if let Some(lock) = self.locks.get_mut(&id) {
            lock.amount = lock_amount;
            lock.unlock_time = unlock_time;
        }
        self.total_principal = total;
        Ok(unlock_time)
    }

    /// Release `amount` from one expired lock, retiring it at zero.
    pub fn withdraw_from_lock(
        &mut self,
        id: LockId,
        amount: u128,
        now: Timestamp,
    ) -> Result<(), VaultError> {
        let lock = self.active_lock(id)?;
        if !lock.is_expired(now) {
            return Err(VaultError::LockNotYetExpired {
                lock_id: id,
                unlock_time: lock.unlock_time,
            });
        }
        if amount > lock.amount {
            return Err(VaultError::UnlockAmountExceeds {
                lock_id: id,
                requested: amount,
                locked: lock.amount,
            });
        }
        let total = math::sub(self.total_principal, amount)?;

        if let Some(lock) = self.locks.get_mut(&id) {
            lock.amount -= amount;
            if lock.amount == 0 {
                lock.active = false;
            }
        }
        self.total_principal = total;
        Ok(())
    }

    /// Release `amount` across expired locks, lowest id first. Returns how
    /// much was taken from each lock touched.
    pub fn withdraw_expired(
        &mut self,
        amount: u128,
        now: Timestamp,
    ) -> Result<Vec<(LockId, u128)>, VaultError> {
        let withdrawable = self.withdrawable(now);
        if amount > withdrawable {
            return Err(VaultError::AggregateUnlockExceeds {
                requested: amount,
                withdrawable,
            });
        }

        let mut remaining = amount;
        let mut taken = Vec::new();
        for lock in self.locks.values_mut() {
            if remaining == 0 {
                break;
            }
            if !lock.active || !lock.is_expired(now) {
                continue;
            }
            let part = remaining.min(lock.amount);
            lock.amount -= part;
            if lock.amount == 0 {
                lock.active = false;
            }
            remaining -= part;
            taken.push((lock.id, part));
        }
        self.total_principal -= amount;
        Ok(taken)
    }

    /// Deduct a paid or compounded reward from the settled balance.
    pub fn take_reward(&mut self, amount: u128) -> Result<(), VaultError> {
        self.accrued_reward = math::sub(self.accrued_reward, amount)?;
        Ok(())
    }
}

/// Every depositor the vault has seen, keyed by address.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockBook {
    depositors: HashMap<Address, Depositor>,
}

impl LockBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, address: &Address) -> Option<&Depositor> {
        self.depositors.get(address)
    }

    /// A working copy of `address`'s record, or a fresh one.
    pub fn checkout(&self, address: &Address) -> Depositor {
        self.depositors
            .get(address)
            .cloned()
            .unwrap_or_else(|| Depositor::new(*address))
    }

    /// Store a working copy, returning the record it replaced. Pristine
    /// records for unknown addresses are dropped.
    pub fn commit(&mut self, depositor: Depositor) -> Option<Depositor> {
        let address = depositor.address();
        if depositor.is_pristine() && !self.depositors.contains_key(&address) {
            return None;
        }
        self.depositors.insert(address, depositor)
    }

    /// Put back what [`LockBook::commit`] replaced.
    pub fn restore(&mut self, address: Address, previous: Option<Depositor>) {
        match previous {
            Some(depositor) => {
                self.depositors.insert(address, depositor);
            }
            None => {
                self.depositors.remove(&address);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.depositors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.depositors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Depositor> {
        self.depositors.values()
    }
}
