//! The staking vault: public operations over locks, rewards and custody.
//!
//! Every state-changing operation follows the same shape:
//!
//! 1. authorization and pause checks,
//! 2. staging: clone the accumulator and the one affected depositor, settle
//!    rewards on the copies, apply the mutation to the copies,
//! 3. commit the staged copies, then perform the asset transfer,
//! 4. if the transfer fails, restore the checkpoint taken at commit.
//!
//! A failed call therefore leaves no trace in vault state, and no event is
//! emitted for it.

use vault_asset::{AssetError, FungibleAsset};
use vault_types::{Address, LockForFunding, LockId, Timestamp, VaultParams};
use vault_utils::format_duration;

use crate::access::AccessControl;
use crate::accumulator::RewardAccumulator;
use crate::book::{Depositor, LockBook};
use crate::config::VaultConfig;
use crate::error::VaultError;
use crate::events::{EventBus, VaultEvent};
use crate::ledger::VaultLedger;
use crate::lock::Lock;
use crate::math;

/// Who is calling, and when. The host supplies both on every call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CallContext {
    pub caller: Address,
    pub now: Timestamp,
}

impl CallContext {
    pub fn new(caller: Address, now: Timestamp) -> Self {
        Self { caller, now }
    }
}

/// What an `unlock` sent back to the depositor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Withdrawal {
    pub principal: u128,
    pub reward: u128,
}

impl Withdrawal {
    pub fn total(&self) -> u128 {
        self.principal.saturating_add(self.reward)
    }
}

/// Working copies an operation has mutated but not yet committed.
struct Staged {
    accumulator: RewardAccumulator,
    depositor: Option<Depositor>,
}

/// What a commit replaced, kept until the asset call has succeeded.
struct Checkpoint {
    accumulator: RewardAccumulator,
    depositor: Option<(Address, Option<Depositor>)>,
}

pub struct StakingVault<A> {
    address: Address,
    params: VaultParams,
    access: AccessControl,
    accumulator: RewardAccumulator,
    book: LockBook,
    ledger: VaultLedger<A>,
    events: EventBus,
}

impl<A: FungibleAsset> StakingVault<A> {
    /// Create a vault holding `asset` under `address`. `deployer` becomes
    /// owner and reward distributor.
    pub fn new(
        asset: A,
        address: Address,
        deployer: Address,
        params: VaultParams,
    ) -> Result<Self, VaultError> {
        if asset.address().is_zero() || address.is_zero() || deployer.is_zero() {
            return Err(VaultError::ZeroAddress);
        }
        params.validate()?;

        tracing::info!(
            vault = %address,
            asset = %asset.address(),
            owner = %deployer,
            epoch = %format_duration(params.epoch_duration_secs),
            "staking vault created"
        );

        Ok(Self {
            address,
            params,
            access: AccessControl::new(deployer),
            accumulator: RewardAccumulator::new(),
            book: LockBook::new(),
            ledger: VaultLedger::new(asset, address),
            events: EventBus::new(),
        })
    }

    pub fn from_config(
        asset: A,
        address: Address,
        deployer: Address,
        config: &VaultConfig,
    ) -> Result<Self, VaultError> {
        Self::new(asset, address, deployer, config.params.clone())
    }

    pub fn subscribe(&mut self, listener: Box<dyn Fn(&VaultEvent) + Send + Sync>) {
        self.events.subscribe(listener);
    }

    // ── Locks ──────────────────────────────────────────────────────────

    /// Lock `amount` of the caller's tokens for `duration_secs`.
    pub fn lock(
        &mut self,
        ctx: &CallContext,
        amount: u128,
        duration_secs: u64,
    ) -> Result<LockId, VaultError> {
        self.open_lock(ctx, ctx.caller, ctx.caller, amount, duration_secs)
    }

    /// Lock `amount` on behalf of `beneficiary`, funded according to
    /// [`VaultParams::lock_for_funding`].
    pub fn lock_for(
        &mut self,
        ctx: &CallContext,
        beneficiary: Address,
        amount: u128,
        duration_secs: u64,
    ) -> Result<LockId, VaultError> {
        if beneficiary.is_zero() {
            return Err(VaultError::ZeroAddress);
        }
        let funder = match self.params.lock_for_funding {
            LockForFunding::Beneficiary => beneficiary,
            LockForFunding::Caller => ctx.caller,
        };
        self.open_lock(ctx, beneficiary, funder, amount, duration_secs)
    }

    fn open_lock(
        &mut self,
        ctx: &CallContext,
        beneficiary: Address,
        funder: Address,
        amount: u128,
        duration_secs: u64,
    ) -> Result<LockId, VaultError> {
        self.access.ensure_unpaused()?;
        if amount == 0 {
            return Err(VaultError::InvalidAmount);
        }
        if !self.params.is_valid_lock_duration(duration_secs) {
            return Err(VaultError::InvalidPeriod {
                duration_secs,
                min_secs: self.params.min_lock_duration_secs,
                max_secs: self.params.max_lock_duration_secs,
            });
        }
        self.ledger.ensure_allowance(&funder, amount)?;

        let mut accumulator = self.accumulator.clone();
        let mut depositor = self.book.checkout(&beneficiary);
        if self.params.single_lock_mode && depositor.has_active_lock() {
            return Err(VaultError::DuplicateLock(beneficiary));
        }
        accumulator.settle(&mut depositor, ctx.now)?;
        let lock_id = depositor.open_lock(amount, ctx.now, duration_secs)?;
        accumulator.add_principal(amount)?;
        let unlock_time = depositor
            .lock(lock_id)
            .map(|lock| lock.unlock_time)
            .unwrap_or(ctx.now);

        self.commit_then(
            Staged {
                accumulator,
                depositor: Some(depositor),
            },
            |ledger| ledger.pull(&funder, amount),
        )?;

        tracing::debug!(
            depositor = %beneficiary,
            funder = %funder,
            %lock_id,
            amount,
            duration = %format_duration(duration_secs),
            "lock created"
        );
        self.events.emit(&VaultEvent::Locked {
            depositor: beneficiary,
            funder,
            lock_id,
            amount,
            unlock_time,
        });
        Ok(lock_id)
    }

    /// Add `amount` to an unexpired lock and/or push its unlock time out by
    /// `extra_secs`.
    pub fn increase_lock(
        &mut self,
        ctx: &CallContext,
        amount: u128,
        extra_secs: u64,
        lock_id: LockId,
    ) -> Result<Timestamp, VaultError> {
        self.access.ensure_unpaused()?;
        if amount == 0 && extra_secs == 0 {
            return Err(VaultError::InvalidAmount);
        }

        let mut accumulator = self.accumulator.clone();
        let mut depositor = self.book.checkout(&ctx.caller);
        depositor.active_lock(lock_id)?;
        accumulator.settle(&mut depositor, ctx.now)?;
        let unlock_time = depositor.add_to_lock(
            lock_id,
            amount,
            extra_secs,
            ctx.now,
            self.params.max_lock_duration_secs,
        )?;
        if amount > 0 {
            self.ledger.ensure_allowance(&ctx.caller, amount)?;
            accumulator.add_principal(amount)?;
        }

        let caller = ctx.caller;
        self.commit_then(
            Staged {
                accumulator,
                depositor: Some(depositor),
            },
            |ledger| ledger.pull(&caller, amount),
        )?;

        tracing::debug!(depositor = %caller, %lock_id, amount, extra_secs, "lock increased");
        self.events.emit(&VaultEvent::LockIncreased {
            depositor: caller,
            lock_id,
            added: amount,
            unlock_time,
        });
        Ok(unlock_time)
    }

    /// Withdraw `amount` of expired principal from `lock_id`, or from every
    /// expired lock in id order when `lock_id` is [`LockId::ALL`]. With
    /// `claim`, the matching reward share goes out in the same transfer.
    pub fn unlock(
        &mut self,
        ctx: &CallContext,
        amount: u128,
        lock_id: LockId,
        claim: bool,
    ) -> Result<Withdrawal, VaultError> {
        self.access.ensure_unpaused()?;
        if amount == 0 && !claim {
            return Err(VaultError::InvalidAmount);
        }

        let mut accumulator = self.accumulator.clone();
        let mut depositor = self.book.checkout(&ctx.caller);
        accumulator.settle(&mut depositor, ctx.now)?;

        // The share is taken against the lock size before withdrawal.
        let reward = match (claim, lock_id.is_aggregate()) {
            (false, _) => 0,
            (true, true) => depositor.accrued_reward(),
            (true, false) => depositor.share_of(lock_id, depositor.accrued_reward())?,
        };

        if lock_id.is_aggregate() {
            depositor.withdraw_expired(amount, ctx.now)?;
        } else {
            depositor.withdraw_from_lock(lock_id, amount, ctx.now)?;
        }
        accumulator.remove_principal(amount)?;
        depositor.take_reward(reward)?;
        accumulator.pay_out(reward)?;
        let payout = math::add(amount, reward)?;

        let caller = ctx.caller;
        self.commit_then(
            Staged {
                accumulator,
                depositor: Some(depositor),
            },
            |ledger| ledger.push(&caller, payout),
        )?;

        tracing::debug!(depositor = %caller, %lock_id, amount, reward, "unlocked");
        if amount > 0 {
            self.events.emit(&VaultEvent::Unlocked {
                depositor: caller,
                lock_id,
                amount,
            });
        }
        if reward > 0 {
            self.events.emit(&VaultEvent::RewardPaid {
                depositor: caller,
                lock_id,
                reward,
            });
        }
        Ok(Withdrawal {
            principal: amount,
            reward,
        })
    }

    /// Move `amount` of a lock's reward share into that lock's principal.
    pub fn compound(
        &mut self,
        ctx: &CallContext,
        amount: u128,
        lock_id: LockId,
    ) -> Result<(), VaultError> {
        self.access.ensure_unpaused()?;

        let mut accumulator = self.accumulator.clone();
        let mut depositor = self.book.checkout(&ctx.caller);
        accumulator.settle(&mut depositor, ctx.now)?;

        if depositor.active_lock(lock_id)?.is_expired(ctx.now) {
            return Err(VaultError::LockExpired(lock_id));
        }
        let claimable = depositor.share_of(lock_id, depositor.accrued_reward())?;
        if amount > claimable {
            return Err(VaultError::InsufficientRewardForCompound {
                requested: amount,
                claimable,
            });
        }
        if amount == 0 {
            return Err(VaultError::InvalidAmount);
        }

        depositor.take_reward(amount)?;
        accumulator.pay_out(amount)?;
        depositor.add_to_lock(
            lock_id,
            amount,
            0,
            ctx.now,
            self.params.max_lock_duration_secs,
        )?;
        accumulator.add_principal(amount)?;

        self.commit_then(
            Staged {
                accumulator,
                depositor: Some(depositor),
            },
            |_| Ok(()),
        )?;

        tracing::debug!(depositor = %ctx.caller, %lock_id, amount, "reward compounded");
        self.events.emit(&VaultEvent::Compounded {
            depositor: ctx.caller,
            lock_id,
            amount,
        });
        Ok(())
    }

    // ── Rewards ────────────────────────────────────────────────────────

    /// Pay out the caller's full reward ([`LockId::ALL`]) or one lock's
    /// share. Returns the amount paid; zero is a successful no-op.
    pub fn claim_rewards(&mut self, ctx: &CallContext, lock_id: LockId) -> Result<u128, VaultError> {
        let mut accumulator = self.accumulator.clone();
        let mut depositor = self.book.checkout(&ctx.caller);
        accumulator.settle(&mut depositor, ctx.now)?;

        let reward = if lock_id.is_aggregate() {
            depositor.accrued_reward()
        } else {
            depositor.share_of(lock_id, depositor.accrued_reward())?
        };
        depositor.take_reward(reward)?;
        accumulator.pay_out(reward)?;

        let caller = ctx.caller;
        self.commit_then(
            Staged {
                accumulator,
                depositor: Some(depositor),
            },
            |ledger| ledger.push(&caller, reward),
        )?;

        if reward > 0 {
            tracing::debug!(depositor = %caller, %lock_id, reward, "reward paid");
            self.events.emit(&VaultEvent::RewardPaid {
                depositor: caller,
                lock_id,
                reward,
            });
        }
        Ok(reward)
    }

    /// Top up the reward pool without touching the current emission. The
    /// tokens back claims immediately and join the next window's pool.
    pub fn add_rewards(&mut self, ctx: &CallContext, amount: u128) -> Result<(), VaultError> {
        if amount == 0 {
            return Err(VaultError::InvalidAmount);
        }
        self.ledger.ensure_allowance(&ctx.caller, amount)?;

        let mut accumulator = self.accumulator.clone();
        accumulator.queue_top_up(amount)?;

        let funder = ctx.caller;
        self.commit_then(
            Staged {
                accumulator,
                depositor: None,
            },
            |ledger| ledger.pull(&funder, amount),
        )?;

        tracing::debug!(funder = %funder, amount, "rewards topped up");
        self.events
            .emit(&VaultEvent::RewardsToppedUp { funder, amount });
        Ok(())
    }

    /// Fund and start a new emission window of `epoch_duration_secs`.
    pub fn notify_reward_amount(&mut self, ctx: &CallContext, amount: u128) -> Result<(), VaultError> {
        self.access.ensure_distributor(&ctx.caller)?;
        if amount == 0 {
            return Err(VaultError::InvalidAmount);
        }
        self.ledger.ensure_allowance(&ctx.caller, amount)?;

        let mut accumulator = self.accumulator.clone();
        accumulator.settle_global(ctx.now)?;
        let pool = accumulator.start_epoch(amount, ctx.now, self.params.epoch_duration_secs)?;
        let reward_rate = accumulator.reward_rate();
        let period_finish = accumulator.period_finish();

        let distributor = ctx.caller;
        self.commit_then(
            Staged {
                accumulator,
                depositor: None,
            },
            |ledger| ledger.pull(&distributor, amount),
        )?;

        tracing::info!(
            amount,
            pool,
            reward_rate,
            %period_finish,
            "reward emission started"
        );
        self.events.emit(&VaultEvent::RewardAdded {
            amount,
            reward_rate,
            period_finish,
        });
        Ok(())
    }

    /// Projected reward of `depositor` at `now`, in full or for one lock.
    ///
    /// A `now` before the last settlement reads the settled value.
    pub fn get_claimable_rewards(
        &self,
        depositor: &Address,
        lock_id: LockId,
        now: Timestamp,
    ) -> Result<u128, VaultError> {
        let Some(record) = self.book.get(depositor) else {
            return if lock_id.is_aggregate() {
                Ok(0)
            } else {
                Err(VaultError::LockNotFound(lock_id))
            };
        };
        let now = now.max(self.accumulator.last_update_time());
        let earned = self.accumulator.projected_earned(record, now)?;
        if lock_id.is_aggregate() {
            Ok(earned)
        } else {
            record.share_of(lock_id, earned)
        }
    }

    // ── Administration ─────────────────────────────────────────────────

    pub fn set_pause(&mut self, ctx: &CallContext, paused: bool) -> Result<(), VaultError> {
        self.access.set_paused(&ctx.caller, paused)?;
        tracing::info!(paused, "pause state changed");
        self.events.emit(&VaultEvent::PauseChanged { paused });
        Ok(())
    }

    pub fn set_reward_distributor(
        &mut self,
        ctx: &CallContext,
        distributor: Address,
    ) -> Result<(), VaultError> {
        let previous = self.access.set_reward_distributor(&ctx.caller, distributor)?;
        tracing::info!(previous = %previous, current = %distributor, "reward distributor changed");
        self.events.emit(&VaultEvent::RewardDistributorChanged {
            previous,
            current: distributor,
        });
        Ok(())
    }

    pub fn transfer_ownership(&mut self, ctx: &CallContext, new_owner: Address) -> Result<(), VaultError> {
        let previous = self.access.transfer_ownership(&ctx.caller, new_owner)?;
        tracing::info!(previous = %previous, current = %new_owner, "ownership transferred");
        self.events.emit(&VaultEvent::OwnershipTransferred {
            previous,
            current: new_owner,
        });
        Ok(())
    }

    // ── Reads ──────────────────────────────────────────────────────────

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn params(&self) -> &VaultParams {
        &self.params
    }

    pub fn owner(&self) -> Address {
        self.access.owner()
    }

    pub fn reward_distributor(&self) -> Address {
        self.access.reward_distributor()
    }

    pub fn is_paused(&self) -> bool {
        self.access.is_paused()
    }

    pub fn total_principal(&self) -> u128 {
        self.accumulator.total_principal()
    }

    pub fn reward_balance(&self) -> u128 {
        self.accumulator.reward_balance()
    }

    /// Scaled by [`vault_types::REWARD_PRECISION`].
    pub fn reward_rate(&self) -> u128 {
        self.accumulator.reward_rate()
    }

    /// Scaled by [`vault_types::REWARD_PER_UNIT_PRECISION`].
    pub fn reward_per_unit_stored(&self) -> u128 {
        self.accumulator.reward_per_unit_stored()
    }

    pub fn period_finish(&self) -> Timestamp {
        self.accumulator.period_finish()
    }

    pub fn queued_rewards(&self) -> u128 {
        self.accumulator.queued_rewards()
    }

    pub fn depositor(&self, address: &Address) -> Option<&Depositor> {
        self.book.get(address)
    }

    /// Any lock ever created by `address`, retired ones included.
    pub fn lock_info(&self, address: &Address, lock_id: LockId) -> Option<&Lock> {
        self.book.get(address).and_then(|d| d.lock(lock_id))
    }

    pub fn active_locks(&self, address: &Address) -> Vec<&Lock> {
        self.book
            .get(address)
            .map(|d| d.active_locks().collect())
            .unwrap_or_default()
    }

    /// Principal `address` could unlock at `now`.
    pub fn withdrawable(&self, address: &Address, now: Timestamp) -> u128 {
        self.book
            .get(address)
            .map(|d| d.withdrawable(now))
            .unwrap_or(0)
    }

    /// Full projected reward of `address` at `now`.
    pub fn earned(&self, address: &Address, now: Timestamp) -> Result<u128, VaultError> {
        self.get_claimable_rewards(address, LockId::ALL, now)
    }

    /// Every depositor the vault has a record for.
    pub fn depositors(&self) -> impl Iterator<Item = &Depositor> {
        self.book.iter()
    }

    /// Tokens the vault holds on the asset.
    pub fn held_balance(&self) -> u128 {
        self.ledger.held()
    }

    pub fn asset(&self) -> &A {
        self.ledger.asset()
    }

    /// Direct access to the asset, for hosts that run the token alongside
    /// the vault (minting, approvals).
    pub fn asset_mut(&mut self) -> &mut A {
        self.ledger.asset_mut()
    }

    // ── Commit / rollback ──────────────────────────────────────────────

    fn commit_then<F>(&mut self, staged: Staged, interact: F) -> Result<(), VaultError>
    where
        F: FnOnce(&mut VaultLedger<A>) -> Result<(), AssetError>,
    {
        let checkpoint = self.apply(staged);
        if let Err(err) = interact(&mut self.ledger) {
            tracing::warn!(error = %err, "asset call failed, rolling back");
            self.revert(checkpoint);
            return Err(err.into());
        }
        Ok(())
    }

    fn apply(&mut self, staged: Staged) -> Checkpoint {
        let accumulator = std::mem::replace(&mut self.accumulator, staged.accumulator);
        let depositor = staged.depositor.map(|depositor| {
            let address = depositor.address();
            (address, self.book.commit(depositor))
        });
        Checkpoint {
            accumulator,
            depositor,
        }
    }

    fn revert(&mut self, checkpoint: Checkpoint) {
        self.accumulator = checkpoint.accumulator;
        if let Some((address, previous)) = checkpoint.depositor {
            self.book.restore(address, previous);
        }
    }
}
