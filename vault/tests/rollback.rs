//! A failing asset transfer must leave the vault exactly as it was before
//! the call: no principal, reward or lock change, and no event.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use vault_asset::FungibleAsset;
use vault_core::{CallContext, StakingVault, VaultError};
use vault_nullables::{NullAsset, NullClock};
use vault_types::{Address, LockId, VaultParams};

const DAY: u64 = 86_400;

fn owner() -> Address {
    Address::repeat_byte(0x0a)
}

fn alice() -> Address {
    Address::repeat_byte(0xa1)
}

fn vault_address() -> Address {
    Address::repeat_byte(0xfa)
}

fn setup() -> (StakingVault<NullAsset>, NullClock, Arc<AtomicUsize>) {
    let mut asset = NullAsset::new(Address::repeat_byte(0xee));
    for who in [owner(), alice()] {
        asset.mint(&who, 100_000);
        asset.approve(&who, &vault_address(), u128::MAX).unwrap();
    }
    let params = VaultParams {
        epoch_duration_secs: 7 * DAY,
        ..VaultParams::default()
    };
    let mut vault = StakingVault::new(asset, vault_address(), owner(), params).unwrap();

    let events = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&events);
    vault.subscribe(Box::new(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    }));
    (vault, NullClock::new(1_000_000), events)
}

fn is_injected(err: &VaultError) -> bool {
    err.kind() == "AssetTransfer"
}

#[test]
fn failed_lock_leaves_no_record() {
    let (mut vault, clock, events) = setup();
    let ctx = CallContext::new(alice(), clock.now());

    vault.asset_mut().fail_transfers(1);
    let err = vault.lock(&ctx, 500, 7 * DAY).unwrap_err();
    assert!(is_injected(&err));
    assert!(vault.depositor(&alice()).is_none());
    assert_eq!(vault.total_principal(), 0);
    assert_eq!(vault.held_balance(), 0);
    assert_eq!(events.load(Ordering::SeqCst), 0);

    // The id was not consumed.
    assert_eq!(vault.lock(&ctx, 500, 7 * DAY).unwrap(), LockId::FIRST);
    assert_eq!(events.load(Ordering::SeqCst), 1);
}

#[test]
fn failed_increase_restores_previous_lock() {
    let (mut vault, clock, _) = setup();
    let ctx = CallContext::new(alice(), clock.now());
    let id = vault.lock(&ctx, 500, 7 * DAY).unwrap();
    let before = vault.depositor(&alice()).cloned();

    clock.advance_days(1);
    vault.asset_mut().fail_transfers(1);
    let ctx = CallContext::new(alice(), clock.now());
    assert!(vault.increase_lock(&ctx, 100, DAY, id).is_err());
    assert_eq!(vault.depositor(&alice()).cloned(), before);
    assert_eq!(vault.total_principal(), 500);
}

#[test]
fn failed_unlock_keeps_principal_locked() {
    let (mut vault, clock, events) = setup();
    let id = vault
        .lock(&CallContext::new(alice(), clock.now()), 500, 7 * DAY)
        .unwrap();
    clock.advance_days(8);
    let ctx = CallContext::new(alice(), clock.now());
    let fired = events.load(Ordering::SeqCst);

    vault.asset_mut().fail_transfers(1);
    assert!(vault.unlock(&ctx, 500, id, true).is_err());
    let lock = vault.lock_info(&alice(), id).unwrap();
    assert!(lock.active);
    assert_eq!(lock.amount, 500);
    assert_eq!(vault.total_principal(), 500);
    assert_eq!(vault.held_balance(), 500);
    assert_eq!(events.load(Ordering::SeqCst), fired);

    vault.unlock(&ctx, 500, id, true).unwrap();
    assert_eq!(vault.asset().balance_of(&alice()), 100_000);
}

#[test]
fn failed_claim_keeps_accrued_reward() {
    let (mut vault, clock, _) = setup();
    vault
        .lock(&CallContext::new(alice(), clock.now()), 100, 30 * DAY)
        .unwrap();
    vault
        .notify_reward_amount(&CallContext::new(owner(), clock.now()), 7_000)
        .unwrap();
    clock.advance_days(3);
    let ctx = CallContext::new(alice(), clock.now());

    let claimable = vault.earned(&alice(), clock.now()).unwrap();
    let reward_balance = vault.reward_balance();
    let stored = vault.reward_per_unit_stored();

    vault.asset_mut().fail_transfers(1);
    assert!(vault.claim_rewards(&ctx, LockId::ALL).is_err());
    assert_eq!(vault.earned(&alice(), clock.now()).unwrap(), claimable);
    assert_eq!(vault.reward_balance(), reward_balance);
    assert_eq!(vault.reward_per_unit_stored(), stored);

    assert_eq!(vault.claim_rewards(&ctx, LockId::ALL).unwrap(), claimable);
}

#[test]
fn failed_funding_leaves_emission_unchanged() {
    let (mut vault, clock, _) = setup();
    let ctx = CallContext::new(owner(), clock.now());

    vault.asset_mut().fail_transfers(2);
    assert!(vault.notify_reward_amount(&ctx, 7_000).is_err());
    assert!(vault.add_rewards(&ctx, 7_000).is_err());
    assert_eq!(vault.reward_rate(), 0);
    assert_eq!(vault.reward_balance(), 0);
    assert_eq!(vault.queued_rewards(), 0);
    assert_eq!(vault.period_finish(), vault_types::Timestamp::EPOCH);
}

#[test]
fn allowance_shortfall_is_reported_before_any_transfer() {
    let (mut vault, clock, _) = setup();
    let ctx = CallContext::new(alice(), clock.now());
    vault
        .asset_mut()
        .approve(&alice(), &vault_address(), 10)
        .unwrap();
    let calls = vault.asset().transfer_calls();

    assert_eq!(
        vault.lock(&ctx, 500, 7 * DAY),
        Err(VaultError::InsufficientAllowance {
            needed: 500,
            available: 10
        })
    );
    assert_eq!(vault.asset().transfer_calls(), calls);
}
