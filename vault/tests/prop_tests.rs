use proptest::prelude::*;

use vault_asset::FungibleAsset;
use vault_core::{CallContext, StakingVault};
use vault_nullables::{NullAsset, NullClock};
use vault_types::{Address, LockId, VaultParams};

const DAY: u64 = 86_400;
const START: u64 = 1_700_000_000;

fn owner() -> Address {
    Address::repeat_byte(0x0a)
}

fn user(n: u8) -> Address {
    Address::repeat_byte(0xa0 + n)
}

fn vault_address() -> Address {
    Address::repeat_byte(0xfa)
}

fn new_vault(users: u8) -> StakingVault<NullAsset> {
    let mut asset = NullAsset::new(Address::repeat_byte(0xee));
    let everyone = std::iter::once(owner()).chain((0..users).map(user));
    for who in everyone {
        asset.mint(&who, 1_000_000_000);
        asset.approve(&who, &vault_address(), u128::MAX).unwrap();
    }
    let params = VaultParams {
        min_lock_duration_secs: DAY,
        max_lock_duration_secs: 60 * DAY,
        epoch_duration_secs: 7 * DAY,
        ..VaultParams::default()
    };
    StakingVault::new(asset, vault_address(), owner(), params).unwrap()
}

#[derive(Clone, Debug)]
enum Op {
    Lock { who: u8, amount: u128, days: u64 },
    Increase { who: u8, lock: u64, amount: u128, days: u64 },
    Unlock { who: u8, lock: u64, amount: u128, claim: bool },
    Claim { who: u8, lock: u64 },
    Compound { who: u8, lock: u64, amount: u128 },
    Notify { amount: u128 },
    TopUp { who: u8, amount: u128 },
    Advance { secs: u64 },
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0u8..3, 1u128..100_000, 1u64..30).prop_map(|(who, amount, days)| Op::Lock { who, amount, days }),
        (0u8..3, 1u64..4, 0u128..10_000, 0u64..5)
            .prop_map(|(who, lock, amount, days)| Op::Increase { who, lock, amount, days }),
        (0u8..3, 0u64..4, 0u128..100_000, any::<bool>())
            .prop_map(|(who, lock, amount, claim)| Op::Unlock { who, lock, amount, claim }),
        (0u8..3, 0u64..4).prop_map(|(who, lock)| Op::Claim { who, lock }),
        (0u8..3, 1u64..4, 0u128..5_000).prop_map(|(who, lock, amount)| Op::Compound { who, lock, amount }),
        (1u128..1_000_000).prop_map(|amount| Op::Notify { amount }),
        (0u8..3, 1u128..100_000).prop_map(|(who, amount)| Op::TopUp { who, amount }),
        (1u64..5 * DAY).prop_map(|secs| Op::Advance { secs }),
    ]
}

fn apply(vault: &mut StakingVault<NullAsset>, clock: &NullClock, op: &Op) {
    let at = |who: u8| CallContext::new(user(who), clock.now());
    // Rejections are expected; only the invariants matter here.
    let _ = match *op {
        Op::Lock { who, amount, days } => vault.lock(&at(who), amount, days * DAY).map(|_| ()),
        Op::Increase { who, lock, amount, days } => vault
            .increase_lock(&at(who), amount, days * DAY, LockId::new(lock))
            .map(|_| ()),
        Op::Unlock { who, lock, amount, claim } => vault
            .unlock(&at(who), amount, LockId::new(lock), claim)
            .map(|_| ()),
        Op::Claim { who, lock } => vault.claim_rewards(&at(who), LockId::new(lock)).map(|_| ()),
        Op::Compound { who, lock, amount } => vault.compound(&at(who), amount, LockId::new(lock)),
        Op::Notify { amount } => {
            vault.notify_reward_amount(&CallContext::new(owner(), clock.now()), amount)
        }
        Op::TopUp { who, amount } => vault.add_rewards(&at(who), amount),
        Op::Advance { secs } => {
            clock.advance(secs);
            Ok(())
        }
    };
}

proptest! {
    /// The vault always holds exactly the locked principal plus the reward
    /// pool, and the pool covers every depositor's projected reward.
    #[test]
    fn custody_is_conserved(ops in prop::collection::vec(op(), 1..60)) {
        let mut vault = new_vault(3);
        let clock = NullClock::new(START);

        for op in &ops {
            apply(&mut vault, &clock, op);

            prop_assert_eq!(
                vault.held_balance(),
                vault.total_principal() + vault.reward_balance(),
                "after {:?}", op
            );
            let principal: u128 = vault.depositors().map(|d| d.total_principal()).sum();
            prop_assert_eq!(principal, vault.total_principal());

            let owed: u128 = (0..3)
                .map(|n| vault.earned(&user(n), clock.now()).unwrap())
                .sum();
            prop_assert!(
                owed <= vault.reward_balance(),
                "owed {} exceeds pool {} after {:?}", owed, vault.reward_balance(), op
            );
        }
    }

    /// reward_per_unit_stored never decreases.
    #[test]
    fn reward_per_unit_is_monotonic(ops in prop::collection::vec(op(), 1..60)) {
        let mut vault = new_vault(3);
        let clock = NullClock::new(START);
        let mut last = vault.reward_per_unit_stored();

        for op in &ops {
            apply(&mut vault, &clock, op);
            let current = vault.reward_per_unit_stored();
            prop_assert!(current >= last, "decreased after {:?}", op);
            last = current;
        }
    }

    /// An address that never locked earns nothing, however rewards flow.
    #[test]
    fn no_reward_without_principal(ops in prop::collection::vec(op(), 1..40)) {
        let mut vault = new_vault(3);
        let clock = NullClock::new(START);
        let idle = user(7);

        for op in &ops {
            apply(&mut vault, &clock, op);
        }
        prop_assert_eq!(vault.earned(&idle, clock.now()).unwrap(), 0);
        let paid = vault
            .claim_rewards(&CallContext::new(idle, clock.now()), LockId::ALL)
            .unwrap();
        prop_assert_eq!(paid, 0);
    }

    /// Settling twice at the same instant changes nothing the second time.
    #[test]
    fn settlement_is_idempotent(
        amount in 1u128..1_000_000,
        reward in 1u128..10_000_000,
        elapsed in 0u64..10 * DAY,
    ) {
        let mut vault = new_vault(1);
        let clock = NullClock::new(START);
        let ctx = CallContext::new(user(0), clock.now());
        vault.lock(&ctx, amount, 30 * DAY).unwrap();
        vault
            .notify_reward_amount(&CallContext::new(owner(), clock.now()), reward)
            .unwrap();
        clock.advance(elapsed);

        let ctx = CallContext::new(user(0), clock.now());
        let first = vault.earned(&user(0), clock.now()).unwrap();
        prop_assert_eq!(vault.earned(&user(0), clock.now()).unwrap(), first);
        prop_assert_eq!(vault.claim_rewards(&ctx, LockId::ALL).unwrap(), first);
        prop_assert_eq!(vault.claim_rewards(&ctx, LockId::ALL).unwrap(), 0);
    }

    /// Per-lock shares add up to the depositor's total, less at most one
    /// unit of rounding per extra lock.
    #[test]
    fn lock_shares_are_proportional(
        amounts in prop::collection::vec(1u128..1_000_000, 1..8),
        reward in 1_000u128..100_000_000,
        elapsed in 1u64..7 * DAY,
    ) {
        let mut vault = new_vault(1);
        let clock = NullClock::new(START);
        let ctx = CallContext::new(user(0), clock.now());
        for amount in &amounts {
            vault.lock(&ctx, *amount, 30 * DAY).unwrap();
        }
        vault
            .notify_reward_amount(&CallContext::new(owner(), clock.now()), reward)
            .unwrap();
        clock.advance(elapsed);

        let now = clock.now();
        let total = vault.earned(&user(0), now).unwrap();
        let shares: u128 = (1..=amounts.len() as u64)
            .map(|id| vault.get_claimable_rewards(&user(0), LockId::new(id), now).unwrap())
            .sum();
        let slack = amounts.len() as u128 - 1;
        prop_assert!(shares <= total);
        prop_assert!(shares + slack >= total, "shares {} total {}", shares, total);
    }
}

#[test]
fn asset_supply_is_untouched_by_vault_activity() {
    let mut vault = new_vault(2);
    let clock = NullClock::new(START);
    let supply = vault.asset().total_supply();
    let ops = [
        Op::Lock { who: 0, amount: 5_000, days: 3 },
        Op::Notify { amount: 70_000 },
        Op::Advance { secs: 4 * DAY },
        Op::Compound { who: 0, lock: 1, amount: 1 },
        Op::Unlock { who: 0, lock: 0, amount: 5_000, claim: true },
        Op::TopUp { who: 1, amount: 10 },
    ];
    for op in &ops {
        apply(&mut vault, &clock, op);
    }
    assert_eq!(vault.asset().total_supply(), supply);
    let held: u128 = std::iter::once(owner())
        .chain((0..2).map(user))
        .chain(std::iter::once(vault_address()))
        .map(|who| vault.asset().balance_of(&who))
        .sum();
    assert_eq!(held, supply);
}
