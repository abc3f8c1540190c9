//! Events emitted after each successful vault operation.

use serde::{Deserialize, Serialize};
use vault_types::{Address, LockId, Timestamp};

/// Vault-level events that observers can subscribe to via the [`EventBus`].
///
/// Emitted only after the operation's state change has been committed; a
/// failed call emits nothing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum VaultEvent {
    /// A new lock was created.
    Locked {
        depositor: Address,
        funder: Address,
        lock_id: LockId,
        amount: u128,
        unlock_time: Timestamp,
    },
    /// An existing lock was topped up and/or extended.
    LockIncreased {
        depositor: Address,
        lock_id: LockId,
        added: u128,
        unlock_time: Timestamp,
    },
    /// Principal left the vault. `lock_id` may be the aggregate sentinel.
    Unlocked {
        depositor: Address,
        lock_id: LockId,
        amount: u128,
    },
    RewardPaid {
        depositor: Address,
        lock_id: LockId,
        reward: u128,
    },
    /// Reward moved into a lock's principal.
    Compounded {
        depositor: Address,
        lock_id: LockId,
        amount: u128,
    },
    /// A new emission window started.
    RewardAdded {
        amount: u128,
        reward_rate: u128,
        period_finish: Timestamp,
    },
    RewardsToppedUp { funder: Address, amount: u128 },
    PauseChanged { paused: bool },
    RewardDistributorChanged { previous: Address, current: Address },
    OwnershipTransferred { previous: Address, current: Address },
}

/// Synchronous fan-out event bus for vault events.
///
/// Listeners run inline on the calling thread, before the operation returns.
pub struct EventBus {
    listeners: Vec<Box<dyn Fn(&VaultEvent) + Send + Sync>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, listener: Box<dyn Fn(&VaultEvent) + Send + Sync>) {
        self.listeners.push(listener);
    }

    pub fn emit(&self, event: &VaultEvent) {
        for listener in &self.listeners {
            listener(event);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    #[test]
    fn emit_calls_all_listeners() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut bus = EventBus::new();

        let c1 = Arc::clone(&counter);
        bus.subscribe(Box::new(move |_| {
            c1.fetch_add(1, Ordering::SeqCst);
        }));

        let c2 = Arc::clone(&counter);
        bus.subscribe(Box::new(move |_| {
            c2.fetch_add(10, Ordering::SeqCst);
        }));

        bus.emit(&VaultEvent::PauseChanged { paused: true });
        assert_eq!(counter.load(Ordering::SeqCst), 11);
        assert_eq!(bus.listener_count(), 2);
    }

    #[test]
    fn emit_with_no_listeners_is_noop() {
        let bus = EventBus::new();
        bus.emit(&VaultEvent::RewardsToppedUp {
            funder: Address::repeat_byte(1),
            amount: 5,
        });
    }

    #[test]
    fn events_serialize_with_variant_tag() {
        let event = VaultEvent::Compounded {
            depositor: Address::repeat_byte(2),
            lock_id: LockId::new(3),
            amount: 7,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.starts_with(r#"{"Compounded":"#));
        let back: VaultEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }
}
