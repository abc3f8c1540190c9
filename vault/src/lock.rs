//! A single time-gated lock.

use serde::{Deserialize, Serialize};
use vault_types::{Address, LockId, Timestamp};

/// Principal committed by one depositor until `unlock_time`.
///
/// Once `amount` reaches zero the lock is retired (`active == false`) and
/// stays in the depositor's book as history; its id is never handed out again.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lock {
    pub id: LockId,
    pub owner: Address,
    pub amount: u128,
    pub start_time: Timestamp,
    pub unlock_time: Timestamp,
    pub active: bool,
}

impl Lock {
    /// A lock is withdrawable from its `unlock_time` onward.
    pub fn is_expired(&self, now: Timestamp) -> bool {
        self.unlock_time <= now
    }

    /// Seconds between creation and unlock.
    pub fn span_secs(&self) -> u64 {
        self.unlock_time
            .checked_secs_since(self.start_time)
            .unwrap_or(0)
    }

    /// Seconds left until unlock, zero once expired.
    pub fn remaining_secs(&self, now: Timestamp) -> u64 {
        self.unlock_time.checked_secs_since(now).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Lock {
        Lock {
            id: LockId::FIRST,
            owner: Address::repeat_byte(1),
            amount: 100,
            start_time: Timestamp::new(1_000),
            unlock_time: Timestamp::new(4_000),
            active: true,
        }
    }

    #[test]
    fn expiry_is_inclusive_of_unlock_time() {
        let lock = sample();
        assert!(!lock.is_expired(Timestamp::new(3_999)));
        assert!(lock.is_expired(Timestamp::new(4_000)));
    }

    #[test]
    fn span_and_remaining() {
        let lock = sample();
        assert_eq!(lock.span_secs(), 3_000);
        assert_eq!(lock.remaining_secs(Timestamp::new(3_500)), 500);
        assert_eq!(lock.remaining_secs(Timestamp::new(9_000)), 0);
    }
}
