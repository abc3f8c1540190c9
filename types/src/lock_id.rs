//! Per-depositor lock identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a lock within one depositor's lock book.
///
/// Real locks are numbered from 1 upward and never reused. The value 0 is
/// reserved as the aggregate sentinel: "every active lock of this depositor".
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LockId(u64);

impl LockId {
    /// The aggregate sentinel.
    pub const ALL: Self = Self(0);

    /// The first id handed out to a depositor.
    pub const FIRST: Self = Self(1);

    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }

    /// Whether this is the aggregate sentinel rather than a real lock.
    pub fn is_aggregate(&self) -> bool {
        self.0 == 0
    }

    /// The id that follows this one, or `None` on overflow.
    pub fn checked_next(self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }
}

impl fmt::Display for LockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_aggregate() {
            write!(f, "all")
        } else {
            write!(f, "#{}", self.0)
        }
    }
}

impl From<u64> for LockId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}
