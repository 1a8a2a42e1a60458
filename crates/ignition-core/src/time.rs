//! Environment-supplied time
//!
//! The core never reads a clock. Every operation that depends on time takes a
//! [`Timestamp`] from the hosting environment.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Seconds since the Unix epoch
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct Timestamp(pub u64);

impl Timestamp {
    /// Create from seconds since the Unix epoch
    pub const fn from_secs(secs: u64) -> Self {
        Self(secs)
    }

    /// Seconds since the Unix epoch
    pub const fn as_secs(self) -> u64 {
        self.0
    }

    /// Whether this instant lies strictly after `other`
    pub fn is_after(self, other: Timestamp) -> bool {
        self.0 > other.0
    }

    /// Timestamp `secs` seconds later, saturating at the maximum
    pub fn saturating_add_secs(self, secs: u64) -> Self {
        Self(self.0.saturating_add(secs))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}

impl From<u64> for Timestamp {
    fn from(secs: u64) -> Self {
        Self(secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_after_is_strict() {
        let t = Timestamp::from_secs(100);
        assert!(Timestamp(101).is_after(t));
        assert!(!t.is_after(t));
        assert!(!Timestamp(99).is_after(t));
    }

    #[test]
    fn test_saturating_add() {
        assert_eq!(Timestamp(u64::MAX).saturating_add_secs(10), Timestamp(u64::MAX));
        assert_eq!(Timestamp(1).saturating_add_secs(10), Timestamp(11));
    }
}
