//! Permit ledger
//!
//! Append-only list of permits addressed by [`PermitIndex`]. A permit records
//! only its expiry and role; it is not tied to the authority that issued it.

use crate::errors::{VehicleError, VehicleResult};
use crate::identifiers::PermitIndex;
use crate::role::Role;
use crate::time::Timestamp;
use serde::{Deserialize, Serialize};

/// Time-bounded authorization for one role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Permit {
    /// Instant after which the permit no longer counts
    pub expiry: Timestamp,
    /// Role the permit covers
    pub role: Role,
}

impl Permit {
    /// Create a permit.
    pub fn new(expiry: Timestamp, role: Role) -> Self {
        Self { expiry, role }
    }

    /// A permit is live while `expiry > now`.
    pub fn is_unexpired(&self, now: Timestamp) -> bool {
        self.expiry.is_after(now)
    }
}

/// Ordered, append-only collection of permits
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermitLedger {
    permits: Vec<Permit>,
}

impl PermitLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `permit` and return its index.
    pub fn append(&mut self, permit: Permit) -> PermitIndex {
        let index = PermitIndex(self.permits.len() as u64);
        self.permits.push(permit);
        index
    }

    /// Permit at `index`.
    pub fn get(&self, index: PermitIndex) -> VehicleResult<Permit> {
        usize::try_from(index.0)
            .ok()
            .and_then(|slot| self.permits.get(slot))
            .copied()
            .ok_or_else(|| {
                VehicleError::not_found(format!(
                    "{index} is out of range ({} permits issued)",
                    self.permits.len()
                ))
            })
    }

    /// Permits still live at `now`.
    pub fn unexpired(&self, now: Timestamp) -> impl Iterator<Item = &Permit> {
        self.permits
            .iter()
            .filter(move |permit| permit.is_unexpired(now))
    }

    /// All permits in index order.
    pub fn iter(&self) -> impl Iterator<Item = (PermitIndex, &Permit)> {
        self.permits
            .iter()
            .enumerate()
            .map(|(slot, permit)| (PermitIndex(slot as u64), permit))
    }

    /// Number of permits ever issued
    pub fn len(&self) -> usize {
        self.permits.len()
    }

    /// Whether no permit has been issued
    pub fn is_empty(&self) -> bool {
        self.permits.is_empty()
    }
}
