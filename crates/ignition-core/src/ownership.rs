//! Single-owner registry
//!
//! Holds the one identity allowed to manage authorities and start the
//! engine. There is always exactly one owner; transfer replaces it with no
//! grace period for the previous holder.

use crate::errors::{VehicleError, VehicleResult};
use crate::identifiers::Identity;
use serde::{Deserialize, Serialize};

/// Holder of the owner identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnershipRegistry {
    owner: Identity,
}

impl OwnershipRegistry {
    /// Create a registry owned by `owner`.
    pub fn new(owner: Identity) -> Self {
        Self { owner }
    }

    /// Current owner
    pub fn owner(&self) -> Identity {
        self.owner
    }

    /// Whether `caller` is the current owner.
    pub fn am_owner(&self, caller: &Identity) -> bool {
        self.owner == *caller
    }

    /// Reject `caller` unless it is the current owner.
    pub fn require_owner(&self, caller: &Identity, operation: &str) -> VehicleResult<()> {
        if self.am_owner(caller) {
            Ok(())
        } else {
            Err(VehicleError::unauthorized(
                operation,
                *caller,
                "caller must be the owner",
            ))
        }
    }

    /// Hand ownership to `new_owner`, returning the previous owner.
    pub fn transfer_owner(
        &mut self,
        caller: &Identity,
        new_owner: Identity,
    ) -> VehicleResult<Identity> {
        self.require_owner(caller, "transfer_owner")?;
        Ok(std::mem::replace(&mut self.owner, new_owner))
    }
}
