//! Roles shared by authorities and permits

use serde::{Deserialize, Serialize};
use std::fmt;

/// Small integer category carried by both authorities and permits
///
/// The valid domain is `0..=max_role` from
/// [`VehicleConfig`](crate::config::VehicleConfig). Two roles are well known
/// and form the default engine-start requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(pub u8);

impl Role {
    /// Technical inspection
    pub const INSPECTION: Role = Role(0);

    /// Insurance coverage
    pub const INSURANCE: Role = Role(1);

    /// Raw value
    pub const fn value(self) -> u8 {
        self.0
    }

    /// Human-readable name for the well-known roles
    pub fn name(self) -> Option<&'static str> {
        match self {
            Role::INSPECTION => Some("inspection"),
            Role::INSURANCE => Some("insurance"),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{}({})", name, self.0),
            None => write!(f, "role({})", self.0),
        }
    }
}

impl From<u8> for Role {
    fn from(value: u8) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_display() {
        assert_eq!(Role::INSPECTION.to_string(), "inspection(0)");
        assert_eq!(Role::INSURANCE.to_string(), "insurance(1)");
        assert_eq!(Role(7).to_string(), "role(7)");
    }
}
