//! Vehicle facts
//!
//! Audit records appended by [`Vehicle`](crate::vehicle::Vehicle) after each
//! successful state change. Rejected operations record nothing. The journal is
//! append-only and kept in the order the changes happened.

use crate::identifiers::{AuthorityIndex, Identity, PermitIndex};
use crate::role::Role;
use crate::time::Timestamp;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A state change recorded for audit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum VehicleFact {
    /// Ownership moved to a new identity
    OwnerTransferred {
        /// Previous owner
        from: Identity,
        /// New owner
        to: Identity,
    },

    /// Owner delegated a role to an identity
    AuthorityAdded {
        /// Roster index of the new entry
        index: AuthorityIndex,
        /// Delegated identity
        identity: Identity,
        /// Label given by the owner
        label: String,
        /// Delegated role
        role: Role,
    },

    /// An active entry was replaced by a newer one for the same identity
    AuthoritySuperseded {
        /// Roster index of the replaced entry
        index: AuthorityIndex,
        /// Roster index of the replacing entry
        by: AuthorityIndex,
    },

    /// Owner deactivated an authority
    AuthorityRemoved {
        /// Roster index of the deactivated entry
        index: AuthorityIndex,
    },

    /// An authority issued a permit
    PermitIssued {
        /// Ledger index of the permit
        index: PermitIndex,
        /// Identity of the issuing authority
        issuer: Identity,
        /// Permit expiry
        expiry: Timestamp,
        /// Permit role
        role: Role,
    },

    /// Owner started the engine
    EngineStarted {
        /// Time of the successful start
        at: Timestamp,
    },
}

impl fmt::Display for VehicleFact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VehicleFact::OwnerTransferred { from, to } => {
                write!(f, "owner transferred from {from} to {to}")
            }
            VehicleFact::AuthorityAdded {
                index,
                identity,
                label,
                role,
            } => write!(f, "{index} added: {identity} ({label}) as {role}"),
            VehicleFact::AuthoritySuperseded { index, by } => {
                write!(f, "{index} superseded by {by}")
            }
            VehicleFact::AuthorityRemoved { index } => write!(f, "{index} removed"),
            VehicleFact::PermitIssued {
                index,
                issuer,
                expiry,
                role,
            } => write!(f, "{index} issued by {issuer} for {role} until {expiry}"),
            VehicleFact::EngineStarted { at } => write!(f, "engine started at {at}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fact_json_is_tagged() {
        let fact = VehicleFact::AuthorityRemoved {
            index: AuthorityIndex(2),
        };
        let json = serde_json::to_value(&fact).unwrap();
        assert_eq!(json["type"], "authority_removed");
        assert_eq!(json["index"], 2);
    }

    #[test]
    fn test_fact_display() {
        let fact = VehicleFact::PermitIssued {
            index: PermitIndex(0),
            issuer: Identity::from_name("tuv"),
            expiry: Timestamp(10),
            role: Role::INSPECTION,
        };
        let text = fact.to_string();
        assert!(text.contains("permit#0"));
        assert!(text.contains("inspection(0)"));
    }
}
