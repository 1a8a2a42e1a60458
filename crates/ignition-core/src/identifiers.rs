//! Identifier types for callers and arena slots
//!
//! Callers are opaque identities resolved by the hosting environment. Roster
//! and ledger entries are addressed by stable indices that are handed out in
//! insertion order and never reassigned.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Opaque identity of a caller (owner, authority, or anyone else)
///
/// The core never authenticates an identity; it only compares it against the
/// owner and the authority roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Identity(pub Uuid);

impl Identity {
    /// Create an identity from 32 bytes of caller-provided entropy.
    pub fn new_from_entropy(entropy: [u8; 32]) -> Self {
        let mut uuid_bytes = [0u8; 16];
        uuid_bytes.copy_from_slice(&entropy[..16]);
        Self(Uuid::from_bytes(uuid_bytes))
    }

    /// Create from a UUID
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Derive a stable identity from a human-readable name.
    ///
    /// The same name always maps to the same identity, which lets scenario
    /// files refer to callers as `"owner"` or `"insurer"`.
    pub fn from_name(name: &str) -> Self {
        Self(Uuid::new_v5(&Uuid::NAMESPACE_OID, name.as_bytes()))
    }

    /// Get the inner UUID
    pub fn uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Identity {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Identity(Uuid::parse_str(s)?))
    }
}

impl From<Uuid> for Identity {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<Identity> for Uuid {
    fn from(identity: Identity) -> Self {
        identity.0
    }
}

impl From<&str> for Identity {
    fn from(s: &str) -> Self {
        Identity::from_str(s).unwrap_or_else(|_| Identity::from_name(s))
    }
}

/// Position of an entry in the authority roster
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct AuthorityIndex(pub u64);

impl AuthorityIndex {
    /// Raw value
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for AuthorityIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "authority#{}", self.0)
    }
}

impl From<u64> for AuthorityIndex {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// Position of a permit in the permit ledger
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct PermitIndex(pub u64);

impl PermitIndex {
    /// Raw value
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for PermitIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "permit#{}", self.0)
    }
}

impl From<u64> for PermitIndex {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_from_name_is_deterministic() {
        assert_eq!(Identity::from_name("owner"), Identity::from_name("owner"));
        assert_ne!(Identity::from_name("owner"), Identity::from_name("insurer"));
    }

    #[test]
    fn test_identity_from_str_prefers_uuid() {
        let uuid = Uuid::from_bytes([7u8; 16]);
        let parsed = Identity::from(uuid.to_string().as_str());
        assert_eq!(parsed, Identity::from_uuid(uuid));

        let named = Identity::from("not-a-uuid");
        assert_eq!(named, Identity::from_name("not-a-uuid"));
    }

    #[test]
    fn test_identity_from_entropy() {
        let a = Identity::new_from_entropy([1u8; 32]);
        let b = Identity::new_from_entropy([2u8; 32]);
        assert_ne!(a, b);
        assert_eq!(a.uuid().as_bytes(), &[1u8; 16]);
    }

    #[test]
    fn test_index_display() {
        assert_eq!(AuthorityIndex(3).to_string(), "authority#3");
        assert_eq!(PermitIndex(0).to_string(), "permit#0");
    }
}
