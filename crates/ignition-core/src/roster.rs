//! Authority roster
//!
//! Arena of authority entries addressed by [`AuthorityIndex`]. Entries are
//! never removed or renumbered; removal clears the `active` flag so the entry
//! stays available for audit. At most one entry per identity is active.
//!
//! The roster stores entries only. Owner gating and role-domain checks happen
//! in [`Vehicle`](crate::vehicle::Vehicle) before the roster is touched.

use crate::errors::{VehicleError, VehicleResult};
use crate::identifiers::{AuthorityIndex, Identity};
use crate::role::Role;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A delegated authority
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Authority {
    /// Identity the owner delegated to
    pub identity: Identity,
    /// Free-form label, e.g. the organisation name
    pub label: String,
    /// Role this authority issues permits for
    pub role: Role,
    /// Cleared on removal or supersession
    pub active: bool,
}

/// Outcome of inserting an authority
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Enrollment {
    /// Index of the new entry
    pub index: AuthorityIndex,
    /// Previously active entry for the same identity, now deactivated
    pub superseded: Option<AuthorityIndex>,
}

/// Ordered, index-stable collection of authorities
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorityRoster {
    entries: Vec<Authority>,
}

impl AuthorityRoster {
    /// Create an empty roster.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an active entry for `identity`.
    ///
    /// An identity that already has an active entry is superseded: the old
    /// entry is deactivated and the new one becomes the identity's authority.
    pub fn enroll(
        &mut self,
        identity: Identity,
        label: impl Into<String>,
        role: Role,
    ) -> Enrollment {
        let superseded = self.active_index(&identity);
        if let Some(previous) = superseded {
            if let Some(entry) = self.entry_mut(previous) {
                entry.active = false;
            }
        }

        let index = AuthorityIndex(self.entries.len() as u64);
        self.entries.push(Authority {
            identity,
            label: label.into(),
            role,
            active: true,
        });

        Enrollment { index, superseded }
    }

    /// Deactivate the entry at `index`.
    pub fn deactivate(&mut self, index: AuthorityIndex) -> VehicleResult<&Authority> {
        let entry = self
            .entry_mut(index)
            .filter(|entry| entry.active)
            .ok_or_else(|| VehicleError::not_found(format!("no active authority at {index}")))?;
        entry.active = false;
        Ok(&*entry)
    }

    /// Whether `identity` has an active entry.
    pub fn am_authority(&self, identity: &Identity) -> bool {
        self.active_index(identity).is_some()
    }

    /// Index of the active entry for `identity`.
    pub fn index_of(&self, identity: &Identity) -> VehicleResult<AuthorityIndex> {
        self.active_index(identity)
            .ok_or_else(|| VehicleError::not_found(format!("no active authority for {identity}")))
    }

    /// Active entry for `identity`, if any.
    pub fn active_authority(&self, identity: &Identity) -> Option<&Authority> {
        self.active_index(identity).and_then(|index| self.get(index))
    }

    /// Entry at `index`, active or not.
    pub fn get(&self, index: AuthorityIndex) -> Option<&Authority> {
        usize::try_from(index.0)
            .ok()
            .and_then(|slot| self.entries.get(slot))
    }

    /// All entries in index order.
    pub fn iter(&self) -> impl Iterator<Item = (AuthorityIndex, &Authority)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(slot, entry)| (AuthorityIndex(slot as u64), entry))
    }

    /// Number of entries ever enrolled
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been enrolled
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of currently active entries
    pub fn active_count(&self) -> usize {
        self.entries.iter().filter(|entry| entry.active).count()
    }

    /// First identity holding more than one active entry, if any.
    pub fn duplicate_active_identity(&self) -> Option<Identity> {
        let mut seen = BTreeSet::new();
        self.entries
            .iter()
            .filter(|entry| entry.active)
            .find(|entry| !seen.insert(entry.identity))
            .map(|entry| entry.identity)
    }

    fn active_index(&self, identity: &Identity) -> Option<AuthorityIndex> {
        self.entries
            .iter()
            .rposition(|entry| entry.active && entry.identity == *identity)
            .map(|slot| AuthorityIndex(slot as u64))
    }

    fn entry_mut(&mut self, index: AuthorityIndex) -> Option<&mut Authority> {
        usize::try_from(index.0)
            .ok()
            .and_then(|slot| self.entries.get_mut(slot))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;

    fn test_identity(seed: u8) -> Identity {
        Identity::new_from_entropy([seed; 32])
    }

    #[test]
    fn test_enroll_assigns_sequential_indices() {
        let mut roster = AuthorityRoster::new();
        let a = roster.enroll(test_identity(1), "TÜV", Role::INSPECTION);
        let b = roster.enroll(test_identity(2), "Versicherung", Role::INSURANCE);

        assert_eq!(a.index, AuthorityIndex(0));
        assert_eq!(b.index, AuthorityIndex(1));
        assert_eq!(a.superseded, None);
        assert!(roster.am_authority(&test_identity(1)));
        assert!(roster.am_authority(&test_identity(2)));
        assert!(!roster.am_authority(&test_identity(3)));
    }

    #[test]
    fn test_deactivate_keeps_entry_for_audit() {
        let mut roster = AuthorityRoster::new();
        let enrollment = roster.enroll(test_identity(1), "Test", Role(4));

        let removed = roster.deactivate(enrollment.index).unwrap();
        assert_eq!(removed.role, Role(4));
        assert!(!roster.am_authority(&test_identity(1)));

        let entry = roster.get(enrollment.index).unwrap();
        assert_eq!(entry.identity, test_identity(1));
        assert!(!entry.active);
        assert_eq!(roster.len(), 1);
        assert_eq!(roster.active_count(), 0);
    }

    #[test]
    fn test_deactivate_twice_is_not_found() {
        let mut roster = AuthorityRoster::new();
        let enrollment = roster.enroll(test_identity(1), "Test", Role(1));
        roster.deactivate(enrollment.index).unwrap();

        let err = roster.deactivate(enrollment.index).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let err = roster.deactivate(AuthorityIndex(42)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_duplicate_active_identity() {
        let mut roster = AuthorityRoster::new();
        roster.enroll(test_identity(1), "TÜV", Role::INSPECTION);
        roster.enroll(test_identity(1), "TÜV Süd", Role::INSPECTION);
        roster.enroll(test_identity(2), "Versicherung", Role::INSURANCE);
        assert_eq!(roster.duplicate_active_identity(), None);

        let mut forged = roster.clone();
        forged.entries[0].active = true;
        assert_eq!(forged.duplicate_active_identity(), Some(test_identity(1)));
    }

    #[test]
    fn test_indices_not_reused_after_removal() {
        let mut roster = AuthorityRoster::new();
        let first = roster.enroll(test_identity(1), "A", Role(0));
        roster.deactivate(first.index).unwrap();
        let second = roster.enroll(test_identity(1), "A again", Role(0));

        assert_eq!(second.index, AuthorityIndex(1));
        assert_eq!(second.superseded, None);
        assert_eq!(roster.index_of(&test_identity(1)).unwrap(), second.index);
    }

    #[test]
    fn test_re_enroll_supersedes_active_entry() {
        let mut roster = AuthorityRoster::new();
        let first = roster.enroll(test_identity(1), "TÜV", Role::INSPECTION);
        let second = roster.enroll(test_identity(1), "TÜV Nord", Role::INSURANCE);

        assert_eq!(second.superseded, Some(first.index));
        assert!(!roster.get(first.index).unwrap().active);
        assert_eq!(roster.index_of(&test_identity(1)).unwrap(), second.index);
        assert_eq!(
            roster.active_authority(&test_identity(1)).unwrap().role,
            Role::INSURANCE
        );
        assert_eq!(roster.active_count(), 1);
    }

    #[test]
    fn test_index_of_unknown_identity() {
        let roster = AuthorityRoster::new();
        let err = roster.index_of(&test_identity(9)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
