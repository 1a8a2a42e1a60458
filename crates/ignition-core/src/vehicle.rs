//! Vehicle: the per-asset authorization state machine
//!
//! A [`Vehicle`] composes the ownership registry, authority roster, and permit
//! ledger of one asset and exposes the full operation surface. Every operation
//! takes the caller identity explicitly, and time-dependent operations take
//! the environment time explicitly; the vehicle never reads a clock.
//!
//! Mutations take `&mut self`. The hosting environment serializes calls on a
//! single vehicle, so no internal locking is needed, and separate vehicles
//! share nothing.
//!
//! # Example
//!
//! ```
//! use ignition_core::{Identity, Role, Timestamp, Vehicle};
//!
//! let owner = Identity::from_name("owner");
//! let tuv = Identity::from_name("tuv");
//! let insurer = Identity::from_name("insurer");
//! let now = Timestamp::from_secs(1_700_000_000);
//! let expiry = Timestamp::from_secs(4_070_908_800);
//!
//! let mut car = Vehicle::new(owner);
//! car.new_authority(&owner, tuv, "TÜV", Role::INSPECTION)?;
//! car.new_permit(&tuv, expiry, Role::INSPECTION, now)?;
//! car.new_authority(&owner, insurer, "Versicherung", Role::INSURANCE)?;
//! car.new_permit(&insurer, expiry, Role::INSURANCE, now)?;
//!
//! assert!(car.start_engine(&owner, now)?);
//! # Ok::<(), ignition_core::VehicleError>(())
//! ```

use crate::config::VehicleConfig;
use crate::engine::{EngineAuthorization, EngineDecision, EngineState};
use crate::errors::{VehicleError, VehicleResult};
use crate::facts::VehicleFact;
use crate::identifiers::{AuthorityIndex, Identity, PermitIndex};
use crate::ledger::{Permit, PermitLedger};
use crate::ownership::OwnershipRegistry;
use crate::roster::{Authority, AuthorityRoster};
use crate::role::Role;
use crate::time::Timestamp;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Access-control state of a single vehicle
///
/// Serializable as a whole, which gives the in-memory state a snapshot form.
/// Restoring a snapshot validates the configuration and the roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "VehicleSnapshot")]
pub struct Vehicle {
    config: VehicleConfig,
    ownership: OwnershipRegistry,
    roster: AuthorityRoster,
    ledger: PermitLedger,
    engine: EngineState,
    facts: Vec<VehicleFact>,
}

impl Vehicle {
    /// Create a vehicle owned by `owner` with the default configuration.
    pub fn new(owner: Identity) -> Self {
        Self::build(owner, VehicleConfig::default())
    }

    /// Create a vehicle on behalf of `deployer`.
    ///
    /// The owner is `owner` when given and the deployer otherwise.
    pub fn deploy(deployer: Identity, owner: Option<Identity>) -> Self {
        Self::new(owner.unwrap_or(deployer))
    }

    /// Create a vehicle owned by `owner` with a validated configuration.
    pub fn with_config(owner: Identity, config: VehicleConfig) -> VehicleResult<Self> {
        config.validate()?;
        Ok(Self::build(owner, config))
    }

    fn build(owner: Identity, config: VehicleConfig) -> Self {
        debug!(
            owner = %owner,
            max_role = config.max_role,
            required_roles = ?config.required_roles,
            "Vehicle created"
        );
        Self {
            config,
            ownership: OwnershipRegistry::new(owner),
            roster: AuthorityRoster::new(),
            ledger: PermitLedger::new(),
            engine: EngineState::Off,
            facts: Vec::new(),
        }
    }

    // ------------------------------------------------------------------
    // Ownership
    // ------------------------------------------------------------------

    /// Whether `caller` is the current owner.
    pub fn am_owner(&self, caller: &Identity) -> bool {
        self.ownership.am_owner(caller)
    }

    /// Current owner
    pub fn owner(&self) -> Identity {
        self.ownership.owner()
    }

    /// Reject `caller` for `operation` unless it is the current owner.
    pub fn require_owner(&self, caller: &Identity, operation: &str) -> VehicleResult<()> {
        self.ownership
            .require_owner(caller, operation)
            .map_err(|e| rejected(operation, caller, e))
    }

    /// Transfer ownership to `new_owner`. Owner only.
    pub fn transfer_owner(
        &mut self,
        caller: &Identity,
        new_owner: Identity,
    ) -> VehicleResult<()> {
        let previous = self
            .ownership
            .transfer_owner(caller, new_owner)
            .map_err(|e| rejected("transfer_owner", caller, e))?;

        info!(from = %previous, to = %new_owner, "Ownership transferred");
        self.facts.push(VehicleFact::OwnerTransferred {
            from: previous,
            to: new_owner,
        });
        Ok(())
    }

    // ------------------------------------------------------------------
    // Authorities
    // ------------------------------------------------------------------

    /// Delegate `role` to `identity`. Owner only.
    ///
    /// If `identity` already has an active entry, that entry is deactivated
    /// and the new one takes its place.
    pub fn new_authority(
        &mut self,
        caller: &Identity,
        identity: Identity,
        label: impl Into<String>,
        role: Role,
    ) -> VehicleResult<AuthorityIndex> {
        self.ownership
            .require_owner(caller, "new_authority")
            .map_err(|e| rejected("new_authority", caller, e))?;

        if !self.config.role_in_domain(role) {
            let err = VehicleError::invalid_role(
                role,
                format!("outside the role domain 0..={}", self.config.max_role),
            );
            return Err(rejected("new_authority", caller, err));
        }

        let label = label.into();
        let enrollment = self.roster.enroll(identity, label.clone(), role);

        if let Some(previous) = enrollment.superseded {
            info!(
                identity = %identity,
                superseded = %previous,
                by = %enrollment.index,
                "Active authority superseded"
            );
            self.facts.push(VehicleFact::AuthoritySuperseded {
                index: previous,
                by: enrollment.index,
            });
        }

        info!(
            index = %enrollment.index,
            identity = %identity,
            label = %label,
            role = %role,
            "Authority added"
        );
        self.facts.push(VehicleFact::AuthorityAdded {
            index: enrollment.index,
            identity,
            label,
            role,
        });

        Ok(enrollment.index)
    }

    /// Whether `caller` holds an active authority entry.
    pub fn am_authority(&self, caller: &Identity) -> bool {
        self.roster.am_authority(caller)
    }

    /// Index of the active authority entry for `identity`.
    pub fn get_index_authority(&self, identity: &Identity) -> VehicleResult<AuthorityIndex> {
        self.roster.index_of(identity)
    }

    /// Deactivate the authority at `index`. Owner only.
    ///
    /// Permits already issued by the authority stay valid.
    pub fn remove_authority(
        &mut self,
        caller: &Identity,
        index: AuthorityIndex,
    ) -> VehicleResult<()> {
        self.ownership
            .require_owner(caller, "remove_authority")
            .map_err(|e| rejected("remove_authority", caller, e))?;

        let removed = self
            .roster
            .deactivate(index)
            .map_err(|e| rejected("remove_authority", caller, e))?;

        info!(
            index = %index,
            identity = %removed.identity,
            role = %removed.role,
            "Authority removed"
        );
        self.facts.push(VehicleFact::AuthorityRemoved { index });
        Ok(())
    }

    /// Authority entry at `index`, active or not.
    pub fn authority(&self, index: AuthorityIndex) -> VehicleResult<&Authority> {
        self.roster
            .get(index)
            .ok_or_else(|| VehicleError::not_found(format!("no authority at {index}")))
    }

    // ------------------------------------------------------------------
    // Permits
    // ------------------------------------------------------------------

    /// Issue a permit for `role` expiring at `expiry`. Active authorities only.
    ///
    /// The role must be the caller's own and `expiry` must lie strictly after
    /// `now`.
    pub fn new_permit(
        &mut self,
        caller: &Identity,
        expiry: Timestamp,
        role: Role,
        now: Timestamp,
    ) -> VehicleResult<PermitIndex> {
        let authority = self.roster.active_authority(caller).ok_or_else(|| {
            rejected(
                "new_permit",
                caller,
                VehicleError::unauthorized(
                    "new_permit",
                    *caller,
                    "caller must be an active authority",
                ),
            )
        })?;

        if authority.role != role {
            let err = VehicleError::invalid_role(
                role,
                format!("caller may only issue permits for {}", authority.role),
            );
            return Err(rejected("new_permit", caller, err));
        }

        if !expiry.is_after(now) {
            return Err(rejected(
                "new_permit",
                caller,
                VehicleError::invalid_expiry(expiry, now),
            ));
        }

        let index = self.ledger.append(Permit::new(expiry, role));

        info!(
            index = %index,
            issuer = %caller,
            role = %role,
            expiry = %expiry,
            "Permit issued"
        );
        self.facts.push(VehicleFact::PermitIssued {
            index,
            issuer: *caller,
            expiry,
            role,
        });
        Ok(index)
    }

    /// Permit at `index`. Open to anyone.
    pub fn get_permit(&self, index: PermitIndex) -> VehicleResult<Permit> {
        self.ledger.get(index)
    }

    // ------------------------------------------------------------------
    // Engine
    // ------------------------------------------------------------------

    /// Attempt to start the engine at `now`. Owner only.
    ///
    /// Returns `Ok(false)` when the owner asks but the permits do not cover
    /// every required role; only a non-owner caller is an error. The result
    /// depends only on the ledger and `now`.
    pub fn start_engine(&mut self, caller: &Identity, now: Timestamp) -> VehicleResult<bool> {
        self.ownership
            .require_owner(caller, "start_engine")
            .map_err(|e| rejected("start_engine", caller, e))?;

        let decision = self.evaluate_start(now);
        if !decision.authorized {
            debug!(
                now = %now,
                missing_roles = ?decision.missing_roles,
                "Engine start refused"
            );
            return Ok(false);
        }

        if self.engine == EngineState::Off {
            self.engine = EngineState::On;
            info!(now = %now, "Engine started");
            self.facts.push(VehicleFact::EngineStarted { at: now });
        }
        Ok(true)
    }

    /// Evaluate the engine-start rule at `now` without the owner check.
    pub fn evaluate_start(&self, now: Timestamp) -> EngineDecision {
        let decision = self.start_rule().evaluate(&self.ledger, now);
        debug!(
            now = %now,
            authorized = decision.authorized,
            permits = self.ledger.len(),
            active_authorities = self.roster.active_count(),
            "Engine start evaluated"
        );
        decision
    }

    /// Whether the engine is running
    pub fn engine_state(&self) -> EngineState {
        self.engine
    }

    fn start_rule(&self) -> EngineAuthorization {
        EngineAuthorization::new(self.config.required_roles.iter().copied())
    }

    // ------------------------------------------------------------------
    // Views
    // ------------------------------------------------------------------

    /// Configuration the vehicle was built with
    pub fn config(&self) -> &VehicleConfig {
        &self.config
    }

    /// Authority roster
    pub fn roster(&self) -> &AuthorityRoster {
        &self.roster
    }

    /// Permit ledger
    pub fn ledger(&self) -> &PermitLedger {
        &self.ledger
    }

    /// Recorded state changes, oldest first
    pub fn facts(&self) -> &[VehicleFact] {
        &self.facts
    }
}

/// Unchecked serialized form of [`Vehicle`]
#[derive(Deserialize)]
struct VehicleSnapshot {
    config: VehicleConfig,
    ownership: OwnershipRegistry,
    roster: AuthorityRoster,
    ledger: PermitLedger,
    engine: EngineState,
    facts: Vec<VehicleFact>,
}

impl TryFrom<VehicleSnapshot> for Vehicle {
    type Error = VehicleError;

    fn try_from(snapshot: VehicleSnapshot) -> VehicleResult<Self> {
        snapshot.config.validate()?;
        if let Some(identity) = snapshot.roster.duplicate_active_identity() {
            return Err(VehicleError::invalid_config(format!(
                "snapshot roster has more than one active entry for {identity}"
            )));
        }

        debug!(
            owner = %snapshot.ownership.owner(),
            authorities = snapshot.roster.len(),
            permits = snapshot.ledger.len(),
            "Vehicle restored from snapshot"
        );
        Ok(Self {
            config: snapshot.config,
            ownership: snapshot.ownership,
            roster: snapshot.roster,
            ledger: snapshot.ledger,
            engine: snapshot.engine,
            facts: snapshot.facts,
        })
    }
}

fn rejected(operation: &str, caller: &Identity, error: VehicleError) -> VehicleError {
    warn!(
        operation = operation,
        caller = %caller,
        kind = ?error.kind(),
        error = %error,
        "Operation rejected"
    );
    error
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use assert_matches::assert_matches;

    const NOW: Timestamp = Timestamp::from_secs(1_700_000_000);
    const FAR_FUTURE: Timestamp = Timestamp::from_secs(4_070_908_800);

    fn test_identity(seed: u8) -> Identity {
        Identity::new_from_entropy([seed; 32])
    }

    #[test]
    fn test_deploy_defaults_owner_to_deployer() {
        let car = Vehicle::deploy(test_identity(1), None);
        assert!(car.am_owner(&test_identity(1)));

        let car = Vehicle::deploy(test_identity(1), Some(test_identity(2)));
        assert!(car.am_owner(&test_identity(2)));
        assert!(!car.am_owner(&test_identity(1)));
    }

    #[test]
    fn test_with_config_validates() {
        let bad = VehicleConfig {
            max_role: 3,
            required_roles: vec![],
        };
        assert_matches!(
            Vehicle::with_config(test_identity(1), bad),
            Err(VehicleError::InvalidConfig { .. })
        );
    }

    #[test]
    fn test_new_authority_rejects_role_outside_domain() {
        let owner = test_identity(1);
        let config = VehicleConfig {
            max_role: 2,
            required_roles: vec![Role(0), Role(1)],
        };
        let mut car = Vehicle::with_config(owner, config).unwrap();

        let err = car
            .new_authority(&owner, test_identity(2), "Test", Role(3))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidRole);
        assert!(!car.am_authority(&test_identity(2)));
        assert!(car.facts().is_empty());
    }

    #[test]
    fn test_authority_checked_before_role() {
        let mut car = Vehicle::new(test_identity(1));
        let err = car
            .new_authority(&test_identity(2), test_identity(3), "Test", Role(200))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
    }

    #[test]
    fn test_new_permit_check_order() {
        let owner = test_identity(1);
        let tuv = test_identity(2);
        let mut car = Vehicle::new(owner);

        // Not an authority: unauthorized even with a bad role and expiry
        assert_matches!(
            car.new_permit(&tuv, NOW, Role::INSURANCE, NOW),
            Err(VehicleError::Unauthorized { .. })
        );

        car.new_authority(&owner, tuv, "TÜV", Role::INSPECTION).unwrap();

        // Wrong role beats bad expiry
        assert_matches!(
            car.new_permit(&tuv, NOW, Role::INSURANCE, NOW),
            Err(VehicleError::InvalidRole { .. })
        );
        assert_matches!(
            car.new_permit(&tuv, NOW, Role::INSPECTION, NOW),
            Err(VehicleError::InvalidExpiry { .. })
        );
        assert!(car.ledger().is_empty());
    }

    #[test]
    fn test_owner_is_not_implicitly_an_authority() {
        let owner = test_identity(1);
        let mut car = Vehicle::new(owner);
        assert_matches!(
            car.new_permit(&owner, FAR_FUTURE, Role::INSPECTION, NOW),
            Err(VehicleError::Unauthorized { .. })
        );
    }

    #[test]
    fn test_start_engine_sets_state_once() {
        let owner = test_identity(1);
        let tuv = test_identity(2);
        let insurer = test_identity(3);
        let mut car = Vehicle::new(owner);

        car.new_authority(&owner, tuv, "TÜV", Role::INSPECTION).unwrap();
        car.new_permit(&tuv, FAR_FUTURE, Role::INSPECTION, NOW).unwrap();
        assert!(!car.start_engine(&owner, NOW).unwrap());
        assert_eq!(car.engine_state(), EngineState::Off);

        car.new_authority(&owner, insurer, "Versicherung", Role::INSURANCE)
            .unwrap();
        car.new_permit(&insurer, FAR_FUTURE, Role::INSURANCE, NOW)
            .unwrap();

        assert!(car.start_engine(&owner, NOW).unwrap());
        assert!(car.start_engine(&owner, NOW).unwrap());
        assert_eq!(car.engine_state(), EngineState::On);

        let starts = car
            .facts()
            .iter()
            .filter(|fact| matches!(fact, VehicleFact::EngineStarted { .. }))
            .count();
        assert_eq!(starts, 1);
    }

    #[test]
    fn test_facts_record_successful_changes_only() {
        let owner = test_identity(1);
        let tuv = test_identity(2);
        let mut car = Vehicle::new(owner);

        let index = car.new_authority(&owner, tuv, "TÜV", Role::INSPECTION).unwrap();
        assert_matches!(
            car.remove_authority(&tuv, index),
            Err(VehicleError::Unauthorized { .. })
        );
        car.new_authority(&owner, tuv, "TÜV Süd", Role::INSPECTION)
            .unwrap();
        car.transfer_owner(&owner, tuv).unwrap();

        assert_eq!(
            car.facts(),
            &[
                VehicleFact::AuthorityAdded {
                    index: AuthorityIndex(0),
                    identity: tuv,
                    label: "TÜV".to_string(),
                    role: Role::INSPECTION,
                },
                VehicleFact::AuthoritySuperseded {
                    index: AuthorityIndex(0),
                    by: AuthorityIndex(1),
                },
                VehicleFact::AuthorityAdded {
                    index: AuthorityIndex(1),
                    identity: tuv,
                    label: "TÜV Süd".to_string(),
                    role: Role::INSPECTION,
                },
                VehicleFact::OwnerTransferred {
                    from: owner,
                    to: tuv,
                },
            ]
        );
    }

    #[test]
    fn test_authority_lookup_by_index() {
        let owner = test_identity(1);
        let mut car = Vehicle::new(owner);
        let index = car
            .new_authority(&owner, test_identity(2), "Test", Role(4))
            .unwrap();
        car.remove_authority(&owner, index).unwrap();

        let entry = car.authority(index).unwrap();
        assert_eq!(entry.role, Role(4));
        assert!(!entry.active);
        assert_matches!(
            car.authority(AuthorityIndex(9)),
            Err(VehicleError::NotFound { .. })
        );
    }

    #[test]
    fn test_snapshot_round_trip() {
        let owner = test_identity(1);
        let tuv = test_identity(2);
        let mut car = Vehicle::new(owner);
        car.new_authority(&owner, tuv, "TÜV", Role::INSPECTION).unwrap();
        car.new_permit(&tuv, FAR_FUTURE, Role::INSPECTION, NOW).unwrap();

        let json = serde_json::to_string(&car).unwrap();
        let restored: Vehicle = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, car);
        assert!(restored.am_authority(&tuv));
    }

    #[test]
    fn test_snapshot_restore_rejects_invalid_config() {
        let car = Vehicle::new(test_identity(1));
        let mut snapshot = serde_json::to_value(&car).unwrap();
        snapshot["config"]["max_role"] = serde_json::json!(0);
        snapshot["config"]["required_roles"] = serde_json::json!([]);

        assert!(serde_json::from_value::<Vehicle>(snapshot).is_err());
    }

    #[test]
    fn test_snapshot_restore_rejects_duplicate_active_authority() {
        let owner = test_identity(1);
        let tuv = test_identity(2);
        let mut car = Vehicle::new(owner);
        car.new_authority(&owner, tuv, "TÜV", Role::INSPECTION).unwrap();

        let mut snapshot = serde_json::to_value(&car).unwrap();
        let entry = snapshot["roster"]["entries"][0].clone();
        snapshot["roster"]["entries"]
            .as_array_mut()
            .unwrap()
            .push(entry);

        let err = serde_json::from_value::<Vehicle>(snapshot).unwrap_err();
        assert!(err.to_string().contains("more than one active entry"));
    }
}
