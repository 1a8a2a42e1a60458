//! Engine-start authorization
//!
//! The decision is a pure function of the permit ledger and the supplied
//! time: the engine may start when every required role is covered by at least
//! one permit with `expiry > now`. Permits are judged on their own fields and
//! are not re-checked against the current roster, so removing an authority
//! does not revoke permits it already issued.

use crate::ledger::PermitLedger;
use crate::role::Role;
use crate::time::Timestamp;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Whether the engine is running
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EngineState {
    /// Not started
    #[default]
    Off,
    /// Started by a successful engine-start request
    On,
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineState::Off => write!(f, "off"),
            EngineState::On => write!(f, "on"),
        }
    }
}

/// Outcome of evaluating the permit ledger at one instant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineDecision {
    /// Time the decision was evaluated at
    pub evaluated_at: Timestamp,
    /// True when every required role is covered
    pub authorized: bool,
    /// Required roles lacking an unexpired permit, in ascending order
    pub missing_roles: Vec<Role>,
}

impl EngineDecision {
    /// Human-readable reason for a negative decision
    pub fn denial_reason(&self) -> Option<String> {
        if self.authorized {
            return None;
        }
        let missing: Vec<String> = self.missing_roles.iter().map(Role::to_string).collect();
        Some(format!(
            "no unexpired permit at {} for {}",
            self.evaluated_at,
            missing.join(", ")
        ))
    }
}

/// Role-coverage rule for starting the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineAuthorization {
    required_roles: BTreeSet<Role>,
}

impl EngineAuthorization {
    /// Require a live permit for each of `required_roles`.
    pub fn new(required_roles: impl IntoIterator<Item = Role>) -> Self {
        Self {
            required_roles: required_roles.into_iter().collect(),
        }
    }

    /// Roles that must be covered
    pub fn required_roles(&self) -> impl Iterator<Item = Role> + '_ {
        self.required_roles.iter().copied()
    }

    /// Evaluate `ledger` at `now`.
    ///
    /// An empty requirement set never authorizes; configuration validation
    /// rejects it before a vehicle is built.
    pub fn evaluate(&self, ledger: &PermitLedger, now: Timestamp) -> EngineDecision {
        let covered: BTreeSet<Role> = ledger
            .unexpired(now)
            .map(|permit| permit.role)
            .filter(|role| self.required_roles.contains(role))
            .collect();

        let missing_roles: Vec<Role> = self
            .required_roles
            .difference(&covered)
            .copied()
            .collect();

        EngineDecision {
            evaluated_at: now,
            authorized: !self.required_roles.is_empty() && missing_roles.is_empty(),
            missing_roles,
        }
    }
}

impl Default for EngineAuthorization {
    fn default() -> Self {
        Self::new([Role::INSPECTION, Role::INSURANCE])
    }
}
