//! Scenario files
//!
//! A scenario deploys one vehicle and replays a list of steps against it. The
//! runner plays the hosting environment: it resolves each step's caller name
//! to an [`Identity`] and supplies the step's time.
//!
//! ```toml
//! name = "two permits start the engine"
//! deployer = "owner"
//! now = 1700000000
//!
//! [[steps]]
//! caller = "owner"
//! op = "new_authority"
//! identity = "tuv"
//! label = "TÜV"
//! role = 0
//!
//! [[steps]]
//! caller = "tuv"
//! op = "new_permit"
//! expiry = 4070908800
//! role = 0
//! expect = 0
//!
//! [[steps]]
//! caller = "owner"
//! op = "start_engine"
//! expect = false
//! ```

use anyhow::{Context, Result};
use ignition_core::{
    AuthorityIndex, ErrorKind, Identity, Permit, PermitIndex, Role, Timestamp, Vehicle,
    VehicleConfig, VehicleError,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tracing::{debug, info, warn};

/// A replayable list of operations against one vehicle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Identity that deploys the vehicle
    pub deployer: String,
    /// Initial owner; the deployer when absent
    #[serde(default)]
    pub owner: Option<String>,
    /// Environment time for steps without their own `at`
    pub now: Timestamp,
    /// Steps in execution order
    #[serde(default)]
    pub steps: Vec<Step>,
}

/// One call made by one caller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Step {
    /// Caller name or UUID
    pub caller: String,
    /// Environment time for this step
    #[serde(default)]
    pub at: Option<Timestamp>,
    /// Expected outcome, checked when present
    #[serde(default)]
    pub expect: Option<Expectation>,
    /// Operation to perform
    #[serde(flatten)]
    pub operation: Operation,
}

/// Operation surface of a vehicle
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    /// Is the caller the owner
    AmOwner,
    /// Hand ownership to another identity
    TransferOwner {
        /// Name or UUID of the new owner
        new_owner: String,
    },
    /// Delegate a role
    NewAuthority {
        /// Name or UUID of the delegate
        identity: String,
        /// Label for the entry
        #[serde(default)]
        label: String,
        /// Delegated role
        role: Role,
    },
    /// Is the caller an active authority
    AmAuthority,
    /// Look up an identity's active authority index
    GetIndexAuthority {
        /// Name or UUID to look up
        identity: String,
    },
    /// Deactivate an authority by index or by identity
    RemoveAuthority {
        /// Index, or the identity whose active index is removed
        authority: AuthorityRef,
    },
    /// Issue a permit
    NewPermit {
        /// Permit expiry
        expiry: Timestamp,
        /// Permit role
        role: Role,
    },
    /// Read a permit
    GetPermit {
        /// Ledger index
        index: PermitIndex,
    },
    /// Try to start the engine
    StartEngine,
}

impl Operation {
    /// Snake-case operation name
    pub fn name(&self) -> &'static str {
        match self {
            Operation::AmOwner => "am_owner",
            Operation::TransferOwner { .. } => "transfer_owner",
            Operation::NewAuthority { .. } => "new_authority",
            Operation::AmAuthority => "am_authority",
            Operation::GetIndexAuthority { .. } => "get_index_authority",
            Operation::RemoveAuthority { .. } => "remove_authority",
            Operation::NewPermit { .. } => "new_permit",
            Operation::GetPermit { .. } => "get_permit",
            Operation::StartEngine => "start_engine",
        }
    }
}

/// Authority addressed by index or by identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AuthorityRef {
    /// Roster index
    Index(AuthorityIndex),
    /// Name or UUID resolved through `get_index_authority`
    Identity(String),
}

/// Expected result of a step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Expectation {
    /// Boolean answer (`am_owner`, `am_authority`, `start_engine`)
    Flag(bool),
    /// Returned index (`new_authority`, `new_permit`, `get_index_authority`)
    Index(u64),
    /// Success or a specific error kind
    Status(ExpectedStatus),
}

/// Success or a specific error kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpectedStatus {
    /// Any successful result
    Ok,
    /// [`ErrorKind::Unauthorized`]
    Unauthorized,
    /// [`ErrorKind::InvalidRole`]
    InvalidRole,
    /// [`ErrorKind::InvalidExpiry`]
    InvalidExpiry,
    /// [`ErrorKind::NotFound`]
    NotFound,
}

/// What a step produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", content = "value", rename_all = "snake_case")]
pub enum StepOutcome {
    /// Mutation succeeded with nothing to return
    Done,
    /// Boolean answer
    Flag(bool),
    /// Authority index
    Authority(AuthorityIndex),
    /// Permit index
    PermitIndex(PermitIndex),
    /// Permit contents
    Permit(Permit),
    /// Operation was rejected
    Rejected(VehicleError),
}

impl StepOutcome {
    /// Whether this outcome satisfies `expectation`
    pub fn satisfies(&self, expectation: &Expectation) -> bool {
        match (expectation, self) {
            (Expectation::Flag(expected), StepOutcome::Flag(actual)) => expected == actual,
            (Expectation::Index(expected), StepOutcome::Authority(index)) => *expected == index.0,
            (Expectation::Index(expected), StepOutcome::PermitIndex(index)) => {
                *expected == index.0
            }
            (Expectation::Status(ExpectedStatus::Ok), outcome) => {
                !matches!(outcome, StepOutcome::Rejected(_))
            }
            (Expectation::Status(status), StepOutcome::Rejected(error)) => {
                let kind = match status {
                    ExpectedStatus::Ok => return false,
                    ExpectedStatus::Unauthorized => ErrorKind::Unauthorized,
                    ExpectedStatus::InvalidRole => ErrorKind::InvalidRole,
                    ExpectedStatus::InvalidExpiry => ErrorKind::InvalidExpiry,
                    ExpectedStatus::NotFound => ErrorKind::NotFound,
                };
                error.kind() == kind
            }
            _ => false,
        }
    }
}

impl fmt::Display for StepOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepOutcome::Done => write!(f, "ok"),
            StepOutcome::Flag(value) => write!(f, "{value}"),
            StepOutcome::Authority(index) => write!(f, "{index}"),
            StepOutcome::PermitIndex(index) => write!(f, "{index}"),
            StepOutcome::Permit(permit) => {
                write!(f, "{} until {}", permit.role, permit.expiry)
            }
            StepOutcome::Rejected(error) => write!(f, "rejected: {error}"),
        }
    }
}

/// Result of one replayed step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepReport {
    /// 1-based position in the scenario
    pub number: usize,
    /// Caller as written in the scenario
    pub caller: String,
    /// Operation name
    pub operation: String,
    /// Environment time supplied
    pub at: Timestamp,
    /// What happened
    pub outcome: StepOutcome,
    /// `Some(met)` when the step carried an expectation
    pub expectation_met: Option<bool>,
}

/// Result of replaying a whole scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioReport {
    /// Scenario name
    pub name: String,
    /// Per-step results
    pub steps: Vec<StepReport>,
    /// Vehicle state after the last step
    pub final_state: Vehicle,
}

impl ScenarioReport {
    /// Steps whose expectation was not met
    pub fn failed_expectations(&self) -> impl Iterator<Item = &StepReport> {
        self.steps
            .iter()
            .filter(|step| step.expectation_met == Some(false))
    }
}

impl Scenario {
    /// Parse a scenario from TOML.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        toml::from_str(source).context("Failed to parse scenario")
    }

    /// Read and parse a scenario file.
    pub fn load(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scenario {}", path.display()))?;
        Self::from_toml_str(&source)
            .with_context(|| format!("Invalid scenario {}", path.display()))
    }

    /// Deploy a vehicle with `config` and replay every step.
    ///
    /// Rejected operations are recorded as outcomes, not returned as errors;
    /// only an invalid config aborts the run.
    pub fn run(&self, config: VehicleConfig) -> Result<ScenarioReport> {
        let deployer = Identity::from(self.deployer.as_str());
        let owner = self.owner.as_deref().map(Identity::from);
        let mut vehicle = Vehicle::with_config(owner.unwrap_or(deployer), config)
            .context("Invalid vehicle config")?;

        info!(
            scenario = %self.name,
            deployer = %deployer,
            owner = %vehicle.owner(),
            steps = self.steps.len(),
            "Running scenario"
        );

        let mut reports = Vec::with_capacity(self.steps.len());
        for (position, step) in self.steps.iter().enumerate() {
            let at = step.at.unwrap_or(self.now);
            let outcome = apply(&mut vehicle, step, at);
            let expectation_met = step
                .expect
                .as_ref()
                .map(|expectation| outcome.satisfies(expectation));

            if expectation_met == Some(false) {
                warn!(
                    step = position + 1,
                    operation = step.operation.name(),
                    expected = ?step.expect,
                    outcome = %outcome,
                    "Expectation not met"
                );
            } else {
                debug!(
                    step = position + 1,
                    operation = step.operation.name(),
                    outcome = %outcome,
                    "Step applied"
                );
            }

            reports.push(StepReport {
                number: position + 1,
                caller: step.caller.clone(),
                operation: step.operation.name().to_string(),
                at,
                outcome,
                expectation_met,
            });
        }

        Ok(ScenarioReport {
            name: self.name.clone(),
            steps: reports,
            final_state: vehicle,
        })
    }
}

fn apply(vehicle: &mut Vehicle, step: &Step, at: Timestamp) -> StepOutcome {
    let caller = Identity::from(step.caller.as_str());

    let result = match &step.operation {
        Operation::AmOwner => Ok(StepOutcome::Flag(vehicle.am_owner(&caller))),
        Operation::TransferOwner { new_owner } => vehicle
            .transfer_owner(&caller, Identity::from(new_owner.as_str()))
            .map(|()| StepOutcome::Done),
        Operation::NewAuthority {
            identity,
            label,
            role,
        } => vehicle
            .new_authority(&caller, Identity::from(identity.as_str()), label.clone(), *role)
            .map(StepOutcome::Authority),
        Operation::AmAuthority => Ok(StepOutcome::Flag(vehicle.am_authority(&caller))),
        Operation::GetIndexAuthority { identity } => vehicle
            .get_index_authority(&Identity::from(identity.as_str()))
            .map(StepOutcome::Authority),
        Operation::RemoveAuthority { authority } => {
            // Owner check precedes name resolution.
            let index = vehicle
                .require_owner(&caller, "remove_authority")
                .and_then(|()| match authority {
                    AuthorityRef::Index(index) => Ok(*index),
                    AuthorityRef::Identity(name) => {
                        vehicle.get_index_authority(&Identity::from(name.as_str()))
                    }
                });
            index
                .and_then(|index| vehicle.remove_authority(&caller, index))
                .map(|()| StepOutcome::Done)
        }
        Operation::NewPermit { expiry, role } => vehicle
            .new_permit(&caller, *expiry, *role, at)
            .map(StepOutcome::PermitIndex),
        Operation::GetPermit { index } => vehicle.get_permit(*index).map(StepOutcome::Permit),
        Operation::StartEngine => vehicle.start_engine(&caller, at).map(StepOutcome::Flag),
    };

    result.unwrap_or_else(StepOutcome::Rejected)
}
