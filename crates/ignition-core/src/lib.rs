//! Ignition Core - Vehicle Access Control
//!
//! This crate models who may start a single vehicle. One owner manages a
//! roster of delegated authorities; each authority issues time-bounded
//! permits for its role; the owner may start the engine once every required
//! role is covered by an unexpired permit.
//!
//! # Architecture
//!
//! - `ownership` - `OwnershipRegistry`, the single owner identity
//! - `roster` - `AuthorityRoster`, index-stable arena of delegated authorities
//! - `ledger` - `PermitLedger`, append-only permits
//! - `engine` - `EngineAuthorization`, the role-coverage rule
//! - `vehicle` - `Vehicle`, the per-asset composition and operation surface
//! - `facts` - `VehicleFact`, audit journal of successful state changes
//!
//! # Design Principles
//!
//! - The caller identity is an explicit argument of every operation; identity
//!   verification belongs to the hosting environment
//! - Time is supplied per call; the core keeps no clock and no timers
//! - Indices are never reused, and removal deactivates instead of deleting
//! - Permits count on their own `{expiry, role}`, independent of the roster

#![forbid(unsafe_code)]

pub mod config;
pub mod engine;
pub mod errors;
pub mod facts;
pub mod identifiers;
pub mod ledger;
pub mod ownership;
pub mod role;
pub mod roster;
pub mod time;
pub mod vehicle;

pub use config::VehicleConfig;
pub use engine::{EngineAuthorization, EngineDecision, EngineState};
pub use errors::{ErrorKind, VehicleError, VehicleResult};
pub use facts::VehicleFact;
pub use identifiers::{AuthorityIndex, Identity, PermitIndex};
pub use ledger::{Permit, PermitLedger};
pub use ownership::OwnershipRegistry;
pub use role::Role;
pub use roster::{Authority, AuthorityRoster, Enrollment};
pub use time::Timestamp;
pub use vehicle::Vehicle;
