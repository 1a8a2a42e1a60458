//! Ignition CLI library
//!
//! Scenario replay and config checking behind the `ignition` binary. The
//! binary stands in for the hosting environment: it names callers and
//! supplies time, and the core crate makes every decision.

#![forbid(unsafe_code)]

pub mod handlers;
pub mod scenario;

pub use scenario::{Scenario, ScenarioReport, StepOutcome};
