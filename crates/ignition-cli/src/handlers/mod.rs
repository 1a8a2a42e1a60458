//! Command handlers for the `ignition` binary

pub mod check_config;
pub mod run;

pub use check_config::handle_check_config;
pub use run::handle_run;

use anyhow::Result;
use ignition_core::VehicleConfig;
use std::path::Path;

/// Load `path` when given, otherwise use the default configuration.
pub fn load_config(path: Option<&Path>) -> Result<VehicleConfig> {
    match path {
        Some(path) => Ok(VehicleConfig::load(path)?),
        None => Ok(VehicleConfig::default()),
    }
}
