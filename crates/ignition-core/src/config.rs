//! Per-vehicle configuration
//!
//! Defines the role domain and the set of roles whose permits must all be
//! present and unexpired for the engine to start. Loadable from TOML:
//!
//! ```toml
//! max_role = 15
//! required_roles = [0, 1]
//! ```

use crate::errors::{VehicleError, VehicleResult};
use crate::role::Role;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

/// Configuration for a single vehicle instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VehicleConfig {
    /// Largest valid role value; the domain is `0..=max_role`
    pub max_role: u8,
    /// Roles that must each be covered by an unexpired permit
    pub required_roles: Vec<Role>,
}

impl VehicleConfig {
    /// Default upper bound of the role domain
    pub const DEFAULT_MAX_ROLE: u8 = 15;

    /// Check internal consistency.
    pub fn validate(&self) -> VehicleResult<()> {
        if self.max_role < 1 {
            return Err(VehicleError::invalid_config(
                "role domain must contain at least two roles (max_role >= 1)",
            ));
        }

        if self.required_roles.is_empty() {
            return Err(VehicleError::invalid_config(
                "required_roles must name at least one role",
            ));
        }

        let mut seen = BTreeSet::new();
        for role in &self.required_roles {
            if !self.role_in_domain(*role) {
                return Err(VehicleError::invalid_config(format!(
                    "required role {role} is outside the domain 0..={}",
                    self.max_role
                )));
            }
            if !seen.insert(*role) {
                return Err(VehicleError::invalid_config(format!(
                    "required role {role} is listed twice"
                )));
            }
        }

        Ok(())
    }

    /// Whether `role` lies in the configured domain
    pub fn role_in_domain(&self, role: Role) -> bool {
        role.value() <= self.max_role
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(source: &str) -> VehicleResult<Self> {
        let config: VehicleConfig = toml::from_str(source)
            .map_err(|e| VehicleError::invalid_config(format!("failed to parse: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse, and validate a TOML file.
    pub fn load(path: &Path) -> VehicleResult<Self> {
        let source = std::fs::read_to_string(path).map_err(|e| {
            VehicleError::invalid_config(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&source)
    }
}

impl Default for VehicleConfig {
    fn default() -> Self {
        Self {
            max_role: Self::DEFAULT_MAX_ROLE,
            required_roles: vec![Role::INSPECTION, Role::INSURANCE],
        }
    }
}
