//! Check-config Command Handler

use anyhow::{Context, Result};
use ignition_core::{Role, VehicleConfig};
use std::io::Write;
use std::path::Path;

/// Parse and validate the vehicle config at `path`.
pub fn handle_check_config(path: &Path, out: &mut dyn Write) -> Result<VehicleConfig> {
    let config = VehicleConfig::load(path)
        .with_context(|| format!("Config check failed for {}", path.display()))?;

    let required: Vec<String> = config.required_roles.iter().map(Role::to_string).collect();
    writeln!(
        out,
        "{}: ok (roles 0..={}, engine start requires {})",
        path.display(),
        config.max_role,
        required.join(" + ")
    )?;
    Ok(config)
}
