use crate::error::{DeployError, Result};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const CMDEPLOY_DIR: &str = ".cmdeploy";
pub const DEPLOYMENTS_DIR: &str = ".cmdeploy/deployments";

pub const CONFIG_FILE: &str = ".cmdeploy/config.yaml";
pub const DEFAULT_INVENTORY_FILE: &str = "inventory.yaml";

pub const LEDGER_FILE: &str = "components.yaml";
pub const INPUT_PARAMETERS_FILE: &str = "input-parameters.yaml";
pub const SERVICE_BACKUP_FILE: &str = "vanilla-services.yaml";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn cmdeploy_dir(root: &Path) -> PathBuf {
    root.join(CMDEPLOY_DIR)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

/// Inventory files are named relative to `.cmdeploy/`.
pub fn inventory_path(root: &Path, file_name: &str) -> PathBuf {
    cmdeploy_dir(root).join(file_name)
}

pub fn deployment_dir(root: &Path, deployment: &str) -> PathBuf {
    root.join(DEPLOYMENTS_DIR).join(deployment)
}

pub fn ledger_path(root: &Path, deployment: &str) -> PathBuf {
    deployment_dir(root, deployment).join(LEDGER_FILE)
}

pub fn input_parameters_path(root: &Path, deployment: &str) -> PathBuf {
    deployment_dir(root, deployment).join(INPUT_PARAMETERS_FILE)
}

/// Startup type and run state of every service as first seen by cmdeploy.
pub fn service_backup_path(root: &Path, deployment: &str) -> PathBuf {
    deployment_dir(root, deployment).join(SERVICE_BACKUP_FILE)
}

// ---------------------------------------------------------------------------
// Deployment name validation
// ---------------------------------------------------------------------------

static NAME_RE: OnceLock<Regex> = OnceLock::new();

fn name_re() -> &'static Regex {
    NAME_RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_\-]*$").unwrap())
}

/// Deployment names end up as directory names under `.cmdeploy/deployments/`.
pub fn validate_deployment_name(name: &str) -> Result<()> {
    if name.is_empty() || name.len() > 64 || !name_re().is_match(name) {
        return Err(DeployError::InvalidDeploymentName(name.to_string()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
