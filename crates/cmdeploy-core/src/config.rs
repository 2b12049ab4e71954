use crate::error::{DeployError, Result};
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// Config (top-level)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    /// Inventory document, relative to `.cmdeploy/`.
    #[serde(default = "default_inventory_file")]
    pub inventory_file: String,
    /// Refuse permission-sensitive operations when the host is not elevated.
    #[serde(default = "default_require_elevation")]
    pub require_elevation: bool,
    /// Background task roles seeded into a fresh ledger.
    #[serde(default = "default_background_task_roles")]
    pub background_task_roles: Vec<String>,
}

fn default_version() -> u32 {
    1
}

fn default_inventory_file() -> String {
    paths::DEFAULT_INVENTORY_FILE.to_string()
}

fn default_require_elevation() -> bool {
    true
}

fn default_background_task_roles() -> Vec<String> {
    vec!["Default".to_string()]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            inventory_file: default_inventory_file(),
            require_elevation: default_require_elevation(),
            background_task_roles: default_background_task_roles(),
        }
    }
}

impl Config {
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Err(DeployError::NotInitialized);
        }
        let data = std::fs::read_to_string(&path)?;
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    pub fn inventory_path(&self, root: &Path) -> PathBuf {
        paths::inventory_path(root, &self.inventory_file)
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.version != default_version() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: format!("unsupported config version {}", self.version),
            });
        }

        if self.inventory_file.trim().is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "inventory_file is empty".to_string(),
            });
        }

        if self.background_task_roles.is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "no background_task_roles: new ledgers get no background task records"
                    .to_string(),
            });
        }

        let mut seen: Vec<&str> = Vec::new();
        for role in &self.background_task_roles {
            if role.trim().is_empty() {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Error,
                    message: "background_task_roles contains an empty role".to_string(),
                });
                continue;
            }
            if seen.iter().any(|r| r.eq_ignore_ascii_case(role)) {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: format!("duplicate background task role '{role}'"),
                });
            } else {
                seen.push(role);
            }
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
