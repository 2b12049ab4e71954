//! Seams to the subsystems a deployment is made of.
//!
//! Operations and concrete actions only talk to the host through these
//! traits. [`Host`] bundles one implementation of each and is handed to
//! operations explicitly.

pub mod inventory;

use crate::error::{DeployError, Result};
use crate::types::{ComponentName, DeploymentStatus, ServiceKind, StartupType};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub use inventory::{AppPoolEntry, Inventory, InventoryHost, ServiceEntry};

// ---------------------------------------------------------------------------
// Models
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deployment {
    pub name: String,
    pub status: DeploymentStatus,
    #[serde(default)]
    pub app_pools: AppPoolNames,
}

impl Deployment {
    pub fn new(name: impl Into<String>, status: DeploymentStatus) -> Self {
        Self {
            name: name.into(),
            status,
            app_pools: AppPoolNames::default(),
        }
    }

    /// Application pool backing a web tier component.
    pub fn app_pool(&self, component: ComponentName) -> Option<String> {
        let (explicit, tier) = match component {
            ComponentName::Cm => (&self.app_pools.cm, "CM"),
            ComponentName::Ws => (&self.app_pools.ws, "WS"),
            ComponentName::Sts => (&self.app_pools.sts, "STS"),
            _ => return None,
        };
        Some(
            explicit
                .clone()
                .unwrap_or_else(|| format!("TrisoftAppPool{}{tier}", self.name)),
        )
    }
}

/// Application pool names; unset tiers fall back to `TrisoftAppPool<deployment><TIER>`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppPoolNames {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cm: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ws: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sts: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowsService {
    pub name: String,
    pub kind: ServiceKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub startup_type: StartupType,
    pub running: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComPlusComponent {
    pub name: String,
    pub enabled: bool,
}

// ---------------------------------------------------------------------------
// Manager traits
// ---------------------------------------------------------------------------

pub trait AppPoolManager: Send + Sync {
    fn start(&self, pool: &str) -> Result<()>;
    fn stop(&self, pool: &str) -> Result<()>;
    fn is_running(&self, pool: &str) -> Result<bool>;
    fn property(&self, pool: &str, property: &str) -> Result<Option<String>>;
    /// `None` removes the property.
    fn set_property(&self, pool: &str, property: &str, value: Option<&str>) -> Result<()>;
}

pub trait ServiceManager: Send + Sync {
    /// Services of one kind installed for `deployment`.
    fn services(&self, deployment: &str, kind: ServiceKind) -> Result<Vec<WindowsService>>;
    /// Names of the services the `kind` services depend on.
    fn dependencies(&self, deployment: &str, kind: ServiceKind) -> Result<Vec<String>>;
    fn start(&self, service: &str) -> Result<()>;
    fn stop(&self, service: &str) -> Result<()>;
    fn is_running(&self, service: &str) -> Result<bool>;
    fn startup_type(&self, service: &str) -> Result<StartupType>;
    fn set_startup_type(&self, service: &str, startup: StartupType) -> Result<()>;
}

pub trait ComPlusManager: Send + Sync {
    fn components(&self) -> Result<Vec<ComPlusComponent>>;
    fn enable(&self, component: &str) -> Result<()>;
    fn disable(&self, component: &str) -> Result<()>;
}

pub trait DeploymentCatalog: Send + Sync {
    fn deployments(&self) -> Result<Vec<Deployment>>;

    fn deployment(&self, name: &str) -> Result<Deployment> {
        self.deployments()?
            .into_iter()
            .find(|d| d.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| DeployError::DeploymentNotFound(name.to_string()))
    }

    /// Whether the current process holds administrative rights.
    fn is_elevated(&self) -> bool;
}

// ---------------------------------------------------------------------------
// Host
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct Host {
    pub app_pools: Arc<dyn AppPoolManager>,
    pub services: Arc<dyn ServiceManager>,
    pub complus: Arc<dyn ComPlusManager>,
    pub catalog: Arc<dyn DeploymentCatalog>,
}

impl Host {
    /// Serve every seam from one inventory.
    pub fn from_inventory(inventory: Arc<InventoryHost>) -> Self {
        Self {
            app_pools: inventory.clone(),
            services: inventory.clone(),
            complus: inventory.clone(),
            catalog: inventory,
        }
    }
}

impl std::fmt::Debug for Host {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Host").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_pool_defaults_to_product_naming() {
        let d = Deployment::new("InfoShare", DeploymentStatus::Started);
        assert_eq!(
            d.app_pool(ComponentName::Cm).as_deref(),
            Some("TrisoftAppPoolInfoShareCM")
        );
        assert_eq!(d.app_pool(ComponentName::Crawler), None);
    }

    #[test]
    fn explicit_app_pool_wins() {
        let mut d = Deployment::new("InfoShare", DeploymentStatus::Started);
        d.app_pools.sts = Some("CustomSTS".to_string());
        assert_eq!(d.app_pool(ComponentName::Sts).as_deref(), Some("CustomSTS"));
    }
}
