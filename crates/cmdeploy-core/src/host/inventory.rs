//! A host described by an `inventory.yaml` document.
//!
//! `InventoryHost` keeps the document in memory and, when it was loaded from
//! a file, writes it back after every mutation. It backs the CLI and the
//! test suites.

use super::{
    AppPoolManager, ComPlusComponent, ComPlusManager, Deployment, DeploymentCatalog,
    ServiceManager, WindowsService,
};
use crate::error::{DeployError, Result};
use crate::types::{ServiceKind, StartupType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

// ---------------------------------------------------------------------------
// Inventory document
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Inventory {
    #[serde(default = "default_elevated")]
    pub elevated: bool,
    #[serde(default)]
    pub deployments: Vec<Deployment>,
    #[serde(default)]
    pub services: Vec<ServiceEntry>,
    #[serde(default)]
    pub app_pools: Vec<AppPoolEntry>,
    #[serde(default)]
    pub complus: Vec<ComPlusComponent>,
}

fn default_elevated() -> bool {
    true
}

impl Default for Inventory {
    fn default() -> Self {
        Self {
            elevated: default_elevated(),
            deployments: Vec::new(),
            services: Vec::new(),
            app_pools: Vec::new(),
            complus: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceEntry {
    pub name: String,
    pub deployment: String,
    pub kind: ServiceKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default = "default_startup")]
    pub startup_type: StartupType,
    #[serde(default)]
    pub running: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,
    /// Simulates a service whose start request is refused.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub fails_to_start: bool,
}

fn default_startup() -> StartupType {
    StartupType::Manual
}

impl ServiceEntry {
    pub fn new(name: &str, deployment: &str, kind: ServiceKind) -> Self {
        Self {
            name: name.to_string(),
            deployment: deployment.to_string(),
            kind,
            role: None,
            startup_type: default_startup(),
            running: false,
            depends_on: Vec::new(),
            fails_to_start: false,
        }
    }

    fn view(&self) -> WindowsService {
        WindowsService {
            name: self.name.clone(),
            kind: self.kind,
            role: self.role.clone(),
            startup_type: self.startup_type,
            running: self.running,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppPoolEntry {
    pub name: String,
    #[serde(default)]
    pub running: bool,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, String>,
}

impl AppPoolEntry {
    pub fn new(name: &str, running: bool) -> Self {
        Self {
            name: name.to_string(),
            running,
            properties: BTreeMap::new(),
        }
    }
}

impl Inventory {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(DeployError::NotInitialized);
        }
        let data = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&data)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(path, data.as_bytes())
    }

    fn service_mut(&mut self, name: &str) -> Result<&mut ServiceEntry> {
        self.services
            .iter_mut()
            .find(|s| s.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| DeployError::subsystem("service", name, "not installed"))
    }

    fn pool_mut(&mut self, name: &str) -> Result<&mut AppPoolEntry> {
        self.app_pools
            .iter_mut()
            .find(|p| p.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| DeployError::subsystem("application pool", name, "not found"))
    }

    fn complus_mut(&mut self, name: &str) -> Result<&mut ComPlusComponent> {
        self.complus
            .iter_mut()
            .find(|c| c.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| DeployError::subsystem("COM+ component", name, "not registered"))
    }
}

// ---------------------------------------------------------------------------
// InventoryHost
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct InventoryHost {
    path: Option<PathBuf>,
    inventory: Mutex<Inventory>,
}

impl InventoryHost {
    pub fn in_memory(inventory: Inventory) -> Self {
        Self {
            path: None,
            inventory: Mutex::new(inventory),
        }
    }

    pub fn open(path: &Path) -> Result<Self> {
        let inventory = Inventory::load(path)?;
        Ok(Self {
            path: Some(path.to_path_buf()),
            inventory: Mutex::new(inventory),
        })
    }

    /// Copy of the current document.
    pub fn snapshot(&self) -> Inventory {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, Inventory> {
        self.inventory.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Apply `f` to a draft and keep it only once it is persisted.
    fn mutate<T>(&self, f: impl FnOnce(&mut Inventory) -> Result<T>) -> Result<T> {
        let mut inventory = self.lock();
        let mut draft = inventory.clone();
        let out = f(&mut draft)?;
        if let Some(path) = &self.path {
            draft.save(path)?;
        }
        *inventory = draft;
        Ok(out)
    }
}

impl AppPoolManager for InventoryHost {
    fn start(&self, pool: &str) -> Result<()> {
        self.mutate(|inv| {
            inv.pool_mut(pool)?.running = true;
            Ok(())
        })
    }

    fn stop(&self, pool: &str) -> Result<()> {
        self.mutate(|inv| {
            inv.pool_mut(pool)?.running = false;
            Ok(())
        })
    }

    fn is_running(&self, pool: &str) -> Result<bool> {
        Ok(self.lock().pool_mut(pool)?.running)
    }

    fn property(&self, pool: &str, property: &str) -> Result<Option<String>> {
        Ok(self.lock().pool_mut(pool)?.properties.get(property).cloned())
    }

    fn set_property(&self, pool: &str, property: &str, value: Option<&str>) -> Result<()> {
        self.mutate(|inv| {
            let entry = inv.pool_mut(pool)?;
            match value {
                Some(v) => {
                    entry.properties.insert(property.to_string(), v.to_string());
                }
                None => {
                    entry.properties.remove(property);
                }
            }
            Ok(())
        })
    }
}

impl ServiceManager for InventoryHost {
    fn services(&self, deployment: &str, kind: ServiceKind) -> Result<Vec<WindowsService>> {
        Ok(self
            .lock()
            .services
            .iter()
            .filter(|s| s.kind == kind && s.deployment.eq_ignore_ascii_case(deployment))
            .map(ServiceEntry::view)
            .collect())
    }

    fn dependencies(&self, deployment: &str, kind: ServiceKind) -> Result<Vec<String>> {
        let mut deps: Vec<String> = Vec::new();
        for s in self
            .lock()
            .services
            .iter()
            .filter(|s| s.kind == kind && s.deployment.eq_ignore_ascii_case(deployment))
        {
            for d in &s.depends_on {
                if !deps.contains(d) {
                    deps.push(d.clone());
                }
            }
        }
        Ok(deps)
    }

    fn start(&self, service: &str) -> Result<()> {
        self.mutate(|inv| {
            let entry = inv.service_mut(service)?;
            if entry.fails_to_start {
                return Err(DeployError::subsystem(
                    "service",
                    service,
                    "the service did not respond to the start request",
                ));
            }
            if entry.startup_type == StartupType::Disabled {
                return Err(DeployError::subsystem(
                    "service",
                    service,
                    "cannot start a disabled service",
                ));
            }
            entry.running = true;
            Ok(())
        })
    }

    fn stop(&self, service: &str) -> Result<()> {
        self.mutate(|inv| {
            inv.service_mut(service)?.running = false;
            Ok(())
        })
    }

    fn is_running(&self, service: &str) -> Result<bool> {
        Ok(self.lock().service_mut(service)?.running)
    }

    fn startup_type(&self, service: &str) -> Result<StartupType> {
        Ok(self.lock().service_mut(service)?.startup_type)
    }

    fn set_startup_type(&self, service: &str, startup: StartupType) -> Result<()> {
        self.mutate(|inv| {
            inv.service_mut(service)?.startup_type = startup;
            Ok(())
        })
    }
}

impl ComPlusManager for InventoryHost {
    fn components(&self) -> Result<Vec<ComPlusComponent>> {
        Ok(self.lock().complus.clone())
    }

    fn enable(&self, component: &str) -> Result<()> {
        self.mutate(|inv| {
            inv.complus_mut(component)?.enabled = true;
            Ok(())
        })
    }

    fn disable(&self, component: &str) -> Result<()> {
        self.mutate(|inv| {
            inv.complus_mut(component)?.enabled = false;
            Ok(())
        })
    }
}

impl DeploymentCatalog for InventoryHost {
    fn deployments(&self) -> Result<Vec<Deployment>> {
        Ok(self.lock().deployments.clone())
    }

    fn is_elevated(&self) -> bool {
        self.lock().elevated
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DeploymentStatus;
    use tempfile::TempDir;

    fn sample() -> Inventory {
        let mut crawler = ServiceEntry::new("Trisoft InfoShare Crawler", "InfoShare", ServiceKind::Crawler);
        crawler.depends_on = vec!["Trisoft InfoShare SolrLucene".to_string()];
        Inventory {
            deployments: vec![Deployment::new("InfoShare", DeploymentStatus::Started)],
            services: vec![
                crawler,
                ServiceEntry::new("Trisoft InfoShare SolrLucene", "InfoShare", ServiceKind::SolrLucene),
            ],
            app_pools: vec![AppPoolEntry::new("TrisoftAppPoolInfoShareCM", false)],
            complus: vec![ComPlusComponent {
                name: "Trisoft-InfoShare-Author".to_string(),
                enabled: false,
            }],
            ..Inventory::default()
        }
    }

    #[test]
    fn services_filter_by_kind_and_deployment() {
        let host = InventoryHost::in_memory(sample());
        let crawlers = host.services("infoshare", ServiceKind::Crawler).unwrap();
        assert_eq!(crawlers.len(), 1);
        assert!(host.services("Other", ServiceKind::Crawler).unwrap().is_empty());
        assert_eq!(
            host.dependencies("InfoShare", ServiceKind::Crawler).unwrap(),
            vec!["Trisoft InfoShare SolrLucene".to_string()]
        );
    }

    #[test]
    fn unknown_pool_is_a_subsystem_error() {
        let host = InventoryHost::in_memory(sample());
        assert!(matches!(
            AppPoolManager::start(&host, "missing"),
            Err(DeployError::Subsystem { .. })
        ));
    }

    #[test]
    fn failing_service_refuses_to_start() {
        let mut inv = sample();
        inv.services[1].fails_to_start = true;
        let host = InventoryHost::in_memory(inv);
        assert!(ServiceManager::start(&host, "Trisoft InfoShare SolrLucene").is_err());
        assert!(!ServiceManager::is_running(&host, "Trisoft InfoShare SolrLucene").unwrap());
    }

    #[test]
    fn file_backed_host_persists_mutations() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("inventory.yaml");
        sample().save(&path).unwrap();

        let host = InventoryHost::open(&path).unwrap();
        AppPoolManager::start(&host, "TrisoftAppPoolInfoShareCM").unwrap();
        host.enable("Trisoft-InfoShare-Author").unwrap();

        let reloaded = Inventory::load(&path).unwrap();
        assert!(reloaded.app_pools[0].running);
        assert!(reloaded.complus[0].enabled);
    }

    #[test]
    fn failed_save_keeps_the_previous_document() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("inventory.yaml");
        sample().save(&path).unwrap();
        let host = InventoryHost::open(&path).unwrap();

        std::fs::remove_file(&path).unwrap();
        std::fs::create_dir(&path).unwrap();

        assert!(AppPoolManager::start(&host, "TrisoftAppPoolInfoShareCM").is_err());
        assert!(!AppPoolManager::is_running(&host, "TrisoftAppPoolInfoShareCM").unwrap());
    }

    #[test]
    fn missing_inventory_is_not_initialized() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            InventoryHost::open(&dir.path().join("nope.yaml")),
            Err(DeployError::NotInitialized)
        ));
    }
}
