use crate::host::{ServiceManager, WindowsService};
use crate::invoker::Action;
use crate::io;
use crate::types::{ServiceKind, StartupType};
use crate::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub struct StartServiceAction {
    services: Arc<dyn ServiceManager>,
    service: String,
    was_running: Option<bool>,
}

impl StartServiceAction {
    pub fn new(services: Arc<dyn ServiceManager>, service: impl Into<String>) -> Self {
        Self {
            services,
            service: service.into(),
            was_running: None,
        }
    }
}

impl Action for StartServiceAction {
    fn description(&self) -> String {
        format!("Start service {}", self.service)
    }

    fn execute(&mut self) -> Result<()> {
        self.services.start(&self.service)
    }

    fn is_restorable(&self) -> bool {
        true
    }

    fn backup(&mut self) -> Result<()> {
        self.was_running = Some(self.services.is_running(&self.service)?);
        Ok(())
    }

    fn rollback(&mut self) -> Result<()> {
        match self.was_running {
            Some(false) => self.services.stop(&self.service),
            _ => Ok(()),
        }
    }
}

pub struct StopServiceAction {
    services: Arc<dyn ServiceManager>,
    service: String,
    was_running: Option<bool>,
}

impl StopServiceAction {
    pub fn new(services: Arc<dyn ServiceManager>, service: impl Into<String>) -> Self {
        Self {
            services,
            service: service.into(),
            was_running: None,
        }
    }
}

impl Action for StopServiceAction {
    fn description(&self) -> String {
        format!("Stop service {}", self.service)
    }

    fn execute(&mut self) -> Result<()> {
        self.services.stop(&self.service)
    }

    fn is_restorable(&self) -> bool {
        true
    }

    fn backup(&mut self) -> Result<()> {
        self.was_running = Some(self.services.is_running(&self.service)?);
        Ok(())
    }

    fn rollback(&mut self) -> Result<()> {
        match self.was_running {
            Some(true) => self.services.start(&self.service),
            _ => Ok(()),
        }
    }
}

pub struct SetServiceStartupTypeAction {
    services: Arc<dyn ServiceManager>,
    service: String,
    startup: StartupType,
    previous: Option<StartupType>,
}

impl SetServiceStartupTypeAction {
    pub fn new(
        services: Arc<dyn ServiceManager>,
        service: impl Into<String>,
        startup: StartupType,
    ) -> Self {
        Self {
            services,
            service: service.into(),
            startup,
            previous: None,
        }
    }
}

impl Action for SetServiceStartupTypeAction {
    fn description(&self) -> String {
        format!(
            "Set startup type of service {} to {}",
            self.service, self.startup
        )
    }

    fn execute(&mut self) -> Result<()> {
        self.services.set_startup_type(&self.service, self.startup)
    }

    fn is_restorable(&self) -> bool {
        true
    }

    fn backup(&mut self) -> Result<()> {
        self.previous = Some(self.services.startup_type(&self.service)?);
        Ok(())
    }

    fn rollback(&mut self) -> Result<()> {
        match self.previous {
            Some(previous) => self.services.set_startup_type(&self.service, previous),
            None => Ok(()),
        }
    }
}

/// Records every service of a deployment, with its startup type and run
/// state, the first time cmdeploy changes one of them. An existing record is
/// never overwritten.
pub struct BackupServicesAction {
    services: Arc<dyn ServiceManager>,
    deployment: String,
    path: PathBuf,
    created: bool,
}

impl BackupServicesAction {
    pub fn new(
        services: Arc<dyn ServiceManager>,
        deployment: impl Into<String>,
        path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            services,
            deployment: deployment.into(),
            path: path.into(),
            created: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read a record written by this action.
    pub fn read(path: &Path) -> Result<Vec<WindowsService>> {
        let data = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&data)?)
    }
}

impl Action for BackupServicesAction {
    fn description(&self) -> String {
        format!(
            "Back up original properties of the services of deployment {} to {}",
            self.deployment,
            self.path.display()
        )
    }

    fn execute(&mut self) -> Result<()> {
        if self.path.exists() {
            return Ok(());
        }
        let mut all = Vec::new();
        for &kind in ServiceKind::all() {
            all.extend(self.services.services(&self.deployment, kind)?);
        }
        let data = serde_yaml::to_string(&all)?;
        io::atomic_write(&self.path, data.as_bytes())?;
        self.created = true;
        tracing::info!(path = %self.path.display(), services = all.len(), "recorded original service properties");
        Ok(())
    }

    fn is_restorable(&self) -> bool {
        true
    }

    fn rollback(&mut self) -> Result<()> {
        if self.created {
            io::restore_snapshot(&self.path, None)?;
            self.created = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{Inventory, InventoryHost, ServiceEntry};
    use crate::types::ServiceKind;

    const CRAWLER: &str = "Trisoft InfoShare Crawler";

    fn host(running: bool) -> Arc<InventoryHost> {
        let mut entry = ServiceEntry::new(CRAWLER, "InfoShare", ServiceKind::Crawler);
        entry.running = running;
        Arc::new(InventoryHost::in_memory(Inventory {
            services: vec![entry],
            ..Inventory::default()
        }))
    }

    #[test]
    fn service_backup_is_written_once() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("InfoShare/vanilla-services.yaml");
        let host = host(false);

        let mut first = BackupServicesAction::new(host.clone(), "InfoShare", &path);
        first.execute().unwrap();
        let recorded = BackupServicesAction::read(&path).unwrap();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].startup_type, StartupType::Manual);

        host.set_startup_type(CRAWLER, StartupType::Automatic).unwrap();
        let mut second = BackupServicesAction::new(host.clone(), "InfoShare", &path);
        second.execute().unwrap();
        second.rollback().unwrap();
        let recorded = BackupServicesAction::read(&path).unwrap();
        assert_eq!(recorded[0].startup_type, StartupType::Manual);

        first.rollback().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn startup_type_rollback_restores_previous() {
        let host = host(false);
        let mut action =
            SetServiceStartupTypeAction::new(host.clone(), CRAWLER, StartupType::Automatic);
        action.backup().unwrap();
        action.execute().unwrap();
        assert_eq!(host.startup_type(CRAWLER).unwrap(), StartupType::Automatic);
        action.rollback().unwrap();
        assert_eq!(host.startup_type(CRAWLER).unwrap(), StartupType::Manual);
    }

    #[test]
    fn stop_rollback_restarts_a_running_service() {
        let host = host(true);
        let mut action = StopServiceAction::new(host.clone(), CRAWLER);
        action.backup().unwrap();
        action.execute().unwrap();
        assert!(!ServiceManager::is_running(host.as_ref(), CRAWLER).unwrap());
        action.rollback().unwrap();
        assert!(ServiceManager::is_running(host.as_ref(), CRAWLER).unwrap());
    }

    #[test]
    fn start_rollback_leaves_an_already_running_service() {
        let host = host(true);
        let mut action = StartServiceAction::new(host.clone(), CRAWLER);
        action.backup().unwrap();
        action.execute().unwrap();
        action.rollback().unwrap();
        assert!(ServiceManager::is_running(host.as_ref(), CRAWLER).unwrap());
    }
}
