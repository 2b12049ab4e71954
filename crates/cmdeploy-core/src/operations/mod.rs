//! User-level intents turned into ordered action batches.
//!
//! An operation is built eagerly: every usage check and ledger lookup happens
//! in its constructor, before anything runs. The built batch can then be
//! inspected ([`Operation::descriptions`]), folded into a larger batch
//! ([`Operation::into_actions`]) or run ([`Operation::run`]).

mod kind;

pub mod disable;
pub mod enable;
pub mod lifecycle;
pub mod sts;

pub use disable::DisableComponentsOperation;
pub use enable::EnableComponentsOperation;
pub use lifecycle::{StartComponentsOperation, StopComponentsOperation};
pub use sts::SetStsAuthenticationOperation;

use crate::actions::BackupServicesAction;
use crate::component::ComponentsCollection;
use crate::config::Config;
use crate::error::{DeployError, Result};
use crate::host::{Deployment, Host};
use crate::invoker::{ActionInvoker, BoxedAction, InvokeReport, Unwind};
use crate::ledger::{ComponentStore, SaveComponentAction};
use crate::types::ComponentName;
use crate::notify::Notifier;
use crate::paths;
use std::path::{Path, PathBuf};
use std::sync::Arc;

// ---------------------------------------------------------------------------
// OperationContext
// ---------------------------------------------------------------------------

/// Everything an operation needs, handed in explicitly.
#[derive(Clone)]
pub struct OperationContext {
    pub deployment: Deployment,
    pub host: Host,
    pub notifier: Arc<dyn Notifier>,
    pub store: ComponentStore,
    pub input_parameters: PathBuf,
    pub service_backup: PathBuf,
    pub require_elevation: bool,
    /// Set on contexts whose operations are folded into an outer batch.
    composed: bool,
}

impl OperationContext {
    /// Resolve `deployment` on the host and wire up its ledger under `root`.
    pub fn open(
        root: &Path,
        config: &Config,
        deployment: &str,
        host: Host,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        paths::validate_deployment_name(deployment)?;
        let deployment = host.catalog.deployment(deployment)?;
        let store = ComponentStore::new(
            paths::ledger_path(root, &deployment.name),
            config.background_task_roles.clone(),
        );
        Ok(Self {
            input_parameters: paths::input_parameters_path(root, &deployment.name),
            service_backup: paths::service_backup_path(root, &deployment.name),
            deployment,
            host,
            notifier,
            store,
            require_elevation: config.require_elevation,
            composed: false,
        })
    }

    /// Context for sub-operations whose actions are appended to a batch
    /// built on `self`; the outer batch owns ledger creation.
    pub(crate) fn composed(&self) -> Self {
        Self {
            composed: true,
            ..self.clone()
        }
    }

    /// Subsystems are only started or stopped while the deployment runs.
    pub fn is_active(&self) -> bool {
        self.deployment.status.is_active()
    }

    /// A fresh batch. When the ledger does not exist yet, writing it is the
    /// first action so an unwind removes it again.
    pub fn invoker(&self, activity: impl Into<String>) -> ActionInvoker {
        let mut invoker = ActionInvoker::new(self.notifier.clone(), activity);
        if !self.composed && !self.store.exists() {
            invoker.add_action(self.store.ensure_action());
        }
        invoker
    }

    /// Queue the one-time record of the original service properties.
    pub(crate) fn backup_services(&self, invoker: &mut ActionInvoker) {
        if !self.composed && !self.service_backup.exists() {
            invoker.add_action(BackupServicesAction::new(
                self.host.services.clone(),
                self.deployment.name.clone(),
                self.service_backup.clone(),
            ));
        }
    }

    /// Ledger update for `(name, role)`, routed to the role-aware path when
    /// a role is given.
    pub(crate) fn save_action(
        &self,
        name: ComponentName,
        role: Option<&str>,
        is_enabled: bool,
        is_running: bool,
    ) -> Result<SaveComponentAction> {
        match role {
            Some(role) if name.has_roles() => {
                self.store.save_role_action(role, is_enabled, is_running)
            }
            Some(role) => Err(DeployError::InvalidArgument(format!(
                "component '{name}' does not take a role (got '{role}')"
            ))),
            None => self.store.save_action(name, is_enabled, is_running),
        }
    }
}

/// A batch entry: a component kind and, for background tasks, its role.
pub(crate) type ComponentKey = (ComponentName, Option<String>);

/// Expand background tasks named without a role into one key per ledger role.
pub(crate) fn expand_roles(
    names: &[ComponentName],
    ledger: &ComponentsCollection,
) -> Vec<ComponentKey> {
    let mut keys = Vec::new();
    for &name in names {
        if name.has_roles() {
            keys.extend(ledger.of_kind(name).map(|c| (name, c.role.clone())));
        } else {
            keys.push((name, None));
        }
    }
    keys
}

pub(crate) fn require_components(names: &[ComponentName]) -> Result<()> {
    if names.is_empty() {
        return Err(DeployError::InvalidArgument(
            "at least one component is required".to_string(),
        ));
    }
    Ok(())
}

impl std::fmt::Debug for OperationContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperationContext")
            .field("deployment", &self.deployment)
            .field("store", &self.store)
            .field("input_parameters", &self.input_parameters)
            .field("service_backup", &self.service_backup)
            .field("require_elevation", &self.require_elevation)
            .field("composed", &self.composed)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Operation
// ---------------------------------------------------------------------------

pub trait Operation: Sized {
    fn invoker(&self) -> &ActionInvoker;

    fn into_invoker(self) -> ActionInvoker;

    fn descriptions(&self) -> Vec<String> {
        self.invoker().descriptions()
    }

    fn into_actions(self) -> Vec<BoxedAction> {
        self.into_invoker().into_actions()
    }

    /// Run the batch, keeping the rollback outcome on failure.
    fn invoke(self) -> std::result::Result<InvokeReport, Unwind> {
        self.into_invoker().invoke()
    }

    /// Run the batch; a failure comes back as the error that triggered it.
    fn run(self) -> Result<InvokeReport> {
        self.invoke().map_err(Unwind::into_error)
    }
}

macro_rules! impl_operation {
    ($ty:ty) => {
        impl $crate::operations::Operation for $ty {
            fn invoker(&self) -> &$crate::invoker::ActionInvoker {
                &self.invoker
            }

            fn into_invoker(self) -> $crate::invoker::ActionInvoker {
                self.invoker
            }
        }
    };
}

pub(crate) use impl_operation;

// ---------------------------------------------------------------------------
// Test fixtures
// ---------------------------------------------------------------------------

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use crate::host::{
        AppPoolEntry, ComPlusComponent, Inventory, InventoryHost, ServiceEntry,
    };
    use crate::notify::RecordingNotifier;
    use crate::types::{DeploymentStatus, ServiceKind};
    use tempfile::TempDir;

    pub struct Fixture {
        pub dir: TempDir,
        pub inventory: Arc<InventoryHost>,
        pub notifier: Arc<RecordingNotifier>,
        pub ctx: OperationContext,
    }

    pub fn inventory(status: DeploymentStatus) -> Inventory {
        let mut crawler = ServiceEntry::new("InfoShare Crawler", "InfoShare", ServiceKind::Crawler);
        crawler.depends_on = vec!["InfoShare SolrLucene".to_string()];
        let mut bt_default =
            ServiceEntry::new("InfoShare BackgroundTask One", "InfoShare", ServiceKind::BackgroundTask);
        bt_default.role = Some("Default".to_string());
        let mut bt_single =
            ServiceEntry::new("InfoShare BackgroundTask Two", "InfoShare", ServiceKind::BackgroundTask);
        bt_single.role = Some("Single".to_string());
        Inventory {
            elevated: true,
            deployments: vec![Deployment::new("InfoShare", status)],
            services: vec![
                crawler,
                ServiceEntry::new("InfoShare SolrLucene", "InfoShare", ServiceKind::SolrLucene),
                ServiceEntry::new(
                    "InfoShare TranslationBuilder",
                    "InfoShare",
                    ServiceKind::TranslationBuilder,
                ),
                bt_default,
                bt_single,
            ],
            app_pools: vec![
                AppPoolEntry::new("TrisoftAppPoolInfoShareCM", false),
                AppPoolEntry::new("TrisoftAppPoolInfoShareWS", false),
                AppPoolEntry::new("TrisoftAppPoolInfoShareSTS", false),
            ],
            complus: vec![
                ComPlusComponent {
                    name: "Trisoft-InfoShare-Author".to_string(),
                    enabled: false,
                },
                ComPlusComponent {
                    name: "Trisoft-Utilities".to_string(),
                    enabled: true,
                },
            ],
        }
    }

    /// A deployment cmdeploy has worked on before: its ledger and the
    /// original service record already exist.
    pub fn fixture(inventory: Inventory) -> Fixture {
        let f = fresh_fixture(inventory);
        f.ctx.store.load().unwrap();
        let mut backup = BackupServicesAction::new(
            f.ctx.host.services.clone(),
            f.ctx.deployment.name.clone(),
            f.ctx.service_backup.clone(),
        );
        crate::invoker::Action::execute(&mut backup).unwrap();
        f
    }

    /// A deployment cmdeploy has never touched.
    pub fn fresh_fixture(inventory: Inventory) -> Fixture {
        let dir = TempDir::new().unwrap();
        let inventory = Arc::new(InventoryHost::in_memory(inventory));
        let notifier = Arc::new(RecordingNotifier::new());
        let config = Config {
            background_task_roles: vec!["Default".to_string(), "Single".to_string()],
            ..Config::default()
        };
        let ctx = OperationContext::open(
            dir.path(),
            &config,
            "InfoShare",
            Host::from_inventory(inventory.clone()),
            notifier.clone(),
        )
        .unwrap();
        Fixture {
            dir,
            inventory,
            notifier,
            ctx,
        }
    }
}
