//! The persisted component-state ledger.
//!
//! The ledger file is created lazily. Operations read a missing ledger as the
//! vanilla collection without writing it, and queue [`EnsureLedgerAction`] at
//! the head of their batch so the file only appears when the batch runs and
//! disappears again if it unwinds. Changes inside a batch go through
//! [`SaveComponentAction`], which snapshots the file so the invoker can put it
//! back on failure. [`ComponentStore::load`] writes a missing ledger
//! immediately; it is meant for callers outside a batch.
//!
//! A ledger file has a single writer. Nothing locks it against another
//! process running against the same deployment; concurrent runs can lose
//! updates. Writes are atomic, so a reader never sees a torn file.

use crate::component::{check_key, component_label, Component, ComponentsCollection};
use crate::error::{DeployError, Result};
use crate::invoker::Action;
use crate::io;
use crate::types::ComponentName;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// ComponentStore
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct ComponentStore {
    path: PathBuf,
    default_roles: Vec<String>,
}

impl ComponentStore {
    /// `default_roles` seeds the background task records of a fresh ledger.
    pub fn new(path: impl Into<PathBuf>, default_roles: Vec<String>) -> Self {
        Self {
            path: path.into(),
            default_roles,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Current collection, or the vanilla one when the file is missing.
    /// Never writes.
    pub fn read(&self) -> Result<ComponentsCollection> {
        if !self.exists() {
            return Ok(ComponentsCollection::vanilla(&self.default_roles));
        }
        let data = std::fs::read_to_string(&self.path)?;
        ComponentsCollection::from_yaml(&data)
    }

    /// Like [`ComponentStore::read`], but writes a missing ledger first.
    pub fn load(&self) -> Result<ComponentsCollection> {
        if !self.exists() {
            self.ensure_action().execute()?;
        }
        self.read()
    }

    pub fn save(&self, collection: &ComponentsCollection) -> Result<()> {
        let data = collection.to_yaml()?;
        io::atomic_write(&self.path, data.as_bytes())
    }

    pub fn get(&self, name: ComponentName) -> Result<Option<Component>> {
        Ok(self.read()?.get(name).cloned())
    }

    pub fn get_role(&self, name: ComponentName, role: &str) -> Result<Option<Component>> {
        Ok(self.read()?.get_role(name, role).cloned())
    }

    /// Load, upsert one record, and write back when it changed.
    pub fn upsert(
        &self,
        name: ComponentName,
        role: Option<&str>,
        is_enabled: bool,
        is_running: bool,
    ) -> Result<bool> {
        let mut collection = self.load()?;
        let changed = collection.upsert(name, role, is_enabled, is_running)?;
        if changed {
            self.save(&collection)?;
        }
        Ok(changed)
    }

    pub fn ensure_action(&self) -> EnsureLedgerAction {
        EnsureLedgerAction::new(self.clone())
    }

    /// Ledger update for a role-less component.
    pub fn save_action(
        &self,
        name: ComponentName,
        is_enabled: bool,
        is_running: bool,
    ) -> Result<SaveComponentAction> {
        if name.has_roles() {
            return Err(DeployError::InvalidArgument(format!(
                "component '{name}' is saved per role"
            )));
        }
        Ok(SaveComponentAction::new(
            self.clone(),
            name,
            None,
            is_enabled,
            is_running,
        ))
    }

    /// Ledger update for one background task role.
    pub fn save_role_action(
        &self,
        role: &str,
        is_enabled: bool,
        is_running: bool,
    ) -> Result<SaveComponentAction> {
        check_key(ComponentName::BackgroundTask, Some(role))?;
        Ok(SaveComponentAction::new(
            self.clone(),
            ComponentName::BackgroundTask,
            Some(role.to_string()),
            is_enabled,
            is_running,
        ))
    }
}

// ---------------------------------------------------------------------------
// EnsureLedgerAction
// ---------------------------------------------------------------------------

/// Writes the vanilla ledger when the file is missing.
#[derive(Debug)]
pub struct EnsureLedgerAction {
    store: ComponentStore,
    created: bool,
}

impl EnsureLedgerAction {
    fn new(store: ComponentStore) -> Self {
        Self {
            store,
            created: false,
        }
    }
}

impl Action for EnsureLedgerAction {
    fn description(&self) -> String {
        format!("Ensure component ledger {}", self.store.path.display())
    }

    fn execute(&mut self) -> Result<()> {
        if self.store.path.exists() {
            return Ok(());
        }
        if let Some(parent) = self.store.path.parent() {
            io::ensure_dir(parent)?;
        }
        let vanilla = ComponentsCollection::vanilla(&self.store.default_roles);
        self.store.save(&vanilla)?;
        self.created = true;
        tracing::info!(path = %self.store.path.display(), "created component ledger");
        Ok(())
    }

    fn is_restorable(&self) -> bool {
        true
    }

    fn rollback(&mut self) -> Result<()> {
        if self.created {
            io::restore_snapshot(&self.store.path, None)?;
            self.created = false;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// SaveComponentAction
// ---------------------------------------------------------------------------

/// Upserts one record into the ledger file.
#[derive(Debug)]
pub struct SaveComponentAction {
    store: ComponentStore,
    name: ComponentName,
    role: Option<String>,
    is_enabled: bool,
    is_running: bool,
    snapshot: Option<Option<Vec<u8>>>,
}

impl SaveComponentAction {
    fn new(
        store: ComponentStore,
        name: ComponentName,
        role: Option<String>,
        is_enabled: bool,
        is_running: bool,
    ) -> Self {
        Self {
            store,
            name,
            role,
            is_enabled,
            is_running,
            snapshot: None,
        }
    }

    pub fn name(&self) -> ComponentName {
        self.name
    }

    pub fn role(&self) -> Option<&str> {
        self.role.as_deref()
    }

    pub fn is_enabled(&self) -> bool {
        self.is_enabled
    }

    pub fn is_running(&self) -> bool {
        self.is_running
    }
}

impl Action for SaveComponentAction {
    fn description(&self) -> String {
        format!(
            "Save state of component {}: enabled={}, running={}",
            component_label(self.name, self.role.as_deref()),
            self.is_enabled,
            self.is_running
        )
    }

    fn execute(&mut self) -> Result<()> {
        self.store.upsert(
            self.name,
            self.role.as_deref(),
            self.is_enabled,
            self.is_running,
        )?;
        Ok(())
    }

    fn is_restorable(&self) -> bool {
        true
    }

    fn backup(&mut self) -> Result<()> {
        self.snapshot = Some(io::read_snapshot(&self.store.path)?);
        Ok(())
    }

    fn rollback(&mut self) -> Result<()> {
        match &self.snapshot {
            Some(snapshot) => io::restore_snapshot(&self.store.path, snapshot.as_deref()),
            None => Ok(()),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
