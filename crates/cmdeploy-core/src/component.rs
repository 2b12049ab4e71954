//! Component records and the keyed collection persisted in the ledger.
//!
//! A record is identified by `(name, role)`. Only `background-task` carries a
//! role; for every other kind the role is always `None` and the key collapses
//! to the name. Role comparison is ASCII case-insensitive.

use crate::error::{DeployError, Result};
use crate::types::ComponentName;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Component
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Component {
    pub name: ComponentName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// What the user asked for: should this component be active.
    #[serde(default)]
    pub is_enabled: bool,
    /// What was asserted about the subsystem when the record was written.
    #[serde(default)]
    pub is_running: bool,
}

impl Component {
    /// A disabled, stopped record for a role-less kind.
    pub fn new(name: ComponentName) -> Self {
        Self {
            name,
            role: None,
            is_enabled: false,
            is_running: false,
        }
    }

    pub fn background_task(role: impl Into<String>) -> Self {
        Self {
            name: ComponentName::BackgroundTask,
            role: Some(role.into()),
            is_enabled: false,
            is_running: false,
        }
    }

    pub fn matches(&self, name: ComponentName, role: Option<&str>) -> bool {
        if self.name != name {
            return false;
        }
        match (self.role.as_deref(), role) {
            (None, None) => true,
            (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
            _ => false,
        }
    }

    /// Human-readable key, e.g. `crawler` or `background-task[Default]`.
    pub fn label(&self) -> String {
        component_label(self.name, self.role.as_deref())
    }
}

pub fn component_label(name: ComponentName, role: Option<&str>) -> String {
    match role {
        Some(role) => format!("{name}[{role}]"),
        None => name.to_string(),
    }
}

/// Check that `role` is present exactly when `name` has role multiplicity.
pub fn check_key(name: ComponentName, role: Option<&str>) -> Result<()> {
    match (name.has_roles(), role) {
        (true, None) => Err(DeployError::InvalidArgument(format!(
            "component '{name}' requires a role"
        ))),
        (true, Some(r)) if r.trim().is_empty() => Err(DeployError::InvalidArgument(format!(
            "component '{name}' requires a non-empty role"
        ))),
        (false, Some(r)) => Err(DeployError::InvalidArgument(format!(
            "component '{name}' does not take a role (got '{r}')"
        ))),
        _ => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// ComponentsCollection
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentsCollection {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub components: Vec<Component>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}

fn default_version() -> u32 {
    1
}

impl Default for ComponentsCollection {
    fn default() -> Self {
        Self {
            version: default_version(),
            components: Vec::new(),
            last_updated: None,
        }
    }
}

impl ComponentsCollection {
    /// Every known kind present and disabled, with one background task record
    /// per role in `roles`. Blank and repeated roles are skipped.
    pub fn vanilla(roles: &[String]) -> Self {
        let mut components = Vec::new();
        for name in ComponentName::all() {
            if name.has_roles() {
                for role in roles {
                    if role.trim().is_empty() {
                        continue;
                    }
                    if !components
                        .iter()
                        .any(|c: &Component| c.matches(*name, Some(role)))
                    {
                        components.push(Component::background_task(role.clone()));
                    }
                }
            } else {
                components.push(Component::new(*name));
            }
        }
        Self {
            version: default_version(),
            components,
            last_updated: Some(Utc::now()),
        }
    }

    // -----------------------------------------------------------------------
    // Lookup
    // -----------------------------------------------------------------------

    /// Record for a role-less kind.
    pub fn get(&self, name: ComponentName) -> Option<&Component> {
        self.find(name, None)
    }

    pub fn get_role(&self, name: ComponentName, role: &str) -> Option<&Component> {
        self.find(name, Some(role))
    }

    pub fn find(&self, name: ComponentName, role: Option<&str>) -> Option<&Component> {
        self.components.iter().find(|c| c.matches(name, role))
    }

    fn find_mut(&mut self, name: ComponentName, role: Option<&str>) -> Option<&mut Component> {
        self.components.iter_mut().find(|c| c.matches(name, role))
    }

    /// All records of one kind, in ledger order.
    pub fn of_kind(&self, name: ComponentName) -> impl Iterator<Item = &Component> {
        self.components.iter().filter(move |c| c.name == name)
    }

    pub fn is_enabled(&self, name: ComponentName, role: Option<&str>) -> bool {
        self.find(name, role).map(|c| c.is_enabled).unwrap_or(false)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Component> {
        self.components.iter()
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    // -----------------------------------------------------------------------
    // Mutation
    // -----------------------------------------------------------------------

    /// Insert a record for `(name, role)` or update the flags of the existing
    /// one. Returns whether anything changed; an unchanged upsert leaves the
    /// collection (including `last_updated`) untouched.
    pub fn upsert(
        &mut self,
        name: ComponentName,
        role: Option<&str>,
        is_enabled: bool,
        is_running: bool,
    ) -> Result<bool> {
        check_key(name, role)?;
        let changed = match self.find_mut(name, role) {
            Some(existing) => {
                if existing.is_enabled == is_enabled && existing.is_running == is_running {
                    false
                } else {
                    existing.is_enabled = is_enabled;
                    existing.is_running = is_running;
                    true
                }
            }
            None => {
                self.components.push(Component {
                    name,
                    role: role.map(str::to_string),
                    is_enabled,
                    is_running,
                });
                true
            }
        };
        if changed {
            self.last_updated = Some(Utc::now());
        }
        Ok(changed)
    }

    // -----------------------------------------------------------------------
    // Serialization
    // -----------------------------------------------------------------------

    /// Parse a ledger document, normalizing stray roles on role-less kinds and
    /// rejecting duplicate keys.
    pub fn from_yaml(data: &str) -> Result<Self> {
        let mut collection: ComponentsCollection = serde_yaml::from_str(data)?;
        for c in &mut collection.components {
            if !c.name.has_roles() {
                c.role = None;
            }
        }
        collection.check_unique()?;
        Ok(collection)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    fn check_unique(&self) -> Result<()> {
        for (i, c) in self.components.iter().enumerate() {
            check_key(c.name, c.role.as_deref())?;
            if self.components[..i]
                .iter()
                .any(|prev| prev.matches(c.name, c.role.as_deref()))
            {
                return Err(DeployError::InvalidArgument(format!(
                    "ledger contains more than one record for '{}'",
                    c.label()
                )));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
