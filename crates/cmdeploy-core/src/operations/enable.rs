use super::{impl_operation, kind, require_components, ComponentKey, OperationContext};
use crate::actions::WarningAction;
use crate::component::{check_key, component_label, ComponentsCollection};
use crate::error::{DeployError, Result};
use crate::invoker::ActionInvoker;
use crate::resolver;
use crate::types::ComponentName;

/// Marks components enabled and, on an active deployment, brings them up.
///
/// Subsystem actions come first in resolved order, followed by one ledger
/// update per component in the same order.
#[derive(Debug)]
pub struct EnableComponentsOperation {
    invoker: ActionInvoker,
}

impl_operation!(EnableComponentsOperation);

impl EnableComponentsOperation {
    pub fn new(ctx: &OperationContext, names: &[ComponentName]) -> Result<Self> {
        require_components(names)?;
        if names.contains(&ComponentName::BackgroundTask) {
            return Err(DeployError::InvalidArgument(
                "background tasks are enabled per role".to_string(),
            ));
        }
        let ledger = ctx.store.read()?;
        let mut requested = names.to_vec();
        for &name in names {
            let Some(prerequisite) = resolver::prerequisite_of(name) else {
                continue;
            };
            if requested.contains(&prerequisite) {
                continue;
            }
            if needs_prerequisite(ctx, name, prerequisite, &ledger)? {
                tracing::debug!(%name, %prerequisite, "adding prerequisite to batch");
                requested.push(prerequisite);
            }
        }
        let keys = resolver::order_components(&requested)
            .into_iter()
            .map(|name| (name, None))
            .collect();
        Self::build(ctx, keys)
    }

    /// Enable one background task role that the ledger already knows.
    pub fn background_task(ctx: &OperationContext, role: &str) -> Result<Self> {
        check_key(ComponentName::BackgroundTask, Some(role))?;
        let ledger = ctx.store.read()?;
        let record = ledger
            .get_role(ComponentName::BackgroundTask, role)
            .ok_or_else(|| DeployError::RoleNotFound(role.to_string()))?;
        Self::build(ctx, vec![(ComponentName::BackgroundTask, record.role.clone())])
    }

    fn build(ctx: &OperationContext, keys: Vec<ComponentKey>) -> Result<Self> {
        let mut invoker = ctx.invoker(format!(
            "Enabling components of deployment '{}'",
            ctx.deployment.name
        ));
        let active = ctx.is_active();
        if active && keys.iter().any(|(name, _)| name.service_kind().is_some()) {
            ctx.backup_services(&mut invoker);
        }
        let mut saves = Vec::with_capacity(keys.len());
        for (name, role) in &keys {
            let role = role.as_deref();
            if active {
                invoker.add_actions(kind::enable_actions(ctx, *name, role)?);
            } else {
                let label = component_label(*name, role);
                invoker.add_action(WarningAction::new(
                    ctx.notifier.clone(),
                    format!(
                        "The component '{label}' will only be marked as enabled. \
                         The component '{label}' will not be started, because the deployment '{}' is not started",
                        ctx.deployment.name
                    ),
                ));
            }
            saves.push(ctx.save_action(*name, role, true, active)?);
        }
        for save in saves {
            invoker.add_action(save);
        }
        Ok(Self { invoker })
    }
}

/// A dependent pulls in its prerequisite when its services declare
/// dependencies and the prerequisite is not enabled yet.
fn needs_prerequisite(
    ctx: &OperationContext,
    name: ComponentName,
    prerequisite: ComponentName,
    ledger: &ComponentsCollection,
) -> Result<bool> {
    let Some(kind) = name.service_kind() else {
        return Ok(false);
    };
    if ctx
        .host
        .services
        .dependencies(&ctx.deployment.name, kind)?
        .is_empty()
    {
        return Ok(false);
    }
    Ok(!ledger
        .of_kind(prerequisite)
        .any(|component| component.is_enabled))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
