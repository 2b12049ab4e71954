use super::{impl_operation, kind, require_components, ComponentKey, OperationContext};
use crate::actions::WarningAction;
use crate::component::{check_key, component_label};
use crate::error::{DeployError, Result};
use crate::invoker::ActionInvoker;
use crate::resolver;
use crate::types::ComponentName;

/// Marks components disabled and, on an active deployment, takes them down.
#[derive(Debug)]
pub struct DisableComponentsOperation {
    invoker: ActionInvoker,
}

impl_operation!(DisableComponentsOperation);

impl DisableComponentsOperation {
    pub fn new(ctx: &OperationContext, names: &[ComponentName]) -> Result<Self> {
        require_components(names)?;
        if names.contains(&ComponentName::BackgroundTask) {
            return Err(DeployError::InvalidArgument(
                "background tasks are disabled per role".to_string(),
            ));
        }
        let keys = resolver::order_components(names)
            .into_iter()
            .map(|name| (name, None))
            .collect();
        Self::build(ctx, keys)
    }

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
            "Disabling components of deployment '{}'",
            ctx.deployment.name
        ));
        let active = ctx.is_active();
        let mut saves = Vec::with_capacity(keys.len());
        for (name, role) in &keys {
            let role = role.as_deref();
            if active {
                invoker.add_actions(kind::disable_actions(ctx, *name, role)?);
            } else {
                let label = component_label(*name, role);
                invoker.add_action(WarningAction::new(
                    ctx.notifier.clone(),
                    format!(
                        "The component '{label}' will only be marked as disabled. \
                         The component '{label}' will not be stopped, because the deployment '{}' is not started",
                        ctx.deployment.name
                    ),
                ));
            }
            saves.push(ctx.save_action(*name, role, false, false)?);
        }
        for save in saves {
            invoker.add_action(save);
        }
        Ok(Self { invoker })
    }
}
