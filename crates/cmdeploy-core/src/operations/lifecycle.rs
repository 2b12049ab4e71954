use super::{expand_roles, impl_operation, kind, require_components, OperationContext};
use crate::actions::{VerboseAction, WarningAction};
use crate::component::component_label;
use crate::error::Result;
use crate::invoker::ActionInvoker;
use crate::resolver;
use crate::types::ComponentName;

/// Starts the subsystems of enabled components and records them running.
///
/// Disabled components are skipped with a verbose note. On a deployment that
/// is not started nothing is started and the ledger is left alone.
#[derive(Debug)]
pub struct StartComponentsOperation {
    invoker: ActionInvoker,
}

impl_operation!(StartComponentsOperation);

impl StartComponentsOperation {
    /// A background task named without a role covers every role in the ledger.
    pub fn new(ctx: &OperationContext, names: &[ComponentName]) -> Result<Self> {
        require_components(names)?;
        let ledger = ctx.store.read()?;
        let keys = expand_roles(&resolver::order_components(names), &ledger);

        let mut invoker = ctx.invoker(format!(
            "Starting components of deployment '{}'",
            ctx.deployment.name
        ));
        let active = ctx.is_active();
        let mut saves = Vec::with_capacity(keys.len());
        for (name, role) in &keys {
            let role = role.as_deref();
            let label = component_label(*name, role);
            if !ledger.is_enabled(*name, role) {
                invoker.add_action(VerboseAction::new(
                    ctx.notifier.clone(),
                    format!("The component '{label}' is disabled and will not be started"),
                ));
                continue;
            }
            if !active {
                invoker.add_action(WarningAction::new(
                    ctx.notifier.clone(),
                    format!(
                        "The component '{label}' will not be started, because the deployment '{}' is not started",
                        ctx.deployment.name
                    ),
                ));
                continue;
            }
            invoker.add_actions(kind::start_actions(ctx, *name, role)?);
            saves.push(ctx.save_action(*name, role, true, true)?);
        }
        for save in saves {
            invoker.add_action(save);
        }
        Ok(Self { invoker })
    }
}

/// Stops the subsystems of components and records them not running. The
/// enabled flag is kept as the ledger has it.
#[derive(Debug)]
pub struct StopComponentsOperation {
    invoker: ActionInvoker,
}

impl_operation!(StopComponentsOperation);

impl StopComponentsOperation {
    pub fn new(ctx: &OperationContext, names: &[ComponentName]) -> Result<Self> {
        require_components(names)?;
        let ledger = ctx.store.read()?;
        let keys = expand_roles(&resolver::order_components(names), &ledger);

        let mut invoker = ctx.invoker(format!(
            "Stopping components of deployment '{}'",
            ctx.deployment.name
        ));
        let mut saves = Vec::with_capacity(keys.len());
        for (name, role) in &keys {
            let role = role.as_deref();
            invoker.add_actions(kind::stop_actions(ctx, *name, role)?);
            saves.push(ctx.save_action(*name, role, ledger.is_enabled(*name, role), false)?);
        }
        for save in saves {
            invoker.add_action(save);
        }
        Ok(Self { invoker })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{AppPoolManager, ServiceManager};
    use crate::notify::Notice;
    use crate::operations::fixtures::{fixture, inventory};
    use crate::operations::Operation;
    use crate::types::DeploymentStatus;

    #[test]
    fn start_skips_disabled_components() {
        let f = fixture(inventory(DeploymentStatus::Started));
        f.ctx.store.upsert(ComponentName::Ws, None, true, false).unwrap();

        let op =
            StartComponentsOperation::new(&f.ctx, &[ComponentName::Cm, ComponentName::Ws]).unwrap();
        assert_eq!(
            op.descriptions(),
            vec![
                "Note: The component 'cm' is disabled and will not be started".to_string(),
                "Start application pool TrisoftAppPoolInfoShareWS".to_string(),
                "Save state of component ws: enabled=true, running=true".to_string(),
            ]
        );
        op.run().unwrap();
        assert!(AppPoolManager::is_running(f.inventory.as_ref(), "TrisoftAppPoolInfoShareWS")
            .unwrap());
        assert!(!AppPoolManager::is_running(f.inventory.as_ref(), "TrisoftAppPoolInfoShareCM")
            .unwrap());
        assert!(f
            .notifier
            .notices()
            .contains(&Notice::Verbose(
                "The component 'cm' is disabled and will not be started".to_string()
            )));
    }

    #[test]
    fn start_on_stopped_deployment_warns_and_keeps_ledger() {
        let f = fixture(inventory(DeploymentStatus::Stopped));
        f.ctx.store.upsert(ComponentName::Sts, None, true, false).unwrap();
        let before = f.ctx.store.load().unwrap();

        let op = StartComponentsOperation::new(&f.ctx, &[ComponentName::Sts]).unwrap();
        op.run().unwrap();
        assert_eq!(f.notifier.warnings().len(), 1);
        assert_eq!(f.ctx.store.load().unwrap(), before);
    }

    #[test]
    fn background_task_by_name_covers_every_role() {
        let f = fixture(inventory(DeploymentStatus::Started));
        f.ctx
            .store
            .upsert(ComponentName::BackgroundTask, Some("Default"), true, false)
            .unwrap();
        f.ctx
            .store
            .upsert(ComponentName::BackgroundTask, Some("Single"), true, false)
            .unwrap();

        StartComponentsOperation::new(&f.ctx, &[ComponentName::BackgroundTask])
            .unwrap()
            .run()
            .unwrap();
        for service in ["InfoShare BackgroundTask One", "InfoShare BackgroundTask Two"] {
            assert!(ServiceManager::is_running(f.inventory.as_ref(), service).unwrap());
        }

        StopComponentsOperation::new(&f.ctx, &[ComponentName::BackgroundTask])
            .unwrap()
            .run()
            .unwrap();
        let ledger = f.ctx.store.load().unwrap();
        for role in ["Default", "Single"] {
            let record = ledger
                .get_role(ComponentName::BackgroundTask, role)
                .unwrap();
            assert!(record.is_enabled);
            assert!(!record.is_running);
        }
    }

    #[test]
    fn stop_keeps_enabled_flag() {
        let f = fixture(inventory(DeploymentStatus::Started));
        f.ctx.store.upsert(ComponentName::Crawler, None, true, true).unwrap();
        let op = StopComponentsOperation::new(&f.ctx, &[ComponentName::Crawler]).unwrap();
        assert_eq!(
            op.descriptions(),
            vec![
                "Stop service InfoShare Crawler".to_string(),
                "Save state of component crawler: enabled=true, running=false".to_string(),
            ]
        );
        op.run().unwrap();
        let crawler = f.ctx.store.get(ComponentName::Crawler).unwrap().unwrap();
        assert!(crawler.is_enabled && !crawler.is_running);
    }

    #[test]
    fn missing_services_produce_a_note() {
        let f = fixture(inventory(DeploymentStatus::Started));
        let op = StopComponentsOperation::new(&f.ctx, &[ComponentName::TranslationOrganizer])
            .unwrap();
        assert!(op.descriptions()[0]
            .starts_with("Note: No services are installed for component 'translation-organizer'"));
    }
}
