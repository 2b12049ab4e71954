//! Per-kind subsystem actions. One `match` per concern.

use super::OperationContext;
use crate::actions::{
    DisableComPlusAction, EnableComPlusAction, SetServiceStartupTypeAction, StartAppPoolAction,
    StartServiceAction, StopAppPoolAction, StopServiceAction, VerboseAction, WarningAction,
};
use crate::error::{DeployError, Result};
use crate::host::WindowsService;
use crate::invoker::BoxedAction;
use crate::types::{ComponentName, StartupType};

/// Actions bringing `name` up on an active deployment.
pub(super) fn enable_actions(
    ctx: &OperationContext,
    name: ComponentName,
    role: Option<&str>,
) -> Result<Vec<BoxedAction>> {
    match name {
        ComponentName::Cm | ComponentName::Ws | ComponentName::Sts => {
            start_actions(ctx, name, role)
        }
        ComponentName::TranslationBuilder
        | ComponentName::TranslationOrganizer
        | ComponentName::BackgroundTask
        | ComponentName::Crawler
        | ComponentName::SolrLucene => {
            let services = services(ctx, name, role)?;
            let mut actions: Vec<BoxedAction> = Vec::new();
            for s in &services {
                actions.push(Box::new(SetServiceStartupTypeAction::new(
                    ctx.host.services.clone(),
                    &s.name,
                    StartupType::Automatic,
                )));
            }
            actions.extend(start_services(ctx, name, role, &services));
            Ok(actions)
        }
        ComponentName::ComPlus => complus_actions(ctx, true),
    }
}

/// Actions taking `name` down on an active deployment.
pub(super) fn disable_actions(
    ctx: &OperationContext,
    name: ComponentName,
    role: Option<&str>,
) -> Result<Vec<BoxedAction>> {
    match name {
        ComponentName::Cm | ComponentName::Ws | ComponentName::Sts => {
            stop_actions(ctx, name, role)
        }
        ComponentName::TranslationBuilder
        | ComponentName::TranslationOrganizer
        | ComponentName::BackgroundTask
        | ComponentName::Crawler
        | ComponentName::SolrLucene => {
            let services = services(ctx, name, role)?;
            let mut actions = stop_services(ctx, name, role, &services);
            for s in &services {
                actions.push(Box::new(SetServiceStartupTypeAction::new(
                    ctx.host.services.clone(),
                    &s.name,
                    StartupType::Manual,
                )));
            }
            Ok(actions)
        }
        ComponentName::ComPlus => complus_actions(ctx, false),
    }
}

pub(super) fn start_actions(
    ctx: &OperationContext,
    name: ComponentName,
    role: Option<&str>,
) -> Result<Vec<BoxedAction>> {
    match name {
        ComponentName::Cm | ComponentName::Ws | ComponentName::Sts => {
            let pool = app_pool(ctx, name)?;
            let action: BoxedAction =
                Box::new(StartAppPoolAction::new(ctx.host.app_pools.clone(), pool));
            Ok(vec![action])
        }
        ComponentName::TranslationBuilder
        | ComponentName::TranslationOrganizer
        | ComponentName::BackgroundTask
        | ComponentName::Crawler
        | ComponentName::SolrLucene => {
            let services = services(ctx, name, role)?;
            Ok(start_services(ctx, name, role, &services))
        }
        ComponentName::ComPlus => Ok(Vec::new()),
    }
}

pub(super) fn stop_actions(
    ctx: &OperationContext,
    name: ComponentName,
    role: Option<&str>,
) -> Result<Vec<BoxedAction>> {
    match name {
        ComponentName::Cm | ComponentName::Ws | ComponentName::Sts => {
            let pool = app_pool(ctx, name)?;
            let action: BoxedAction =
                Box::new(StopAppPoolAction::new(ctx.host.app_pools.clone(), pool));
            Ok(vec![action])
        }
        ComponentName::TranslationBuilder
        | ComponentName::TranslationOrganizer
        | ComponentName::BackgroundTask
        | ComponentName::Crawler
        | ComponentName::SolrLucene => {
            let services = services(ctx, name, role)?;
            Ok(stop_services(ctx, name, role, &services))
        }
        ComponentName::ComPlus => Ok(Vec::new()),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn app_pool(ctx: &OperationContext, name: ComponentName) -> Result<String> {
    ctx.deployment.app_pool(name).ok_or_else(|| {
        DeployError::InvalidArgument(format!("component '{name}' has no application pool"))
    })
}

/// Installed services backing `name`, narrowed to `role` for background tasks.
fn services(
    ctx: &OperationContext,
    name: ComponentName,
    role: Option<&str>,
) -> Result<Vec<WindowsService>> {
    let kind = name.service_kind().ok_or_else(|| {
        DeployError::InvalidArgument(format!("component '{name}' has no services"))
    })?;
    let mut services = ctx.host.services.services(&ctx.deployment.name, kind)?;
    if let Some(role) = role {
        services.retain(|s| {
            s.role
                .as_deref()
                .is_some_and(|r| r.eq_ignore_ascii_case(role))
        });
    }
    Ok(services)
}

fn start_services(
    ctx: &OperationContext,
    name: ComponentName,
    role: Option<&str>,
    services: &[WindowsService],
) -> Vec<BoxedAction> {
    if services.is_empty() {
        return vec![no_services(ctx, name, role)];
    }
    services
        .iter()
        .map(|s| {
            Box::new(StartServiceAction::new(ctx.host.services.clone(), &s.name)) as BoxedAction
        })
        .collect()
}

fn stop_services(
    ctx: &OperationContext,
    name: ComponentName,
    role: Option<&str>,
    services: &[WindowsService],
) -> Vec<BoxedAction> {
    if services.is_empty() {
        return vec![no_services(ctx, name, role)];
    }
    services
        .iter()
        .map(|s| {
            Box::new(StopServiceAction::new(ctx.host.services.clone(), &s.name)) as BoxedAction
        })
        .collect()
}

fn no_services(ctx: &OperationContext, name: ComponentName, role: Option<&str>) -> BoxedAction {
    Box::new(VerboseAction::new(
        ctx.notifier.clone(),
        format!(
            "No services are installed for component '{}' in deployment '{}'",
            crate::component::component_label(name, role),
            ctx.deployment.name
        ),
    ))
}

/// COM+ components are shared by the whole host: a change is flagged when
/// other deployments exist.
fn complus_actions(ctx: &OperationContext, enable: bool) -> Result<Vec<BoxedAction>> {
    let shared = ctx.host.catalog.deployments()?.len() > 1;
    let verb = if enable { "enabled" } else { "disabled" };
    let mut actions: Vec<BoxedAction> = Vec::new();
    for component in ctx.host.complus.components()? {
        if component.enabled == enable {
            actions.push(Box::new(VerboseAction::new(
                ctx.notifier.clone(),
                format!("COM+ component '{}' is already {verb}", component.name),
            )));
            continue;
        }
        if shared {
            actions.push(Box::new(WarningAction::new(
                ctx.notifier.clone(),
                format!(
                    "COM+ component '{}' is shared by every deployment on this host and will be {verb} for all of them",
                    component.name
                ),
            )));
        }
        if enable {
            actions.push(Box::new(EnableComPlusAction::new(
                ctx.host.complus.clone(),
                &component.name,
            )));
        } else {
            actions.push(Box::new(DisableComPlusAction::new(
                ctx.host.complus.clone(),
                &component.name,
            )));
        }
    }
    Ok(actions)
}
