pub mod component;
pub mod config;
pub mod deployment;
pub mod init;
pub mod sts;

use crate::output::{print_json, render_plan};
use anyhow::Context;
use cmdeploy_core::{
    config::Config,
    host::{Host, InventoryHost},
    notify::TracingNotifier,
    operations::{Operation, OperationContext},
};
use std::path::Path;
use std::sync::Arc;

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

pub fn open_host(root: &Path) -> anyhow::Result<(Config, Host)> {
    let config = Config::load(root).context("failed to load config")?;
    let path = config.inventory_path(root);
    let inventory = InventoryHost::open(&path)
        .with_context(|| format!("failed to load inventory {}", path.display()))?;
    Ok((config, Host::from_inventory(Arc::new(inventory))))
}

pub fn open_context(root: &Path, deployment: &str) -> anyhow::Result<OperationContext> {
    let (config, host) = open_host(root)?;
    let ctx = OperationContext::open(root, &config, deployment, host, Arc::new(TracingNotifier))
        .with_context(|| format!("failed to open deployment '{deployment}'"))?;
    Ok(ctx)
}

/// Print the batch on `dry_run`, otherwise run it and report the outcome.
pub fn finish(op: impl Operation, dry_run: bool, json: bool) -> anyhow::Result<()> {
    let activity = op.invoker().activity().to_string();

    if dry_run {
        let actions = op.descriptions();
        if json {
            print_json(&serde_json::json!({
                "activity": activity,
                "dry_run": true,
                "actions": actions,
            }))?;
        } else {
            println!("{}", render_plan(&activity, &actions));
        }
        return Ok(());
    }

    match op.invoke() {
        Ok(report) => {
            if json {
                print_json(&serde_json::json!({
                    "activity": activity,
                    "executed": report.executed,
                }))?;
            } else {
                println!("{activity}: {} actions executed.", report.executed);
            }
            Ok(())
        }
        Err(unwind) => {
            let summary = format!(
                "{activity} failed at action {} ({}); rolled back {} actions",
                unwind.failed_index + 1,
                unwind.failed_action,
                unwind.rolled_back.len()
            );
            for failure in &unwind.rollback_failures {
                tracing::error!(
                    action = %failure.action,
                    "rollback failed: {}",
                    failure.error
                );
            }
            Err(anyhow::Error::new(unwind.into_error())).context(summary)
        }
    }
}
