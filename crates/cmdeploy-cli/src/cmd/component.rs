use crate::cmd::{finish, open_context};
use crate::output::{print_json, yes_no, Table};
use anyhow::Context;
use clap::Subcommand;
use cmdeploy_core::{
    operations::{
        DisableComponentsOperation, EnableComponentsOperation, StartComponentsOperation,
        StopComponentsOperation,
    },
    types::ComponentName,
};
use std::path::Path;

#[derive(Subcommand)]
pub enum ComponentSubcommand {
    /// Show the component ledger of a deployment
    List {
        #[arg(long, short = 'd')]
        deployment: String,
    },
    /// Enable components and start them if the deployment runs
    Enable {
        #[arg(long, short = 'd')]
        deployment: String,
        /// Component kinds, e.g. crawler solr-lucene complus
        #[arg(required = true)]
        components: Vec<String>,
        /// Print the planned actions without running them
        #[arg(long)]
        dry_run: bool,
    },
    /// Disable components and stop them if the deployment runs
    Disable {
        #[arg(long, short = 'd')]
        deployment: String,
        #[arg(required = true)]
        components: Vec<String>,
        #[arg(long)]
        dry_run: bool,
    },
    /// Enable one background task role
    EnableRole {
        #[arg(long, short = 'd')]
        deployment: String,
        role: String,
        #[arg(long)]
        dry_run: bool,
    },
    /// Disable one background task role
    DisableRole {
        #[arg(long, short = 'd')]
        deployment: String,
        role: String,
        #[arg(long)]
        dry_run: bool,
    },
    /// Start enabled components
    Start {
        #[arg(long, short = 'd')]
        deployment: String,
        #[arg(required = true)]
        components: Vec<String>,
        #[arg(long)]
        dry_run: bool,
    },
    /// Stop components
    Stop {
        #[arg(long, short = 'd')]
        deployment: String,
        #[arg(required = true)]
        components: Vec<String>,
        #[arg(long)]
        dry_run: bool,
    },
}

pub fn run(root: &Path, subcmd: ComponentSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        ComponentSubcommand::List { deployment } => list(root, &deployment, json),
        ComponentSubcommand::Enable {
            deployment,
            components,
            dry_run,
        } => {
            let ctx = open_context(root, &deployment)?;
            let op = EnableComponentsOperation::new(&ctx, &parse_components(&components)?)?;
            finish(op, dry_run, json)
        }
        ComponentSubcommand::Disable {
            deployment,
            components,
            dry_run,
        } => {
            let ctx = open_context(root, &deployment)?;
            let op = DisableComponentsOperation::new(&ctx, &parse_components(&components)?)?;
            finish(op, dry_run, json)
        }
        ComponentSubcommand::EnableRole {
            deployment,
            role,
            dry_run,
        } => {
            let ctx = open_context(root, &deployment)?;
            let op = EnableComponentsOperation::background_task(&ctx, &role)?;
            finish(op, dry_run, json)
        }
        ComponentSubcommand::DisableRole {
            deployment,
            role,
            dry_run,
        } => {
            let ctx = open_context(root, &deployment)?;
            let op = DisableComponentsOperation::background_task(&ctx, &role)?;
            finish(op, dry_run, json)
        }
        ComponentSubcommand::Start {
            deployment,
            components,
            dry_run,
        } => {
            let ctx = open_context(root, &deployment)?;
            let op = StartComponentsOperation::new(&ctx, &parse_components(&components)?)?;
            finish(op, dry_run, json)
        }
        ComponentSubcommand::Stop {
            deployment,
            components,
            dry_run,
        } => {
            let ctx = open_context(root, &deployment)?;
            let op = StopComponentsOperation::new(&ctx, &parse_components(&components)?)?;
            finish(op, dry_run, json)
        }
    }
}

fn parse_components(raw: &[String]) -> anyhow::Result<Vec<ComponentName>> {
    raw.iter()
        .map(|s| s.parse::<ComponentName>().map_err(anyhow::Error::from))
        .collect()
}

fn list(root: &Path, deployment: &str, json: bool) -> anyhow::Result<()> {
    let ctx = open_context(root, deployment)?;
    let ledger = ctx.store.load().context("failed to load component ledger")?;

    if json {
        print_json(&ledger)?;
        return Ok(());
    }

    let mut table = Table::new(&["COMPONENT", "ROLE", "ENABLED", "RUNNING"]);
    for c in ledger.iter() {
        table.row(vec![
            c.name.to_string(),
            c.role.clone().unwrap_or_default(),
            yes_no(c.is_enabled),
            yes_no(c.is_running),
        ]);
    }
    table.print();
    Ok(())
}
