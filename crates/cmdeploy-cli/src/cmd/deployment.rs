use crate::cmd::open_host;
use crate::output::{print_json, Table};
use clap::Subcommand;
use cmdeploy_core::types::ComponentName;
use std::path::Path;

#[derive(Subcommand)]
pub enum DeploymentSubcommand {
    /// List the deployments installed on this host
    List,
}

pub fn run(root: &Path, subcmd: DeploymentSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        DeploymentSubcommand::List => list(root, json),
    }
}

fn list(root: &Path, json: bool) -> anyhow::Result<()> {
    let (_, host) = open_host(root)?;
    let deployments = host.catalog.deployments()?;

    if json {
        print_json(&deployments)?;
        return Ok(());
    }

    if deployments.is_empty() {
        println!("No deployments.");
        return Ok(());
    }

    let mut table = Table::new(&["NAME", "STATUS", "CM POOL", "WS POOL", "STS POOL"]);
    for d in &deployments {
        let pool = |c| d.app_pool(c).unwrap_or_default();
        table.row(vec![
            d.name.clone(),
            d.status.to_string(),
            pool(ComponentName::Cm),
            pool(ComponentName::Ws),
            pool(ComponentName::Sts),
        ]);
    }
    table.print();
    Ok(())
}
