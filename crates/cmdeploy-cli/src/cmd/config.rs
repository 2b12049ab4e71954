use crate::output::print_json;
use anyhow::Context;
use clap::Subcommand;
use cmdeploy_core::config::{Config, WarnLevel};
use std::path::Path;

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Show the effective configuration
    Show,

    /// Validate the config for common mistakes
    Validate,
}

pub fn run(root: &Path, subcmd: ConfigSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        ConfigSubcommand::Show => show(root, json),
        ConfigSubcommand::Validate => validate(root, json),
    }
}

fn show(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    if json {
        return print_json(&config);
    }
    println!("Inventory:             {}", config.inventory_path(root).display());
    println!("Require elevation:     {}", config.require_elevation);
    println!(
        "Background task roles: {}",
        config.background_task_roles.join(", ")
    );
    Ok(())
}

fn validate(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    let warnings = config.validate();

    if json {
        let value = serde_json::json!({
            "warnings": warnings,
        });
        print_json(&value)?;
    } else if warnings.is_empty() {
        println!("Config is valid. No warnings.");
    } else {
        for w in &warnings {
            let prefix = match w.level {
                WarnLevel::Warning => "warning",
                WarnLevel::Error => "error",
            };
            println!("[{prefix}] {}", w.message);
        }
    }

    let has_errors = warnings.iter().any(|w| w.level == WarnLevel::Error);
    if has_errors {
        anyhow::bail!("config validation found errors");
    }

    Ok(())
}
