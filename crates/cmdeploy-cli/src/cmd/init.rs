use anyhow::Context;
use cmdeploy_core::{config::Config, host::Inventory, io, paths};
use std::path::Path;

pub fn run(root: &Path) -> anyhow::Result<()> {
    println!("Initializing cmdeploy in: {}", root.display());

    for dir in [paths::CMDEPLOY_DIR, paths::DEPLOYMENTS_DIR] {
        let p = root.join(dir);
        io::ensure_dir(&p).with_context(|| format!("failed to create {}", p.display()))?;
    }

    let config_path = paths::config_path(root);
    let config = if config_path.exists() {
        println!("  exists:  {}", paths::CONFIG_FILE);
        Config::load(root).context("failed to load config")?
    } else {
        let cfg = Config::default();
        cfg.save(root).context("failed to write config.yaml")?;
        println!("  created: {}", paths::CONFIG_FILE);
        cfg
    };

    let inventory_path = config.inventory_path(root);
    let rel = format!("{}/{}", paths::CMDEPLOY_DIR, config.inventory_file);
    if inventory_path.exists() {
        println!("  exists:  {rel}");
    } else {
        Inventory::default()
            .save(&inventory_path)
            .with_context(|| format!("failed to write {rel}"))?;
        println!("  created: {rel}");
    }

    println!("\nDescribe the host in {rel}, then run 'cmdeploy deployment list'.");
    Ok(())
}
