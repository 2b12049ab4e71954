mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{
    component::ComponentSubcommand, config::ConfigSubcommand, deployment::DeploymentSubcommand,
    sts::StsSubcommand,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "cmdeploy",
    about = "Enable, disable, start and stop the components of content manager deployments",
    version,
    propagate_version = true
)]
struct Cli {
    /// Workspace root (default: auto-detect from .cmdeploy/)
    #[arg(long, global = true, env = "CMDEPLOY_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create .cmdeploy/ with a default config and an empty inventory
    Init,

    /// Inspect the deployments on this host
    Deployment {
        #[command(subcommand)]
        subcommand: DeploymentSubcommand,
    },

    /// Enable, disable, start and stop deployment components
    Component {
        #[command(subcommand)]
        subcommand: ComponentSubcommand,
    },

    /// Configure the security token service
    Sts {
        #[command(subcommand)]
        subcommand: StsSubcommand,
    },

    /// Validate the workspace configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Component { .. } | Commands::Sts { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root_path = cli.root.as_deref();
    let root = root::resolve_root(root_path);

    let result = match cli.command {
        Commands::Init => cmd::init::run(&root),
        Commands::Deployment { subcommand } => cmd::deployment::run(&root, subcommand, cli.json),
        Commands::Component { subcommand } => cmd::component::run(&root, subcommand, cli.json),
        Commands::Sts { subcommand } => cmd::sts::run(&root, subcommand, cli.json),
        Commands::Config { subcommand } => cmd::config::run(&root, subcommand, cli.json),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
