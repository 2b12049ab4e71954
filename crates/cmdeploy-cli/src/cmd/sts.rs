use crate::cmd::{finish, open_context};
use clap::Subcommand;
use cmdeploy_core::{operations::SetStsAuthenticationOperation, types::AuthenticationType};
use std::path::Path;

#[derive(Subcommand)]
pub enum StsSubcommand {
    /// Switch STS between windows and username authentication
    SetAuth {
        #[arg(long, short = 'd')]
        deployment: String,
        /// windows or username
        authentication: String,
        /// Print the planned actions without running them
        #[arg(long)]
        dry_run: bool,
    },
}

pub fn run(root: &Path, subcmd: StsSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        StsSubcommand::SetAuth {
            deployment,
            authentication,
            dry_run,
        } => {
            let authentication: AuthenticationType = authentication.parse()?;
            let ctx = open_context(root, &deployment)?;
            let op = SetStsAuthenticationOperation::new(&ctx, authentication)?;
            finish(op, dry_run, json)
        }
    }
}
