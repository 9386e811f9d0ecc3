pub mod commands;
pub mod utils;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::config::config;
use crate::workspace::Workspace;

#[derive(Parser)]
#[command(name = "workspace")]
#[command(about = "Workspace CLI - organizations, team and outline records")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Sign up, sign in and session status")]
    Auth {
        #[command(subcommand)]
        cmd: commands::auth::AuthCommands,
    },

    #[command(about = "Organization selection and management")]
    Org {
        #[command(subcommand)]
        cmd: commands::org::OrgCommands,
    },

    #[command(about = "Members and invitations of the active organization")]
    Team {
        #[command(subcommand)]
        cmd: commands::team::TeamCommands,
    },

    #[command(about = "Respond to an invitation you received")]
    Invite {
        #[command(subcommand)]
        cmd: commands::invite::InviteCommands,
    },

    #[command(about = "Outline records of the active organization")]
    Outline {
        #[command(subcommand)]
        cmd: commands::outline::OutlineCommands,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

/// Workspace backed by the configured API and state directory, reporting notices on the console
pub fn open_workspace(output_format: OutputFormat) -> anyhow::Result<Workspace> {
    let notifier = Arc::new(utils::ConsoleNotifier::new(output_format));
    Workspace::open(config(), notifier)
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let workspace = open_workspace(output_format)?;

    let result = match cli.command {
        Commands::Auth { cmd } => commands::auth::handle(cmd, &workspace, output_format).await,
        Commands::Org { cmd } => commands::org::handle(cmd, &workspace, output_format).await,
        Commands::Team { cmd } => commands::team::handle(cmd, &workspace, output_format).await,
        Commands::Invite { cmd } => commands::invite::handle(cmd, &workspace, output_format).await,
        Commands::Outline { cmd } => commands::outline::handle(cmd, &workspace, output_format).await,
    };
    result.map_err(|e| utils::redirect_error(&workspace, e))
}
