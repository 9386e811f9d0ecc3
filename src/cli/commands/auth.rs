use clap::Subcommand;
use serde_json::json;

use crate::auth::{SignIn, SignUp};
use crate::cli::utils::*;
use crate::cli::OutputFormat;
use crate::gate::{GateState, Route};
use crate::workspace::Workspace;

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Sign in with email and password")]
    Login {
        #[arg(help = "Email")]
        email: String,
        #[arg(long, help = "Password")]
        password: String,
    },

    #[command(about = "Sign out and forget the active organization")]
    Logout,

    #[command(about = "Show current authentication status")]
    Status,

    #[command(about = "Register new user")]
    Register {
        #[arg(help = "Display name")]
        name: String,
        #[arg(help = "Email")]
        email: String,
        #[arg(long, help = "Password")]
        password: String,
    },
}

pub async fn handle(cmd: AuthCommands, workspace: &Workspace, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        AuthCommands::Login { email, password } => {
            let user = workspace.sign_in(&SignIn { email, password }).await?;
            output_success(
                &output_format,
                &format!("Signed in as {}", user.email),
                Some(json!({ "user": user })),
            )
        }
        AuthCommands::Logout => {
            workspace.logout().await?;
            output_success(&output_format, "Signed out", None)
        }
        AuthCommands::Status => {
            workspace.gate().navigate(&Route::Dashboard).await?;
            match workspace.gate().state() {
                GateState::Authenticated(info) => output_current_item(
                    &output_format,
                    "user",
                    &info.user.name,
                    json!({
                        "id": info.user.id,
                        "email": info.user.email,
                        "organization": workspace.tenants().get(),
                    }),
                ),
                _ => output_no_current_item(&output_format, "user"),
            }
        }
        AuthCommands::Register { name, email, password } => {
            let user = workspace.sign_up(&SignUp { name, email, password }).await?;
            output_success(
                &output_format,
                &format!("Registered {}", user.email),
                Some(json!({ "user": user })),
            )
        }
    }
}
