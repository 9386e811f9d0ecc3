use clap::Subcommand;
use serde_json::json;

use crate::auth::models::{InvitationStatus, Role};
use crate::cli::utils::*;
use crate::cli::OutputFormat;
use crate::gate::Route;
use crate::workspace::Workspace;

#[derive(Subcommand)]
pub enum TeamCommands {
    #[command(about = "List members of the active organization")]
    Members,

    #[command(about = "List invitations of the active organization")]
    Invitations {
        #[arg(long, help = "Include accepted, rejected and canceled invitations")]
        all: bool,
    },

    #[command(about = "Invite someone by email")]
    Invite {
        #[arg(help = "Email")]
        email: String,
        #[arg(long, default_value = "member", help = "Role: member or admin")]
        role: String,
    },

    #[command(about = "Cancel a pending invitation")]
    Cancel {
        #[arg(help = "Invitation ID")]
        invitation: String,
    },

    #[command(about = "Send a pending invitation again")]
    Resend {
        #[arg(help = "Invitation ID")]
        invitation: String,
    },

    #[command(about = "Remove a member")]
    Remove {
        #[arg(help = "Member ID")]
        member: String,
    },
}

pub async fn handle(cmd: TeamCommands, workspace: &Workspace, output_format: OutputFormat) -> anyhow::Result<()> {
    require_route(workspace, Route::DashboardTeam).await?;
    let team = workspace.team();

    match cmd {
        TeamCommands::Members => {
            let members = team.members().await?;
            if members.is_empty() {
                return output_empty_collection(&output_format, "members", "No members");
            }

            match output_format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&json!({ "members": members }))?);
                }
                OutputFormat::Text => {
                    println!("{:<28} {:<25} {:<30} {}", "ID", "NAME", "EMAIL", "ROLE");
                    println!("{}", "-".repeat(92));
                    for m in &members {
                        let (name, email) = m
                            .user
                            .as_ref()
                            .map(|u| (u.name.as_str(), u.email.as_str()))
                            .unwrap_or(("", ""));
                        println!("{:<28} {:<25} {:<30} {}", m.id, name, email, m.role.as_str());
                    }
                }
            }
            Ok(())
        }
        TeamCommands::Invitations { all } => {
            let invitations: Vec<_> = team
                .invitations()
                .await?
                .into_iter()
                .filter(|i| all || i.status == InvitationStatus::Pending)
                .collect();
            if invitations.is_empty() {
                return output_empty_collection(&output_format, "invitations", "No pending invitations");
            }

            match output_format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&json!({ "invitations": invitations }))?);
                }
                OutputFormat::Text => {
                    println!("{:<28} {:<30} {:<8} {:<10} {}", "ID", "EMAIL", "ROLE", "STATUS", "EXPIRES");
                    println!("{}", "-".repeat(95));
                    for i in &invitations {
                        let expires = i
                            .expires_at
                            .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
                            .unwrap_or_default();
                        let status = json!(i.status);
                        println!(
                            "{:<28} {:<30} {:<8} {:<10} {}",
                            i.id,
                            i.email,
                            i.role.as_str(),
                            status.as_str().unwrap_or_default(),
                            expires
                        );
                    }
                }
            }
            Ok(())
        }
        TeamCommands::Invite { email, role } => {
            let role: Role = role.parse()?;
            let invitation = team.invite(&email, role).await?;
            output_success(
                &output_format,
                &format!("Invited {} as {}", invitation.email, invitation.role.as_str()),
                Some(json!({ "invitation": invitation })),
            )
        }
        TeamCommands::Cancel { invitation } => {
            let canceled = team.cancel(&invitation).await?;
            output_success(
                &output_format,
                &format!("Invitation for {} canceled", canceled.email),
                Some(json!({ "invitation": canceled })),
            )
        }
        TeamCommands::Resend { invitation } => {
            let resent = team.resend(&invitation).await?;
            output_success(
                &output_format,
                &format!("Invitation resent to {}", resent.email),
                Some(json!({ "invitation": resent })),
            )
        }
        TeamCommands::Remove { member } => {
            team.remove(&member).await?;
            output_success(&output_format, &format!("Member '{}' removed", member), None)
        }
    }
}
