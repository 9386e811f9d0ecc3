use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::*;
use crate::cli::OutputFormat;
use crate::gate::Route;
use crate::workspace::Workspace;

#[derive(Subcommand)]
pub enum InviteCommands {
    #[command(about = "Show an invitation")]
    Show {
        #[arg(help = "Invitation ID")]
        invitation: String,
    },

    #[command(about = "Accept an invitation and switch to its organization")]
    Accept {
        #[arg(help = "Invitation ID")]
        invitation: String,
    },

    #[command(about = "Reject an invitation")]
    Reject {
        #[arg(help = "Invitation ID")]
        invitation: String,
    },
}

pub async fn handle(cmd: InviteCommands, workspace: &Workspace, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        InviteCommands::Show { invitation } => {
            require_route(workspace, Route::AcceptInvitation(invitation.clone())).await?;
            let invitation = workspace.invitations().get(&invitation).await?;
            let name = invitation
                .organization_name
                .clone()
                .unwrap_or_else(|| invitation.organization_id.clone());
            output_current_item(&output_format, "invitation", &name, json!(invitation))
        }
        InviteCommands::Accept { invitation } => {
            require_route(workspace, Route::AcceptInvitation(invitation.clone())).await?;
            match workspace.invitations().accept(&invitation).await? {
                Some(organization) => output_success(
                    &output_format,
                    &format!("Joined '{}'", organization.name),
                    Some(json!({ "current_organization": organization.id })),
                ),
                None => output_success(&output_format, "Invitation accepted", None),
            }
        }
        InviteCommands::Reject { invitation } => {
            require_route(workspace, Route::AcceptInvitation(invitation.clone())).await?;
            workspace.invitations().reject(&invitation).await?;
            output_success(&output_format, "Invitation rejected", None)
        }
    }
}
