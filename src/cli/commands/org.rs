use clap::Subcommand;
use serde_json::json;

use crate::auth::models::{NewOrganization, Organization, OrganizationUpdate};
use crate::cli::utils::*;
use crate::cli::OutputFormat;
use crate::gate::Route;
use crate::switcher::Resolution;
use crate::workspace::Workspace;

#[derive(Subcommand)]
pub enum OrgCommands {
    #[command(about = "List organizations you belong to")]
    List,

    #[command(about = "Show the active organization")]
    Current,

    #[command(about = "Switch the active organization")]
    Use {
        #[arg(help = "Organization ID or slug")]
        organization: String,
    },

    #[command(about = "Create an organization and switch to it")]
    Create {
        #[arg(help = "Organization name")]
        name: String,
        #[arg(help = "URL slug (lowercase letters, digits and dashes)")]
        slug: String,
        #[arg(long, help = "Logo (one or two characters, or an image URL)")]
        logo: Option<String>,
    },

    #[command(about = "Update the active organization (owner only)")]
    Update {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        slug: Option<String>,
        #[arg(long)]
        logo: Option<String>,
    },

    #[command(about = "Show your role in the active organization")]
    Role,
}

pub async fn handle(cmd: OrgCommands, workspace: &Workspace, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        OrgCommands::List => {
            require_route(workspace, Route::SelectOrganization).await?;
            let organizations = workspace.switcher().list_organizations().await?;

            if organizations.is_empty() {
                return output_empty_collection(
                    &output_format,
                    "organizations",
                    "No organizations yet. Create one with 'workspace org create'",
                );
            }

            let current = workspace.tenants().get();
            match output_format {
                OutputFormat::Json => {
                    let organizations: Vec<_> = organizations
                        .iter()
                        .map(|o| {
                            json!({
                                "id": o.id,
                                "name": o.name,
                                "slug": o.slug,
                                "logo": o.logo,
                                "created_at": o.created_at,
                                "current": current.as_deref() == Some(o.id.as_str()),
                            })
                        })
                        .collect();
                    println!("{}", serde_json::to_string_pretty(&json!({ "organizations": organizations }))?);
                }
                OutputFormat::Text => {
                    println!("  {:<3} {:<25} {:<20} {:<28} {}", "", "NAME", "SLUG", "ID", "CREATED");
                    println!("{}", "-".repeat(90));

                    for o in &organizations {
                        let marker = if current.as_deref() == Some(o.id.as_str()) { "*" } else { " " };
                        let created = o
                            .created_at
                            .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
                            .unwrap_or_default();
                        println!("{} {:<3} {:<25} {:<20} {:<28} {}", marker, o.badge(), o.name, o.slug, o.id, created);
                    }
                }
            }
            Ok(())
        }
        OrgCommands::Current => {
            require_route(workspace, Route::SelectOrganization).await?;
            match workspace.switcher().resolve_active().await? {
                Resolution::Active(organization) => output_current_item(
                    &output_format,
                    "organization",
                    &organization.name,
                    json!(organization),
                ),
                Resolution::SelectOrganization(_) => output_no_current_item(&output_format, "organization"),
                Resolution::CreateOrganization => output_empty_collection(
                    &output_format,
                    "organizations",
                    "No organizations yet. Create one with 'workspace org create'",
                ),
            }
        }
        OrgCommands::Use { organization } => {
            require_route(workspace, Route::SelectOrganization).await?;
            let target = find_organization(workspace, &organization).await?;
            workspace.switcher().select_organization(&target).await?;

            output_success(
                &output_format,
                &format!("Switched to organization '{}'", target.name),
                Some(json!({ "current_organization": target.id })),
            )
        }
        OrgCommands::Create { name, slug, logo } => {
            require_route(workspace, Route::CreateOrganization).await?;
            let created = workspace
                .switcher()
                .create_organization(&NewOrganization { name, slug, logo })
                .await?;

            output_success(
                &output_format,
                &format!("Organization '{}' created", created.name),
                Some(json!({ "organization": created })),
            )
        }
        OrgCommands::Update { name, slug, logo } => {
            require_route(workspace, Route::Dashboard).await?;
            let current = match workspace.switcher().resolve_active().await? {
                Resolution::Active(organization) => organization,
                _ => return output_no_current_item(&output_format, "organization"),
            };

            let updated = workspace
                .switcher()
                .update_organization(&current, &OrganizationUpdate { name, slug, logo })
                .await?;

            output_success(
                &output_format,
                &format!("Organization '{}' updated", updated.name),
                Some(json!({ "organization": updated })),
            )
        }
        OrgCommands::Role => {
            require_route(workspace, Route::Dashboard).await?;
            let membership = workspace.switcher().active_membership().await?;
            output_current_item(&output_format, "role", membership.role.as_str(), json!(membership))
        }
    }
}

async fn find_organization(workspace: &Workspace, needle: &str) -> anyhow::Result<Organization> {
    workspace
        .switcher()
        .list_organizations()
        .await?
        .into_iter()
        .find(|o| o.id == needle || o.slug == needle)
        .ok_or_else(|| anyhow::anyhow!("Organization '{}' not found", needle))
}
