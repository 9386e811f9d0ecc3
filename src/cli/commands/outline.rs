use clap::{Args, Subcommand};
use serde_json::json;

use crate::cli::utils::*;
use crate::cli::OutputFormat;
use crate::config::config;
use crate::gate::Route;
use crate::outline::{OutlineInput, OutlineStatus, SectionStyle};
use crate::view::query::{ColumnFilter, SortSpec, ViewQuery};
use crate::view::table::ColumnKey;
use crate::view::Rendered;
use crate::workspace::Workspace;

#[derive(Subcommand)]
pub enum OutlineCommands {
    #[command(about = "Show one page of outline records")]
    List {
        #[arg(long, default_value_t = 1, help = "Page number (1-based)")]
        page: u32,
        #[arg(long, help = "Rows per page")]
        limit: Option<u32>,
        #[arg(long, help = "Sort, e.g. 'header desc, status'")]
        sort: Option<String>,
        #[arg(long = "filter", help = "Column filter 'column=value' (repeatable)")]
        filters: Vec<String>,
        #[arg(long = "hide", help = "Hide a column (repeatable)")]
        hidden: Vec<String>,
    },

    #[command(about = "Create an outline record")]
    Create {
        #[command(flatten)]
        fields: OutlineFields,
    },

    #[command(about = "Replace an outline record's fields")]
    Update {
        #[arg(help = "Record ID")]
        id: String,
        #[command(flatten)]
        fields: OutlineFields,
    },

    #[command(about = "Delete an outline record")]
    Delete {
        #[arg(help = "Record ID")]
        id: String,
    },
}

#[derive(Args)]
pub struct OutlineFields {
    #[arg(long)]
    pub header: String,
    #[arg(long, help = "Section type, e.g. Narrative or ExecutiveSummary")]
    pub section: String,
    #[arg(long, default_value = "Pending", help = "Pending, In-Progress or Completed")]
    pub status: String,
    #[arg(long, default_value_t = 0)]
    pub target: i64,
    #[arg(long, default_value_t = 0)]
    pub limit: i64,
    #[arg(long, help = "Reviewer member ID")]
    pub member: String,
}

impl OutlineFields {
    fn into_input(self) -> anyhow::Result<OutlineInput> {
        Ok(OutlineInput {
            header: self.header,
            section: self.section.parse::<SectionStyle>()?,
            status: self.status.parse::<OutlineStatus>()?,
            limit: self.limit,
            target: self.target,
            member_id: self.member,
        })
    }
}

pub async fn handle(cmd: OutlineCommands, workspace: &Workspace, output_format: OutputFormat) -> anyhow::Result<()> {
    require_route(workspace, Route::DashboardTable).await?;
    let view = workspace.outlines();

    match cmd {
        OutlineCommands::List { page, limit, sort, filters, hidden } => {
            let page_size = limit.unwrap_or(config().view.default_page_size);
            if !config().view.page_size_options.contains(&page_size) {
                tracing::debug!("Non-standard page size {}", page_size);
            }

            let query = ViewQuery {
                page,
                page_size,
                sort: sort.as_deref().map(SortSpec::parse_list).transpose()?.unwrap_or_default(),
                filters: filters
                    .iter()
                    .map(|f| ColumnFilter::parse(f))
                    .collect::<Result<Vec<_>, _>>()?,
            };
            for column in &hidden {
                view.toggle_column(column.parse::<ColumnKey>()?);
            }

            view.set_query(query).await?;

            match (output_format, view.render()) {
                (OutputFormat::Json, Rendered::Table(model)) => {
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&json!({
                            "outline": model.rows,
                            "page": model.page,
                            "page_count": model.page_count,
                            "total": model.total,
                        }))?
                    );
                }
                (OutputFormat::Json, other) => {
                    println!("{}", serde_json::to_string_pretty(&json!({ "view": other }))?);
                }
                (OutputFormat::Text, rendered) => println!("{}", rendered.to_text()),
            }
            Ok(())
        }
        OutlineCommands::Create { fields } => {
            view.create(&fields.into_input()?).await?;
            output_success(&output_format, "Outline record created", None)
        }
        OutlineCommands::Update { id, fields } => {
            view.update(&id, &fields.into_input()?).await?;
            output_success(
                &output_format,
                &format!("Outline record '{}' updated", id),
                Some(json!({ "id": id })),
            )
        }
        OutlineCommands::Delete { id } => {
            view.delete(&id).await?;
            output_success(
                &output_format,
                &format!("Outline record '{}' deleted", id),
                Some(json!({ "id": id })),
            )
        }
    }
}
