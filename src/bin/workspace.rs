use clap::Parser;
use outline_workspace::cli::utils::{error_code, output_error};
use outline_workspace::cli::{Cli, OutputFormat};
use outline_workspace::is_development;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let default_level = if is_development!() { "outline_workspace=debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output_format = OutputFormat::from_cli(&cli);

    if let Err(e) = outline_workspace::cli::run(cli).await {
        match (output_format, std::env::var("CLI_VERBOSE").as_deref()) {
            (OutputFormat::Json, _) => output_error(&output_format, &e.to_string(), error_code(&e).as_deref())?,
            (OutputFormat::Text, Ok("true") | Ok("1")) => eprintln!("Error: {e:?}"),
            (OutputFormat::Text, _) => eprintln!("Error: {e}"),
        }
        std::process::exit(1);
    }

    Ok(())
}
