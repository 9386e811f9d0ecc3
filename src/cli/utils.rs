use serde_json::{json, Value};

use crate::cli::OutputFormat;
use crate::error::ClientError;
use crate::gate::{GateDecision, Route};
use crate::notify::{Notice, NoticeLevel, Notifier};
use crate::workspace::Workspace;

/// Output a success message in the appropriate format
pub fn output_success(
    output_format: &OutputFormat,
    message: &str,
    data: Option<Value>,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let (Some(Value::Object(extra)), Some(object)) = (data, response.as_object_mut()) {
                object.extend(extra);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Output an error message in the appropriate format
pub fn output_error(
    output_format: &OutputFormat,
    message: &str,
    error_code: Option<&str>,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": false,
                "error": message
            });

            if let Some(code) = error_code {
                response["error_code"] = json!(code);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            eprintln!("Error: {}", message);
        }
    }
    Ok(())
}

/// Machine-readable class of a failed command, when it came from the client
pub fn error_code(error: &anyhow::Error) -> Option<String> {
    error
        .downcast_ref::<ClientError>()
        .map(|e| format!("{:?}", e.class()).to_lowercase())
}

/// Output an empty collection in the appropriate format
pub fn output_empty_collection(
    output_format: &OutputFormat,
    collection_name: &str,
    message: &str,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json!({
                collection_name: []
            }))?);
        }
        OutputFormat::Text => {
            println!("{}", message);
        }
    }
    Ok(())
}

/// Output current item information in the appropriate format
pub fn output_current_item(
    output_format: &OutputFormat,
    item_type: &str,
    name: &str,
    details: Value,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json!({
                format!("current_{}", item_type): details
            }))?);
        }
        OutputFormat::Text => {
            println!("Current {}: {}", item_type, name);
            for key in ["id", "slug", "role", "email"] {
                if let Some(value) = details.get(key).and_then(Value::as_str) {
                    println!("{}: {}", key, value);
                }
            }
        }
    }
    Ok(())
}

/// Output "no current item" message in the appropriate format
pub fn output_no_current_item(output_format: &OutputFormat, item_type: &str) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json!({
                format!("current_{}", item_type): null
            }))?);
        }
        OutputFormat::Text => {
            println!("No current {} set", item_type);
        }
    }
    Ok(())
}

const SIGN_IN_HINT: &str = "Not signed in. Run 'workspace auth login' first";

/// Resolve identity for `route` and fail with a hint instead of rendering when the gate redirects
pub async fn require_route(workspace: &Workspace, route: Route) -> anyhow::Result<()> {
    match workspace.gate().navigate(&route).await? {
        GateDecision::Render => Ok(()),
        GateDecision::Redirect(Route::SignIn) => Err(anyhow::anyhow!(SIGN_IN_HINT)),
        GateDecision::Redirect(Route::SelectOrganization) => Err(anyhow::anyhow!(
            "No active organization. Run 'workspace org use <organization>' first"
        )),
        GateDecision::Redirect(other) => Err(anyhow::anyhow!("Redirected to {}", other.path())),
        GateDecision::Suspend => Err(anyhow::anyhow!("Session could not be resolved")),
    }
}

/// An identity failure mid-command sends the user to sign-in like a redirect would
pub fn redirect_error(workspace: &Workspace, error: anyhow::Error) -> anyhow::Error {
    let route = error
        .downcast_ref::<ClientError>()
        .and_then(|e| workspace.route_for_error(e));
    match route {
        Some(Route::SignIn) => error.context(SIGN_IN_HINT),
        Some(other) => error.context(format!("Redirected to {}", other.path())),
        None => error,
    }
}

/// Prints notices as they happen: stdout in text mode, JSON lines on stderr otherwise
pub struct ConsoleNotifier {
    output_format: OutputFormat,
}

impl ConsoleNotifier {
    pub fn new(output_format: OutputFormat) -> Self {
        Self { output_format }
    }
}

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: Notice) {
        match self.output_format {
            OutputFormat::Json => match serde_json::to_string(&json!({ "notice": notice })) {
                Ok(line) => eprintln!("{}", line),
                Err(e) => tracing::warn!("Failed to encode notice: {}", e),
            },
            OutputFormat::Text => match notice.level {
                NoticeLevel::Success => println!("✓ {}", notice.message),
                NoticeLevel::Info => println!("• {}", notice.message),
                NoticeLevel::Error => eprintln!("✗ {}", notice.message),
            },
        }
    }
}
