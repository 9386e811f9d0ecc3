use std::panic::{catch_unwind, AssertUnwindSafe};

use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    #[error("Failed to format table: {0}")]
    Format(#[from] std::fmt::Error),

    #[error("Render failed: {0}")]
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FallbackAction {
    Reload,
}

/// Shown in place of the data view when drawing it failed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FallbackPanel {
    pub title: String,
    pub message: String,
    pub action: FallbackAction,
}

impl FallbackPanel {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            title: "Something went wrong while loading the table".to_string(),
            message: message.into(),
            action: FallbackAction::Reload,
        }
    }
}

/// Run `render` so that neither an error nor a panic escapes the data view.
pub fn contain<T, F>(render: F) -> Result<T, FallbackPanel>
where
    F: FnOnce() -> Result<T, RenderError>,
{
    match catch_unwind(AssertUnwindSafe(render)) {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => {
            tracing::error!("Data view render error: {}", e);
            Err(FallbackPanel::new(e.to_string()))
        }
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unexpected error".to_string());
            tracing::error!("Data view render panicked: {}", message);
            Err(FallbackPanel::new(message))
        }
    }
}
