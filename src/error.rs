// Client error types
use serde_json::Value;
use thiserror::Error;

/// How an error is surfaced to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Session missing or expired: redirect to sign-in, never shown in-page
    Identity,
    /// Server refused to activate an organization
    TenantSwitch,
    /// Tenant-scoped list or mutation failed
    Fetch,
    /// Rejected before any request was made
    Validation,
    /// Local persistence problem
    Storage,
}

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("{message}")]
    Http { status: u16, message: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Invalid response: {0}")]
    Decode(String),

    #[error("Not signed in")]
    NotAuthenticated,

    #[error("No active organization")]
    NoActiveTenant,

    #[error("Failed to switch organization: {0}")]
    TenantSwitch(Box<ClientError>),

    #[error("Not allowed: {0}")]
    Forbidden(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Field '{field}' is required")]
    Required { field: &'static str },

    #[error("Field '{field}' must not be negative")]
    Negative { field: &'static str },

    #[error("Invalid value for '{field}': {value}")]
    InvalidValue { field: &'static str, value: String },

    #[error("Slug '{0}' already exists")]
    SlugTaken(String),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ClientError {
    /// Build an error from a non-success response, keeping the server's message when it sent one
    pub fn from_response(status: u16, body: &Value) -> Self {
        let message = body
            .get("message")
            .or_else(|| body.get("error"))
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| format!("Request failed with status {}", status));

        ClientError::Http { status, message }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            ClientError::Http { status, .. } => Some(*status),
            ClientError::TenantSwitch(inner) => inner.status_code(),
            _ => None,
        }
    }

    pub fn class(&self) -> ErrorClass {
        match self {
            ClientError::Http { status: 401, .. } | ClientError::NotAuthenticated => ErrorClass::Identity,
            ClientError::TenantSwitch(_) => ErrorClass::TenantSwitch,
            ClientError::Validation(_) | ClientError::Forbidden(_) => ErrorClass::Validation,
            ClientError::Storage(_) => ErrorClass::Storage,
            ClientError::Http { .. }
            | ClientError::Transport(_)
            | ClientError::Decode(_)
            | ClientError::NoActiveTenant => ErrorClass::Fetch,
        }
    }

    pub fn is_identity(&self) -> bool {
        self.class() == ErrorClass::Identity
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else {
            ClientError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Decode(err.to_string())
    }
}

pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_message_taken_from_body() {
        let err = ClientError::from_response(403, &json!({ "message": "You are not a member" }));
        assert_eq!(err.to_string(), "You are not a member");
        assert_eq!(err.status_code(), Some(403));
        assert_eq!(err.class(), ErrorClass::Fetch);
    }

    #[test]
    fn test_fallback_message_without_body() {
        let err = ClientError::from_response(500, &Value::Null);
        assert_eq!(err.to_string(), "Request failed with status 500");
    }

    #[test]
    fn test_unauthorized_is_identity() {
        let err = ClientError::from_response(401, &json!({ "error": "expired" }));
        assert!(err.is_identity());
        assert!(ClientError::NotAuthenticated.is_identity());
    }

    #[test]
    fn test_switch_error_keeps_inner_status() {
        let inner = ClientError::from_response(403, &json!({}));
        let err = ClientError::TenantSwitch(Box::new(inner));
        assert_eq!(err.class(), ErrorClass::TenantSwitch);
        assert_eq!(err.status_code(), Some(403));
    }
}
