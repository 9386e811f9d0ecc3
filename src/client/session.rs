use std::sync::{Arc, RwLock};

use super::transport::ApiResponse;
use crate::store::SessionStorage;

/// Session cookie issued by the auth provider
pub struct SessionCredentials {
    cookie_name: String,
    token: RwLock<Option<String>>,
    storage: Option<Arc<dyn SessionStorage>>,
}

impl SessionCredentials {
    pub fn new(cookie_name: impl Into<String>) -> Self {
        Self {
            cookie_name: cookie_name.into(),
            token: RwLock::new(None),
            storage: None,
        }
    }

    /// Restore a previously saved token and keep saving future changes
    pub fn persisted(cookie_name: impl Into<String>, storage: Arc<dyn SessionStorage>) -> Self {
        let token = storage.load_token().unwrap_or_else(|e| {
            tracing::warn!("Session storage unavailable: {}", e);
            None
        });

        Self {
            cookie_name: cookie_name.into(),
            token: RwLock::new(token),
            storage: Some(storage),
        }
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    pub fn token(&self) -> Option<String> {
        self.token.read().ok().and_then(|t| t.clone())
    }

    pub fn is_present(&self) -> bool {
        self.token().is_some()
    }

    pub fn cookie_header(&self) -> Option<String> {
        self.token().map(|token| format!("{}={}", self.cookie_name, token))
    }

    pub fn set(&self, token: Option<String>) {
        if let Some(storage) = &self.storage {
            if let Err(e) = storage.save_token(token.as_deref()) {
                tracing::warn!("Failed to persist session token: {}", e);
            }
        }
        if let Ok(mut current) = self.token.write() {
            *current = token;
        }
    }

    pub fn clear(&self) {
        self.set(None);
    }

    /// Pick up (or drop) our cookie from any `set-cookie` headers on a response
    pub fn capture(&self, response: &ApiResponse) {
        for header in response.header_values("set-cookie") {
            let mut parts = header.split(';').map(str::trim);
            let Some((name, value)) = parts.next().and_then(|pair| pair.split_once('=')) else {
                continue;
            };
            if name != self.cookie_name {
                continue;
            }

            let expired = parts.any(|attr| {
                let attr = attr.to_ascii_lowercase();
                attr == "max-age=0" || attr.starts_with("expires=thu, 01 jan 1970")
            });

            if value.is_empty() || expired {
                tracing::debug!("Session cookie cleared by server");
                self.clear();
            } else {
                self.set(Some(value.to_string()));
            }
        }
    }
}
