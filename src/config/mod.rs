use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub api: ApiConfig,
    pub auth: AuthConfig,
    pub view: ViewConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub organization_header: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub base_path: String,
    pub session_cookie: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewConfig {
    pub default_page_size: u32,
    pub page_size_options: Vec<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// None means `$HOME/.config/outline-workspace`
    pub config_dir: Option<PathBuf>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // API overrides
        if let Ok(v) = env::var("WORKSPACE_API_URL") {
            self.api.base_url = v.trim_end_matches('/').to_string();
        }
        if let Ok(v) = env::var("WORKSPACE_API_TIMEOUT_SECS") {
            self.api.timeout_secs = v.parse().unwrap_or(self.api.timeout_secs);
        }
        if let Ok(v) = env::var("WORKSPACE_ORGANIZATION_HEADER") {
            self.api.organization_header = v;
        }

        // Auth overrides
        if let Ok(v) = env::var("WORKSPACE_AUTH_BASE_PATH") {
            self.auth.base_path = v.trim_end_matches('/').to_string();
        }
        if let Ok(v) = env::var("WORKSPACE_SESSION_COOKIE") {
            self.auth.session_cookie = v;
        }

        // View overrides
        if let Ok(v) = env::var("WORKSPACE_PAGE_SIZE") {
            self.view.default_page_size = v.parse().unwrap_or(self.view.default_page_size);
        }

        // Storage overrides
        if let Ok(v) = env::var("WORKSPACE_CONFIG_DIR") {
            self.storage.config_dir = Some(PathBuf::from(v));
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            api: ApiConfig {
                base_url: "http://localhost:4000".to_string(),
                timeout_secs: 30,
                organization_header: "x-organization-id".to_string(),
            },
            auth: AuthConfig::default(),
            view: ViewConfig::default(),
            storage: StorageConfig { config_dir: None },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            api: ApiConfig {
                base_url: "https://api.staging.example.com".to_string(),
                timeout_secs: 15,
                organization_header: "x-organization-id".to_string(),
            },
            auth: AuthConfig::default(),
            view: ViewConfig::default(),
            storage: StorageConfig { config_dir: None },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            api: ApiConfig {
                base_url: "https://api.example.com".to_string(),
                timeout_secs: 10,
                organization_header: "x-organization-id".to_string(),
            },
            auth: AuthConfig::default(),
            view: ViewConfig::default(),
            storage: StorageConfig { config_dir: None },
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            base_path: "/api/auth".to_string(),
            session_cookie: "better-auth.session_token".to_string(),
        }
    }
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            default_page_size: 10,
            page_size_options: vec![10, 20, 30, 40, 50],
        }
    }
}

impl StorageConfig {
    pub fn resolve_dir(&self) -> anyhow::Result<PathBuf> {
        match &self.config_dir {
            Some(dir) => Ok(dir.clone()),
            None => {
                let home = env::var("HOME")
                    .map_err(|_| anyhow::anyhow!("HOME environment variable not set"))?;
                Ok(PathBuf::from(home).join(".config").join("outline-workspace"))
            }
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[macro_export]
macro_rules! is_development {
    () => {
        matches!($crate::config::CONFIG.environment, $crate::config::Environment::Development)
    };
}
