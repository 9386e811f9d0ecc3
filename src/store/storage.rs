use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::StorageError;

/// On-disk shape of the active tenant selection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersistedTenant {
    #[serde(rename = "organizationId")]
    pub organization_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersistedSession {
    pub token: Option<String>,
}

pub trait TenantStorage: Send + Sync {
    fn load_tenant(&self) -> Result<Option<String>, StorageError>;
    fn save_tenant(&self, organization_id: Option<&str>) -> Result<(), StorageError>;
}

pub trait SessionStorage: Send + Sync {
    fn load_token(&self) -> Result<Option<String>, StorageError>;
    fn save_token(&self, token: Option<&str>) -> Result<(), StorageError>;
}

/// JSON files in a config directory: `tenant.json` and `session.json`
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    dir: PathBuf,
}

impl JsonFileStorage {
    pub const TENANT_FILE: &'static str = "tenant.json";
    pub const SESSION_FILE: &'static str = "session.json";

    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn load<T: DeserializeOwned + Default>(&self, file: &str) -> Result<T, StorageError> {
        let path = self.dir.join(file);

        if !path.exists() {
            return Ok(T::default());
        }

        let content = fs::read_to_string(path)?;
        let value: T = serde_json::from_str(&content)?;
        Ok(value)
    }

    fn save<T: Serialize>(&self, file: &str, value: &T) -> Result<(), StorageError> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir)?;
        }

        let content = serde_json::to_string_pretty(value)?;
        fs::write(self.dir.join(file), content)?;
        Ok(())
    }
}

impl TenantStorage for JsonFileStorage {
    fn load_tenant(&self) -> Result<Option<String>, StorageError> {
        Ok(self.load::<PersistedTenant>(Self::TENANT_FILE)?.organization_id)
    }

    fn save_tenant(&self, organization_id: Option<&str>) -> Result<(), StorageError> {
        self.save(
            Self::TENANT_FILE,
            &PersistedTenant { organization_id: organization_id.map(str::to_string) },
        )
    }
}

impl SessionStorage for JsonFileStorage {
    fn load_token(&self) -> Result<Option<String>, StorageError> {
        Ok(self.load::<PersistedSession>(Self::SESSION_FILE)?.token)
    }

    fn save_token(&self, token: Option<&str>) -> Result<(), StorageError> {
        self.save(Self::SESSION_FILE, &PersistedSession { token: token.map(str::to_string) })
    }
}

/// Process-local storage. `unavailable()` simulates storage that always fails.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    tenant: Mutex<Option<String>>,
    token: Mutex<Option<String>>,
    unavailable: bool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tenant(organization_id: impl Into<String>) -> Self {
        Self {
            tenant: Mutex::new(Some(organization_id.into())),
            ..Self::default()
        }
    }

    pub fn unavailable() -> Self {
        Self { unavailable: true, ..Self::default() }
    }

    fn check(&self) -> Result<(), StorageError> {
        if self.unavailable {
            return Err(StorageError::Unavailable("storage disabled".to_string()));
        }
        Ok(())
    }
}

impl TenantStorage for MemoryStorage {
    fn load_tenant(&self) -> Result<Option<String>, StorageError> {
        self.check()?;
        Ok(self.tenant.lock().map(|t| t.clone()).unwrap_or_default())
    }

    fn save_tenant(&self, organization_id: Option<&str>) -> Result<(), StorageError> {
        self.check()?;
        if let Ok(mut tenant) = self.tenant.lock() {
            *tenant = organization_id.map(str::to_string);
        }
        Ok(())
    }
}

impl SessionStorage for MemoryStorage {
    fn load_token(&self) -> Result<Option<String>, StorageError> {
        self.check()?;
        Ok(self.token.lock().map(|t| t.clone()).unwrap_or_default())
    }

    fn save_token(&self, token: Option<&str>) -> Result<(), StorageError> {
        self.check()?;
        if let Ok(mut current) = self.token.lock() {
            *current = token.map(str::to_string);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_persisted_tenant_wire_shape() {
        let value = serde_json::to_value(PersistedTenant { organization_id: Some("A".into()) }).unwrap();
        assert_eq!(value, serde_json::json!({ "organizationId": "A" }));
    }

    #[test]
    fn test_json_file_storage_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonFileStorage::new(dir.path().join("nested"));
        assert_eq!(storage.load_tenant().unwrap(), None);
        assert_eq!(storage.load_token().unwrap(), None);
    }

    #[test]
    fn test_json_file_storage_writes_both_files() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonFileStorage::new(dir.path());

        storage.save_tenant(Some("org_1")).unwrap();
        storage.save_token(Some("tok")).unwrap();

        assert_eq!(storage.load_tenant().unwrap().as_deref(), Some("org_1"));
        assert_eq!(storage.load_token().unwrap().as_deref(), Some("tok"));
        assert!(dir.path().join(JsonFileStorage::TENANT_FILE).exists());
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(JsonFileStorage::TENANT_FILE), "{not json").unwrap();
        let storage = JsonFileStorage::new(dir.path());
        assert!(matches!(storage.load_tenant(), Err(StorageError::Json(_))));
    }
}
