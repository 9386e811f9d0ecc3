pub mod storage;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::watch;

pub use storage::{JsonFileStorage, MemoryStorage, SessionStorage, TenantStorage};

/// The active organization for this client session.
///
/// Readers call [`TenantStore::get`] or [`TenantStore::subscribe`]. Only the
/// organization switcher and logout write to it, hence `set`/`clear` are
/// crate-private. Every write goes through to storage; if storage fails the
/// store keeps working in memory and reports itself as degraded.
#[derive(Clone)]
pub struct TenantStore {
    inner: Arc<Inner>,
}

struct Inner {
    current: watch::Sender<Option<String>>,
    storage: Arc<dyn TenantStorage>,
    degraded: AtomicBool,
}

impl TenantStore {
    /// Rehydrate from storage. Completes before any caller can read the value.
    pub fn open(storage: Arc<dyn TenantStorage>) -> Self {
        let (initial, degraded) = match storage.load_tenant() {
            Ok(value) => (value, false),
            Err(e) => {
                tracing::warn!("Tenant storage unavailable, keeping selection in memory: {}", e);
                (None, true)
            }
        };

        if let Some(id) = &initial {
            tracing::debug!("Rehydrated active organization: {}", id);
        }

        let (current, _) = watch::channel(initial);
        Self {
            inner: Arc::new(Inner {
                current,
                storage,
                degraded: AtomicBool::new(degraded),
            }),
        }
    }

    pub fn in_memory() -> Self {
        Self::open(Arc::new(MemoryStorage::new()))
    }

    pub fn get(&self) -> Option<String> {
        self.inner.current.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<String>> {
        self.inner.current.subscribe()
    }

    pub fn is_degraded(&self) -> bool {
        self.inner.degraded.load(Ordering::Relaxed)
    }

    pub(crate) fn set(&self, organization_id: impl Into<String>) {
        let id = organization_id.into();
        self.persist(Some(&id));
        self.inner.current.send_replace(Some(id));
    }

    pub(crate) fn clear(&self) {
        self.persist(None);
        self.inner.current.send_replace(None);
    }

    /// A successful write ends degraded mode; a failed one starts it
    fn persist(&self, organization_id: Option<&str>) {
        match self.inner.storage.save_tenant(organization_id) {
            Ok(()) => {
                if self.inner.degraded.swap(false, Ordering::Relaxed) {
                    tracing::info!("Tenant storage available again");
                }
            }
            Err(e) => {
                if !self.inner.degraded.swap(true, Ordering::Relaxed) {
                    tracing::warn!("Failed to persist active organization, continuing in memory: {}", e);
                }
            }
        }
    }
}

impl std::fmt::Debug for TenantStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TenantStore")
            .field("current", &self.get())
            .field("degraded", &self.is_degraded())
            .finish()
    }
}
