//! Tenant-scoped, server-paginated outline list.
//!
//! Each fetch is identified by a [`RequestKey`] (active tenant plus query).
//! A response is applied only if its key is still the current one and its
//! ticket is still the one registered for that key; anything else is a stale
//! response and is dropped. Rendering re-checks the key against the live
//! tenant, so rows from a previous tenant never show after a switch.

pub mod boundary;
pub mod page;
pub mod query;
pub mod table;

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use serde::Serialize;

use crate::error::{ClientError, ClientResult};
use crate::notify::{Notice, Notifier};
use crate::outline::{Outline, OutlineApi, OutlineInput};
use crate::store::TenantStore;
use crate::types::Operation;

use boundary::{FallbackPanel, RenderError};
use page::Page;
use query::{request_key, ColumnFilter, RequestKey, SortSpec, ViewQuery};
use table::{ColumnKey, TableModel, TableState};

/// Anything that must re-fetch when the active organization changes
#[async_trait]
pub trait TenantScoped: Send + Sync {
    async fn tenant_changed(&self, tenant: Option<String>) -> ClientResult<()>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewState {
    Idle,
    Loading(RequestKey),
    Success { key: RequestKey, page: Page<Outline> },
    Error { key: RequestKey, message: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Rendered {
    /// No active organization
    Idle,
    Loading,
    Table(TableModel),
    Error(String),
    Fallback(FallbackPanel),
}

impl Rendered {
    pub fn to_text(&self) -> String {
        match self {
            Rendered::Idle => "No active organization".to_string(),
            Rendered::Loading => "Loading...".to_string(),
            Rendered::Table(model) => match boundary::contain(|| model.render_text()) {
                Ok(text) => text,
                Err(panel) => panel_text(&panel),
            },
            Rendered::Error(message) => format!("Error: {}", message),
            Rendered::Fallback(panel) => panel_text(panel),
        }
    }
}

fn panel_text(panel: &FallbackPanel) -> String {
    format!("{}\n{}\n[Reload]", panel.title, panel.message)
}

enum Fetch {
    Applied,
    /// Requested page was past the end; query moved to the last page
    Clamped,
    Discarded,
    AlreadyInFlight,
    NoTenant,
}

struct Inner {
    query: ViewQuery,
    state: ViewState,
    in_flight: HashMap<RequestKey, u64>,
    next_ticket: u64,
    table: TableState,
}

pub struct OutlineView {
    api: OutlineApi,
    tenants: TenantStore,
    notifier: Arc<dyn Notifier>,
    inner: Mutex<Inner>,
}

impl OutlineView {
    pub fn new(api: OutlineApi, tenants: TenantStore, notifier: Arc<dyn Notifier>, page_size: u32) -> Self {
        Self {
            api,
            tenants,
            notifier,
            inner: Mutex::new(Inner {
                query: ViewQuery::new(page_size),
                state: ViewState::Idle,
                in_flight: HashMap::new(),
                next_ticket: 0,
                table: TableState::default(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn state(&self) -> ViewState {
        self.lock().state.clone()
    }

    pub fn query(&self) -> ViewQuery {
        self.lock().query.clone()
    }

    pub fn table_state(&self) -> TableState {
        self.lock().table.clone()
    }

    /// Key the view should currently be showing
    pub fn current_key(&self) -> Option<RequestKey> {
        let tenant = self.tenants.get();
        request_key(tenant.as_deref(), &self.lock().query)
    }

    /// Fetch the current page unless the same key is already being fetched
    pub async fn refresh(&self) -> ClientResult<()> {
        self.refresh_with(false).await
    }

    /// Fetch the current page, superseding any in-flight fetch of the same key
    pub async fn reload(&self) -> ClientResult<()> {
        self.refresh_with(true).await
    }

    async fn refresh_with(&self, mut force: bool) -> ClientResult<()> {
        loop {
            match self.fetch_once(force).await? {
                Fetch::Clamped => force = true,
                Fetch::Applied | Fetch::Discarded | Fetch::AlreadyInFlight | Fetch::NoTenant => {
                    return Ok(())
                }
            }
        }
    }

    async fn fetch_once(&self, force: bool) -> ClientResult<Fetch> {
        let tenant = self.tenants.get();

        let (key, ticket) = {
            let mut inner = self.lock();
            let Some(key) = request_key(tenant.as_deref(), &inner.query) else {
                inner.state = ViewState::Idle;
                return Ok(Fetch::NoTenant);
            };
            if !force && inner.in_flight.contains_key(&key) {
                return Ok(Fetch::AlreadyInFlight);
            }

            inner.next_ticket += 1;
            let ticket = inner.next_ticket;
            inner.in_flight.insert(key.clone(), ticket);
            inner.state = ViewState::Loading(key.clone());
            (key, ticket)
        };

        let result = self.api.list(&key.query).await;

        let tenant = self.tenants.get();
        let mut inner = self.lock();

        if inner.in_flight.get(&key) != Some(&ticket) {
            tracing::debug!("Discarding superseded response for {:?}", key);
            return Ok(Fetch::Discarded);
        }
        inner.in_flight.remove(&key);

        if request_key(tenant.as_deref(), &inner.query).as_ref() != Some(&key) {
            tracing::debug!("Discarding stale response for {:?}", key);
            return Ok(Fetch::Discarded);
        }

        match result {
            Ok(page) => {
                let last_page = page.page_count(key.query.page_size);
                if key.query.page > last_page {
                    inner.query.page = last_page;
                    return Ok(Fetch::Clamped);
                }
                inner.state = ViewState::Success { key, page };
                Ok(Fetch::Applied)
            }
            // Identity errors go to sign-in; nothing is shown in the page
            Err(e) if e.is_identity() => {
                inner.state = ViewState::Idle;
                Err(e)
            }
            Err(e) => {
                inner.state = ViewState::Error { key, message: e.to_string() };
                drop(inner);
                self.notifier.notify(Notice::error(format!(
                    "{}: {}",
                    Operation::Select.failure_message(),
                    e
                )));
                Err(e)
            }
        }
    }

    /// Forget everything fetched for any other tenant and load the first page for `tenant`
    pub async fn switch_tenant(&self, tenant: Option<String>) -> ClientResult<()> {
        {
            let mut inner = self.lock();
            inner.in_flight.retain(|key, _| Some(&key.tenant) == tenant.as_ref());
            inner.query = inner.query.first_page();
            inner.table.clear_selection();
            inner.state = match request_key(tenant.as_deref(), &inner.query) {
                Some(key) => ViewState::Loading(key),
                None => ViewState::Idle,
            };
        }
        tracing::debug!("Outline view bound to organization {:?}", tenant);
        self.reload().await
    }

    /// Replace the whole query at once; one fetch instead of one per setter
    pub async fn set_query(&self, query: ViewQuery) -> ClientResult<()> {
        self.lock().query = ViewQuery {
            page: query.page.max(1),
            page_size: query.page_size.max(1),
            ..query
        };
        self.refresh().await
    }

    pub async fn set_page(&self, page: u32) -> ClientResult<()> {
        self.lock().query.page = page.max(1);
        self.refresh().await
    }

    pub async fn set_page_size(&self, page_size: u32) -> ClientResult<()> {
        {
            let mut inner = self.lock();
            inner.query.page_size = page_size.max(1);
            inner.query.page = 1;
        }
        self.refresh().await
    }

    pub async fn set_sort(&self, sort: Vec<SortSpec>) -> ClientResult<()> {
        {
            let mut inner = self.lock();
            inner.query.sort = sort;
            inner.query.page = 1;
        }
        self.refresh().await
    }

    pub async fn set_filters(&self, filters: Vec<ColumnFilter>) -> ClientResult<()> {
        {
            let mut inner = self.lock();
            inner.query.filters = filters;
            inner.query.page = 1;
        }
        self.refresh().await
    }

    pub async fn create(&self, input: &OutlineInput) -> ClientResult<()> {
        self.mutate(Operation::Create, self.api.create(input)).await
    }

    pub async fn update(&self, id: &str, input: &OutlineInput) -> ClientResult<()> {
        self.mutate(Operation::Update, self.api.update(id, input)).await
    }

    pub async fn delete(&self, id: &str) -> ClientResult<()> {
        self.mutate(Operation::Delete, self.api.delete(id)).await
    }

    /// Run a mutation, report it, and re-fetch the current page on success.
    /// Rows are never patched locally.
    async fn mutate<F>(&self, operation: Operation, mutation: F) -> ClientResult<()>
    where
        F: Future<Output = ClientResult<()>>,
    {
        if self.tenants.get().is_none() {
            self.notifier.notify(Notice::error(operation.failure_message()));
            return Err(ClientError::NoActiveTenant);
        }

        match mutation.await {
            Ok(()) => {
                tracing::info!("{:?} succeeded, refreshing current page", operation);
                self.notifier.notify(Notice::success(operation.success_message()));
                // A refresh failure is reported by the refresh itself
                let _ = self.reload().await;
                Ok(())
            }
            Err(e) => {
                tracing::warn!("{:?} failed: {}", operation, e);
                if !e.is_identity() {
                    self.notifier.notify(Notice::error(operation.failure_message()));
                }
                Err(e)
            }
        }
    }

    /// Drag-reorder within the current page. Client-side only.
    pub fn move_row(&self, active_id: &str, over_id: &str) -> bool {
        let moved = match &mut self.lock().state {
            ViewState::Success { page, .. } => table::move_row(&mut page.items, active_id, over_id),
            _ => false,
        };
        if moved {
            self.notifier.notify(Notice::success("Order updated"));
        }
        moved
    }

    pub fn toggle_column(&self, column: ColumnKey) -> bool {
        self.lock().table.toggle_column(column)
    }

    pub fn toggle_row(&self, id: &str) {
        self.lock().table.toggle_row(id);
    }

    pub fn select_all_rows(&self) {
        let mut inner = self.lock();
        let ids: Vec<String> = match &inner.state {
            ViewState::Success { page, .. } => page.items.iter().map(|r| r.id.clone()).collect(),
            _ => Vec::new(),
        };
        inner.table.select_all(ids.iter().map(String::as_str));
    }

    pub fn clear_selection(&self) {
        self.lock().table.clear_selection();
    }

    pub fn render(&self) -> Rendered {
        let tenant = self.tenants.get();
        let inner = self.lock();

        match boundary::contain(|| build(&inner, tenant.as_deref())) {
            Ok(rendered) => rendered,
            Err(panel) => Rendered::Fallback(panel),
        }
    }
}

fn build(inner: &Inner, tenant: Option<&str>) -> Result<Rendered, RenderError> {
    let Some(current) = request_key(tenant, &inner.query) else {
        return Ok(Rendered::Idle);
    };

    let rendered = match &inner.state {
        ViewState::Idle | ViewState::Loading(_) => Rendered::Loading,
        ViewState::Success { key, page } if *key == current => {
            let selected = inner
                .table
                .selected()
                .iter()
                .filter(|id| page.items.iter().any(|r| &r.id == *id))
                .cloned()
                .collect();
            Rendered::Table(TableModel {
                columns: inner.table.visible_columns(),
                rows: page.items.clone(),
                selected,
                page: key.query.page,
                page_count: page.page_count(key.query.page_size),
                total: page.total,
            })
        }
        ViewState::Error { key, message } if *key == current => Rendered::Error(message.clone()),
        // Anything keyed to another tenant or query is not shown
        ViewState::Success { .. } | ViewState::Error { .. } => Rendered::Loading,
    };

    Ok(rendered)
}

#[async_trait]
impl TenantScoped for OutlineView {
    async fn tenant_changed(&self, tenant: Option<String>) -> ClientResult<()> {
        self.switch_tenant(tenant).await
    }
}
