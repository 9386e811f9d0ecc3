#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use anyhow::Result;
use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::Notify;

use outline_workspace::client::{ApiRequest, ApiResponse, Method, Transport};
use outline_workspace::config::{ApiConfig, AppConfig, AuthConfig, Environment, StorageConfig, ViewConfig};
use outline_workspace::error::ClientResult;
use outline_workspace::notify::MemoryNotifier;
use outline_workspace::store::MemoryStorage;
use outline_workspace::Workspace;

pub const AUTH: &str = "/api/auth";
pub const ORG_HEADER: &str = "x-organization-id";

type Handler = Arc<dyn Fn(&ApiRequest) -> ApiResponse + Send + Sync>;
type Matcher = Box<dyn Fn(&ApiRequest) -> bool + Send + Sync>;

/// In-process stand-in for the API and auth provider.
///
/// Records every request as it is sent. A request matching a `hold` waits
/// until the returned `Notify` is signalled, which lets tests deliver
/// responses out of order.
#[derive(Default)]
pub struct FakeBackend {
    routes: Mutex<Vec<(Method, String, Handler)>>,
    holds: Mutex<Vec<(Matcher, Arc<Notify>)>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl FakeBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Later registrations for the same route win
    pub fn on<F>(&self, method: Method, path: &str, handler: F)
    where
        F: Fn(&ApiRequest) -> ApiResponse + Send + Sync + 'static,
    {
        self.routes.lock().unwrap().push((method, path.to_string(), Arc::new(handler)));
    }

    pub fn on_json(&self, method: Method, path: &str, body: Value) {
        self.on(method, path, move |_| ApiResponse::ok(body.clone()));
    }

    pub fn on_status(&self, method: Method, path: &str, status: u16, message: &str) {
        let body = json!({ "message": message });
        self.on(method, path, move |_| ApiResponse::new(status, body.clone()));
    }

    /// Hold the next request matching `matcher` until the returned handle is notified
    pub fn hold<F>(&self, matcher: F) -> Arc<Notify>
    where
        F: Fn(&ApiRequest) -> bool + Send + Sync + 'static,
    {
        let release = Arc::new(Notify::new());
        self.holds.lock().unwrap().push((Box::new(matcher), release.clone()));
        release
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requests_to(&self, path: &str) -> Vec<ApiRequest> {
        self.requests().into_iter().filter(|r| r.path == path).collect()
    }

    pub fn clear_requests(&self) {
        self.requests.lock().unwrap().clear();
    }

    /// Wait until a matching request has been sent
    pub async fn wait_for<F>(&self, predicate: F) -> Result<ApiRequest>
    where
        F: Fn(&ApiRequest) -> bool,
    {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            if let Some(found) = self.requests().into_iter().find(|r| predicate(r)) {
                return Ok(found);
            }
            if Instant::now() > deadline {
                anyhow::bail!("expected request was never sent; saw {:?}", self.requests());
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }
}

#[async_trait]
impl Transport for FakeBackend {
    async fn send(&self, request: ApiRequest) -> ClientResult<ApiResponse> {
        self.requests.lock().unwrap().push(request.clone());

        let hold = {
            let mut holds = self.holds.lock().unwrap();
            holds
                .iter()
                .position(|(matcher, _)| matcher(&request))
                .map(|i| holds.remove(i).1)
        };
        if let Some(release) = hold {
            release.notified().await;
        }

        let handler = self
            .routes
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(method, path, _)| *method == request.method && *path == request.path)
            .map(|(_, _, handler)| handler.clone());

        Ok(match handler {
            Some(handler) => handler(&request),
            None => ApiResponse::new(
                404,
                json!({ "message": format!("No route for {} {}", request.method.as_str(), request.path) }),
            ),
        })
    }
}

pub fn auth_path(endpoint: &str) -> String {
    format!("{}/{}", AUTH, endpoint)
}

pub fn test_config() -> AppConfig {
    AppConfig {
        environment: Environment::Development,
        api: ApiConfig {
            base_url: "http://localhost:4000".to_string(),
            timeout_secs: 5,
            organization_header: ORG_HEADER.to_string(),
        },
        auth: AuthConfig::default(),
        view: ViewConfig::default(),
        storage: StorageConfig { config_dir: None },
    }
}

pub fn organization(id: &str) -> Value {
    json!({
        "id": id,
        "name": format!("Org {}", id),
        "slug": format!("org-{}", id.to_lowercase()),
        "logo": null,
        "createdAt": "2024-05-01T12:00:00Z"
    })
}

pub fn session(user_id: &str) -> Value {
    json!({
        "session": { "id": "sess_1", "userId": user_id, "activeOrganizationId": null },
        "user": { "id": user_id, "name": "Ada Lovelace", "email": "ada@example.com" }
    })
}

pub fn member(id: &str, organization_id: &str, role: &str) -> Value {
    json!({
        "id": id,
        "userId": format!("user_{}", id),
        "organizationId": organization_id,
        "role": role,
        "createdAt": "2024-05-01T12:00:00Z",
        "user": { "id": format!("user_{}", id), "name": format!("User {}", id), "email": format!("{}@example.com", id) }
    })
}

pub fn outline_row(id: &str, header: &str) -> Value {
    json!({
        "id": id,
        "header": header,
        "section": "Narrative",
        "status": "Pending",
        "target": 1,
        "limit": 3,
        "reviewerId": "user_1"
    })
}

pub struct Harness {
    pub backend: Arc<FakeBackend>,
    pub storage: Arc<MemoryStorage>,
    pub notifier: Arc<MemoryNotifier>,
    pub workspace: Workspace,
}

impl Harness {
    pub fn new(storage: MemoryStorage) -> Self {
        let backend = FakeBackend::new();
        let storage = Arc::new(storage);
        let notifier = Arc::new(MemoryNotifier::new());
        let workspace = Workspace::with_transport(
            backend.clone(),
            storage.clone(),
            storage.clone(),
            &test_config(),
            notifier.clone(),
        );
        Self { backend, storage, notifier, workspace }
    }

    pub fn empty() -> Self {
        Self::new(MemoryStorage::new())
    }

    pub fn with_stored_tenant(organization_id: &str) -> Self {
        Self::new(MemoryStorage::with_tenant(organization_id))
    }

    /// Signed in as an owner, member of organizations A and B, activation always accepted
    pub fn signed_in(self) -> Self {
        self.backend.on_json(Method::Get, &auth_path("get-session"), session("user_1"));
        self.backend.on_json(
            Method::Get,
            &auth_path("organization/list"),
            json!([organization("A"), organization("B")]),
        );
        self.backend.on_json(Method::Post, &auth_path("organization/set-active"), json!({}));
        self.backend.on(Method::Get, &auth_path("organization/get-active-member"), |request| {
            let organization_id = request.header(ORG_HEADER).unwrap_or_default().to_string();
            ApiResponse::ok(member("m_owner", &organization_id, "owner"))
        });
        self
    }

    /// `/outline` answers 25 rows per tenant, paged by the request's page and limit.
    /// Row ids embed the tenant from the request header.
    pub fn serving_outline(self) -> Self {
        self.backend.on(Method::Get, "/outline", |request| {
            let tenant = request.header(ORG_HEADER).unwrap_or("none").to_string();
            let page: usize = request.query_value("page").and_then(|v| v.parse().ok()).unwrap_or(1);
            let limit: usize = request.query_value("limit").and_then(|v| v.parse().ok()).unwrap_or(10);

            let total = 25;
            let start = (page - 1) * limit;
            let items: Vec<Value> = (start..(start + limit).min(total))
                .map(|n| outline_row(&format!("{}-{}", tenant, n + 1), &format!("Section {}", n + 1)))
                .collect();

            ApiResponse::ok(json!({ "items": items, "total": total }))
        });
        self
    }

    pub fn organization(&self, id: &str) -> outline_workspace::auth::models::Organization {
        serde_json::from_value(organization(id)).unwrap()
    }
}
