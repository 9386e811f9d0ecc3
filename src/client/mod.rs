pub mod session;
pub mod transport;

use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::error::{ClientError, ClientResult};
use crate::store::TenantStore;

pub use session::SessionCredentials;
pub use transport::{ApiRequest, ApiResponse, HttpTransport, Method, Transport};

/// Every outbound API call goes through here.
///
/// The active organization is read from the [`TenantStore`] when each request
/// is prepared, never cached, so a switch applies to the very next call.
/// Error responses are converted and returned as-is; nothing is retried.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    tenants: TenantStore,
    session: Arc<SessionCredentials>,
    organization_header: String,
}

impl ApiClient {
    pub fn new(
        transport: Arc<dyn Transport>,
        tenants: TenantStore,
        session: Arc<SessionCredentials>,
        organization_header: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            tenants,
            session,
            organization_header: organization_header.into(),
        }
    }

    pub fn tenants(&self) -> &TenantStore {
        &self.tenants
    }

    pub fn session(&self) -> &SessionCredentials {
        &self.session
    }

    /// Attach session cookie and active organization header
    pub fn prepare(&self, mut request: ApiRequest) -> ApiRequest {
        if let Some(cookie) = self.session.cookie_header() {
            request = request.with_header("cookie", cookie);
        }

        if let Some(organization_id) = self.tenants.get() {
            tracing::debug!(
                "{} {} [{}: {}]",
                request.method.as_str(),
                request.path,
                self.organization_header,
                organization_id
            );
            request = request.with_header(self.organization_header.clone(), organization_id);
        }

        request
    }

    pub async fn send(&self, request: ApiRequest) -> ClientResult<ApiResponse> {
        let request = self.prepare(request);
        let response = self.transport.send(request).await?;

        self.session.capture(&response);

        if !response.is_success() {
            return Err(ClientError::from_response(response.status, &response.body));
        }

        Ok(response)
    }

    pub async fn send_json<T: DeserializeOwned>(&self, request: ApiRequest) -> ClientResult<T> {
        let response = self.send(request).await?;
        Ok(serde_json::from_value(response.body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::Mutex;

    #[derive(Default)]
    struct Echo {
        seen: Mutex<Vec<ApiRequest>>,
    }

    #[async_trait]
    impl Transport for Echo {
        async fn send(&self, request: ApiRequest) -> ClientResult<ApiResponse> {
            let status = if request.path == "/missing" { 404 } else { 200 };
            self.seen.lock().unwrap().push(request);
            Ok(ApiResponse::new(status, json!({ "message": "nope" })))
        }
    }

    fn client(echo: Arc<Echo>, tenants: TenantStore) -> ApiClient {
        ApiClient::new(
            echo,
            tenants,
            Arc::new(SessionCredentials::new("better-auth.session_token")),
            "x-organization-id",
        )
    }

    #[test]
    fn test_no_tenant_forwards_unchanged() {
        let api = client(Arc::new(Echo::default()), TenantStore::in_memory());
        let request = ApiRequest::get("/outline");
        assert_eq!(api.prepare(request.clone()), request);
    }

    #[test]
    fn test_header_reflects_store_at_call_time() {
        let tenants = TenantStore::in_memory();
        let api = client(Arc::new(Echo::default()), tenants.clone());

        tenants.set("A");
        assert_eq!(api.prepare(ApiRequest::get("/outline")).header("x-organization-id"), Some("A"));

        tenants.set("B");
        assert_eq!(api.prepare(ApiRequest::get("/outline")).header("x-organization-id"), Some("B"));

        tenants.clear();
        assert_eq!(api.prepare(ApiRequest::get("/outline")).header("x-organization-id"), None);
    }

    #[tokio::test]
    async fn test_error_status_passes_through() {
        let echo = Arc::new(Echo::default());
        let api = client(echo.clone(), TenantStore::in_memory());

        let err = api.send(ApiRequest::get("/missing")).await.unwrap_err();
        assert_eq!(err.status_code(), Some(404));
        assert_eq!(err.to_string(), "nope");
        assert_eq!(echo.seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_send_json_decodes_body() {
        let api = client(Arc::new(Echo::default()), TenantStore::in_memory());
        let body: Value = api.send_json(ApiRequest::get("/anything")).await.unwrap();
        assert_eq!(body["message"], "nope");
    }
}
