use serde_json::json;

use super::{Outline, OutlineInput};
use crate::client::{ApiClient, ApiRequest};
use crate::error::ClientResult;
use crate::view::page::Page;
use crate::view::query::ViewQuery;

/// `/outline` endpoints. Tenant scoping comes from the client's header.
#[derive(Clone)]
pub struct OutlineApi {
    api: ApiClient,
    path: String,
}

impl OutlineApi {
    pub fn new(api: ApiClient) -> Self {
        Self { api, path: "/outline".to_string() }
    }

    pub async fn list(&self, query: &ViewQuery) -> ClientResult<Page<Outline>> {
        let mut request = ApiRequest::get(self.path.clone());
        for (key, value) in query.to_params() {
            request = request.with_query(key, value);
        }

        let response = self.api.send(request).await?;
        Page::from_value(response.body)
    }

    pub async fn create(&self, input: &OutlineInput) -> ClientResult<()> {
        input.validate()?;
        self.api.send(ApiRequest::post(self.path.clone(), json!(input))).await?;
        Ok(())
    }

    pub async fn update(&self, id: &str, input: &OutlineInput) -> ClientResult<()> {
        input.validate()?;
        self.api
            .send(ApiRequest::patch(format!("{}/{}", self.path, id), json!(input)))
            .await?;
        Ok(())
    }

    pub async fn delete(&self, id: &str) -> ClientResult<()> {
        self.api.send(ApiRequest::delete(format!("{}/{}", self.path, id))).await?;
        Ok(())
    }
}
