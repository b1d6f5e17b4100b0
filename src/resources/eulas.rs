// EULA Client

use crate::executor::RequestExecutor;
use crate::resources::{ResourceClient, ResourceOperations};
use crate::types::*;
use crate::utils::build_path;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Access to `/eulas` and release EULA acceptance
#[derive(Clone)]
pub struct EulasClient {
    executor: Arc<RequestExecutor>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Eula {
    pub id: i64,
    pub slug: String,
    #[serde(default)]
    pub name: String,
    /// Only present when a single EULA is requested
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

#[derive(Deserialize)]
struct EulasResponse {
    #[serde(default)]
    eulas: Vec<Eula>,
}

impl EulasClient {
    pub(crate) fn new(executor: Arc<RequestExecutor>) -> Self {
        Self { executor }
    }

    pub async fn list(&self) -> PivnetResult<Vec<Eula>> {
        let response: EulasResponse = self.fetch(self.resource_path(&[])?).await?;
        Ok(response.eulas)
    }

    pub async fn get(&self, eula_slug: impl Into<String>) -> PivnetResult<Eula> {
        let slug = self.validate_string(eula_slug, "EULA slug")?;
        self.fetch(self.resource_path(&[slug.as_str()])?).await
    }

    /// Accept the EULA attached to a product release.
    ///
    /// Any 2xx counts as accepted; the response body is not inspected.
    pub async fn accept(&self, product_slug: impl Into<String>, release_id: i64) -> PivnetResult<()> {
        let product_slug = self.validate_string(product_slug, "product slug")?;
        let release_id = release_id.to_string();
        let path = build_path(&[
            "products",
            product_slug.as_str(),
            "releases",
            release_id.as_str(),
            "pivnet_resource_eula_acceptance",
        ])?;

        self.executor()
            .execute::<()>(Method::POST, &path, None)
            .await?;
        Ok(())
    }
}

impl ResourceClient for EulasClient {
    fn resource_name(&self) -> &str {
        "eulas"
    }

    fn executor(&self) -> &RequestExecutor {
        &self.executor
    }
}

impl ResourceOperations for EulasClient {}
