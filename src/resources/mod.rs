//! Typed resource clients.
//!
//! Each resource client wraps the shared [`RequestExecutor`] and exposes the
//! operations of one collection of server-owned entities. They all follow the
//! same rules:
//!
//! - paths are a fixed resource prefix plus identifiers substituted in order
//!   (`/company_groups/1234/add_member`), joined onto the API root by the
//!   executor; identifiers are percent-encoded and `.`/`..` are refused;
//! - request bodies carry only the fields the operation needs, never the full
//!   entity;
//! - responses are decoded as the full, authoritative entity after the
//!   operation.
//!
//! ## Example: Adding a Resource Client
//!
//! ```rust
//! use pivnet_rs::{PivnetResult, RequestExecutor};
//! use pivnet_rs::resources::{ResourceClient, ResourceOperations};
//! use serde::Deserialize;
//! use std::sync::Arc;
//!
//! #[derive(Debug, Deserialize)]
//! struct Product {
//!     id: i64,
//!     slug: String,
//! }
//!
//! #[derive(Deserialize)]
//! struct ProductsResponse {
//!     products: Vec<Product>,
//! }
//!
//! struct ProductsClient {
//!     executor: Arc<RequestExecutor>,
//! }
//!
//! impl ProductsClient {
//!     async fn list(&self) -> PivnetResult<Vec<Product>> {
//!         let response: ProductsResponse = self.fetch(self.resource_path(&[])?).await?;
//!         Ok(response.products)
//!     }
//! }
//!
//! impl ResourceClient for ProductsClient {
//!     fn resource_name(&self) -> &str {
//!         "products"
//!     }
//!
//!     fn executor(&self) -> &RequestExecutor {
//!         &self.executor
//!     }
//! }
//!
//! impl ResourceOperations for ProductsClient {}
//! ```

pub mod company_groups;
pub mod eulas;

pub use company_groups::{CompanyGroup, CompanyGroupEntitlement, CompanyGroupMember, CompanyGroupsClient};
pub use eulas::{Eula, EulasClient};

use crate::executor::RequestExecutor;
use crate::types::*;
use crate::utils::{build_path, StringValidator};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Common trait for all resource clients
pub trait ResourceClient: Send + Sync {
    /// Collection name, also the first path segment
    fn resource_name(&self) -> &str;

    /// Shared request layer
    fn executor(&self) -> &RequestExecutor;

    /// `/{resource}/{segments...}`, each identifier percent-encoded
    fn resource_path(&self, segments: &[&str]) -> PivnetResult<String> {
        let mut path = build_path(&[self.resource_name()])?;
        path.push_str(&build_path(segments)?);
        Ok(path)
    }

    /// Reject blank identifiers before anything goes over the wire
    fn validate_string<S: Into<String>>(&self, value: S, param_name: &str) -> PivnetResult<String> {
        StringValidator::not_empty(value, param_name)
    }
}

/// Request/decode helpers shared by resource clients
pub trait ResourceOperations: ResourceClient {
    /// `GET path`, decoded as `T`
    fn fetch<'a, T: DeserializeOwned + 'a>(&'a self, path: String) -> JsonFuture<'a, T> {
        Box::pin(async move {
            let response = self.executor().get(&path).await?;
            response.json()
        })
    }

    /// `method path` with a JSON body, decoded as `T`
    fn mutate<'a, B, T>(&'a self, method: Method, path: String, body: &'a B) -> JsonFuture<'a, T>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned + 'a,
    {
        Box::pin(async move {
            let response = self.executor().execute(method, &path, Some(body)).await?;
            response.json()
        })
    }
}
