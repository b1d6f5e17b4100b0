//! # pivnet-rs: An async Rust client for the Pivotal Network API
//!
//! This crate wraps the product-distribution API behind typed resource
//! clients. Every request is authenticated with a bearer token obtained by
//! exchanging a long-lived refresh token, and every non-success response is
//! reported as a structured [`PivnetError`].
//!
//! ## Key Features
//!
//! - Refresh-token exchange with a cache-until-rejected token policy
//! - Pluggable [`AccessTokenService`] for running against test doubles
//! - One shared connection pool and request layer for all resources
//! - Server error messages surfaced verbatim; undecodable bodies reported as such
//! - Per-client timeout and TLS configuration
//!
//! ## Basic Usage
//!
//! ```no_run
//! use pivnet_rs::{Client, ClientConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::new("https://network.pivotal.io")
//!         .with_user_agent("my-tool/0.1.0");
//!     let client = Client::from_refresh_token("my-refresh-token", config)?;
//!
//!     for group in client.company_groups.list().await? {
//!         println!("{} {}", group.id, group.name);
//!     }
//!
//!     let group = client.company_groups
//!         .add_member(1234, "dude@dude.dude", false)
//!         .await?;
//!     println!("{} now has {} members", group.name, group.members.len());
//!
//!     Ok(())
//! }
//! ```

pub mod types;
pub mod auth;
pub mod client;
pub mod executor;
pub mod resources;
pub mod utils;

// Re-export core components
pub use auth::{AccessTokenService, CachedTokenService, TokenFetcher, ACCESS_TOKEN_PATH};
pub use client::{Client, ClientConfig, TlsConfig, API_PREFIX, DEFAULT_TIMEOUT};
pub use executor::{ApiResponse, RequestExecutor};
pub use types::{ApiErrorBody, PivnetError, PivnetResult, SecureToken};

pub mod prelude {
    //! Convenient imports for commonly used types and functions
    pub use crate::{AccessTokenService, Client, ClientConfig, PivnetError, PivnetResult, new_client};
    pub use crate::resources::{CompanyGroup, CompanyGroupMember, Eula, ResourceClient, ResourceOperations};
}

// Resource access
pub use resources::{
    ResourceClient,
    ResourceOperations,
    CompanyGroupsClient,
    EulasClient,
    CompanyGroup,
    CompanyGroupMember,
    CompanyGroupEntitlement,
    Eula,
};

/// Create a client for `host` authenticated with `refresh_token`
pub fn new_client(refresh_token: impl Into<String>, host: impl Into<String>) -> PivnetResult<Client> {
    Client::from_refresh_token(refresh_token, ClientConfig::new(host))
}
