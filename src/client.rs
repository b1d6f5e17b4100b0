// Core Client Implementation

use crate::auth::{AccessTokenService, CachedTokenService, TokenFetcher};
use crate::executor::RequestExecutor;
use crate::resources::*;
use crate::types::*;
use crate::utils::{join_url, normalize_host};
use reqwest::Client as HttpClient;
use std::sync::Arc;
use std::time::Duration;

/// Version prefix every API path lives under
pub const API_PREFIX: &str = "/api/v2";

/// Deadline applied to each network call unless overridden
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Configuration for TLS
#[derive(Clone, Debug)]
pub struct TlsConfig {
    pub min_tls_version: Option<reqwest::tls::Version>,
    pub cert_verification: bool,
}

impl Default for TlsConfig {
    fn default() -> Self {
        Self {
            min_tls_version: Some(reqwest::tls::Version::TLS_1_2),
            cert_verification: true,
        }
    }
}

/// Connection settings for a [`Client`]
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Base URL of the service, e.g. `https://network.pivotal.io`
    pub host: String,
    /// Sent as the `User-Agent` header when set
    pub user_agent: Option<String>,
    /// Per-call deadline covering connect, send and body read
    pub timeout: Duration,
    pub tls: TlsConfig,
}

impl ClientConfig {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            user_agent: None,
            timeout: DEFAULT_TIMEOUT,
            tls: TlsConfig::default(),
        }
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        let user_agent = user_agent.into();
        self.user_agent = if user_agent.is_empty() { None } else { Some(user_agent) };
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_tls_config(mut self, tls: TlsConfig) -> Self {
        self.tls = tls;
        self
    }

    /// Equivalent of disabling certificate verification
    pub fn skip_ssl_validation(mut self) -> Self {
        self.tls.cert_verification = false;
        self
    }

    fn build_http_client(&self) -> PivnetResult<HttpClient> {
        let mut builder = HttpClient::builder()
            .timeout(self.timeout)
            .danger_accept_invalid_certs(!self.tls.cert_verification);

        if let Some(version) = self.tls.min_tls_version {
            builder = builder.min_tls_version(version);
        }

        builder.build().map_err(|e| {
            PivnetError::Configuration(format!("failed to create HTTP client: {}", e))
        })
    }
}

/// Entry point to the API: configuration plus one field per resource.
///
/// Cloning is cheap; clones share the connection pool and token service.
#[derive(Clone)]
pub struct Client {
    config: ClientConfig,
    executor: Arc<RequestExecutor>,
    pub company_groups: CompanyGroupsClient,
    pub eulas: EulasClient,
}

impl Client {
    /// Create a client that authenticates through `token_service`
    pub fn new(
        token_service: Arc<dyn AccessTokenService>,
        config: ClientConfig,
    ) -> PivnetResult<Self> {
        let http_client = config.build_http_client()?;
        Self::with_http_client(token_service, config, http_client)
    }

    /// Create a client that exchanges `refresh_token` for bearer tokens,
    /// caching each token until the service rejects it.
    pub fn from_refresh_token(
        refresh_token: impl Into<String>,
        config: ClientConfig,
    ) -> PivnetResult<Self> {
        let host = normalize_host(&config.host)?;
        let http_client = config.build_http_client()?;

        let fetcher = TokenFetcher::new(
            join_url(&host, API_PREFIX),
            refresh_token,
            config.user_agent.clone(),
        )
        .with_http_client(http_client.clone());

        let token_service: Arc<dyn AccessTokenService> =
            Arc::new(CachedTokenService::new(fetcher));

        Self::with_http_client(token_service, config, http_client)
    }

    fn with_http_client(
        token_service: Arc<dyn AccessTokenService>,
        mut config: ClientConfig,
        http_client: HttpClient,
    ) -> PivnetResult<Self> {
        config.host = normalize_host(&config.host)?;
        config.user_agent = config.user_agent.filter(|ua| !ua.is_empty());

        let executor = Arc::new(RequestExecutor::new(
            http_client,
            join_url(&config.host, API_PREFIX),
            config.user_agent.clone(),
            token_service,
        ));

        Ok(Self {
            company_groups: CompanyGroupsClient::new(executor.clone()),
            eulas: EulasClient::new(executor.clone()),
            config,
            executor,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Shared request layer, for resources this crate does not wrap yet
    pub fn executor(&self) -> &RequestExecutor {
        &self.executor
    }
}
