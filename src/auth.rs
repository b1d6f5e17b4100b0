//! Bearer token acquisition.
//!
//! Requests to the service are authenticated with a short-lived bearer token
//! obtained by exchanging a long-lived refresh credential at
//! `{endpoint}/authentication/access_tokens`. The exchange is modelled as the
//! [`AccessTokenService`] capability so the request layer can run against a
//! substitute implementation in tests.

use crate::client::DEFAULT_TIMEOUT;
use crate::types::*;
use crate::utils::join_url;
use async_trait::async_trait;
use reqwest::{header, Client as HttpClient, StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Path of the token exchange, relative to the token endpoint
pub const ACCESS_TOKEN_PATH: &str = "/authentication/access_tokens";

/// Anything that can produce a bearer token on demand
#[async_trait]
pub trait AccessTokenService: Send + Sync {
    /// Produce a bearer token, fetching one if necessary
    async fn access_token(&self) -> PivnetResult<SecureToken>;

    /// Report that `rejected` was refused by the service.
    ///
    /// Returns `true` when a later call to [`access_token`](Self::access_token)
    /// will yield a different token, i.e. when retrying is worthwhile.
    /// Services that do not cache have nothing to drop.
    async fn invalidate(&self, _rejected: &SecureToken) -> bool {
        false
    }
}

#[async_trait]
impl<T: AccessTokenService + ?Sized> AccessTokenService for Arc<T> {
    async fn access_token(&self) -> PivnetResult<SecureToken> {
        (**self).access_token().await
    }

    async fn invalidate(&self, rejected: &SecureToken) -> bool {
        (**self).invalidate(rejected).await
    }
}

#[derive(Serialize)]
struct AccessTokenRequest<'a> {
    refresh_token: &'a str,
}

#[derive(Deserialize)]
struct AccessTokenResponse {
    access_token: String,
}

/// Exchanges a refresh credential for a bearer token over HTTP.
///
/// Every call performs exactly one POST; nothing is cached here. Wrap it in a
/// [`CachedTokenService`] to reuse tokens across requests.
///
/// A fetcher from [`TokenFetcher::new`] has a private pool bounded by
/// [`DEFAULT_TIMEOUT`]. Use [`TokenFetcher::with_http_client`] to share the
/// client's pool so the exchange honors the same `ClientConfig` deadline.
#[derive(Clone)]
pub struct TokenFetcher {
    http_client: HttpClient,
    endpoint: String,
    refresh_token: SecureToken,
    user_agent: Option<String>,
}

impl TokenFetcher {
    pub fn new(
        endpoint: impl Into<String>,
        refresh_token: impl Into<String>,
        user_agent: Option<String>,
    ) -> Self {
        Self {
            http_client: HttpClient::builder()
                .timeout(DEFAULT_TIMEOUT)
                .build()
                .unwrap_or_else(|_| HttpClient::new()),
            endpoint: endpoint.into(),
            refresh_token: SecureToken::new(refresh_token),
            user_agent: user_agent.filter(|ua| !ua.is_empty()),
        }
    }

    /// Reuse an existing connection pool, and its timeout, instead of a private one
    pub fn with_http_client(mut self, http_client: HttpClient) -> Self {
        self.http_client = http_client;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl AccessTokenService for TokenFetcher {
    #[tracing::instrument(skip_all)]
    async fn access_token(&self) -> PivnetResult<SecureToken> {
        let url = join_url(&self.endpoint, ACCESS_TOKEN_PATH);

        let body = serde_json::to_vec(&AccessTokenRequest {
            refresh_token: self.refresh_token.as_str(),
        })
        .map_err(|e| PivnetError::Configuration(format!(
            "failed to marshal API token request body: {}", e
        )))?;

        let mut request = self.http_client
            .post(&url)
            .header(header::CONTENT_TYPE, "application/json")
            .body(body);

        if let Some(user_agent) = &self.user_agent {
            request = request.header(header::USER_AGENT, user_agent.as_str());
        }

        log::debug!("Fetching API token from {}", url);

        let response = request.send().await?;

        if response.status() != StatusCode::OK {
            return Err(PivnetError::token_fetch(response.status().as_u16()));
        }

        let bytes = response.bytes().await?;
        let decoded: AccessTokenResponse = serde_json::from_slice(&bytes)
            .map_err(PivnetError::token_decode)?;

        Ok(SecureToken::new(decoded.access_token))
    }
}

/// Caches the token produced by another service until the service rejects it.
///
/// The cache lives behind an async mutex owned by this value: it is empty at
/// construction, filled by the first [`access_token`](AccessTokenService::access_token)
/// call, cleared by [`invalidate`](AccessTokenService::invalidate) and dropped
/// with the service. Concurrent callers on an empty cache wait for a single
/// fetch instead of racing.
pub struct CachedTokenService<S> {
    inner: S,
    cached: Mutex<Option<SecureToken>>,
}

impl<S: AccessTokenService> CachedTokenService<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            cached: Mutex::new(None),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Whether a token is currently held
    pub async fn is_cached(&self) -> bool {
        self.cached.lock().await.is_some()
    }
}

#[async_trait]
impl<S: AccessTokenService> AccessTokenService for CachedTokenService<S> {
    async fn access_token(&self) -> PivnetResult<SecureToken> {
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref() {
            return Ok(token.clone());
        }

        let token = self.inner.access_token().await?;
        *cached = Some(token.clone());
        Ok(token)
    }

    async fn invalidate(&self, rejected: &SecureToken) -> bool {
        let mut cached = self.cached.lock().await;
        match cached.as_ref() {
            Some(current) if current.as_str() == rejected.as_str() => {
                log::warn!("Cached API token was rejected; dropping it");
                *cached = None;
                true
            }
            // Another caller already replaced the rejected token
            Some(_) => true,
            None => false,
        }
    }
}
