// Request execution and error decoding

use crate::auth::AccessTokenService;
use crate::types::*;
use crate::utils::join_url;

use reqwest::{header, Client as HttpClient, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

/// A successful (2xx) response, body left exactly as the service sent it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl ApiResponse {
    /// Decode the body into the expected shape
    pub fn json<T: DeserializeOwned>(&self) -> PivnetResult<T> {
        serde_json::from_slice(&self.body)
            .map_err(|e| PivnetError::decode_error(self.status, &e, &self.body))
    }
}

/// Issues authenticated requests against the API and classifies the outcome.
///
/// One executor is built per [`Client`](crate::Client) and shared by all
/// resource clients; the underlying connection pool is never rebuilt per call.
#[derive(Clone)]
pub struct RequestExecutor {
    http_client: HttpClient,
    base_url: String,
    user_agent: Option<String>,
    token_service: Arc<dyn AccessTokenService>,
}

impl RequestExecutor {
    pub(crate) fn new(
        http_client: HttpClient,
        base_url: String,
        user_agent: Option<String>,
        token_service: Arc<dyn AccessTokenService>,
    ) -> Self {
        Self {
            http_client,
            base_url,
            user_agent,
            token_service,
        }
    }

    /// Root that every request path is joined onto
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send `method path` with an optional JSON body.
    ///
    /// A token is obtained first; if that fails nothing is sent. The request
    /// is attempted once, except that a 401 answered to a cached token the
    /// token service agrees to drop is re-sent exactly once with a fresh
    /// token. Non-2xx responses become [`PivnetError::Api`] when the body is
    /// a JSON object (its `message`, else the raw text) and
    /// [`PivnetError::Decode`] otherwise.
    #[tracing::instrument(skip(self, method, body), fields(method = %method))]
    pub async fn execute<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> PivnetResult<ApiResponse> {
        let payload = body
            .map(serde_json::to_vec)
            .transpose()
            .map_err(|e| PivnetError::Validation(format!("failed to marshal request body: {}", e)))?;

        let url = join_url(&self.base_url, path);

        let token = self.token_service.access_token().await?;
        let mut response = self.send(&method, &url, payload.as_deref(), &token).await?;

        if response.status() == StatusCode::UNAUTHORIZED
            && self.token_service.invalidate(&token).await
        {
            drop(response);
            log::debug!("Retrying {} {} with a fresh API token", method, url);
            let token = self.token_service.access_token().await?;
            response = self.send(&method, &url, payload.as_deref(), &token).await?;
        }

        Self::classify(response).await
    }

    /// `GET path` without a body
    pub async fn get(&self, path: &str) -> PivnetResult<ApiResponse> {
        self.execute::<()>(Method::GET, path, None).await
    }

    async fn send(
        &self,
        method: &Method,
        url: &str,
        payload: Option<&[u8]>,
        token: &SecureToken,
    ) -> PivnetResult<reqwest::Response> {
        let mut request = self.http_client
            .request(method.clone(), url)
            .header(header::AUTHORIZATION, format!("Bearer {}", token.as_str()));

        if let Some(user_agent) = &self.user_agent {
            request = request.header(header::USER_AGENT, user_agent.as_str());
        }

        if let Some(payload) = payload {
            request = request
                .header(header::CONTENT_TYPE, "application/json")
                .body(payload.to_vec());
        }

        log::debug!("Making request: {} {}", method, url);

        Ok(request.send().await?)
    }

    /// Reads the body on every branch so the connection goes back to the pool
    async fn classify(response: reqwest::Response) -> PivnetResult<ApiResponse> {
        let status = response.status();
        let body = response.bytes().await?.to_vec();

        if status.is_success() {
            return Ok(ApiResponse {
                status: status.as_u16(),
                body,
            });
        }

        match serde_json::from_slice::<ApiErrorBody>(&body) {
            Ok(error_body) => {
                let raw = String::from_utf8_lossy(&body).into_owned();
                // Bodies without a message are still reported, as their raw text
                let message = if error_body.message.is_empty() {
                    raw.clone()
                } else {
                    error_body.message
                };
                Err(PivnetError::api_error(status.as_u16(), message, Some(raw)))
            }
            Err(e) => Err(PivnetError::decode_error(status.as_u16(), &e, &body)),
        }
    }
}
