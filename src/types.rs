// Core types and errors

use serde::Deserialize;
use thiserror::Error;
use std::fmt;
use std::future::Future;
use std::ops::Deref;
use std::pin::Pin;
use std::sync::Arc;

/// The result type used throughout the Pivnet client
pub type PivnetResult<T> = Result<T, PivnetError>;

/// Type alias for future returning a decoded resource
pub type JsonFuture<'a, T> = Pin<Box<dyn Future<Output = PivnetResult<T>> + Send + 'a>>;

/// Shared, cloneable error source
pub type ErrorSource = Arc<dyn std::error::Error + Send + Sync>;

/// Convert reqwest::Error to our PivnetError
///
/// Anything reqwest reports while sending or reading is a transport failure;
/// status classification happens before bodies are handed to serde.
impl From<reqwest::Error> for PivnetError {
    fn from(err: reqwest::Error) -> Self {
        PivnetError::transport(err.to_string(), Some(err))
    }
}

/// A secret string (refresh credential or bearer token) that never shows up
/// in logs or debug output and is zeroed when dropped
pub struct SecureToken {
    token: String,
}

impl SecureToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self { token: token.into() }
    }

    /// Get a reference to the underlying secret
    pub fn as_str(&self) -> &str {
        &self.token
    }

    pub fn is_empty(&self) -> bool {
        self.token.is_empty()
    }
}

impl Deref for SecureToken {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.token
    }
}

impl Drop for SecureToken {
    fn drop(&mut self) {
        // Writing zero bytes keeps the buffer valid UTF-8
        unsafe {
            let bytes = self.token.as_bytes_mut();
            bytes.iter_mut().for_each(|b| *b = 0);
        }
    }
}

impl fmt::Debug for SecureToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecureToken([REDACTED])")
    }
}

impl fmt::Display for SecureToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED TOKEN]")
    }
}

impl Clone for SecureToken {
    fn clone(&self) -> Self {
        Self {
            token: self.token.clone(),
        }
    }
}

/// Error body convention of the service: `{"message": "..."}`.
///
/// Any JSON object is accepted; a missing `message` decodes as empty.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Error, Clone)]
pub enum PivnetError {
    /// Connection, DNS or timeout failure. Never carries a status code.
    #[error("request failed: {message}")]
    Transport {
        message: String,
        source: Option<ErrorSource>,
    },

    #[error("failed to fetch API token - received status {status}")]
    TokenFetch {
        status: u16,
    },

    #[error("failed to decode API token response: {message}")]
    TokenDecode {
        message: String,
        source: Option<ErrorSource>,
    },

    /// The service rejected the request with a structured `{"message"}` body
    #[error("Pivnet returned status code: {status} for the request - message: {message}")]
    Api {
        status: u16,
        message: String,
        response_body: Option<String>,
    },

    /// A body that should have been JSON of a known shape could not be parsed
    #[error("failed to decode response body (status {status}): {message}")]
    Decode {
        status: u16,
        message: String,
        raw: Vec<u8>,
    },

    #[error("invalid client configuration: {0}")]
    Configuration(String),

    #[error("validation error: {0}")]
    Validation(String),
}

impl PivnetError {
    pub fn transport<T: Into<String>>(
        message: T,
        source: Option<impl std::error::Error + Send + Sync + 'static>,
    ) -> Self {
        let error = Self::Transport {
            message: message.into(),
            source: source.map(|e| Arc::new(e) as ErrorSource),
        };
        log::error!("{}", error);
        error
    }

    pub fn token_fetch(status: u16) -> Self {
        let error = Self::TokenFetch { status };
        log::error!("{}", error);
        error
    }

    pub fn token_decode(source: serde_json::Error) -> Self {
        let error = Self::TokenDecode {
            message: source.to_string(),
            source: Some(Arc::new(source) as ErrorSource),
        };
        log::error!("{}", error);
        error
    }

    pub fn api_error<T: Into<String>>(
        status: u16,
        message: T,
        response_body: Option<String>,
    ) -> Self {
        let error = Self::Api {
            status,
            message: message.into(),
            response_body,
        };
        log::error!("{}", error);
        error
    }

    pub fn decode_error(status: u16, source: &serde_json::Error, raw: &[u8]) -> Self {
        let error = Self::Decode {
            status,
            message: source.to_string(),
            raw: raw.to_vec(),
        };
        log::error!("{}", error);
        error
    }

    /// HTTP status carried by the error, if the service answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::TokenFetch { status } => Some(*status),
            Self::Api { status, .. } => Some(*status),
            Self::Decode { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the service refused the presented credentials
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    pub fn source_error(&self) -> Option<&(dyn std::error::Error + Send + Sync)> {
        match self {
            Self::Transport { source, .. } => source.as_ref().map(|s| s.as_ref()),
            Self::TokenDecode { source, .. } => source.as_ref().map(|s| s.as_ref()),
            _ => None,
        }
    }
}
