//! HTTP transport to the backend.
//!
//! [`Transport`] is the seam the executor and CRUD client talk to. The real
//! implementation wraps `reqwest` with a cookie jar holding the HTTP-only
//! `auth_token` the backend sets on login. The jar's cookie header for the API
//! origin can be persisted to a file so separate CLI invocations share one
//! backend session. The token itself is never handed to the rest of the crate.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use reqwest::cookie::{CookieStore, Jar};
use serde_json::Value;

use super::endpoint::Method;
use crate::errors::{FieldError, StateError, TransportError};
use crate::state::storage::write_private;

/// One request against the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub url: String,
    pub method: Method,
    pub body: Option<Value>,
    /// Query pairs; absent optional values are never added here.
    pub query: Vec<(String, String)>,
}

impl ApiRequest {
    pub fn new(url: impl Into<String>, method: Method) -> Self {
        Self {
            url: url.into(),
            method,
            body: None,
            query: Vec::new(),
        }
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_query(mut self, query: Vec<(String, String)>) -> Self {
        self.query = query;
        self
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// Send the request and return the decoded JSON body (`Value::Null` when empty).
    async fn send(&self, request: ApiRequest) -> Result<Value, TransportError>;

    /// Drop locally held credentials such as the session cookie.
    fn clear_credentials(&self) -> Result<(), StateError> {
        Ok(())
    }
}

/// Settings for [`ReqwestTransport`].
#[derive(Debug, Clone)]
pub struct TransportSettings {
    pub base_url: String,
    /// Send and keep cookies (the backend's auth cookie).
    pub with_credentials: bool,
    /// No timeout when `None`; a stuck call never resolves.
    pub timeout: Option<Duration>,
    /// Where the cookie header is persisted between runs.
    pub cookie_file: Option<PathBuf>,
}

pub struct ReqwestTransport {
    client: reqwest::Client,
    jar: Option<Arc<Jar>>,
    origin: Url,
    cookie_file: Option<PathBuf>,
}

impl ReqwestTransport {
    pub fn new(settings: &TransportSettings) -> anyhow::Result<Self> {
        use anyhow::Context;

        let origin = Url::parse(&settings.base_url)
            .with_context(|| format!("Invalid API base URL: {}", settings.base_url))?;

        let mut builder = reqwest::Client::builder().user_agent("adminhub");
        if let Some(timeout) = settings.timeout {
            builder = builder.timeout(timeout);
        }

        let jar = if settings.with_credentials {
            let jar = Arc::new(Jar::default());
            builder = builder.cookie_provider(jar.clone());
            Some(jar)
        } else {
            None
        };

        let client = builder.build().context("Failed to build HTTP client")?;
        let transport = Self {
            client,
            jar,
            origin,
            cookie_file: settings.cookie_file.clone(),
        };
        transport.restore_cookies()?;
        Ok(transport)
    }

    /// Load the persisted cookie header into the jar, if present.
    fn restore_cookies(&self) -> Result<(), StateError> {
        let (Some(jar), Some(path)) = (&self.jar, &self.cookie_file) else {
            return Ok(());
        };
        if !path.exists() {
            return Ok(());
        }
        let header = std::fs::read_to_string(path).map_err(|source| StateError::ReadFailed {
            path: path.clone(),
            source,
        })?;
        for pair in header.split(';').map(str::trim).filter(|p| !p.is_empty()) {
            jar.add_cookie_str(&format!("{}; Path=/", pair), &self.origin);
        }
        tracing::debug!(path = %path.display(), "restored backend session cookies");
        Ok(())
    }

    /// Write the jar's cookie header for the API origin, or remove the file when empty.
    pub fn persist_cookies(&self) -> Result<(), StateError> {
        let (Some(jar), Some(path)) = (&self.jar, &self.cookie_file) else {
            return Ok(());
        };
        let header = jar
            .cookies(&self.origin)
            .and_then(|value| value.to_str().ok().map(str::to_string))
            .unwrap_or_default();

        if header.is_empty() {
            if path.exists() {
                std::fs::remove_file(path).map_err(|source| StateError::WriteFailed {
                    path: path.clone(),
                    source,
                })?;
            }
            return Ok(());
        }

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|source| StateError::WriteFailed {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        write_private(path, header.as_bytes()).map_err(|source| StateError::WriteFailed {
            path: path.clone(),
            source,
        })
    }

    /// Forget the persisted session cookie (local logout).
    pub fn forget_cookies(&self) -> Result<(), StateError> {
        match &self.cookie_file {
            Some(path) if path.exists() => {
                std::fs::remove_file(path).map_err(|source| StateError::WriteFailed {
                    path: path.clone(),
                    source,
                })
            }
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: ApiRequest) -> Result<Value, TransportError> {
        let url = request.url.clone();
        tracing::debug!(method = %request.method, %url, "sending request");

        let mut builder = self.client.request(request.method.into(), &request.url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let resp = builder
            .send()
            .await
            .map_err(|source| TransportError::Network {
                url: url.clone(),
                source,
            })?;

        let status = resp.status();
        let sets_cookie = resp.headers().contains_key(reqwest::header::SET_COOKIE);
        let bytes = resp
            .bytes()
            .await
            .map_err(|source| TransportError::Network {
                url: url.clone(),
                source,
            })?;

        if sets_cookie && let Err(e) = self.persist_cookies() {
            tracing::warn!(error = %e, "failed to persist session cookies");
        }

        if !status.is_success() {
            let body: Option<Value> = serde_json::from_slice(&bytes).ok();
            let (server_message, field_errors) = error_details(body.as_ref());
            tracing::debug!(status = status.as_u16(), %url, "request failed");
            return Err(TransportError::Status {
                url,
                status: status.as_u16(),
                server_message,
                field_errors,
            });
        }

        if bytes.is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_slice(&bytes).map_err(|e| TransportError::Decode {
            url,
            message: e.to_string(),
        })
    }

    fn clear_credentials(&self) -> Result<(), StateError> {
        self.forget_cookies()
    }
}

/// Pull `message` and `errors: [{key, message}]` out of an error body.
fn error_details(body: Option<&Value>) -> (Option<String>, Vec<FieldError>) {
    let Some(body) = body else {
        return (None, Vec::new());
    };
    let message = body
        .get("message")
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty())
        .map(str::to_string);
    let errors = body
        .get("errors")
        .and_then(|e| serde_json::from_value::<Vec<FieldError>>(e.clone()).ok())
        .unwrap_or_default();
    (message, errors)
}
