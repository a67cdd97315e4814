// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! HTTP transport shared by the public and authenticated clients.
//!
//! Both clients are built from the same [`ClientConfig`]: same base URL, same
//! timeout and the same cookie jar, so the httpOnly refresh cookie set by
//! `login` is replayed by `refresh`.

use std::sync::Arc;

use reqwest::{cookie::Jar, Method};
use serde_json::Value;
use tracing::Instrument;
use url::Url;
use uuid::Uuid;

use crate::{config::ClientConfig, error::ApiError};

pub mod authenticated;
pub mod public;

pub use authenticated::AuthenticatedClient;
pub use public::{Credentials, PublicClient, TokenResponse};

/// Correlation header attached to every outgoing request.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Description of a single API call.
///
/// The request is rebuilt for every attempt so a retry picks up the latest
/// bearer token. `retried` is the per-request marker that limits silent
/// refresh to one attempt.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path: String,
    body: Option<Value>,
    query: Vec<(String, String)>,
    retried: bool,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            query: Vec::new(),
            retried: false,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::POST, path).with_body(body)
    }

    pub fn put(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::PUT, path).with_body(body)
    }

    pub fn patch(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::PATCH, path).with_body(body)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Attach a JSON body.
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Append a query parameter.
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    /// Whether this request has already been retried after a refresh.
    pub fn is_retried(&self) -> bool {
        self.retried
    }

    pub(crate) fn mark_retried(&mut self) {
        self.retried = true;
    }
}

/// One configured `reqwest` client bound to the API base URL.
#[derive(Debug, Clone)]
pub(crate) struct Transport {
    http: reqwest::Client,
    base_url: Url,
}

impl Transport {
    fn new(config: &ClientConfig, jar: Arc<Jar>) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .cookie_provider(jar)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ApiError::Build(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
        })
    }

    /// Resolve an endpoint path against the base URL.
    ///
    /// Only paths that stay beneath the base URL are accepted: absolute URLs,
    /// backslashes and `.`/`..` segments (encoded or not) are rejected, so the
    /// bearer never leaves the API and auth endpoints cannot be reached under
    /// another name.
    pub(crate) fn url(&self, path: &str) -> Result<Url, ApiError> {
        let invalid = || ApiError::InvalidPath(path.to_string());
        let relative = path.trim_start_matches('/');
        let path_part = relative.split(['?', '#']).next().unwrap_or(relative);

        if relative.contains("://")
            || path_part.contains('\\')
            || path_part.split('/').any(is_dot_segment)
        {
            return Err(invalid());
        }

        let url = self.base_url.join(relative).map_err(|_| invalid())?;
        if !url.as_str().starts_with(self.base_url.as_str()) {
            return Err(invalid());
        }
        Ok(url)
    }

    /// Send `request`, optionally with a bearer token, and read the JSON body.
    pub(crate) async fn execute(
        &self,
        request: &ApiRequest,
        bearer: Option<&str>,
    ) -> Result<Value, ApiError> {
        let url = self.url(&request.path)?;
        let request_id = Uuid::new_v4();

        let span = tracing::debug_span!(
            "api_request",
            method = %request.method,
            path = %request.path,
            req_id = %request_id,
            retried = request.retried,
        );

        async move {
            let mut builder = self
                .http
                .request(request.method.clone(), url)
                .header(REQUEST_ID_HEADER, request_id.to_string());

            if !request.query.is_empty() {
                builder = builder.query(&request.query);
            }
            if let Some(token) = bearer {
                builder = builder.bearer_auth(token);
            }
            if let Some(body) = &request.body {
                builder = builder.json(body);
            }

            let response = builder.send().await.map_err(|source| ApiError::Transport {
                path: request.path.clone(),
                source,
            })?;

            read_response(&request.path, response).await
        }
        .instrument(span)
        .await
    }
}

fn is_dot_segment(segment: &str) -> bool {
    let decoded = segment.to_ascii_lowercase().replace("%2e", ".");
    decoded == "." || decoded == ".."
}

/// Build the two transports over one shared cookie jar.
///
/// The first is for the public client, the second for the authenticated one.
pub(crate) fn build_transports(config: &ClientConfig) -> Result<(Transport, Transport), ApiError> {
    let jar = Arc::new(Jar::default());
    let public = Transport::new(config, Arc::clone(&jar))?;
    let authenticated = Transport::new(config, jar)?;
    Ok((public, authenticated))
}

/// Turn a response into JSON or an [`ApiError`].
async fn read_response(path: &str, response: reqwest::Response) -> Result<Value, ApiError> {
    let status = response.status();
    let bytes = response.bytes().await.map_err(|source| ApiError::Transport {
        path: path.to_string(),
        source,
    })?;

    if !status.is_success() {
        let message = serde_json::from_slice::<Value>(&bytes)
            .ok()
            .and_then(|body| error_message(&body));
        tracing::debug!(%status, message = message.as_deref(), "API returned error status");
        return Err(ApiError::Status {
            path: path.to_string(),
            status,
            message,
        });
    }

    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }

    serde_json::from_slice(&bytes).map_err(|e| ApiError::InvalidResponse {
        path: path.to_string(),
        reason: format!("invalid JSON: {e}"),
    })
}

/// Pull a human-readable message out of an error body.
fn error_message(body: &Value) -> Option<String> {
    body.get("message")
        .or_else(|| body.get("error"))
        .and_then(Value::as_str)
        .map(str::to_string)
}
