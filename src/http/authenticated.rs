// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authenticated client with the bearer/refresh interceptor pair.
//!
//! ## Request phase
//!
//! The latest token is read from the session cell at send time, so a token
//! written by `login` or a refresh is visible to the very next request.
//!
//! ## Response phase
//!
//! A 401/403 from a protected endpoint is recovered once:
//!
//! 1. mark the request as retried
//! 2. refresh the session (single-flight, see [`SessionShared::refresh_after`])
//! 3. resend with the new bearer; that result is the caller's result
//!
//! If the refresh fails the session is cleared and the refresh error is
//! returned. Designated auth endpoints and already-retried requests are
//! never refreshed.
//!
//! The client only holds a weak reference to the session. Once the owning
//! [`SessionStore`](crate::session::SessionStore) is dropped the interceptors
//! are gone: requests go out without a bearer and failures pass through.

use std::sync::Weak;

use serde_json::Value;

use super::{ApiRequest, PublicClient, Transport};
use crate::{auth::endpoints::is_auth_endpoint, error::ApiError, session::state::SessionShared};

/// Client that injects the session's bearer token and silently refreshes it.
#[derive(Debug, Clone)]
pub struct AuthenticatedClient {
    transport: Transport,
    public: PublicClient,
    session: Weak<SessionShared>,
}

impl AuthenticatedClient {
    pub(crate) fn new(
        transport: Transport,
        public: PublicClient,
        session: Weak<SessionShared>,
    ) -> Self {
        Self {
            transport,
            public,
            session,
        }
    }

    /// Whether the owning session is still alive (interceptors attached).
    pub fn is_attached(&self) -> bool {
        self.session.strong_count() > 0
    }

    /// Send a request through the interceptor pair.
    pub async fn send(&self, mut request: ApiRequest) -> Result<Value, ApiError> {
        loop {
            let session = self.session.upgrade();
            let token = session.as_ref().and_then(|s| s.access_token());

            let error = match self.transport.execute(&request, token.as_deref()).await {
                Ok(value) => return Ok(value),
                Err(error) => error,
            };

            let Some(session) = session else {
                return Err(error);
            };

            if !error.is_unauthorized() || is_auth_endpoint(request.path()) || request.is_retried()
            {
                return Err(error);
            }

            request.mark_retried();
            tracing::debug!(
                path = %request.path(),
                status = ?error.status(),
                "Protected request rejected, refreshing session"
            );

            session.refresh_after(token.as_deref(), &self.public).await?;
            tracing::debug!(path = %request.path(), "Session refreshed, resubmitting request");
        }
    }

    pub async fn get(&self, path: impl Into<String>) -> Result<Value, ApiError> {
        self.send(ApiRequest::get(path)).await
    }

    pub async fn post(&self, path: impl Into<String>, body: Value) -> Result<Value, ApiError> {
        self.send(ApiRequest::post(path, body)).await
    }

    pub async fn put(&self, path: impl Into<String>, body: Value) -> Result<Value, ApiError> {
        self.send(ApiRequest::put(path, body)).await
    }

    pub async fn patch(&self, path: impl Into<String>, body: Value) -> Result<Value, ApiError> {
        self.send(ApiRequest::patch(path, body)).await
    }

    pub async fn delete(&self, path: impl Into<String>) -> Result<Value, ApiError> {
        self.send(ApiRequest::delete(path)).await
    }
}
