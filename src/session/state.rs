// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session state and the shared token cell.

use serde::Serialize;
use tokio::sync::{watch, Mutex};

use crate::{
    auth::{decode_claims, dashboard_for, endpoints, Claims},
    error::ApiError,
    http::PublicClient,
};

/// Current session.
///
/// `user` is only ever set together with the token it was decoded from, so a
/// session is authenticated exactly when it has claims.
#[derive(Debug, Clone)]
pub struct Session {
    access_token: Option<String>,
    user: Option<Claims>,
    loading: bool,
}

impl Session {
    /// Empty session, still waiting for the startup restore attempt.
    pub fn new() -> Self {
        Self {
            access_token: None,
            user: None,
            loading: true,
        }
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    pub fn user(&self) -> Option<&Claims> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            access_token: self.access_token.clone(),
            user: self.user.clone(),
            is_authenticated: self.is_authenticated(),
            loading: self.loading,
        }
    }

    /// Adopt `token` if it decodes, ending loading. Returns the decoded claims.
    ///
    /// Claims only ever come from the stored token, so a token without a
    /// user (or the reverse) cannot be stored.
    fn establish(&mut self, token: &str) -> Option<Claims> {
        let claims = decode_claims(token)?;
        self.access_token = Some(token.to_string());
        self.user = Some(claims.clone());
        self.loading = false;
        Some(claims)
    }

    fn clear(&mut self) {
        self.access_token = None;
        self.user = None;
        self.loading = false;
    }

    fn holds(&self, token: Option<&str>) -> bool {
        self.access_token.as_deref() == token
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time copy of the session handed to consumers.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SessionSnapshot {
    #[serde(skip_serializing)]
    pub access_token: Option<String>,
    pub user: Option<Claims>,
    pub is_authenticated: bool,
    pub loading: bool,
}

impl SessionSnapshot {
    /// Snapshot taken before the startup restore attempt finished.
    pub fn loading() -> Self {
        Self {
            loading: true,
            ..Self::default()
        }
    }

    /// Resolved, signed-out snapshot.
    pub fn signed_out() -> Self {
        Self::default()
    }

    /// Resolved, signed-in snapshot.
    pub fn signed_in(token: impl Into<String>, claims: Claims) -> Self {
        Self {
            access_token: Some(token.into()),
            user: Some(claims),
            is_authenticated: true,
            loading: false,
        }
    }

    /// Role name of the signed-in user.
    pub fn role(&self) -> Option<&str> {
        self.user.as_ref().and_then(|u| u.role.as_deref())
    }

    /// Dashboard path for the signed-in user's role.
    pub fn dashboard(&self) -> &'static str {
        dashboard_for(self.role())
    }
}

/// State shared between the session store and the authenticated client.
///
/// The watch sender is the token holder: writes are synchronous
/// `send_modify` calls and reads borrow the latest value, so the interceptor
/// never sees a stale token. Receivers are notified of every change.
#[derive(Debug)]
pub(crate) struct SessionShared {
    cell: watch::Sender<Session>,
    refresh_gate: Mutex<()>,
}

impl SessionShared {
    pub(crate) fn new() -> Self {
        let (cell, _) = watch::channel(Session::new());
        Self {
            cell,
            refresh_gate: Mutex::new(()),
        }
    }

    pub(crate) fn snapshot(&self) -> SessionSnapshot {
        self.cell.borrow().snapshot()
    }

    pub(crate) fn access_token(&self) -> Option<String> {
        self.cell.borrow().access_token.clone()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<Session> {
        self.cell.subscribe()
    }

    /// Adopt `token` if it decodes; otherwise leave the session untouched.
    pub(crate) fn establish(&self, token: &str) -> Option<Claims> {
        let mut established = None;
        self.cell.send_if_modified(|s| {
            established = s.establish(token);
            established.is_some()
        });
        established
    }

    pub(crate) fn clear(&self) {
        self.cell.send_modify(Session::clear);
    }

    /// Apply the outcome of a restore attempt and end loading in one write.
    ///
    /// `started_with` is the token held when the attempt began. If the session
    /// moved on meanwhile (a login, an MFA exchange, a logout), the newer
    /// state wins and only loading ends.
    pub(crate) fn finish_restore(
        &self,
        started_with: Option<&str>,
        fetched: Option<&str>,
    ) -> Option<Claims> {
        let mut restored = None;
        self.cell.send_modify(|s| {
            s.loading = false;
            if !s.holds(started_with) {
                return;
            }
            restored = fetched.and_then(|token| s.establish(token));
            if restored.is_none() {
                s.clear();
            }
        });
        restored
    }

    /// Exchange the refresh cookie for a new token, without touching state.
    pub(crate) async fn fetch_refreshed(&self, public: &PublicClient) -> Result<String, ApiError> {
        let _gate = self.refresh_gate.lock().await;
        fetch_token(public).await
    }

    /// Refresh on behalf of a request that was rejected while holding `stale`.
    ///
    /// Refreshes are serialised. If another request already replaced `stale`
    /// while this one waited, the newer token is reused instead of refreshing
    /// again. On failure the session is cleared, unless it was replaced while
    /// the refresh was in flight.
    pub(crate) async fn refresh_after(
        &self,
        stale: Option<&str>,
        public: &PublicClient,
    ) -> Result<String, ApiError> {
        let _gate = self.refresh_gate.lock().await;

        if let Some(current) = self.access_token() {
            if stale != Some(current.as_str()) {
                tracing::debug!("Session already refreshed by a concurrent request");
                return Ok(current);
            }
        }

        let fetched = fetch_token(public).await;

        let mut settled = Settled::Failed;
        self.cell.send_modify(|s| {
            if !s.holds(stale) {
                settled = Settled::Superseded(s.access_token.clone());
            } else if let Some(token) = fetched
                .as_ref()
                .ok()
                .filter(|token| s.establish(token.as_str()).is_some())
            {
                settled = Settled::Refreshed(token.clone());
            } else {
                s.clear();
            }
        });

        match settled {
            Settled::Refreshed(token) => Ok(token),
            Settled::Superseded(Some(current)) => {
                tracing::debug!("Session replaced while refreshing, keeping the newer token");
                Ok(current)
            }
            Settled::Superseded(None) => fetched,
            Settled::Failed => {
                let error = match fetched {
                    Err(e) => e,
                    Ok(_) => undecodable(),
                };
                tracing::warn!(error = %error, "Silent refresh failed, clearing session");
                Err(error)
            }
        }
    }
}

/// How a refresh landed in the session cell.
enum Settled {
    Refreshed(String),
    /// The session no longer held the stale token; carries what it holds now
    Superseded(Option<String>),
    Failed,
}

fn undecodable() -> ApiError {
    ApiError::InvalidResponse {
        path: endpoints::REFRESH.to_string(),
        reason: "access token could not be decoded".to_string(),
    }
}

async fn fetch_token(public: &PublicClient) -> Result<String, ApiError> {
    let response = public.refresh().await?;

    response
        .token()
        .map(str::to_string)
        .ok_or_else(|| ApiError::InvalidResponse {
            path: endpoints::REFRESH.to_string(),
            reason: "response did not include an access token".to_string(),
        })
}
