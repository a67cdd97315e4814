// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session store: the single owner of session state.

use std::sync::Arc;

use serde::Serialize;
use serde_json::{json, Value};
use tokio::sync::watch;

use super::state::{Session, SessionShared, SessionSnapshot};
use crate::{
    auth::{endpoints, Claims},
    config::ClientConfig,
    error::{
        ApiError, AuthFailure, FORGOT_PASSWORD_FAILED, LOGIN_FAILED, MFA_CHALLENGE_FAILED,
        MFA_RECOVERY_FAILED, MFA_SETUP_FAILED, MFA_VERIFY_FAILED, RESET_PASSWORD_FAILED,
    },
    http::{self, ApiRequest, AuthenticatedClient, Credentials, PublicClient, TokenResponse},
    resources::{Resource, ResourceClient},
};

/// Successful login.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoginSuccess {
    /// Decoded claims of the issued token
    pub user: Claims,
    /// A second factor must be entered before the session is usable
    pub mfa_pending: bool,
    /// The account has MFA enrolled
    pub mfa_enabled: bool,
    /// The user must set a new password first
    pub must_change_password: bool,
}

impl LoginSuccess {
    fn from_claims(user: Claims) -> Self {
        Self {
            mfa_pending: user.mfa_pending,
            mfa_enabled: user.mfa_enabled,
            must_change_password: user.must_change_password,
            user,
        }
    }
}

/// Successful MFA exchange.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MfaSuccess {
    /// Claims of the token issued by the exchange, if one was issued
    pub user: Option<Claims>,
    /// Raw response body
    pub payload: Value,
}

/// Owner of the session and of both HTTP clients.
///
/// All session mutations go through these methods. Each operation awaits its
/// network call first and then applies its state change as one write, so no
/// caller can observe a half-updated session.
pub struct SessionStore {
    shared: Arc<SessionShared>,
    public: PublicClient,
    api: AuthenticatedClient,
}

impl SessionStore {
    /// Build the store, its clients, and attach the interceptor pair.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let (public_transport, authenticated_transport) = http::build_transports(config)?;
        let public = PublicClient::new(public_transport);
        let shared = Arc::new(SessionShared::new());
        let api = AuthenticatedClient::new(
            authenticated_transport,
            public.clone(),
            Arc::downgrade(&shared),
        );

        Ok(Self {
            shared,
            public,
            api,
        })
    }

    /// Current session state.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.shared.snapshot()
    }

    /// Receiver notified on every session change.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.shared.subscribe()
    }

    /// Client for protected endpoints, carrying the interceptor pair.
    pub fn api(&self) -> AuthenticatedClient {
        self.api.clone()
    }

    /// Client for one REST resource family.
    pub fn resource(&self, resource: Resource) -> ResourceClient {
        ResourceClient::new(self.api(), resource)
    }

    /// Try to restore the session from the refresh cookie.
    ///
    /// Returns whether a session was restored. Loading ends either way. A
    /// session established by a login that finishes first is kept.
    pub async fn refresh_session(&self) -> bool {
        let started_with = self.shared.access_token();
        let fetched = match self.shared.fetch_refreshed(&self.public).await {
            Ok(token) => Some(token),
            Err(e) => {
                tracing::debug!(error = %e, "No session to restore");
                None
            }
        };

        match self
            .shared
            .finish_restore(started_with.as_deref(), fetched.as_deref())
        {
            Some(claims) => {
                tracing::info!(role = claims.role.as_deref(), "Session restored");
                true
            }
            None => false,
        }
    }

    /// Log in with credentials.
    pub async fn login(&self, credentials: &Credentials) -> Result<LoginSuccess, AuthFailure> {
        let response = self.public.login(credentials).await.map_err(|e| {
            tracing::debug!(error = %e, "Login rejected");
            AuthFailure::from_api_error(&e, LOGIN_FAILED)
        })?;

        let claims = response
            .token()
            .and_then(|token| self.shared.establish(token))
            .ok_or_else(|| {
                tracing::warn!("Login response did not carry a usable token");
                AuthFailure::new(LOGIN_FAILED)
            })?;

        tracing::info!(
            role = claims.role.as_deref(),
            mfa_pending = claims.mfa_pending,
            "Logged in"
        );
        Ok(LoginSuccess::from_claims(claims))
    }

    /// Log out. Always ends with an empty session.
    pub async fn logout(&self) {
        if let Err(e) = self.public.logout().await {
            tracing::warn!(error = %e, "Logout request failed, clearing session anyway");
        }
        self.shared.clear();
        tracing::info!("Logged out");
    }

    /// Complete a login that is waiting for a second factor.
    pub async fn mfa_challenge(&self, code: &str) -> Result<MfaSuccess, AuthFailure> {
        self.mfa_exchange(endpoints::MFA_CHALLENGE, code, MFA_CHALLENGE_FAILED)
            .await
    }

    /// Confirm MFA enrollment with a code from the authenticator.
    pub async fn mfa_verify(&self, code: &str) -> Result<MfaSuccess, AuthFailure> {
        self.mfa_exchange(endpoints::MFA_VERIFY, code, MFA_VERIFY_FAILED)
            .await
    }

    /// Complete a pending second factor with a recovery code.
    pub async fn mfa_recovery(&self, code: &str) -> Result<MfaSuccess, AuthFailure> {
        self.mfa_exchange(endpoints::MFA_RECOVERY, code, MFA_RECOVERY_FAILED)
            .await
    }

    /// Start MFA enrollment. Returns the enrollment material; the session is untouched.
    pub async fn mfa_setup(&self) -> Result<Value, AuthFailure> {
        self.api
            .send(ApiRequest::get(endpoints::MFA_SETUP))
            .await
            .map_err(|e| AuthFailure::from_api_error(&e, MFA_SETUP_FAILED))
    }

    /// Ask for a password reset link. Returns the server's message, if any.
    pub async fn forgot_password(&self, email: &str) -> Result<Option<String>, AuthFailure> {
        self.public
            .forgot_password(email)
            .await
            .map(|body| response_message(&body))
            .map_err(|e| AuthFailure::from_api_error(&e, FORGOT_PASSWORD_FAILED))
    }

    /// Set a new password using a reset link token.
    pub async fn reset_password(
        &self,
        token: &str,
        password: &str,
    ) -> Result<Option<String>, AuthFailure> {
        self.public
            .reset_password(token, password)
            .await
            .map(|body| response_message(&body))
            .map_err(|e| AuthFailure::from_api_error(&e, RESET_PASSWORD_FAILED))
    }

    async fn mfa_exchange(
        &self,
        path: &str,
        code: &str,
        fallback: &str,
    ) -> Result<MfaSuccess, AuthFailure> {
        let payload = self
            .api
            .send(ApiRequest::post(path, json!({ "code": code })))
            .await
            .map_err(|e| AuthFailure::from_api_error(&e, fallback))?;

        let response = TokenResponse::from_value(&payload);
        let user = match response.token() {
            Some(token) => Some(
                self.shared
                    .establish(token)
                    .ok_or_else(|| AuthFailure::new(fallback))?,
            ),
            None => None,
        };

        Ok(MfaSuccess { user, payload })
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let snapshot = self.snapshot();
        f.debug_struct("SessionStore")
            .field("is_authenticated", &snapshot.is_authenticated)
            .field("loading", &snapshot.loading)
            .finish()
    }
}

fn response_message(body: &Value) -> Option<String> {
    body.get("message").and_then(Value::as_str).map(str::to_string)
}
