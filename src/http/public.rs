// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Public client for endpoints that must never carry a bearer token.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{ApiRequest, Transport};
use crate::{auth::endpoints, error::ApiError};

/// Login credentials.
#[derive(Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Body returned by endpoints that issue a bearer token.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenResponse {
    #[serde(default, rename = "accessToken", alias = "access_token", alias = "token")]
    pub access_token: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl TokenResponse {
    /// Read a token response out of an arbitrary JSON body.
    ///
    /// Bodies that are not objects carry no token.
    pub fn from_value(value: &Value) -> Self {
        serde_json::from_value(value.clone()).unwrap_or_default()
    }

    /// The issued token, if present and non-blank.
    pub fn token(&self) -> Option<&str> {
        self.access_token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

/// Client without interceptors.
///
/// Used for login, logout, refresh, forgot-password and password-reset,
/// where a stale or missing token must not interfere.
#[derive(Debug, Clone)]
pub struct PublicClient {
    transport: Transport,
}

impl PublicClient {
    pub(crate) fn new(transport: Transport) -> Self {
        Self { transport }
    }

    /// Send an arbitrary request without credentials.
    pub async fn send(&self, request: ApiRequest) -> Result<Value, ApiError> {
        self.transport.execute(&request, None).await
    }

    /// `POST tickets/auth/login`
    pub async fn login(&self, credentials: &Credentials) -> Result<TokenResponse, ApiError> {
        let body = json!({
            "email": credentials.email,
            "password": credentials.password,
        });
        let value = self.send(ApiRequest::post(endpoints::LOGIN, body)).await?;
        Ok(TokenResponse::from_value(&value))
    }

    /// `GET tickets/auth/refresh` (driven by the refresh cookie)
    pub async fn refresh(&self) -> Result<TokenResponse, ApiError> {
        let value = self.send(ApiRequest::get(endpoints::REFRESH)).await?;
        Ok(TokenResponse::from_value(&value))
    }

    /// `GET tickets/auth/logout`
    pub async fn logout(&self) -> Result<(), ApiError> {
        self.send(ApiRequest::get(endpoints::LOGOUT)).await?;
        Ok(())
    }

    /// `POST tickets/auth/forgot-password`
    pub async fn forgot_password(&self, email: &str) -> Result<Value, ApiError> {
        self.send(ApiRequest::post(
            endpoints::FORGOT_PASSWORD,
            json!({ "email": email }),
        ))
        .await
    }

    /// `POST tickets/auth/password-reset/{token}`
    pub async fn reset_password(&self, token: &str, password: &str) -> Result<Value, ApiError> {
        self.send(ApiRequest::post(
            endpoints::password_reset(token),
            json!({ "password": password }),
        ))
        .await
    }
}
