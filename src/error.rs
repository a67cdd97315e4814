// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Client error types.

use reqwest::StatusCode;
use serde::Serialize;

/// Error returned by the HTTP layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request never produced a response (connect, timeout, TLS, ...)
    #[error("request to {path} failed: {source}")]
    Transport {
        path: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status
    #[error("{path} returned {status}")]
    Status {
        path: String,
        status: StatusCode,
        /// `message` field of the error body, if the server sent one
        message: Option<String>,
    },

    /// The response body could not be used
    #[error("invalid response from {path}: {reason}")]
    InvalidResponse { path: String, reason: String },

    /// The endpoint path could not be joined onto the base URL
    #[error("invalid endpoint path '{0}'")]
    InvalidPath(String),

    /// The HTTP client could not be constructed
    #[error("failed to build HTTP client: {0}")]
    Build(String),
}

impl ApiError {
    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::Transport { .. } => "transport_error",
            ApiError::Status { .. } => "http_status",
            ApiError::InvalidResponse { .. } => "invalid_response",
            ApiError::InvalidPath(_) => "invalid_path",
            ApiError::Build(_) => "client_build_error",
        }
    }

    /// HTTP status of the failed response, if there was one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Message supplied by the server in the error body.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Status { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    /// Whether this is an authorization failure (401 or 403).
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self.status(),
            Some(StatusCode::UNAUTHORIZED) | Some(StatusCode::FORBIDDEN)
        )
    }
}

/// Fallback message for a failed login.
pub const LOGIN_FAILED: &str = "Login failed";
/// Fallback message for a failed MFA challenge.
pub const MFA_CHALLENGE_FAILED: &str = "MFA challenge failed";
/// Fallback message for a failed MFA verification.
pub const MFA_VERIFY_FAILED: &str = "MFA verification failed";
/// Fallback message for a failed MFA enrollment request.
pub const MFA_SETUP_FAILED: &str = "MFA setup failed";
/// Fallback message for a failed MFA recovery-code login.
pub const MFA_RECOVERY_FAILED: &str = "MFA recovery failed";
/// Fallback message for a failed forgot-password request.
pub const FORGOT_PASSWORD_FAILED: &str = "Password reset request failed";
/// Fallback message for a failed password reset.
pub const RESET_PASSWORD_FAILED: &str = "Password reset failed";

/// Structured failure returned by session operations.
///
/// Session operations never surface raw transport errors to the caller.
/// The message prefers what the server said and otherwise falls back to a
/// fixed per-operation string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{message}")]
pub struct AuthFailure {
    /// Message suitable for inline display
    pub message: String,
    /// HTTP status, when the server answered at all
    #[serde(skip)]
    pub status: Option<StatusCode>,
}

impl AuthFailure {
    /// Failure with a fixed message and no status.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: None,
        }
    }

    /// Convert an HTTP error, preferring the server-supplied message.
    pub fn from_api_error(error: &ApiError, fallback: &str) -> Self {
        let message = error
            .server_message()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(fallback)
            .to_string();

        Self {
            message,
            status: error.status(),
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid base URL '{value}': {reason}")]
    InvalidBaseUrl { value: String, reason: String },

    #[error("invalid value '{value}' for {name}")]
    InvalidValue { name: &'static str, value: String },
}

impl ConfigError {
    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            ConfigError::InvalidBaseUrl { .. } => "invalid_base_url",
            ConfigError::InvalidValue { .. } => "invalid_value",
        }
    }
}
