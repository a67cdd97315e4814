// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names and default values used
//! by the helpdesk client. Configuration is loaded from the environment
//! at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HELPDESK_API_BASE_URL` | Base URL of the ticketing API | `http://localhost:5000/api/` |
//! | `HELPDESK_HTTP_TIMEOUT_SECS` | Per-request timeout in seconds | `10` |
//! | `HELPDESK_LOGIN_EMAIL` | Login email used by the binary when no session can be restored | - |
//! | `HELPDESK_LOGIN_PASSWORD` | Login password used by the binary | - |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,helpdesk_client=debug` |

use std::{env, time::Duration};

use url::Url;

use crate::error::ConfigError;

/// Environment variable name for the API base URL.
///
/// Every endpoint path (`tickets/auth/login`, `tickets/ticket`, ...) is
/// joined onto this URL, so it always ends up with a trailing `/`.
pub const API_BASE_URL_ENV: &str = "HELPDESK_API_BASE_URL";

/// Environment variable name for the HTTP timeout, in whole seconds.
pub const HTTP_TIMEOUT_ENV: &str = "HELPDESK_HTTP_TIMEOUT_SECS";

/// Environment variable name for the login email (binary only).
pub const LOGIN_EMAIL_ENV: &str = "HELPDESK_LOGIN_EMAIL";

/// Environment variable name for the login password (binary only).
pub const LOGIN_PASSWORD_ENV: &str = "HELPDESK_LOGIN_PASSWORD";

/// Environment variable name for the log output format.
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Default API base URL.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000/api/";

/// Default HTTP timeout.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable multi-line output
    #[default]
    Pretty,
    /// One JSON object per line
    Json,
}

impl LogFormat {
    /// Parse a format name (case-insensitive). Unknown names fall back to pretty.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

/// Client configuration shared by the public and authenticated HTTP clients.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API base URL (always ends with `/`)
    pub base_url: Url,
    /// Timeout applied to every request
    pub timeout: Duration,
    /// Log output format
    pub log_format: LogFormat,
}

impl ClientConfig {
    /// Build a configuration for the given base URL with default settings.
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: normalize_base_url(base_url)?,
            timeout: DEFAULT_HTTP_TIMEOUT,
            log_format: LogFormat::default(),
        })
    }

    /// Load configuration from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = env::var(API_BASE_URL_ENV).unwrap_or_else(|_| DEFAULT_API_BASE_URL.into());

        let timeout = match env::var(HTTP_TIMEOUT_ENV) {
            Ok(raw) => {
                let secs: u64 = raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                    name: HTTP_TIMEOUT_ENV,
                    value: raw.clone(),
                })?;
                if secs == 0 {
                    return Err(ConfigError::InvalidValue {
                        name: HTTP_TIMEOUT_ENV,
                        value: raw,
                    });
                }
                Duration::from_secs(secs)
            }
            Err(_) => DEFAULT_HTTP_TIMEOUT,
        };

        let log_format = env::var(LOG_FORMAT_ENV)
            .map(|v| LogFormat::from_name(&v))
            .unwrap_or_default();

        Ok(Self {
            base_url: normalize_base_url(&base_url)?,
            timeout,
            log_format,
        })
    }

    /// Override the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Parse the base URL and make sure relative endpoint paths join beneath it.
fn normalize_base_url(raw: &str) -> Result<Url, ConfigError> {
    let trimmed = raw.trim();
    let with_slash = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    };

    let url = Url::parse(&with_slash).map_err(|e| ConfigError::InvalidBaseUrl {
        value: raw.to_string(),
        reason: e.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::InvalidBaseUrl {
            value: raw.to_string(),
            reason: format!("unsupported scheme '{other}'"),
        }),
    }
}
