// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication endpoint paths, relative to the API base URL.

pub const LOGIN: &str = "tickets/auth/login";
pub const LOGOUT: &str = "tickets/auth/logout";
pub const REFRESH: &str = "tickets/auth/refresh";
pub const FORGOT_PASSWORD: &str = "tickets/auth/forgot-password";
pub const PASSWORD_RESET: &str = "tickets/auth/password-reset";
pub const MFA_SETUP: &str = "tickets/auth/mfa-setup";
pub const MFA_VERIFY: &str = "tickets/auth/mfa-verify";
pub const MFA_CHALLENGE: &str = "tickets/auth/mfa-challenge";
pub const MFA_RECOVERY: &str = "tickets/auth/mfa-recovery";

/// Endpoints whose 401/403 means "bad credentials", not "stale token".
///
/// A failure on any of these is returned as-is and never triggers a silent
/// refresh. `mfa-setup` is absent on purpose: it is called from inside an
/// established session and recovers like any other protected call.
const DESIGNATED: &[&str] = &[
    LOGIN,
    LOGOUT,
    REFRESH,
    FORGOT_PASSWORD,
    PASSWORD_RESET,
    MFA_VERIFY,
    MFA_CHALLENGE,
    MFA_RECOVERY,
];

/// Path of the password reset endpoint for a reset token.
pub fn password_reset(token: &str) -> String {
    format!("{PASSWORD_RESET}/{token}")
}

/// Whether `path` is one of the designated auth endpoints.
///
/// Matches the endpoint itself and anything beneath it
/// (`tickets/auth/password-reset/<token>`), ignoring a leading `/` and any
/// query string.
pub fn is_auth_endpoint(path: &str) -> bool {
    let path = path.trim_start_matches('/');
    let path = path.split(['?', '#']).next().unwrap_or(path);

    DESIGNATED.iter().any(|endpoint| {
        path == *endpoint
            || path
                .strip_prefix(endpoint)
                .is_some_and(|rest| rest.starts_with('/'))
    })
}
