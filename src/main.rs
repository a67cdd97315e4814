// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Command-line front end for the helpdesk session core.
//!
//! Restores (or establishes) a session against the configured API and prints
//! how each path given on the command line would be guarded.
//!
//! ```text
//! HELPDESK_LOGIN_EMAIL=ada@example.com HELPDESK_LOGIN_PASSWORD=... \
//!     helpdesk-client /admin/users /manager /login
//! ```

use std::{env, process::ExitCode};

use helpdesk_client::{
    config::{LOGIN_EMAIL_ENV, LOGIN_PASSWORD_ENV},
    telemetry, ClientConfig, Credentials, GuardDecision, RouteTable, SessionStore,
};

#[tokio::main]
async fn main() -> ExitCode {
    let config = match ClientConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration [{}]: {e}", e.error_code());
            return ExitCode::FAILURE;
        }
    };
    telemetry::init(config.log_format);

    tracing::info!(base_url = %config.base_url, timeout = ?config.timeout, "Starting helpdesk client");

    let store = match SessionStore::new(&config) {
        Ok(store) => store,
        Err(e) => {
            tracing::error!(error = %e, code = e.error_code(), "Failed to build HTTP clients");
            return ExitCode::FAILURE;
        }
    };

    if !store.refresh_session().await {
        if let (Ok(email), Ok(password)) = (env::var(LOGIN_EMAIL_ENV), env::var(LOGIN_PASSWORD_ENV)) {
            match store.login(&Credentials::new(email, password)).await {
                Ok(success) if success.mfa_pending => {
                    tracing::warn!("Login needs a second factor; MFA is not available from the CLI");
                }
                Ok(success) if success.must_change_password => {
                    tracing::warn!("Login succeeded but the password must be changed");
                }
                Ok(_) => {}
                Err(failure) => {
                    tracing::error!(message = %failure.message, "Login failed");
                    return ExitCode::FAILURE;
                }
            }
        }
    }

    let session = store.snapshot();
    match session.role() {
        Some(role) if session.is_authenticated => {
            tracing::info!(role, dashboard = session.dashboard(), "Signed in");
        }
        _ if session.is_authenticated => tracing::info!("Signed in without a role"),
        _ => tracing::info!("Signed out"),
    }

    let table = RouteTable::helpdesk();
    let paths: Vec<String> = env::args().skip(1).collect();
    for path in &paths {
        match table.resolve(path, &session) {
            GuardDecision::Loading => println!("{path}: loading"),
            GuardDecision::Render => println!("{path}: render"),
            GuardDecision::Redirect(redirect) => match redirect.from {
                Some(from) => println!("{path}: redirect to {} (from {from})", redirect.to),
                None => println!("{path}: redirect to {}", redirect.to),
            },
        }
    }

    if session.is_authenticated && paths.is_empty() {
        println!("{}", session.dashboard());
    }

    ExitCode::SUCCESS
}
