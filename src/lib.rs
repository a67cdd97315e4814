// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Helpdesk Client - Session & Routing Core
//!
//! Client-side authentication core for the ticketing/helpdesk front end:
//! session state, bearer injection with one-shot silent refresh, and
//! role-based route guarding.
//!
//! ## Modules
//!
//! - `auth` - Token payload decoding, claims and roles
//! - `http` - Public and authenticated API clients (reqwest)
//! - `session` - Session state and the store that owns it
//! - `guard` - Protected/public route guards and the route table
//! - `resources` - CRUD clients for the ticketing resources
//! - `config` / `telemetry` - Environment configuration and tracing setup

pub mod auth;
pub mod config;
pub mod error;
pub mod guard;
pub mod http;
pub mod resources;
pub mod session;
pub mod telemetry;

#[cfg(test)]
mod testing;

pub use auth::{Claims, Role};
pub use config::ClientConfig;
pub use error::{ApiError, AuthFailure, ConfigError};
pub use guard::{GuardDecision, ProtectedRoute, PublicRoute, Redirect, RouteTable};
pub use http::{ApiRequest, AuthenticatedClient, Credentials, PublicClient};
pub use resources::{Resource, ResourceClient};
pub use session::{SessionSnapshot, SessionStore};
