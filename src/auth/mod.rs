// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Client-side view of helpdesk authentication.
//!
//! ## Auth Flow
//!
//! 1. The user logs in through the public client (`tickets/auth/login`)
//! 2. The API answers with a bearer token and sets an httpOnly refresh cookie
//! 3. The client:
//!    - decodes the token payload into [`Claims`] (no signature check)
//!    - reads `role` to pick the user's dashboard
//!    - reads the MFA / password-change flags to drive the next screen
//! 4. When a protected call fails with 401/403, the cookie is exchanged for a
//!    new token via `tickets/auth/refresh` and the call is retried once
//!
//! ## Security
//!
//! - Signatures are verified by the API, never by this crate
//! - The refresh cookie never leaves the cookie jar

pub mod claims;
pub mod endpoints;
pub mod error;
pub mod roles;
pub mod token;

pub use claims::Claims;
pub use error::TokenError;
pub use roles::{dashboard_for, Role};
pub use token::{decode_claims, try_decode_claims};
