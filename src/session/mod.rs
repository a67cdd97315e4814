// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session state and its owning store.

pub mod state;
pub mod store;

pub use state::{Session, SessionSnapshot};
pub use store::{LoginSuccess, MfaSuccess, SessionStore};
