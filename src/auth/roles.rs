// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User roles and their dashboard routes.

use serde::{Deserialize, Serialize};

/// Dashboard root for administrators.
pub const ADMIN_DASHBOARD: &str = "/admin";
/// Dashboard root for managers and approval officers.
pub const MANAGER_DASHBOARD: &str = "/manager";
/// Dashboard root for executives.
pub const EXECUTIVE_DASHBOARD: &str = "/executive";
/// Dashboard root for everyone else.
pub const USER_DASHBOARD: &str = "/user";

/// User roles known to the helpdesk front end.
///
/// ## Role Areas
///
/// - `Admin` - User, department, role, ticket type and SLA administration
/// - `Manager` - Ticket approval workflow and team tickets
/// - `Executive` - SLA breach tracking
/// - `User` - Ticket creation and own tickets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Helpdesk administrator
    Admin,
    /// Manager or approval officer
    Manager,
    /// Executive overview
    Executive,
    /// Regular end user
    #[default]
    User,
}

impl Role {
    /// Parse role from string (case-insensitive).
    ///
    /// Several server-side role names share an area: `administrator` is an
    /// admin and `officer` works in the manager area.
    pub fn from_str(s: &str) -> Option<Role> {
        match s.trim().to_lowercase().as_str() {
            "admin" | "administrator" => Some(Role::Admin),
            "manager" | "officer" => Some(Role::Manager),
            "executive" => Some(Role::Executive),
            "user" => Some(Role::User),
            _ => None,
        }
    }

    /// Root path of this role's dashboard.
    pub fn dashboard_path(&self) -> &'static str {
        match self {
            Role::Admin => ADMIN_DASHBOARD,
            Role::Manager => MANAGER_DASHBOARD,
            Role::Executive => EXECUTIVE_DASHBOARD,
            Role::User => USER_DASHBOARD,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::Manager => write!(f, "manager"),
            Role::Executive => write!(f, "executive"),
            Role::User => write!(f, "user"),
        }
    }
}

/// Map a role name to its dashboard path.
///
/// Total: unknown or missing roles land on the user dashboard.
pub fn dashboard_for(role: Option<&str>) -> &'static str {
    role.and_then(Role::from_str)
        .unwrap_or_default()
        .dashboard_path()
}
