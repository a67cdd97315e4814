// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Route guards.
//!
//! Guards turn a [`SessionSnapshot`] and a requested location into a
//! [`GuardDecision`]. Rendering and navigation belong to the caller.

use crate::session::SessionSnapshot;

/// Path of the login page.
pub const LOGIN_PATH: &str = "/login";

/// Outcome of evaluating a guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Session restore still running; show a placeholder
    Loading,
    /// Render the guarded page
    Render,
    /// Navigate elsewhere
    Redirect(Redirect),
}

/// Navigation target of a redirect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    /// Where to go
    pub to: String,
    /// The originally requested location, kept so login can send the user back
    pub from: Option<String>,
}

impl Redirect {
    fn to_login(from: &str) -> Self {
        Self {
            to: LOGIN_PATH.to_string(),
            from: Some(from.to_string()),
        }
    }

    fn to_dashboard(session: &SessionSnapshot) -> Self {
        Self {
            to: session.dashboard().to_string(),
            from: None,
        }
    }
}

/// Guard for pages that need a signed-in user, optionally with given roles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProtectedRoute {
    allowed_roles: Option<Vec<String>>,
}

impl ProtectedRoute {
    /// Any signed-in user.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to these roles (compared case-insensitively).
    pub fn allow_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.allowed_roles = Some(
            roles
                .into_iter()
                .map(|r| r.as_ref().trim().to_lowercase())
                .collect(),
        );
        self
    }

    pub fn evaluate(&self, session: &SessionSnapshot, location: &str) -> GuardDecision {
        if session.loading {
            return GuardDecision::Loading;
        }
        if !session.is_authenticated {
            return GuardDecision::Redirect(Redirect::to_login(location));
        }
        if let Some(allowed) = &self.allowed_roles {
            let role = session
                .user
                .as_ref()
                .and_then(|u| u.normalized_role())
                .unwrap_or_default();
            if !allowed.contains(&role) {
                return GuardDecision::Redirect(Redirect::to_dashboard(session));
            }
        }
        GuardDecision::Render
    }
}

/// Guard for pages only meant for signed-out users (login, signup, ...).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublicRoute;

impl PublicRoute {
    pub fn evaluate(&self, session: &SessionSnapshot) -> GuardDecision {
        if session.loading {
            return GuardDecision::Loading;
        }
        if session.is_authenticated {
            return GuardDecision::Redirect(Redirect::to_dashboard(session));
        }
        GuardDecision::Render
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Access {
    Public(PublicRoute),
    Protected(ProtectedRoute),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct RouteEntry {
    prefix: String,
    access: Access,
}

/// Application route map: path prefixes and the guard protecting each.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTable {
    routes: Vec<RouteEntry>,
}

impl RouteTable {
    /// Empty table. Every path falls back to the dashboard or login.
    pub fn empty() -> Self {
        Self { routes: Vec::new() }
    }

    /// Route map of the helpdesk front end.
    pub fn helpdesk() -> Self {
        let admin = ProtectedRoute::new().allow_roles(["admin", "administrator"]);
        let manager = ProtectedRoute::new().allow_roles(["manager", "officer"]);
        let executive = ProtectedRoute::new().allow_roles(["executive"]);

        Self::empty()
            .public(LOGIN_PATH)
            .public("/forgot-password")
            .public("/reset-password")
            .public("/mfa")
            .protected("/admin", admin.clone())
            .protected("/admin/users", admin.clone())
            .protected("/admin/departments", admin.clone())
            .protected("/admin/roles", admin.clone())
            .protected("/admin/ticket-types", admin.clone())
            .protected("/admin/sla", admin)
            .protected("/manager", manager.clone())
            .protected("/manager/approvals", manager.clone())
            .protected("/manager/tickets", manager)
            .protected("/executive", executive.clone())
            .protected("/executive/sla-breaches", executive)
            // The user area accepts every role: it is also where unknown roles land.
            .protected("/user", ProtectedRoute::new())
            .protected("/user/tickets", ProtectedRoute::new())
            .protected("/user/tickets/new", ProtectedRoute::new())
            .protected("/change-password", ProtectedRoute::new())
    }

    pub fn public(mut self, prefix: &str) -> Self {
        self.routes.push(RouteEntry {
            prefix: normalize_path(prefix).to_string(),
            access: Access::Public(PublicRoute),
        });
        self
    }

    pub fn protected(mut self, prefix: &str, guard: ProtectedRoute) -> Self {
        self.routes.push(RouteEntry {
            prefix: normalize_path(prefix).to_string(),
            access: Access::Protected(guard),
        });
        self
    }

    /// Evaluate the guard of the most specific route matching `location`.
    ///
    /// Unknown locations send signed-in users to their dashboard and
    /// everyone else to login.
    pub fn resolve(&self, location: &str, session: &SessionSnapshot) -> GuardDecision {
        match self.lookup(location) {
            Some(Access::Public(guard)) => guard.evaluate(session),
            Some(Access::Protected(guard)) => guard.evaluate(session, location),
            None if session.loading => GuardDecision::Loading,
            None if session.is_authenticated => {
                GuardDecision::Redirect(Redirect::to_dashboard(session))
            }
            None => GuardDecision::Redirect(Redirect {
                to: LOGIN_PATH.to_string(),
                from: None,
            }),
        }
    }

    /// Where to go right after login.
    ///
    /// The preserved location wins when the new session may render it;
    /// otherwise the user's dashboard.
    pub fn post_login_destination(&self, from: Option<&str>, session: &SessionSnapshot) -> String {
        match from {
            Some(location) if self.resolve(location, session) == GuardDecision::Render => {
                location.to_string()
            }
            _ => session.dashboard().to_string(),
        }
    }

    fn lookup(&self, location: &str) -> Option<&Access> {
        let path = normalize_path(location);
        self.routes
            .iter()
            .filter(|entry| {
                path == entry.prefix
                    || path
                        .strip_prefix(entry.prefix.as_str())
                        .is_some_and(|rest| rest.starts_with('/'))
            })
            .max_by_key(|entry| entry.prefix.len())
            .map(|entry| &entry.access)
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::helpdesk()
    }
}

/// Strip query, fragment and trailing slash; `/` stays `/`.
fn normalize_path(location: &str) -> &str {
    let path = location.split(['?', '#']).next().unwrap_or(location);
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/"
    } else {
        trimmed
    }
}
