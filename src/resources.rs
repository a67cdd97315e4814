// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! REST resource families of the ticketing API.
//!
//! Each family is a plain JSON mapping over the authenticated client, so
//! every call gets bearer injection and silent refresh.

use std::fmt::Display;

use serde_json::Value;

use crate::{
    error::ApiError,
    http::{ApiRequest, AuthenticatedClient},
};

/// Resource families exposed under `tickets/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Ticket,
    TicketType,
    TicketApproval,
    ApprovalStep,
    Assignment,
    Department,
    Role,
    Sla,
    User,
}

impl Resource {
    pub const ALL: [Resource; 9] = [
        Resource::Ticket,
        Resource::TicketType,
        Resource::TicketApproval,
        Resource::ApprovalStep,
        Resource::Assignment,
        Resource::Department,
        Resource::Role,
        Resource::Sla,
        Resource::User,
    ];

    /// Collection path relative to the API base URL.
    pub fn path(&self) -> &'static str {
        match self {
            Resource::Ticket => "tickets/ticket",
            Resource::TicketType => "tickets/ticket-type",
            Resource::TicketApproval => "tickets/ticket-approval",
            Resource::ApprovalStep => "tickets/approval-steps",
            Resource::Assignment => "tickets/assignment",
            Resource::Department => "tickets/department",
            Resource::Role => "tickets/roles",
            Resource::Sla => "tickets/sla",
            Resource::User => "tickets/users",
        }
    }

    /// Path of a single item.
    pub fn item_path(&self, id: impl Display) -> String {
        format!("{}/{}", self.path(), id)
    }
}

/// CRUD client for one resource family.
#[derive(Debug, Clone)]
pub struct ResourceClient {
    api: AuthenticatedClient,
    resource: Resource,
}

impl ResourceClient {
    pub fn new(api: AuthenticatedClient, resource: Resource) -> Self {
        Self { api, resource }
    }

    pub fn resource(&self) -> Resource {
        self.resource
    }

    pub async fn create(&self, body: Value) -> Result<Value, ApiError> {
        self.api.post(self.resource.path(), body).await
    }

    pub async fn get_all(&self) -> Result<Value, ApiError> {
        self.api.get(self.resource.path()).await
    }

    /// List with query filters, e.g. `[("status", "open")]`.
    pub async fn get_all_with(&self, filters: &[(&str, &str)]) -> Result<Value, ApiError> {
        let request = filters
            .iter()
            .fold(ApiRequest::get(self.resource.path()), |req, (k, v)| {
                req.with_query(*k, *v)
            });
        self.api.send(request).await
    }

    pub async fn get_by_id(&self, id: impl Display) -> Result<Value, ApiError> {
        self.api.get(self.resource.item_path(id)).await
    }

    /// Full replacement (`PUT`).
    pub async fn update(&self, id: impl Display, body: Value) -> Result<Value, ApiError> {
        self.api.put(self.resource.item_path(id), body).await
    }

    /// Partial update (`PATCH`).
    pub async fn patch(&self, id: impl Display, body: Value) -> Result<Value, ApiError> {
        self.api.patch(self.resource.item_path(id), body).await
    }

    /// Named state transition, e.g. `ticket-approval/{id}/approve`.
    pub async fn patch_action(
        &self,
        id: impl Display,
        action: &str,
        body: Value,
    ) -> Result<Value, ApiError> {
        let path = format!("{}/{}", self.resource.item_path(id), action);
        self.api.patch(path, body).await
    }

    pub async fn delete(&self, id: impl Display) -> Result<Value, ApiError> {
        self.api.delete(self.resource.item_path(id)).await
    }
}
