// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Bearer token claims.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Claims carried in the payload segment of a helpdesk bearer token.
///
/// Only the fields the client acts on are typed. Everything else the server
/// puts in the payload is kept in `extra` so nothing is lost on re-encoding.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    /// Subject (user ID). Numeric IDs are accepted and kept as strings.
    #[serde(
        default,
        deserialize_with = "string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub sub: Option<String>,

    /// Role name, verbatim from the token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    /// Multi-factor completion is still outstanding for this session
    #[serde(
        default,
        deserialize_with = "flag",
        alias = "mfaRequired",
        alias = "mfa_required",
        alias = "mfa_pending"
    )]
    pub mfa_pending: bool,

    /// The account has multi-factor authentication enrolled
    #[serde(default, deserialize_with = "flag", alias = "mfa_enabled")]
    pub mfa_enabled: bool,

    /// The user must change their password before continuing
    #[serde(
        default,
        deserialize_with = "flag",
        alias = "forcePasswordChange",
        alias = "must_change_password"
    )]
    pub must_change_password: bool,

    /// Expiration timestamp
    #[serde(
        default,
        deserialize_with = "timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub exp: Option<i64>,

    /// Issued at timestamp
    #[serde(
        default,
        deserialize_with = "timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub iat: Option<i64>,

    /// Any other claims
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Claims {
    /// Expiration as a UTC timestamp.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.exp.and_then(|exp| DateTime::from_timestamp(exp, 0))
    }

    /// Whether the token had expired at `now`. Tokens without `exp` never expire here.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at().is_some_and(|at| at <= now)
    }

    /// Role name normalised for comparison.
    pub fn normalized_role(&self) -> Option<String> {
        self.role.as_deref().map(|r| r.trim().to_lowercase())
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected string or number for sub, got {other}"
        ))),
    }
}

/// Boolean flag; `null` reads as `false`.
fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}

/// Unix seconds. Fractional values are truncated; numeric strings are accepted.
fn timestamp<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let invalid = |v: &dyn std::fmt::Display| {
        <D::Error as serde::de::Error>::custom(format!("expected unix timestamp, got {v}"))
    };
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
            .map(Some)
            .ok_or_else(|| invalid(&n)),
        Some(Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .map(|f| Some(f.trunc() as i64))
            .ok_or_else(|| invalid(&s)),
        Some(other) => Err(invalid(&other)),
    }
}
