// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-process mock of the ticketing API for tests.
//!
//! Tokens are real HS256 JWTs. A token is accepted while its `gen` claim
//! matches the server's current generation; [`MockState::revoke_current`]
//! bumps the generation, which is how tests simulate an expired access token
//! while the refresh cookie stays valid.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Json, Router,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde_json::{json, Map, Value};

use crate::{config::ClientConfig, session::SessionStore};

pub const GOOD_PASSWORD: &str = "correct-horse";
/// Accepted, but the response carries no token.
pub const NO_TOKEN_PASSWORD: &str = "tokenless";
pub const MFA_CODE: &str = "123456";
pub const RECOVERY_CODE: &str = "rcv-0001";
pub const RESET_TOKEN: &str = "reset-abc";
pub const MFA_SECRET: &str = "JBSWY3DPEHPK3PXP";

const REFRESH_COOKIE: &str = "helpdesk_refresh";
const SIGNING_SECRET: &[u8] = b"helpdesk-mock-secret";

/// Unsigned token carrying `claims`, for decoding only.
pub fn unsigned_token(claims: Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string().as_bytes());
    format!("{header}.{payload}.unsigned")
}

/// Mock server state, inspected and steered by tests.
pub struct MockState {
    pub refresh_calls: AtomicUsize,
    pub protected_calls: AtomicUsize,
    pub logout_calls: AtomicUsize,
    /// Refresh answers 401 "Refresh token expired"
    pub refresh_fails: AtomicBool,
    /// Logout answers 500
    pub logout_fails: AtomicBool,
    /// Rejected protected calls answer 403 instead of 401
    pub reject_with_forbidden: AtomicBool,
    /// Protected calls are rejected whatever the token
    pub reject_all: AtomicBool,
    /// Refresh answers only after this many milliseconds
    pub refresh_delay_ms: AtomicU64,
    login_claims: Mutex<Value>,
    generation: AtomicU64,
    issued: AtomicU64,
    refresh_session_valid: AtomicBool,
    last_bearer: Mutex<Option<String>>,
}

impl MockState {
    fn new() -> Self {
        Self {
            refresh_calls: AtomicUsize::new(0),
            protected_calls: AtomicUsize::new(0),
            logout_calls: AtomicUsize::new(0),
            refresh_fails: AtomicBool::new(false),
            logout_fails: AtomicBool::new(false),
            reject_with_forbidden: AtomicBool::new(false),
            reject_all: AtomicBool::new(false),
            refresh_delay_ms: AtomicU64::new(0),
            login_claims: Mutex::new(json!({ "role": "user" })),
            generation: AtomicU64::new(1),
            issued: AtomicU64::new(0),
            refresh_session_valid: AtomicBool::new(false),
            last_bearer: Mutex::new(None),
        }
    }

    /// Claims merged into every token the server issues.
    pub fn set_login_claims(&self, claims: Value) {
        *self.login_claims.lock().unwrap() = claims;
    }

    /// Invalidate every access token issued so far.
    pub fn revoke_current(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    pub fn reset_counters(&self) {
        self.refresh_calls.store(0, Ordering::SeqCst);
        self.protected_calls.store(0, Ordering::SeqCst);
        self.logout_calls.store(0, Ordering::SeqCst);
        *self.last_bearer.lock().unwrap() = None;
    }

    /// Bearer token seen by the most recent protected call.
    pub fn last_bearer(&self) -> Option<String> {
        self.last_bearer.lock().unwrap().clone()
    }

    /// Issue a token for the login claims, with `overrides` applied on top.
    fn issue(&self, overrides: Value) -> String {
        let mut claims = match self.login_claims.lock().unwrap().clone() {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        if let Value::Object(extra) = overrides {
            claims.extend(extra);
        }
        self.mint(claims)
    }

    fn mint(&self, mut claims: Map<String, Value>) -> String {
        let now = chrono::Utc::now().timestamp();
        claims.insert("sub".to_string(), json!("42"));
        claims.insert("gen".to_string(), json!(self.generation.load(Ordering::SeqCst)));
        claims.insert("jti".to_string(), json!(self.issued.fetch_add(1, Ordering::SeqCst)));
        claims.insert("iat".to_string(), json!(now));
        claims.insert("exp".to_string(), json!(now + 900));

        jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SIGNING_SECRET),
        )
        .unwrap()
    }

    fn is_current(&self, token: &str) -> bool {
        let Ok(data) = jsonwebtoken::decode::<Value>(
            token,
            &DecodingKey::from_secret(SIGNING_SECRET),
            &Validation::new(Algorithm::HS256),
        ) else {
            return false;
        };
        data.claims["gen"].as_u64() == Some(self.generation.load(Ordering::SeqCst))
    }

    fn has_session(&self, headers: &HeaderMap) -> bool {
        bearer(headers).is_some_and(|t| self.is_current(&t))
    }

    /// Gate for the resource routes. Records the bearer and counts the call.
    fn authorize(&self, headers: &HeaderMap) -> Result<(), Response> {
        let token = bearer(headers);
        *self.last_bearer.lock().unwrap() = token.clone();
        self.protected_calls.fetch_add(1, Ordering::SeqCst);

        let accepted = !self.reject_all.load(Ordering::SeqCst)
            && token.is_some_and(|t| self.is_current(&t));
        if accepted {
            return Ok(());
        }
        if self.reject_with_forbidden.load(Ordering::SeqCst) {
            Err(message(StatusCode::FORBIDDEN, "Forbidden"))
        } else {
            Err(message(StatusCode::UNAUTHORIZED, "Unauthorized"))
        }
    }
}

/// Running mock server.
pub struct MockApi {
    pub state: Arc<MockState>,
    pub base_url: String,
}

impl MockApi {
    /// A fresh session store pointed at this server.
    pub fn store(&self) -> SessionStore {
        let config = ClientConfig::new(&self.base_url).unwrap();
        SessionStore::new(&config).unwrap()
    }
}

/// Start a mock server on an ephemeral port.
pub async fn spawn() -> MockApi {
    let state = Arc::new(MockState::new());
    let app = router(Arc::clone(&state));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockApi {
        state,
        base_url: format!("http://{addr}/api/"),
    }
}

/// Store whose API is unreachable.
pub fn unreachable_store() -> SessionStore {
    let config = ClientConfig::new("http://127.0.0.1:1/api/")
        .unwrap()
        .with_timeout(Duration::from_secs(2));
    SessionStore::new(&config).unwrap()
}

fn router(state: Arc<MockState>) -> Router {
    Router::new()
        .route("/api/tickets/auth/login", post(login))
        .route("/api/tickets/auth/refresh", get(refresh))
        .route("/api/tickets/auth/logout", get(logout))
        .route("/api/tickets/auth/forgot-password", post(forgot_password))
        .route("/api/tickets/auth/password-reset/{token}", post(password_reset))
        .route("/api/tickets/auth/mfa-setup", get(mfa_setup))
        .route("/api/tickets/auth/mfa-verify", post(mfa_verify))
        .route("/api/tickets/auth/mfa-challenge", post(mfa_challenge))
        .route("/api/tickets/auth/mfa-recovery", post(mfa_recovery))
        .route("/api/tickets/{resource}", get(list_items).post(create_item))
        .route(
            "/api/tickets/{resource}/{id}",
            get(get_item)
                .put(replace_item)
                .patch(replace_item)
                .delete(delete_item),
        )
        .route("/api/tickets/{resource}/{id}/{action}", patch(item_action))
        .with_state(state)
}

fn message(status: StatusCode, text: &str) -> Response {
    (status, Json(json!({ "message": text }))).into_response()
}

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::to_string)
}

fn has_refresh_cookie(headers: &HeaderMap) -> bool {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .any(|pair| pair.trim().starts_with(&format!("{REFRESH_COOKIE}=")))
}

async fn login(State(state): State<Arc<MockState>>, Json(body): Json<Value>) -> Response {
    match body["password"].as_str() {
        Some(GOOD_PASSWORD) => {
            state.refresh_session_valid.store(true, Ordering::SeqCst);
            let token = state.issue(json!({}));
            let cookie = format!("{REFRESH_COOKIE}=session-{}; HttpOnly; Path=/", token.len());
            (
                StatusCode::OK,
                [(header::SET_COOKIE, cookie)],
                Json(json!({ "accessToken": token })),
            )
                .into_response()
        }
        Some(NO_TOKEN_PASSWORD) => Json(json!({ "message": "Welcome" })).into_response(),
        _ => message(StatusCode::UNAUTHORIZED, "Invalid email or password"),
    }
}

async fn refresh(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    state.refresh_calls.fetch_add(1, Ordering::SeqCst);
    let delay = state.refresh_delay_ms.load(Ordering::SeqCst);
    if delay > 0 {
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }
    if state.refresh_fails.load(Ordering::SeqCst) {
        return message(StatusCode::UNAUTHORIZED, "Refresh token expired");
    }
    if !has_refresh_cookie(&headers) || !state.refresh_session_valid.load(Ordering::SeqCst) {
        return message(StatusCode::UNAUTHORIZED, "Refresh token missing");
    }
    Json(json!({ "accessToken": state.issue(json!({})) })).into_response()
}

async fn logout(State(state): State<Arc<MockState>>) -> Response {
    state.logout_calls.fetch_add(1, Ordering::SeqCst);
    if state.logout_fails.load(Ordering::SeqCst) {
        return message(StatusCode::INTERNAL_SERVER_ERROR, "Logout failed");
    }
    state.refresh_session_valid.store(false, Ordering::SeqCst);
    let cookie = format!("{REFRESH_COOKIE}=; HttpOnly; Path=/; Max-Age=0");
    (
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(json!({ "message": "Logged out" })),
    )
        .into_response()
}

async fn forgot_password(Json(body): Json<Value>) -> Response {
    match body["email"].as_str() {
        Some(email) if email.contains('@') => message(StatusCode::OK, "Reset link sent"),
        _ => message(StatusCode::NOT_FOUND, "No account for that email"),
    }
}

async fn password_reset(Path(token): Path<String>, Json(body): Json<Value>) -> Response {
    if token != RESET_TOKEN {
        return message(StatusCode::BAD_REQUEST, "Reset link expired");
    }
    match body["password"].as_str() {
        Some(p) if !p.is_empty() => message(StatusCode::OK, "Password updated"),
        _ => message(StatusCode::BAD_REQUEST, "Password required"),
    }
}

async fn mfa_setup(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    if !state.has_session(&headers) {
        return message(StatusCode::UNAUTHORIZED, "Session expired");
    }
    Json(json!({
        "secret": MFA_SECRET,
        "otpauthUrl": format!("otpauth://totp/Helpdesk:ada?secret={MFA_SECRET}"),
    }))
    .into_response()
}

/// Shared shape of the three code-checking MFA endpoints.
fn mfa_exchange(
    state: &MockState,
    headers: &HeaderMap,
    body: &Value,
    expected: &str,
    overrides: Value,
) -> Response {
    if !state.has_session(headers) {
        return message(StatusCode::UNAUTHORIZED, "Session expired");
    }
    if body["code"].as_str() != Some(expected) {
        return message(StatusCode::BAD_REQUEST, "Invalid verification code");
    }
    Json(json!({ "accessToken": state.issue(overrides) })).into_response()
}

async fn mfa_verify(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    mfa_exchange(&state, &headers, &body, MFA_CODE, json!({ "mfaEnabled": true }))
}

async fn mfa_challenge(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    mfa_exchange(&state, &headers, &body, MFA_CODE, json!({ "mfaPending": false }))
}

async fn mfa_recovery(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    mfa_exchange(&state, &headers, &body, RECOVERY_CODE, json!({ "mfaPending": false }))
}

async fn list_items(
    State(state): State<Arc<MockState>>,
    Path(resource): Path<String>,
    Query(filters): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    if let Err(rejection) = state.authorize(&headers) {
        return rejection;
    }
    let status = filters.get("status").map_or("open", String::as_str);
    Json(json!([
        { "id": 1, "resource": resource, "status": status },
        { "id": 2, "resource": resource, "status": status },
    ]))
    .into_response()
}

async fn create_item(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Err(rejection) = state.authorize(&headers) {
        return rejection;
    }
    let mut item = body.as_object().cloned().unwrap_or_default();
    item.insert("id".to_string(), json!(1));
    (StatusCode::CREATED, Json(Value::Object(item))).into_response()
}

async fn get_item(
    State(state): State<Arc<MockState>>,
    Path((resource, id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Response {
    if let Err(rejection) = state.authorize(&headers) {
        return rejection;
    }
    if id == "404" {
        return message(StatusCode::NOT_FOUND, "Not found");
    }
    Json(json!({ "id": id, "resource": resource })).into_response()
}

async fn replace_item(
    State(state): State<Arc<MockState>>,
    Path((_resource, id)): Path<(String, String)>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Err(rejection) = state.authorize(&headers) {
        return rejection;
    }
    let mut item = body.as_object().cloned().unwrap_or_default();
    item.insert("id".to_string(), json!(id));
    Json(Value::Object(item)).into_response()
}

async fn delete_item(
    State(state): State<Arc<MockState>>,
    Path((_resource, _id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Response {
    if let Err(rejection) = state.authorize(&headers) {
        return rejection;
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn item_action(
    State(state): State<Arc<MockState>>,
    Path((_resource, id, action)): Path<(String, String, String)>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Err(rejection) = state.authorize(&headers) {
        return rejection;
    }
    let mut item = body.as_object().cloned().unwrap_or_default();
    item.insert("id".to_string(), json!(id));
    item.insert("action".to_string(), json!(action));
    Json(Value::Object(item)).into_response()
}
