// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token decoding errors.

/// Reason a bearer token could not be decoded into claims.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// Token does not have exactly three dot-separated segments
    #[error("expected 3 token segments, found {0}")]
    SegmentCount(usize),

    /// Payload segment is not valid base64url
    #[error("payload is not valid base64url: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Payload bytes are not valid UTF-8
    #[error("payload is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// Payload is not a JSON claims object
    #[error("payload is not a claims object: {0}")]
    Json(#[from] serde_json::Error),
}

impl TokenError {
    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            TokenError::SegmentCount(_) => "malformed_token",
            TokenError::Base64(_) => "invalid_base64",
            TokenError::Utf8(_) => "invalid_utf8",
            TokenError::Json(_) => "invalid_claims",
        }
    }
}
