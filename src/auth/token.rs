// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Bearer token payload decoding.
//!
//! Tokens are compact three-segment JWTs. The client only reads the payload;
//! signatures are verified by the ticketing API, never here.

use base64::{
    alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
    Engine,
};

use super::{error::TokenError, Claims};

/// base64url decoder that accepts payloads with or without `=` padding.
const PAYLOAD_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Decode the claims of a bearer token, reporting why decoding failed.
pub fn try_decode_claims(token: &str) -> Result<Claims, TokenError> {
    let segments: Vec<&str> = token.trim().split('.').collect();
    if segments.len() != 3 {
        return Err(TokenError::SegmentCount(segments.len()));
    }

    // Some issuers emit the standard alphabet; fold it onto base64url first.
    let payload: String = segments[1]
        .chars()
        .map(|c| match c {
            '+' => '-',
            '/' => '_',
            other => other,
        })
        .collect();

    let bytes = PAYLOAD_ENGINE.decode(payload)?;
    let text = std::str::from_utf8(&bytes)?;
    Ok(serde_json::from_str(text)?)
}

/// Decode the claims of a bearer token.
///
/// Returns `None` for any malformed token and logs the reason.
pub fn decode_claims(token: &str) -> Option<Claims> {
    match try_decode_claims(token) {
        Ok(claims) => Some(claims),
        Err(e) => {
            tracing::warn!(error = %e, code = e.error_code(), "Failed to decode bearer token");
            None
        }
    }
}
