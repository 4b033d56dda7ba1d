// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Why an otherwise well-formed bearer token was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenInvalidReason {
    /// Token could not be decoded (segments, base64 or JSON)
    Malformed,
    /// Signature does not match the shared secret
    BadSignature,
    /// `exp` is in the past
    Expired,
    /// `nbf` is in the future
    NotYetValid,
    /// A required claim is absent or empty
    MissingClaim(String),
}

impl std::fmt::Display for TokenInvalidReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenInvalidReason::Malformed => write!(f, "token is malformed"),
            TokenInvalidReason::BadSignature => write!(f, "token signature is invalid"),
            TokenInvalidReason::Expired => write!(f, "token has expired"),
            TokenInvalidReason::NotYetValid => write!(f, "token is not yet valid"),
            TokenInvalidReason::MissingClaim(claim) => {
                write!(f, "token is missing required claim '{claim}'")
            }
        }
    }
}

/// Authentication error type.
///
/// Every variant maps to `401 Unauthorized`. Messages name the failure
/// reason only; they never include the secret or decoder internals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Authorization header missing, not UTF-8, or not `Bearer <token>`
    MalformedHeader,
    /// Token declares an algorithm outside the HMAC family
    UnsupportedAlgorithm(String),
    /// Signature, expiry or claim validation failed
    TokenInvalid(TokenInvalidReason),
}

#[derive(Serialize)]
struct AuthErrorBody {
    error: String,
    error_code: String,
}

impl AuthError {
    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::MalformedHeader => "malformed_header",
            AuthError::UnsupportedAlgorithm(_) => "unsupported_algorithm",
            AuthError::TokenInvalid(_) => "token_invalid",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        StatusCode::UNAUTHORIZED
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::MalformedHeader => {
                write!(f, "Missing or malformed Authorization header (expected 'Bearer <token>')")
            }
            AuthError::UnsupportedAlgorithm(alg) => {
                write!(f, "Unsupported token algorithm '{alg}' (expected HS256, HS384 or HS512)")
            }
            AuthError::TokenInvalid(reason) => write!(f, "Invalid token: {reason}"),
        }
    }
}

impl std::error::Error for AuthError {}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(AuthErrorBody {
            error: self.to_string(),
            error_code: self.error_code().to_string(),
        });
        (status, body).into_response()
    }
}
