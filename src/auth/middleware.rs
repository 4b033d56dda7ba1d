// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! The auth gate: per-request authentication middleware.
//!
//! Every protected request goes through these steps, in order:
//!
//! 1. Read `Authorization` and verify the bearer token (401 on failure)
//! 2. Resolve the token's email to an identity (500 on store failure)
//! 3. Evaluate the origin policy for the request `Origin`
//! 4. Insert a [`RequestAuthContext`] into the request extensions and run
//!    the next handler exactly once
//! 5. Attach the CORS headers to the handler's response before it is sent
//!
//! Rejections short-circuit: the next handler is never run and no CORS
//! headers are added. If the client disconnects, axum drops this future and
//! nothing past the current await point runs.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{
        header::{AUTHORIZATION, ORIGIN},
        HeaderMap, StatusCode,
    },
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use super::claims::{ClaimSet, RequestAuthContext};
use super::{AuthError, TokenVerifier};
use crate::cors::OriginPolicy;
use crate::identity::IdentityResolver;
use crate::storage::StoreError;
use crate::telemetry::email_fingerprint;

/// Shared, read-only collaborators of the gate.
#[derive(Clone)]
pub struct AuthGate {
    verifier: Arc<TokenVerifier>,
    resolver: IdentityResolver,
    origins: Arc<OriginPolicy>,
}

impl AuthGate {
    pub fn new(verifier: TokenVerifier, resolver: IdentityResolver, origins: OriginPolicy) -> Self {
        Self {
            verifier: Arc::new(verifier),
            resolver,
            origins: Arc::new(origins),
        }
    }

    /// Verify the `Authorization` header of a request.
    pub fn verify_headers(&self, headers: &HeaderMap) -> Result<ClaimSet, AuthError> {
        let raw = headers
            .get(AUTHORIZATION)
            .ok_or(AuthError::MalformedHeader)?
            .to_str()
            .map_err(|_| AuthError::MalformedHeader)?;
        self.verifier.verify(raw)
    }

    /// CORS headers earned by the request's `Origin`, if any.
    pub fn cors_headers(&self, headers: &HeaderMap) -> HeaderMap {
        headers
            .get(ORIGIN)
            .and_then(|origin| origin.to_str().ok())
            .map(|origin| self.origins.headers_for(origin))
            .unwrap_or_default()
    }
}

/// Why the gate refused to dispatch a request.
#[derive(Debug)]
pub enum GateRejection {
    /// Header or token failure (401)
    Auth(AuthError),
    /// Identity store failure (500)
    Store(StoreError),
}

#[derive(Serialize)]
struct StoreErrorBody {
    error: &'static str,
    error_code: &'static str,
}

impl IntoResponse for GateRejection {
    fn into_response(self) -> Response {
        match self {
            GateRejection::Auth(err) => err.into_response(),
            // Store details stay in the logs.
            GateRejection::Store(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(StoreErrorBody {
                    error: "Identity store unavailable",
                    error_code: "identity_store_unavailable",
                }),
            )
                .into_response(),
        }
    }
}

/// Authentication middleware function.
///
/// ```rust,ignore
/// let app = Router::new()
///     .route("/exercises", get(list_exercises))
///     .route_layer(axum::middleware::from_fn_with_state(gate, auth_gate));
/// ```
pub async fn auth_gate(State(gate): State<AuthGate>, mut request: Request, next: Next) -> Response {
    let claims = match gate.verify_headers(request.headers()) {
        Ok(claims) => claims,
        Err(err) => {
            tracing::debug!(
                error_code = err.error_code(),
                path = %request.uri().path(),
                "Rejected unauthenticated request"
            );
            return GateRejection::Auth(err).into_response();
        }
    };

    let identity = match gate.resolver.resolve(&claims.email).await {
        Ok(identity) => identity,
        Err(err) => {
            tracing::error!(
                error = %err,
                email_fp = %email_fingerprint(&claims.email),
                "Identity resolution failed"
            );
            return GateRejection::Store(err).into_response();
        }
    };

    let cors_headers = gate.cors_headers(request.headers());

    request
        .extensions_mut()
        .insert(RequestAuthContext::from(&identity));

    let mut response = next.run(request).await;
    for (name, value) in cors_headers.iter() {
        response.headers_mut().insert(name.clone(), value.clone());
    }
    response
}
