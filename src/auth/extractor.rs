// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractor for the authenticated identity.
//!
//! Use the `Auth` extractor in handlers mounted behind the auth gate:
//!
//! ```rust,ignore
//! async fn my_handler(Auth(ctx): Auth) -> impl IntoResponse {
//!     // ctx is RequestAuthContext
//! }
//! ```

use axum::{extract::FromRequestParts, http::request::Parts};

use super::RequestAuthContext;
use crate::error::ApiError;

/// Extractor for the identity attached by [`super::middleware::auth_gate`].
///
/// The gate is the only place tokens are verified. A handler reached
/// without a context was mounted outside the gate, which is a routing bug,
/// so the rejection is a 500 rather than a 401.
pub struct Auth(pub RequestAuthContext);

impl<S> FromRequestParts<S> for Auth
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<RequestAuthContext>()
            .cloned()
            .map(Auth)
            .ok_or_else(|| {
                tracing::error!(path = %parts.uri.path(), "Handler reached without auth context");
                ApiError::internal("Request was not authenticated")
            })
    }
}
