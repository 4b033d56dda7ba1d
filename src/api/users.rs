// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User endpoints.

use axum::Json;

use crate::auth::{Auth, RequestAuthContext};

/// Get the identity the current bearer token resolved to.
#[utoipa::path(
    get,
    path = "/me",
    tag = "Users",
    responses(
        (status = 200, description = "Resolved identity", body = RequestAuthContext),
        (status = 401, description = "Unauthorized - invalid or missing token"),
    )
)]
pub async fn get_current_identity(Auth(ctx): Auth) -> Json<RequestAuthContext> {
    Json(ctx)
}
