// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    http::HeaderName,
    middleware,
    routing::{get, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::{auth_gate, RequestAuthContext},
    models::{Exercise, Identity, UpsertExerciseRequest},
    state::AppState,
};

pub mod exercises;
pub mod health;
pub mod users;

const REQUEST_ID_HEADER: &str = "x-request-id";

pub fn router(state: AppState) -> Router {
    // Every route here passes through the auth gate exactly once.
    let protected_routes = Router::new()
        .route("/", get(exercises::list_exercises))
        .route("/exercises", get(exercises::list_exercises))
        .route(
            "/exercises/{exercise_id}",
            put(exercises::upsert_exercise).delete(exercises::delete_exercise),
        )
        .route("/me", get(users::get_current_identity))
        .route_layer(middleware::from_fn_with_state(state.gate.clone(), auth_gate))
        .with_state(state);

    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    Router::new()
        .route("/health", get(health::liveness))
        .merge(protected_routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(request_id.clone(), MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::new(request_id)),
        )
}

#[derive(OpenApi)]
#[openapi(
    paths(
        exercises::list_exercises,
        exercises::upsert_exercise,
        exercises::delete_exercise,
        users::get_current_identity,
        health::liveness
    ),
    components(
        schemas(
            Exercise,
            UpsertExerciseRequest,
            Identity,
            RequestAuthContext,
            health::HealthResponse
        )
    ),
    tags(
        (name = "Exercises", description = "Per-user exercise management"),
        (name = "Users", description = "Resolved identity of the caller"),
        (name = "Health", description = "Liveness probe")
    )
)]
struct ApiDoc;
