// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Exercise endpoints, scoped to the caller's identity.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    auth::Auth,
    error::ApiError,
    models::{Exercise, UpsertExerciseRequest},
    state::AppState,
};

/// Longest accepted exercise id.
const MAX_EXERCISE_ID_LEN: usize = 128;

/// Normalize a path exercise id the same way for every handler.
fn normalize_exercise_id(raw: String) -> Result<String, ApiError> {
    let id = raw.trim();
    if id.is_empty() || id.len() > MAX_EXERCISE_ID_LEN {
        return Err(ApiError::bad_request("Invalid exercise id"));
    }
    Ok(id.to_string())
}

#[utoipa::path(
    get,
    path = "/exercises",
    tag = "Exercises",
    responses(
        (status = 200, body = [Exercise]),
        (status = 401, description = "Missing or invalid bearer token")
    )
)]
pub async fn list_exercises(
    Auth(ctx): Auth,
    State(state): State<AppState>,
) -> Result<Json<Vec<Exercise>>, ApiError> {
    let exercises = state.exercises.list_exercises(ctx.identity_id).await?;
    Ok(Json(exercises))
}

#[utoipa::path(
    put,
    path = "/exercises/{exercise_id}",
    params(
        ("exercise_id" = String, Path, description = "Client-chosen exercise identifier")
    ),
    request_body = UpsertExerciseRequest,
    tag = "Exercises",
    responses(
        (status = 200, body = Exercise),
        (status = 400, description = "Invalid exercise"),
        (status = 401, description = "Missing or invalid bearer token")
    )
)]
pub async fn upsert_exercise(
    Auth(ctx): Auth,
    State(state): State<AppState>,
    Path(exercise_id): Path<String>,
    Json(request): Json<UpsertExerciseRequest>,
) -> Result<Json<Exercise>, ApiError> {
    let exercise_id = normalize_exercise_id(exercise_id)?;
    if request.name.trim().is_empty() {
        return Err(ApiError::bad_request("Exercise name is required"));
    }

    let exercise = request.into_exercise(exercise_id);
    state
        .exercises
        .upsert_exercise(ctx.identity_id, &exercise)
        .await?;

    tracing::debug!(
        identity_id = %ctx.identity_id,
        exercise_id = %exercise.id,
        "Upserted exercise"
    );
    Ok(Json(exercise))
}

#[utoipa::path(
    delete,
    path = "/exercises/{exercise_id}",
    params(
        ("exercise_id" = String, Path, description = "Identifier of the exercise to delete")
    ),
    tag = "Exercises",
    responses(
        (status = 204),
        (status = 400, description = "Invalid exercise id"),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 404, description = "No such exercise for this user")
    )
)]
pub async fn delete_exercise(
    Auth(ctx): Auth,
    State(state): State<AppState>,
    Path(exercise_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let exercise_id = normalize_exercise_id(exercise_id)?;
    if state
        .exercises
        .delete_exercise(ctx.identity_id, &exercise_id)
        .await?
    {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("Exercise not found"))
    }
}
