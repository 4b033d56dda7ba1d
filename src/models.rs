// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response structures used by the REST API, plus the durable
//! [`Identity`] record. All types derive `Serialize`, `Deserialize`, and
//! `ToSchema` for JSON handling and OpenAPI documentation.
//!
//! Exercise JSON uses camelCase field names to match the web client.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

// =============================================================================
// Identity
// =============================================================================

/// Durable internal user record.
///
/// `email` is the natural key; `id` is assigned once at creation and never
/// changes.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct Identity {
    pub id: Uuid,
    pub email: String,
}

// =============================================================================
// Exercises
// =============================================================================

/// An exercise owned by one identity.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub muscle_group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub motion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reps: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sets: Option<u32>,
    pub updated_at: DateTime<Utc>,
}

/// Body of `PUT /exercises/{exercise_id}`.
///
/// The client may echo the id in the body; the path id always wins.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpsertExerciseRequest {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub muscle_group: Option<String>,
    #[serde(default)]
    pub motion: Option<String>,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub reps: Option<u32>,
    #[serde(default)]
    pub sets: Option<u32>,
}

impl UpsertExerciseRequest {
    /// Build the stored exercise for `exercise_id`.
    pub fn into_exercise(self, exercise_id: String) -> Exercise {
        Exercise {
            id: exercise_id,
            name: self.name.trim().to_string(),
            muscle_group: self.muscle_group,
            motion: self.motion,
            weight: self.weight,
            reps: self.reps,
            sets: self.sets,
            updated_at: Utc::now(),
        }
    }
}
