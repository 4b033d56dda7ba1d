// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Document Store
//!
//! Storage seams consumed by the identity resolver and the exercise
//! handlers. Two backends implement them:
//!
//! - [`MemoryStore`] - process-local maps, used when `DATA_DIR` is unset
//!   and in tests
//! - [`RedbStore`] - embedded redb database under `DATA_DIR`
//!
//! ## Find-or-create
//!
//! [`IdentityStore::create_identity`] is a conditional create keyed by
//! email: when another identity already holds the email (or the id), the
//! call reports [`CreateOutcome::Conflict`] and writes nothing. Concurrent
//! first logins therefore converge on a single identity.

use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{Exercise, Identity};

pub mod memory;
pub mod redb_store;

pub use memory::MemoryStore;
pub use redb_store::RedbStore;

// =============================================================================
// Error Type
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("redb error: {0}")]
    Redb(#[from] redb::Error),

    #[error("redb database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("blocking store task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("store call exceeded {0:?}")]
    Timeout(Duration),

    #[error("conflict: {0}")]
    Conflict(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Result of a conditional identity create.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateOutcome {
    /// The identity was written
    Created,
    /// The email (or id) is already taken; nothing was written
    Conflict,
}

// =============================================================================
// Store Traits
// =============================================================================

/// Identity lookups and conditional creates.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Find the identity holding `email`, if any.
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<Identity>>;

    /// Create `{id, email}` unless the email or id is already taken.
    async fn create_identity(&self, id: Uuid, email: &str) -> StoreResult<CreateOutcome>;
}

/// Per-identity exercise documents.
#[async_trait]
pub trait ExerciseStore: Send + Sync {
    /// All exercises owned by `owner`, ordered by exercise id.
    async fn list_exercises(&self, owner: Uuid) -> StoreResult<Vec<Exercise>>;

    /// Insert or replace `exercise` under `owner`.
    async fn upsert_exercise(&self, owner: Uuid, exercise: &Exercise) -> StoreResult<()>;

    /// Remove an exercise. Returns `false` when `owner` has no such exercise.
    async fn delete_exercise(&self, owner: Uuid, exercise_id: &str) -> StoreResult<bool>;
}
