// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Embedded document store backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! - `identities`: identity id → serialized Identity
//! - `identity_email_index`: email → identity id
//! - `exercises`: composite key (`owner_id|exercise_id`) → serialized Exercise
//!
//! redb calls block, so every operation runs on the blocking pool in its own
//! transaction. redb serializes write transactions, which makes the
//! check-then-insert in [`IdentityStore::create_identity`] atomic.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use uuid::Uuid;

use super::{CreateOutcome, ExerciseStore, IdentityStore, StoreResult};
use crate::models::{Exercise, Identity};

// =============================================================================
// Table Definitions
// =============================================================================

/// Primary table: identity id → serialized Identity (JSON bytes).
const IDENTITIES: TableDefinition<&str, &[u8]> = TableDefinition::new("identities");

/// Unique index: email → identity id.
const IDENTITY_EMAIL_INDEX: TableDefinition<&str, &str> =
    TableDefinition::new("identity_email_index");

/// Exercises: `owner_id|exercise_id` → serialized Exercise (JSON bytes).
const EXERCISES: TableDefinition<&str, &[u8]> = TableDefinition::new("exercises");

// =============================================================================
// Key Helpers
// =============================================================================

fn exercise_key(owner: Uuid, exercise_id: &str) -> String {
    format!("{owner}|{exercise_id}")
}

/// Half-open range covering every exercise of `owner`.
///
/// `}` is the byte after `|`, so the upper bound sorts past any key with the
/// `owner|` prefix.
fn owner_range(owner: Uuid) -> (String, String) {
    (format!("{owner}|"), format!("{owner}}}"))
}

// =============================================================================
// RedbStore
// =============================================================================

#[derive(Clone)]
pub struct RedbStore {
    db: Arc<Database>,
}

impl RedbStore {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> StoreResult<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let db = Database::create(path)?;

        // Pre-create all tables so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(IDENTITIES)?;
            let _ = write_txn.open_table(IDENTITY_EMAIL_INDEX)?;
            let _ = write_txn.open_table(EXERCISES)?;
        }
        write_txn.commit()?;

        tracing::info!(path = %path.display(), "Opened redb document store");
        Ok(Self { db: Arc::new(db) })
    }

    /// Run a blocking database operation off the async workers.
    async fn blocking<T, F>(&self, op: F) -> StoreResult<T>
    where
        F: FnOnce(&Database) -> StoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || op(&db)).await?
    }
}

#[async_trait]
impl IdentityStore for RedbStore {
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<Identity>> {
        let email = email.to_owned();
        self.blocking(move |db| {
            let read_txn = db.begin_read()?;
            let index = read_txn.open_table(IDENTITY_EMAIL_INDEX)?;

            let id = match index.get(email.as_str())? {
                Some(id) => id.value().to_string(),
                None => return Ok(None),
            };

            let identities = read_txn.open_table(IDENTITIES)?;
            match identities.get(id.as_str())? {
                Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
                None => {
                    tracing::warn!(identity_id = %id, "Email index points at a missing identity");
                    Ok(None)
                }
            }
        })
        .await
    }

    async fn create_identity(&self, id: Uuid, email: &str) -> StoreResult<CreateOutcome> {
        let identity = Identity {
            id,
            email: email.to_owned(),
        };
        self.blocking(move |db| {
            let id_key = identity.id.to_string();
            let json = serde_json::to_vec(&identity)?;

            let write_txn = db.begin_write()?;
            let outcome = {
                let mut index = write_txn.open_table(IDENTITY_EMAIL_INDEX)?;
                let mut identities = write_txn.open_table(IDENTITIES)?;

                let taken = index.get(identity.email.as_str())?.is_some()
                    || identities.get(id_key.as_str())?.is_some();

                if taken {
                    CreateOutcome::Conflict
                } else {
                    identities.insert(id_key.as_str(), json.as_slice())?;
                    index.insert(identity.email.as_str(), id_key.as_str())?;
                    CreateOutcome::Created
                }
            };

            match outcome {
                CreateOutcome::Created => write_txn.commit()?,
                CreateOutcome::Conflict => write_txn.abort()?,
            }
            Ok(outcome)
        })
        .await
    }
}

#[async_trait]
impl ExerciseStore for RedbStore {
    async fn list_exercises(&self, owner: Uuid) -> StoreResult<Vec<Exercise>> {
        self.blocking(move |db| {
            let read_txn = db.begin_read()?;
            let table = read_txn.open_table(EXERCISES)?;
            let (start, end) = owner_range(owner);

            let mut exercises: Vec<Exercise> = Vec::new();
            for entry in table.range(start.as_str()..end.as_str())? {
                let (_, value) = entry?;
                exercises.push(serde_json::from_slice(value.value())?);
            }
            Ok(exercises)
        })
        .await
    }

    async fn upsert_exercise(&self, owner: Uuid, exercise: &Exercise) -> StoreResult<()> {
        let key = exercise_key(owner, &exercise.id);
        let json = serde_json::to_vec(exercise)?;
        self.blocking(move |db| {
            let write_txn = db.begin_write()?;
            {
                let mut table = write_txn.open_table(EXERCISES)?;
                table.insert(key.as_str(), json.as_slice())?;
            }
            write_txn.commit()?;
            Ok(())
        })
        .await
    }

    async fn delete_exercise(&self, owner: Uuid, exercise_id: &str) -> StoreResult<bool> {
        let key = exercise_key(owner, exercise_id);
        self.blocking(move |db| {
            let write_txn = db.begin_write()?;
            let removed = {
                let mut table = write_txn.open_table(EXERCISES)?;
                let existed = table.remove(key.as_str())?.is_some();
                existed
            };
            write_txn.commit()?;
            Ok(removed)
        })
        .await
    }
}
