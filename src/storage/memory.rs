// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-memory document store.
//!
//! Nothing survives a restart. Each call holds the lock only for the map
//! operation itself, never across an await point.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{CreateOutcome, ExerciseStore, IdentityStore, StoreResult};
use crate::models::{Exercise, Identity};

#[derive(Default)]
struct Tables {
    identities: HashMap<Uuid, Identity>,
    email_index: HashMap<String, Uuid>,
    exercises: HashMap<Uuid, BTreeMap<String, Exercise>>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored identities.
    pub async fn identity_count(&self) -> usize {
        self.tables.read().await.identities.len()
    }
}

#[async_trait]
impl IdentityStore for MemoryStore {
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<Identity>> {
        let tables = self.tables.read().await;
        Ok(tables
            .email_index
            .get(email)
            .and_then(|id| tables.identities.get(id))
            .cloned())
    }

    async fn create_identity(&self, id: Uuid, email: &str) -> StoreResult<CreateOutcome> {
        let mut tables = self.tables.write().await;

        if tables.email_index.contains_key(email) || tables.identities.contains_key(&id) {
            return Ok(CreateOutcome::Conflict);
        }

        tables.email_index.insert(email.to_string(), id);
        tables.identities.insert(
            id,
            Identity {
                id,
                email: email.to_string(),
            },
        );
        Ok(CreateOutcome::Created)
    }
}

#[async_trait]
impl ExerciseStore for MemoryStore {
    async fn list_exercises(&self, owner: Uuid) -> StoreResult<Vec<Exercise>> {
        let tables = self.tables.read().await;
        Ok(tables
            .exercises
            .get(&owner)
            .map(|by_id| by_id.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn upsert_exercise(&self, owner: Uuid, exercise: &Exercise) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        tables
            .exercises
            .entry(owner)
            .or_default()
            .insert(exercise.id.clone(), exercise.clone());
        Ok(())
    }

    async fn delete_exercise(&self, owner: Uuid, exercise_id: &str) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        Ok(tables
            .exercises
            .get_mut(&owner)
            .map(|by_id| by_id.remove(exercise_id).is_some())
            .unwrap_or(false))
    }
}
