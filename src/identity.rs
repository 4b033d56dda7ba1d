// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Identity resolution: verified email → durable [`Identity`].
//!
//! The resolver never assumes it is the only one creating an identity for an
//! email. It relies on the store's conditional create and, when it loses a
//! race, re-reads the winner's record.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use crate::models::Identity;
use crate::storage::{CreateOutcome, IdentityStore, StoreError, StoreResult};
use crate::telemetry::email_fingerprint;

/// Find-or-create over an [`IdentityStore`], with a deadline on every call.
#[derive(Clone)]
pub struct IdentityResolver {
    store: Arc<dyn IdentityStore>,
    deadline: Duration,
}

impl IdentityResolver {
    pub fn new(store: Arc<dyn IdentityStore>, deadline: Duration) -> Self {
        Self { store, deadline }
    }

    /// Resolve `email` to its identity, creating it on first sight.
    pub async fn resolve(&self, email: &str) -> StoreResult<Identity> {
        if let Some(existing) = self.bounded(self.store.find_by_email(email)).await? {
            return Ok(existing);
        }

        let id = Uuid::new_v4();
        match self.bounded(self.store.create_identity(id, email)).await? {
            CreateOutcome::Created => {
                tracing::info!(
                    identity_id = %id,
                    email_fp = %email_fingerprint(email),
                    "Created identity"
                );
                Ok(Identity {
                    id,
                    email: email.to_string(),
                })
            }
            CreateOutcome::Conflict => {
                tracing::debug!(
                    email_fp = %email_fingerprint(email),
                    "Lost identity create race, re-reading"
                );
                self.bounded(self.store.find_by_email(email))
                    .await?
                    .ok_or_else(|| {
                        StoreError::Conflict(
                            "identity create conflicted but no identity holds the email"
                                .to_string(),
                        )
                    })
            }
        }
    }

    async fn bounded<T>(&self, call: impl Future<Output = StoreResult<T>>) -> StoreResult<T> {
        tokio::time::timeout(self.deadline, call)
            .await
            .map_err(|_| StoreError::Timeout(self.deadline))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn resolver(store: Arc<dyn IdentityStore>) -> IdentityResolver {
        IdentityResolver::new(store, Duration::from_secs(5))
    }

    #[tokio::test]
    async fn first_sight_creates_then_reuses() {
        let store = Arc::new(MemoryStore::new());
        let resolver = resolver(store.clone());

        let first = resolver.resolve("a@x.com").await.unwrap();
        assert_eq!(first.email, "a@x.com");

        let second = resolver.resolve("a@x.com").await.unwrap();
        assert_eq!(second.id, first.id);
        assert_eq!(store.identity_count().await, 1);
    }

    #[tokio::test]
    async fn distinct_emails_get_distinct_ids() {
        let resolver = resolver(Arc::new(MemoryStore::new()));
        let a = resolver.resolve("a@x.com").await.unwrap();
        let b = resolver.resolve("b@x.com").await.unwrap();
        assert_ne!(a.id, b.id);
    }

    #[tokio::test]
    async fn concurrent_first_logins_converge() {
        let store = Arc::new(MemoryStore::new());
        let resolver = resolver(store.clone());

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let resolver = resolver.clone();
                tokio::spawn(async move { resolver.resolve("race@x.com").await })
            })
            .collect();

        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap().unwrap().id);
        }
        ids.dedup();
        assert_eq!(ids.len(), 1);
        assert_eq!(store.identity_count().await, 1);
    }

    /// Lets a competing writer win between the find and the create.
    struct RacingStore {
        inner: MemoryStore,
        winner: Uuid,
    }

    #[async_trait]
    impl IdentityStore for RacingStore {
        async fn find_by_email(&self, email: &str) -> StoreResult<Option<Identity>> {
            self.inner.find_by_email(email).await
        }

        async fn create_identity(&self, id: Uuid, email: &str) -> StoreResult<CreateOutcome> {
            self.inner.create_identity(self.winner, email).await?;
            self.inner.create_identity(id, email).await
        }
    }

    #[tokio::test]
    async fn lost_race_returns_winner() {
        let winner = Uuid::new_v4();
        let resolver = resolver(Arc::new(RacingStore {
            inner: MemoryStore::new(),
            winner,
        }));

        let identity = resolver.resolve("a@x.com").await.unwrap();
        assert_eq!(identity.id, winner);
    }

    /// Reports a conflict without ever storing anything.
    struct PhantomConflictStore;

    #[async_trait]
    impl IdentityStore for PhantomConflictStore {
        async fn find_by_email(&self, _email: &str) -> StoreResult<Option<Identity>> {
            Ok(None)
        }

        async fn create_identity(&self, _id: Uuid, _email: &str) -> StoreResult<CreateOutcome> {
            Ok(CreateOutcome::Conflict)
        }
    }

    #[tokio::test]
    async fn unresolvable_conflict_is_a_store_error() {
        let resolver = resolver(Arc::new(PhantomConflictStore));
        assert!(matches!(
            resolver.resolve("a@x.com").await,
            Err(StoreError::Conflict(_))
        ));
    }

    /// Never answers within any reasonable deadline.
    struct StalledStore {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl IdentityStore for StalledStore {
        async fn find_by_email(&self, _email: &str) -> StoreResult<Option<Identity>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(None)
        }

        async fn create_identity(&self, _id: Uuid, _email: &str) -> StoreResult<CreateOutcome> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(CreateOutcome::Created)
        }
    }

    #[tokio::test]
    async fn stalled_store_times_out() {
        let store = Arc::new(StalledStore {
            calls: AtomicUsize::new(0),
        });
        let resolver = IdentityResolver::new(store.clone(), Duration::from_millis(20));

        let result = resolver.resolve("a@x.com").await;
        assert!(matches!(result, Err(StoreError::Timeout(_))));
        // The create path is never reached after a failed lookup.
        assert_eq!(store.calls.load(Ordering::SeqCst), 1);
    }
}
