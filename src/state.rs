// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::auth::{AuthGate, TokenVerifier};
use crate::config::GatewayConfig;
use crate::cors::OriginPolicy;
use crate::identity::IdentityResolver;
use crate::storage::{ExerciseStore, IdentityStore};

#[derive(Clone)]
pub struct AppState {
    pub gate: AuthGate,
    pub exercises: Arc<dyn ExerciseStore>,
}

impl AppState {
    pub fn new(gate: AuthGate, exercises: Arc<dyn ExerciseStore>) -> Self {
        Self { gate, exercises }
    }

    /// Wire the gate and handlers from startup configuration.
    pub fn from_config(
        config: &GatewayConfig,
        identities: Arc<dyn IdentityStore>,
        exercises: Arc<dyn ExerciseStore>,
    ) -> Self {
        let gate = AuthGate::new(
            TokenVerifier::new(&config.secret),
            IdentityResolver::new(identities, config.store_timeout),
            OriginPolicy::new(config.allowed_origins.clone()),
        );
        Self::new(gate, exercises)
    }
}
