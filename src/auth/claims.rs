// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JWT claims and the per-request authentication context.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::error::TokenInvalidReason;
use crate::models::Identity;

/// Claims as they come off the wire, before required fields are enforced.
///
/// Session tokens are minted from the frontend's session payload, so they
/// carry profile fields next to the registered claims.
#[derive(Debug, Deserialize)]
pub(crate) struct RawClaims {
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    sub: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    picture: Option<String>,
    #[serde(default)]
    jti: Option<String>,
    /// Presence and freshness are enforced by the decoder
    #[serde(default)]
    exp: Option<i64>,
    #[serde(default)]
    iat: Option<i64>,
    #[serde(default)]
    nbf: Option<i64>,
}

/// Verified claims extracted from a session token.
///
/// Only [`super::TokenVerifier`] constructs this, and only after the
/// signature and registered claims have been checked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClaimSet {
    /// Natural key of the caller's identity
    pub email: String,
    /// Expiration timestamp
    pub exp: i64,
    /// Subject at the upstream identity provider
    pub sub: Option<String>,
    pub name: Option<String>,
    pub picture: Option<String>,
    pub jti: Option<String>,
    /// Issued at timestamp
    pub iat: Option<i64>,
    /// Not before timestamp
    pub nbf: Option<i64>,
}

impl TryFrom<RawClaims> for ClaimSet {
    type Error = TokenInvalidReason;

    fn try_from(raw: RawClaims) -> Result<Self, Self::Error> {
        let email = raw
            .email
            .filter(|e| !e.trim().is_empty())
            .ok_or_else(|| TokenInvalidReason::MissingClaim("email".to_string()))?;
        let exp = raw
            .exp
            .ok_or_else(|| TokenInvalidReason::MissingClaim("exp".to_string()))?;

        Ok(Self {
            email,
            exp,
            sub: raw.sub,
            name: raw.name,
            picture: raw.picture,
            jti: raw.jti,
            iat: raw.iat,
            nbf: raw.nbf,
        })
    }
}

/// Identity attached to a request by the auth gate.
///
/// Lives in the request extensions for exactly one request; downstream
/// handlers read it through the [`super::Auth`] extractor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct RequestAuthContext {
    /// Stable internal identity id
    pub identity_id: Uuid,
    /// Email the identity was resolved from
    pub email: String,
}

impl From<&Identity> for RequestAuthContext {
    fn from(identity: &Identity) -> Self {
        Self {
            identity_id: identity.id,
            email: identity.email.clone(),
        }
    }
}
