// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Bearer-token authentication for the SimpleFit API.
//!
//! ## Auth Flow
//!
//! 1. The web client signs the user in with its identity provider
//! 2. Its server-side proxy re-signs the session as an HS256 JWT with the
//!    shared `AUTH_SECRET` and sends `Authorization: Bearer <JWT>`
//! 3. The gateway:
//!    - Rejects any algorithm outside the HMAC family
//!    - Verifies signature, expiry and not-before
//!    - Extracts:
//!      - `email` → resolved to a durable identity (created on first login)
//!    - Attaches the identity to the request for downstream handlers
//!
//! ## Security
//!
//! - All non-health endpoints require authentication
//! - The secret is loaded once at startup and never logged
//! - Emails appear in logs only as SHA-256 fingerprints
//! - Clock skew tolerance is 60 seconds

pub mod claims;
pub mod error;
pub mod extractor;
pub mod middleware;
pub mod verifier;

pub use claims::{ClaimSet, RequestAuthContext};
pub use error::{AuthError, TokenInvalidReason};
pub use extractor::Auth;
pub use middleware::{auth_gate, AuthGate, GateRejection};
pub use verifier::TokenVerifier;
