// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Shared fixtures for unit tests: a fixture secret, token minting and a
//! ready-made configuration.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::{json, Value};

use crate::auth::TokenVerifier;
use crate::config::{GatewayConfig, SharedSecret, ALLOWED_ORIGINS_ENV, AUTH_SECRET_ENV};

pub const TEST_SECRET: &str = "fixture-secret-not-for-production";
pub const TEST_ORIGIN: &str = "https://simplefit.dzql.cc";

pub fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Claims shaped like a signed-in web session.
pub fn session_claims(email: &str) -> Value {
    let now = now();
    json!({
        "name": "Test User",
        "email": email,
        "picture": "https://example.com/avatar.png",
        "sub": "109876543210",
        "iat": now,
        "exp": now + 3600,
        "jti": "6d1f1c2e-test"
    })
}

pub fn sign_token(claims: &Value) -> String {
    sign_token_with(Algorithm::HS256, TEST_SECRET.as_bytes(), claims)
}

pub fn sign_token_with(alg: Algorithm, secret: &[u8], claims: &Value) -> String {
    encode(&Header::new(alg), claims, &EncodingKey::from_secret(secret))
        .expect("Failed to sign test token")
}

/// Assemble a token with an arbitrary `alg` and a junk signature.
pub fn forge_token(alg: &str, claims: &Value) -> String {
    let header = json!({ "alg": alg, "typ": "JWT" }).to_string();
    format!(
        "{}.{}.{}",
        URL_SAFE_NO_PAD.encode(header),
        URL_SAFE_NO_PAD.encode(claims.to_string()),
        URL_SAFE_NO_PAD.encode("forged-signature")
    )
}

pub fn verifier() -> TokenVerifier {
    TokenVerifier::new(&SharedSecret::new(TEST_SECRET).expect("fixture secret is non-empty"))
}

pub fn test_config() -> GatewayConfig {
    GatewayConfig::from_lookup(|name| match name {
        AUTH_SECRET_ENV => Some(TEST_SECRET.to_string()),
        ALLOWED_ORIGINS_ENV => Some(TEST_ORIGIN.to_string()),
        _ => None,
    })
    .expect("Failed to build test config")
}
