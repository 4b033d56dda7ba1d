// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Bearer token verification against the shared HMAC secret.
//!
//! ## Security
//!
//! - Only `HS256`, `HS384` and `HS512` are accepted. The JOSE header is
//!   inspected before any key material is touched, so `none` or asymmetric
//!   algorithms can never be checked against the symmetric secret.
//! - `exp` is mandatory; `nbf` is honoured when present.
//! - Clock skew tolerance is 60 seconds

use base64ct::{Base64UrlUnpadded, Encoding};
use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, DecodingKey, Validation};
use serde::Deserialize;

use super::claims::{ClaimSet, RawClaims};
use super::error::{AuthError, TokenInvalidReason};
use crate::config::SharedSecret;

/// Clock skew tolerance (60 seconds).
const CLOCK_SKEW_LEEWAY: u64 = 60;

/// Accepted signing algorithms, all keyed by the shared secret.
const HMAC_ALGORITHMS: [Algorithm; 3] = [Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];
const HMAC_ALGORITHM_NAMES: [&str; 3] = ["HS256", "HS384", "HS512"];

/// Longest `alg` value echoed back in an error message.
const MAX_ECHOED_ALG_LEN: usize = 16;

/// The only JOSE header field looked at before verification.
///
/// Read by hand rather than through `jsonwebtoken::decode_header`, which
/// fails on unknown algorithms and so cannot tell `alg: "none"` apart from a
/// malformed header.
#[derive(Deserialize)]
struct JoseHeader {
    alg: String,
}

/// Verifies `Authorization` header values and yields trusted claims.
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(secret: &SharedSecret) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = HMAC_ALGORITHMS.to_vec();
        validation.leeway = CLOCK_SKEW_LEEWAY;
        validation.validate_exp = true;
        validation.validate_nbf = true;
        // Session tokens carry no audience.
        validation.validate_aud = false;

        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Verify a raw `Authorization` header value.
    pub fn verify(&self, raw_header_value: &str) -> Result<ClaimSet, AuthError> {
        let token = bearer_token(raw_header_value)?;
        check_algorithm(token)?;

        let token_data =
            decode::<RawClaims>(token, &self.key, &self.validation).map_err(|e| {
                let reason = match e.kind() {
                    ErrorKind::InvalidSignature => TokenInvalidReason::BadSignature,
                    ErrorKind::ExpiredSignature => TokenInvalidReason::Expired,
                    ErrorKind::ImmatureSignature => TokenInvalidReason::NotYetValid,
                    ErrorKind::MissingRequiredClaim(claim) => {
                        TokenInvalidReason::MissingClaim(claim.clone())
                    }
                    _ => TokenInvalidReason::Malformed,
                };
                AuthError::TokenInvalid(reason)
            })?;

        ClaimSet::try_from(token_data.claims).map_err(AuthError::TokenInvalid)
    }
}

/// Extract the token from `Bearer <token>`. The scheme is case-insensitive.
fn bearer_token(raw: &str) -> Result<&str, AuthError> {
    let (scheme, token) = raw
        .trim()
        .split_once(' ')
        .ok_or(AuthError::MalformedHeader)?;

    if !scheme.eq_ignore_ascii_case("Bearer") {
        return Err(AuthError::MalformedHeader);
    }

    let token = token.trim();
    if token.is_empty() || token.contains(char::is_whitespace) {
        return Err(AuthError::MalformedHeader);
    }

    Ok(token)
}

/// Reject tokens whose declared algorithm is outside the HMAC family.
fn check_algorithm(token: &str) -> Result<(), AuthError> {
    let malformed = || AuthError::TokenInvalid(TokenInvalidReason::Malformed);

    let mut segments = token.split('.');
    let header_segment = segments.next().ok_or_else(malformed)?;
    if segments.count() != 2 {
        return Err(malformed());
    }

    let header_bytes = Base64UrlUnpadded::decode_vec(header_segment).map_err(|_| malformed())?;
    let header: JoseHeader = serde_json::from_slice(&header_bytes).map_err(|_| malformed())?;

    if !HMAC_ALGORITHM_NAMES.contains(&header.alg.as_str()) {
        let echoed: String = header.alg.chars().take(MAX_ECHOED_ALG_LEN).collect();
        return Err(AuthError::UnsupportedAlgorithm(echoed));
    }

    Ok(())
}
