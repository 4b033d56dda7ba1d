// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Credentialed cross-origin policy.
//!
//! The gateway only ever echoes an exact, allow-listed origin together with
//! `Access-Control-Allow-Credentials: true`. A wildcard origin cannot be
//! configured, so the unsafe wildcard-plus-credentials combination is
//! unrepresentable. The policy governs what browsers may read; it never
//! decides whether a request is admitted.

use std::collections::BTreeSet;

use axum::http::{
    header::{
        ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_HEADERS,
        ACCESS_CONTROL_ALLOW_ORIGIN,
    },
    HeaderMap, HeaderValue,
};
use url::Url;

use crate::config::ConfigError;

/// Request headers a browser may send on credentialed cross-origin calls.
pub const ALLOWED_REQUEST_HEADERS: &str = "Content-Type,Authorization";

/// Immutable allow-list of browser origins, fixed at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OriginSet {
    origins: BTreeSet<String>,
}

impl OriginSet {
    /// Build the set, validating that every entry is a bare
    /// `scheme://host[:port]` origin.
    pub fn new<I, S>(origins: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = BTreeSet::new();
        for origin in origins {
            let origin = origin.as_ref().trim();
            if origin.is_empty() {
                continue;
            }
            validate_origin(origin)?;
            set.insert(origin.to_string());
        }
        Ok(Self { origins: set })
    }

    /// Parse a comma-separated list such as `ALLOWED_ORIGINS`.
    pub fn parse_list(raw: &str) -> Result<Self, ConfigError> {
        Self::new(raw.split(','))
    }

    pub fn contains(&self, origin: &str) -> bool {
        self.origins.contains(origin)
    }

    pub fn len(&self) -> usize {
        self.origins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.origins.is_empty()
    }
}

fn validate_origin(origin: &str) -> Result<(), ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidOrigin {
        origin: origin.to_string(),
        reason: reason.to_string(),
    };

    if origin == "*" || origin.eq_ignore_ascii_case("null") {
        return Err(invalid("wildcard and null origins cannot carry credentials"));
    }

    let url = Url::parse(origin).map_err(|e| invalid(&e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid("scheme must be http or https"));
    }

    // Browsers send the serialized origin verbatim, so anything else would
    // never match.
    if url.origin().ascii_serialization() != origin {
        return Err(invalid("expected a bare scheme://host[:port] origin"));
    }

    Ok(())
}

/// Maps a request `Origin` to the CORS response headers it earns.
#[derive(Debug, Clone)]
pub struct OriginPolicy {
    allowed: OriginSet,
}

impl OriginPolicy {
    pub fn new(allowed: OriginSet) -> Self {
        Self { allowed }
    }

    /// Headers to attach for `request_origin`; empty when it is not allow-listed.
    pub fn headers_for(&self, request_origin: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();

        if !self.allowed.contains(request_origin) {
            return headers;
        }

        let Ok(origin) = HeaderValue::from_str(request_origin) else {
            return headers;
        };

        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, origin);
        headers.insert(
            ACCESS_CONTROL_ALLOW_CREDENTIALS,
            HeaderValue::from_static("true"),
        );
        headers.insert(
            ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOWED_REQUEST_HEADERS),
        );
        headers
    }
}
