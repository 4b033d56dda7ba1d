// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names, default values and the
//! [`GatewayConfig`] loaded once at startup. Any error here is fatal: the
//! process refuses to bind rather than serve with a default secret.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `AUTH_SECRET` | HMAC secret shared with the session issuer | Required |
//! | `ALLOWED_ORIGINS` | Comma-separated browser origins allowed credentialed CORS | `http://localhost:3000,https://simplefit.dzql.cc` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `DATA_DIR` | Directory holding the redb document store | In-memory store |
//! | `STORE_TIMEOUT_MS` | Deadline for each document store call | `5000` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use crate::cors::OriginSet;

pub const AUTH_SECRET_ENV: &str = "AUTH_SECRET";
pub const ALLOWED_ORIGINS_ENV: &str = "ALLOWED_ORIGINS";
pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";

/// Environment variable name for the document store directory.
///
/// When unset the gateway keeps identities and exercises in memory, which
/// is only suitable for development.
pub const DATA_DIR_ENV: &str = "DATA_DIR";

pub const STORE_TIMEOUT_ENV: &str = "STORE_TIMEOUT_MS";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:3000,https://simplefit.dzql.cc";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_millis(5000);
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

/// File name of the redb database inside `DATA_DIR`.
pub const DATABASE_FILE: &str = "simplefit.redb";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("AUTH_SECRET must be set to a non-empty value")]
    MissingSecret,

    #[error("invalid value for {name}: {value:?}")]
    InvalidValue { name: &'static str, value: String },

    #[error("invalid allowed origin {origin:?}: {reason}")]
    InvalidOrigin { origin: String, reason: String },
}

/// The HMAC key shared with the token issuer.
///
/// Never printed: `Debug` is redacted so the config can be logged safely.
#[derive(Clone)]
pub struct SharedSecret(Vec<u8>);

impl SharedSecret {
    /// Wrap the raw secret, refusing an empty value.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self, ConfigError> {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Err(ConfigError::MissingSecret);
        }
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SharedSecret(<redacted>)")
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

impl LogFormat {
    /// Read `LOG_FORMAT`; unknown values fall back to pretty output.
    ///
    /// Kept apart from [`GatewayConfig`] so logging is up before the rest of
    /// the configuration is validated.
    pub fn from_env() -> Self {
        Self::parse(std::env::var(LOG_FORMAT_ENV).ok().as_deref())
    }

    fn parse(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()) {
            Some(v) if v == "json" => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

/// Process-wide configuration, read-only after startup.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub secret: SharedSecret,
    pub allowed_origins: OriginSet,
    pub host: String,
    pub port: u16,
    pub data_dir: Option<PathBuf>,
    pub store_timeout: Duration,
}

impl GatewayConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret = SharedSecret::new(lookup(AUTH_SECRET_ENV).unwrap_or_default())?;

        let origins = lookup(ALLOWED_ORIGINS_ENV)
            .unwrap_or_else(|| DEFAULT_ALLOWED_ORIGINS.to_string());
        let allowed_origins = OriginSet::parse_list(&origins)?;

        let host = lookup(HOST_ENV)
            .filter(|h| !h.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = match lookup(PORT_ENV) {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                name: PORT_ENV,
                value: raw,
            })?,
            None => DEFAULT_PORT,
        };

        let data_dir = lookup(DATA_DIR_ENV)
            .filter(|d| !d.trim().is_empty())
            .map(PathBuf::from);

        let store_timeout = match lookup(STORE_TIMEOUT_ENV) {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(ms) if ms > 0 => Duration::from_millis(ms),
                _ => {
                    return Err(ConfigError::InvalidValue {
                        name: STORE_TIMEOUT_ENV,
                        value: raw,
                    })
                }
            },
            None => DEFAULT_STORE_TIMEOUT,
        };

        Ok(Self {
            secret,
            allowed_origins,
            host,
            port,
            data_dir,
            store_timeout,
        })
    }

    /// Socket address to bind.
    ///
    /// `HOST` is a bare IPv4 or IPv6 address; IPv6 hosts are not bracketed.
    pub fn bind_address(&self) -> Result<SocketAddr, ConfigError> {
        let ip: IpAddr = self
            .host
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue {
                name: HOST_ENV,
                value: self.host.clone(),
            })?;
        Ok(SocketAddr::new(ip, self.port))
    }

    /// Path of the redb database, if a data directory is configured.
    pub fn database_path(&self) -> Option<PathBuf> {
        self.data_dir.as_ref().map(|dir| dir.join(DATABASE_FILE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn missing_secret_is_fatal() {
        let result = GatewayConfig::from_lookup(lookup_from(&[]));
        assert!(matches!(result, Err(ConfigError::MissingSecret)));
    }

    #[test]
    fn empty_secret_is_fatal() {
        let result = GatewayConfig::from_lookup(lookup_from(&[(AUTH_SECRET_ENV, "")]));
        assert!(matches!(result, Err(ConfigError::MissingSecret)));
    }

    #[test]
    fn defaults_apply_when_only_secret_is_set() {
        let config = GatewayConfig::from_lookup(lookup_from(&[(AUTH_SECRET_ENV, "s3cret")]))
            .expect("config should load");

        assert_eq!(config.secret.as_bytes(), b"s3cret");
        assert_eq!(config.host, DEFAULT_HOST);
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.store_timeout, DEFAULT_STORE_TIMEOUT);
        assert!(config.data_dir.is_none());
        assert!(config.database_path().is_none());
        assert!(config.allowed_origins.contains("http://localhost:3000"));
        assert!(config.allowed_origins.contains("https://simplefit.dzql.cc"));
    }

    #[test]
    fn overrides_are_read() {
        let config = GatewayConfig::from_lookup(lookup_from(&[
            (AUTH_SECRET_ENV, "s3cret"),
            (ALLOWED_ORIGINS_ENV, "https://app.example, https://admin.example"),
            (HOST_ENV, "127.0.0.1"),
            (PORT_ENV, "9090"),
            (DATA_DIR_ENV, "/var/lib/simplefit"),
            (STORE_TIMEOUT_ENV, "250"),
        ]))
        .expect("config should load");

        assert_eq!(config.port, 9090);
        assert_eq!(config.store_timeout, Duration::from_millis(250));
        assert_eq!(
            config.database_path(),
            Some(PathBuf::from("/var/lib/simplefit").join(DATABASE_FILE))
        );
        assert_eq!(
            config.bind_address().unwrap(),
            "127.0.0.1:9090".parse::<SocketAddr>().unwrap()
        );
        assert!(config.allowed_origins.contains("https://admin.example"));
        assert!(!config.allowed_origins.contains("http://localhost:3000"));
    }

    #[test]
    fn ipv6_host_binds() {
        let config = GatewayConfig::from_lookup(lookup_from(&[
            (AUTH_SECRET_ENV, "s3cret"),
            (HOST_ENV, "::"),
            (PORT_ENV, "8443"),
        ]))
        .expect("config should load");

        let addr = config.bind_address().unwrap();
        assert!(addr.is_ipv6());
        assert_eq!(addr.port(), 8443);
    }

    #[test]
    fn hostname_host_is_rejected_at_bind() {
        let config = GatewayConfig::from_lookup(lookup_from(&[
            (AUTH_SECRET_ENV, "s3cret"),
            (HOST_ENV, "localhost"),
        ]))
        .expect("config should load");

        assert!(matches!(
            config.bind_address(),
            Err(ConfigError::InvalidValue { name: HOST_ENV, .. })
        ));
    }

    #[test]
    fn invalid_port_is_rejected() {
        let result = GatewayConfig::from_lookup(lookup_from(&[
            (AUTH_SECRET_ENV, "s3cret"),
            (PORT_ENV, "eighty"),
        ]));
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue { name: PORT_ENV, .. })
        ));
    }

    #[test]
    fn zero_store_timeout_is_rejected() {
        let result = GatewayConfig::from_lookup(lookup_from(&[
            (AUTH_SECRET_ENV, "s3cret"),
            (STORE_TIMEOUT_ENV, "0"),
        ]));
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue { name: STORE_TIMEOUT_ENV, .. })
        ));
    }

    #[test]
    fn wildcard_origin_is_rejected() {
        let result = GatewayConfig::from_lookup(lookup_from(&[
            (AUTH_SECRET_ENV, "s3cret"),
            (ALLOWED_ORIGINS_ENV, "*"),
        ]));
        assert!(matches!(result, Err(ConfigError::InvalidOrigin { .. })));
    }

    #[test]
    fn secret_debug_is_redacted() {
        let secret = SharedSecret::new("hunter2").unwrap();
        let printed = format!("{secret:?}");
        assert!(!printed.contains("hunter2"));
    }

    #[test]
    fn log_format_parses_json_case_insensitively() {
        assert_eq!(LogFormat::parse(Some("JSON")), LogFormat::Json);
        assert_eq!(LogFormat::parse(Some("pretty")), LogFormat::Pretty);
        assert_eq!(LogFormat::parse(Some("xml")), LogFormat::Pretty);
        assert_eq!(LogFormat::parse(None), LogFormat::Pretty);
    }
}
