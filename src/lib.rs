// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! SimpleFit Gateway - Authenticated Exercise API
//!
//! This crate puts the SimpleFit exercise API behind bearer-token
//! authentication. Each request's HMAC-signed session token is verified,
//! its email resolved to a durable identity, and that identity handed to
//! the exercise handlers.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Token verification, the auth gate middleware and extractor
//! - `cors` - Credentialed cross-origin allow-list
//! - `identity` - Find-or-create identity resolution
//! - `storage` - Document store seams (in-memory and redb)

pub mod api;
pub mod auth;
pub mod config;
pub mod cors;
pub mod error;
pub mod identity;
pub mod models;
pub mod state;
pub mod storage;
pub mod telemetry;

#[cfg(test)]
mod test_support;
