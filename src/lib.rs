// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Bearer Gate - JWT request authentication for Axum services
//!
//! Validates `Authorization: Bearer` tokens against a static secret or a
//! JWKS endpoint, checks audience and expiry, optionally enforces group
//! membership, and hands the verified claims to the protected handler.
//!
//! ## Modules
//!
//! - `api` - Demo service routes and health probes
//! - `auth` - Key resolution, token validation, middleware and extractor
//! - `config` - Trust configuration and environment overrides

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod state;
