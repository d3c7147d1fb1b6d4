// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Bearer-token (JWT) authentication for Axum services.
//!
//! ## Auth Flow
//!
//! 1. Client sends `Authorization: Bearer <JWT>`
//! 2. The gate resolves the verification key:
//!    - JWKS mode (`JWKS_URL` set): fetch the key set, pick the key by `kid`
//!    - Static mode: the configured `JWT_SECRET`
//! 3. The validator checks signature, expiry, audience and, when a groups
//!    claim is configured, membership in the route's required role
//! 4. The claims are stored in request extensions as [`CurrentUser`]
//!
//! ## Errors
//!
//! Token problems are answered with 401 and one of `token_expired`,
//! `invalid_audience`, `invalid_token`, `unauthorized` or `unknown_error`.
//! A service that cannot authenticate anyone (no secret, no audience)
//! answers 500.

pub mod claims;
pub mod error;
pub mod extractor;
pub mod issuer;
pub mod jwks;
pub mod keys;
pub mod middleware;
pub mod roles;
pub mod validator;

#[cfg(test)]
pub(crate) mod test_support;

pub use claims::{ClaimSet, CurrentUser};
pub use error::AuthError;
pub use issuer::generate_auth_token;
pub use jwks::JwksClient;
pub use keys::{KeyError, KeyResolver, SigningKey};
pub use middleware::{auth_middleware, authenticate, AuthGate, GateError};
pub use validator::TokenValidator;
