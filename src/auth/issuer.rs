// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token generation for tests and local tooling.
//!
//! This is not a production issuer: there is no key management and no
//! claim policy. It signs whatever it is given.

use chrono::{Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::Serialize;

use super::ClaimSet;

/// Sign `claims` into a compact JWT.
///
/// `kid`, when given, is written to the token header so JWKS-mode
/// validation can find the matching key.
pub fn generate_auth_token<C: Serialize>(
    claims: &C,
    key: &EncodingKey,
    algorithm: Algorithm,
    kid: Option<&str>,
) -> Result<String, jsonwebtoken::errors::Error> {
    let mut header = Header::new(algorithm);
    header.kid = kid.map(str::to_owned);
    encode(&header, claims, key)
}

/// Stamp `iat` with the current time and `exp` with `now + lifetime`.
///
/// A negative lifetime produces an already-expired token.
pub fn with_lifetime(claims: ClaimSet, lifetime: Duration) -> ClaimSet {
    let now = Utc::now();
    claims
        .with("iat", now.timestamp())
        .with("exp", (now + lifetime).timestamp())
}
