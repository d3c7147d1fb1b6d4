// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token validation.
//!
//! ## Checks, in order
//!
//! 1. Signature, against the resolved key and the allowed algorithms
//! 2. Expiry (`exp`, when present) inside the same decode call
//! 3. Audience, exact match
//! 4. Group membership, when a role is requested and a groups claim is configured
//!
//! Every failure is one of the [`AuthError`] classes. Nothing that goes
//! wrong while decoding escapes as anything else.

use jsonwebtoken::{decode, Algorithm, Validation};

use super::keys::SigningKey;
use super::roles::enforce_role;
use super::{AuthError, ClaimSet};
use crate::config::{ConfigError, TrustConfig, DEFAULT_ALGORITHMS};

/// Validates bearer tokens for one audience.
#[derive(Debug, Clone)]
pub struct TokenValidator {
    audience: String,
    groups_claim: Option<String>,
    algorithms: Vec<Algorithm>,
    leeway_secs: u64,
}

impl TokenValidator {
    /// Validator for `audience` with the default algorithms and no groups claim.
    pub fn new(audience: impl Into<String>) -> Self {
        Self {
            audience: audience.into(),
            groups_claim: None,
            algorithms: DEFAULT_ALGORITHMS.to_vec(),
            leeway_secs: 0,
        }
    }

    /// Build from the trust configuration.
    ///
    /// Fails only when no audience is configured.
    pub fn from_config(config: &TrustConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            audience: config.audience()?.to_string(),
            groups_claim: config.groups_claim.clone(),
            algorithms: config.algorithms.clone(),
            leeway_secs: config.leeway_secs,
        })
    }

    pub fn with_groups_claim(mut self, claim: impl Into<String>) -> Self {
        self.groups_claim = Some(claim.into());
        self
    }

    pub fn with_algorithms(mut self, algorithms: impl Into<Vec<Algorithm>>) -> Self {
        self.algorithms = algorithms.into();
        self
    }

    pub fn with_leeway(mut self, leeway_secs: u64) -> Self {
        self.leeway_secs = leeway_secs;
        self
    }

    /// Validate `token` and return its claims unmodified.
    ///
    /// `role_name` is only enforced when a groups claim is configured.
    pub fn validate(
        &self,
        token: &str,
        key: &SigningKey,
        role_name: Option<&str>,
    ) -> Result<ClaimSet, AuthError> {
        let validation = self.validation_for(key)?;

        let claims = decode::<ClaimSet>(token, key.decoding_key(), &validation)
            .map_err(|e| {
                let detail = e.to_string();
                let err = AuthError::from(e);
                tracing::debug!(code = err.code(), error = %detail, "token rejected");
                err
            })?
            .claims;

        enforce_role(&claims, self.groups_claim.as_deref(), role_name)?;

        Ok(claims)
    }

    /// Decode options for `key`.
    ///
    /// The allowed algorithms are narrowed to those the key can verify; a
    /// token signed with anything else is rejected before its claims are
    /// looked at.
    fn validation_for(&self, key: &SigningKey) -> Result<Validation, AuthError> {
        let algorithms: Vec<Algorithm> = self
            .algorithms
            .iter()
            .copied()
            .filter(|alg| key.accepts(*alg))
            .collect();

        let Some(&first) = algorithms.first() else {
            tracing::debug!(family = ?key.family(), "no allowed algorithm matches the key");
            return Err(AuthError::InvalidToken);
        };

        let mut validation = Validation::new(first);
        validation.algorithms = algorithms;
        validation.leeway = self.leeway_secs;
        validation.validate_exp = true;
        validation.validate_nbf = true;
        // `exp` is checked when present, not demanded; `aud` must parse
        validation.set_required_spec_claims(&["aud"]);
        validation.set_audience(&[&self.audience]);
        Ok(validation)
    }
}
