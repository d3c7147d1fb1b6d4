// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names, default values and the
//! [`TrustConfig`] that drives token validation. Configuration is resolved
//! once at startup and is read-only for the rest of the process.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `JWT_SECRET` | Shared secret (or RSA public key PEM) for static mode | None |
//! | `JWT_AUDIENCE` | Expected `aud` claim | Required |
//! | `JWKS_URL` | JWKS endpoint; enables JWKS mode when set | None |
//! | `GROUPS_CLAIM` | Claim holding the caller's groups/roles | None |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `REQUIRED_ROLE` | Role required on the protected demo route | None |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::fmt;
use std::time::Duration;

use jsonwebtoken::Algorithm;
use thiserror::Error;

/// Environment variable name for the static shared secret.
pub const JWT_SECRET_ENV: &str = "JWT_SECRET";

/// Environment variable name for the expected token audience.
pub const JWT_AUDIENCE_ENV: &str = "JWT_AUDIENCE";

/// Environment variable name for the JWKS endpoint.
///
/// When set, signing keys are looked up in the published key set by `kid`
/// instead of using the static secret.
pub const JWKS_URL_ENV: &str = "JWKS_URL";

/// Environment variable name for the claim that carries group membership.
pub const GROUPS_CLAIM_ENV: &str = "GROUPS_CLAIM";

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const REQUIRED_ROLE_ENV: &str = "REQUIRED_ROLE";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;

/// Default timeout for a single JWKS fetch.
pub const DEFAULT_JWKS_TIMEOUT: Duration = Duration::from_secs(10);

/// Algorithms accepted when the caller does not restrict them.
pub const DEFAULT_ALGORITHMS: [Algorithm; 2] = [Algorithm::RS256, Algorithm::HS256];

/// Configuration faults that make the service unable to authenticate anyone.
///
/// These are never reported to callers as auth failures; the request gate
/// turns them into a generic 500.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("no signing secret configured for static key mode")]
    MissingSecret,
    #[error("no audience configured")]
    MissingAudience,
    #[error("failed to build JWKS HTTP client: {0}")]
    HttpClient(String),
}

/// Trust configuration for token validation.
///
/// Exactly one key-resolution mode is active: JWKS mode when `jwks_url` is
/// set, static-secret mode otherwise.
#[derive(Clone, PartialEq, Eq)]
pub struct TrustConfig {
    /// Shared secret for static mode
    pub secret: Option<String>,
    /// Expected `aud` claim
    pub audience: Option<String>,
    /// JWKS endpoint (`http(s)://` or `file://`)
    pub jwks_url: Option<String>,
    /// Name of the claim holding the caller's groups
    pub groups_claim: Option<String>,
    /// Algorithms accepted by the validator
    pub algorithms: Vec<Algorithm>,
    /// Clock skew tolerance for `exp`/`nbf`, in seconds
    pub leeway_secs: u64,
    /// Upper bound on a single JWKS fetch
    pub jwks_timeout: Duration,
}

impl Default for TrustConfig {
    fn default() -> Self {
        Self {
            secret: None,
            audience: None,
            jwks_url: None,
            groups_claim: None,
            algorithms: DEFAULT_ALGORITHMS.to_vec(),
            leeway_secs: 0,
            jwks_timeout: DEFAULT_JWKS_TIMEOUT,
        }
    }
}

// Key material stays out of logs.
impl fmt::Debug for TrustConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrustConfig")
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .field("audience", &self.audience)
            .field("jwks_url", &self.jwks_url)
            .field("groups_claim", &self.groups_claim)
            .field("algorithms", &self.algorithms)
            .field("leeway_secs", &self.leeway_secs)
            .field("jwks_timeout", &self.jwks_timeout)
            .finish()
    }
}

impl TrustConfig {
    /// Create a static-secret configuration.
    pub fn new(secret: impl Into<String>, audience: impl Into<String>) -> Self {
        Self {
            secret: Some(secret.into()),
            audience: Some(audience.into()),
            ..Self::default()
        }
    }

    /// Create a JWKS-mode configuration.
    pub fn with_jwks(jwks_url: impl Into<String>, audience: impl Into<String>) -> Self {
        Self {
            jwks_url: Some(jwks_url.into()),
            audience: Some(audience.into()),
            ..Self::default()
        }
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

    pub fn with_jwks_timeout(mut self, timeout: Duration) -> Self {
        self.jwks_timeout = timeout;
        self
    }

    /// Whether keys come from a JWKS endpoint.
    pub fn is_jwks_mode(&self) -> bool {
        self.jwks_url.is_some()
    }

    /// The configured audience, or a misconfiguration error.
    pub fn audience(&self) -> Result<&str, ConfigError> {
        self.audience.as_deref().ok_or(ConfigError::MissingAudience)
    }

    /// Check that the configuration can authenticate requests at all.
    pub fn check_usable(&self) -> Result<(), ConfigError> {
        self.audience()?;
        if !self.is_jwks_mode() && self.secret.is_none() {
            return Err(ConfigError::MissingSecret);
        }
        Ok(())
    }
}

/// Overlay environment overrides onto `base`.
///
/// `env` looks up a variable by name. Present, non-empty values replace the
/// corresponding base field; everything else is left as it was. No value is
/// validated here.
pub fn resolve<F>(base: TrustConfig, env: F) -> TrustConfig
where
    F: Fn(&str) -> Option<String>,
{
    let lookup = |name: &str| env(name).filter(|value| !value.is_empty());

    let mut config = base;
    if let Some(secret) = lookup(JWT_SECRET_ENV) {
        config.secret = Some(secret);
    }
    if let Some(audience) = lookup(JWT_AUDIENCE_ENV) {
        config.audience = Some(audience);
    }
    if let Some(jwks_url) = lookup(JWKS_URL_ENV) {
        config.jwks_url = Some(jwks_url);
    }
    if let Some(groups_claim) = lookup(GROUPS_CLAIM_ENV) {
        config.groups_claim = Some(groups_claim);
    }
    config
}

/// [`resolve`] against the process environment.
pub fn resolve_from_env(base: TrustConfig) -> TrustConfig {
    resolve(base, |name| std::env::var(name).ok())
}
