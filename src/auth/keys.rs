// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Signing key resolution.
//!
//! A request's verification key comes from exactly one place: the JWKS
//! endpoint when one is configured, the static secret otherwise.

use jsonwebtoken::jwk::{AlgorithmParameters, Jwk, KeyAlgorithm};
use jsonwebtoken::{decode_header, Algorithm, DecodingKey};
use thiserror::Error;

use super::jwks::JwksClient;
use crate::config::{ConfigError, TrustConfig};

/// Key resolution failures.
///
/// Only [`KeyError::MissingSecret`] is a service fault. Everything else is
/// reported to the caller as a single opaque auth failure so that an
/// unknown `kid` cannot be told apart from an unreachable key server.
#[derive(Debug, Error)]
pub enum KeyError {
    #[error("no signing secret configured")]
    MissingSecret,
    #[error("malformed token header: {0}")]
    MalformedHeader(String),
    #[error("token header has no key id")]
    MissingKeyId,
    #[error("failed to fetch JWKS: {0}")]
    Fetch(String),
    #[error("malformed JWKS document: {0}")]
    MalformedKeySet(String),
    #[error("no key with id '{0}' in JWKS")]
    NoMatchingKey(String),
    #[error("unsupported key: {0}")]
    UnsupportedKey(String),
    #[error("invalid key material: {0}")]
    InvalidKeyMaterial(String),
}

/// Algorithm families a verification key can belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyFamily {
    Hmac,
    Rsa,
    Ec,
}

impl KeyFamily {
    /// Family that verifies `algorithm`, if supported.
    pub fn of(algorithm: Algorithm) -> Option<KeyFamily> {
        match algorithm {
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => Some(KeyFamily::Hmac),
            Algorithm::RS256
            | Algorithm::RS384
            | Algorithm::RS512
            | Algorithm::PS256
            | Algorithm::PS384
            | Algorithm::PS512 => Some(KeyFamily::Rsa),
            Algorithm::ES256 | Algorithm::ES384 => Some(KeyFamily::Ec),
            _ => None,
        }
    }
}

/// Key material used to verify a token signature.
#[derive(Clone)]
pub struct SigningKey {
    key: DecodingKey,
    family: KeyFamily,
    /// Algorithm pinned by the key itself (a JWK's `alg`)
    algorithm: Option<Algorithm>,
}

impl std::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print key material
        f.debug_struct("SigningKey")
            .field("family", &self.family)
            .field("algorithm", &self.algorithm)
            .finish()
    }
}

impl SigningKey {
    /// HMAC shared secret.
    pub fn from_secret(secret: &[u8]) -> Self {
        Self {
            key: DecodingKey::from_secret(secret),
            family: KeyFamily::Hmac,
            algorithm: None,
        }
    }

    /// RSA public key in PEM form.
    pub fn from_rsa_pem(pem: &[u8]) -> Result<Self, KeyError> {
        let key = DecodingKey::from_rsa_pem(pem)
            .map_err(|e| KeyError::InvalidKeyMaterial(e.to_string()))?;
        Ok(Self {
            key,
            family: KeyFamily::Rsa,
            algorithm: None,
        })
    }

    /// Interpret a configured static secret.
    ///
    /// PEM-encoded values are RSA public keys; anything else is used
    /// verbatim as an HMAC secret.
    pub fn from_static(secret: &str) -> Result<Self, KeyError> {
        if secret.trim_start().starts_with("-----BEGIN") {
            Self::from_rsa_pem(secret.as_bytes())
        } else {
            Ok(Self::from_secret(secret.as_bytes()))
        }
    }

    /// Convert a published JWK into a verification key.
    pub fn from_jwk(jwk: &Jwk) -> Result<Self, KeyError> {
        let (key, family) = match &jwk.algorithm {
            AlgorithmParameters::RSA(rsa) => {
                let key = DecodingKey::from_rsa_components(&rsa.n, &rsa.e)
                    .map_err(|e| KeyError::InvalidKeyMaterial(format!("RSA key: {e}")))?;
                (key, KeyFamily::Rsa)
            }
            AlgorithmParameters::EllipticCurve(ec) => {
                let key = DecodingKey::from_ec_components(&ec.x, &ec.y)
                    .map_err(|e| KeyError::InvalidKeyMaterial(format!("EC key: {e}")))?;
                (key, KeyFamily::Ec)
            }
            _ => {
                return Err(KeyError::UnsupportedKey(
                    "only RSA and EC keys are supported".to_string(),
                ))
            }
        };

        let algorithm = match jwk.common.key_algorithm {
            Some(declared) => Some(declared_algorithm(declared, family)?),
            None => None,
        };

        Ok(Self {
            key,
            family,
            algorithm,
        })
    }

    pub fn decoding_key(&self) -> &DecodingKey {
        &self.key
    }

    pub fn family(&self) -> KeyFamily {
        self.family
    }

    /// Whether this key can verify tokens signed with `algorithm`.
    pub fn accepts(&self, algorithm: Algorithm) -> bool {
        KeyFamily::of(algorithm) == Some(self.family)
            && self.algorithm.is_none_or(|pinned| pinned == algorithm)
    }
}

/// Map a JWK's declared `alg` onto a signature algorithm of the key's family.
fn declared_algorithm(declared: KeyAlgorithm, family: KeyFamily) -> Result<Algorithm, KeyError> {
    let algorithm = match declared {
        KeyAlgorithm::RS256 => Algorithm::RS256,
        KeyAlgorithm::RS384 => Algorithm::RS384,
        KeyAlgorithm::RS512 => Algorithm::RS512,
        KeyAlgorithm::PS256 => Algorithm::PS256,
        KeyAlgorithm::PS384 => Algorithm::PS384,
        KeyAlgorithm::PS512 => Algorithm::PS512,
        KeyAlgorithm::ES256 => Algorithm::ES256,
        KeyAlgorithm::ES384 => Algorithm::ES384,
        other => {
            return Err(KeyError::UnsupportedKey(format!(
                "algorithm {other:?} is not a signature algorithm"
            )))
        }
    };

    if KeyFamily::of(algorithm) != Some(family) {
        return Err(KeyError::UnsupportedKey(format!(
            "algorithm {algorithm:?} does not match {family:?} key"
        )));
    }
    Ok(algorithm)
}

/// Resolves the verification key for a request.
#[derive(Debug, Clone)]
pub enum KeyResolver {
    /// Static mode: the configured secret, if any
    Static(Option<String>),
    /// JWKS mode: look the token's `kid` up in the published key set
    Jwks(JwksClient),
}

impl KeyResolver {
    /// Pick the resolution mode from the configuration.
    pub fn from_config(config: &TrustConfig) -> Result<Self, ConfigError> {
        match &config.jwks_url {
            Some(url) => Ok(KeyResolver::Jwks(JwksClient::new(
                url.clone(),
                config.jwks_timeout,
            )?)),
            None => Ok(KeyResolver::Static(config.secret.clone())),
        }
    }

    /// Get the key that should verify `token`.
    ///
    /// In JWKS mode the header is read without verifying the signature; the
    /// signature is checked afterwards by the validator using the key
    /// returned here.
    pub async fn resolve_key(&self, token: &str) -> Result<SigningKey, KeyError> {
        match self {
            KeyResolver::Static(secret) => {
                let secret = secret.as_deref().ok_or(KeyError::MissingSecret)?;
                SigningKey::from_static(secret)
            }
            KeyResolver::Jwks(client) => {
                let header =
                    decode_header(token).map_err(|e| KeyError::MalformedHeader(e.to_string()))?;
                let kid = header.kid.ok_or(KeyError::MissingKeyId)?;
                client.get_signing_key(&kid).await
            }
        }
    }

    pub fn jwks(&self) -> Option<&JwksClient> {
        match self {
            KeyResolver::Jwks(client) => Some(client),
            KeyResolver::Static(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::test_support::{file_url, hs256_token, rsa_fixture, write_jwks};
    use crate::auth::{ClaimSet, TokenValidator};

    const AUDIENCE: &str = "http://www.service.wingdings.com/";

    #[test]
    fn key_family_covers_supported_algorithms() {
        assert_eq!(KeyFamily::of(Algorithm::HS512), Some(KeyFamily::Hmac));
        assert_eq!(KeyFamily::of(Algorithm::PS256), Some(KeyFamily::Rsa));
        assert_eq!(KeyFamily::of(Algorithm::ES384), Some(KeyFamily::Ec));
        assert_eq!(KeyFamily::of(Algorithm::EdDSA), None);
    }

    #[test]
    fn secret_key_accepts_only_hmac() {
        let key = SigningKey::from_secret(b"secret");
        assert!(key.accepts(Algorithm::HS256));
        assert!(key.accepts(Algorithm::HS512));
        assert!(!key.accepts(Algorithm::RS256));
    }

    #[test]
    fn static_pem_secret_is_rsa_key() {
        let fixture = rsa_fixture();
        let key = SigningKey::from_static(&fixture.public_pem).unwrap();
        assert_eq!(key.family(), KeyFamily::Rsa);

        let key = SigningKey::from_static("plain-shared-secret").unwrap();
        assert_eq!(key.family(), KeyFamily::Hmac);
    }

    #[test]
    fn broken_pem_secret_is_invalid_material() {
        let result = SigningKey::from_static("-----BEGIN PUBLIC KEY-----\nnope\n-----END PUBLIC KEY-----");
        assert!(matches!(result, Err(KeyError::InvalidKeyMaterial(_))));
    }

    #[test]
    fn jwk_with_declared_alg_pins_algorithm() {
        let fixture = rsa_fixture();
        let jwk: Jwk = serde_json::from_value(fixture.jwk("kid1")).unwrap();
        let key = SigningKey::from_jwk(&jwk).unwrap();

        assert_eq!(key.family(), KeyFamily::Rsa);
        assert!(key.accepts(Algorithm::RS256));
        assert!(!key.accepts(Algorithm::RS512));
        assert!(!key.accepts(Algorithm::HS256));
    }

    #[test]
    fn encryption_jwk_is_unsupported() {
        let fixture = rsa_fixture();
        let mut value = fixture.jwk("kid1");
        value["alg"] = "RSA-OAEP".into();
        value["use"] = "enc".into();
        let jwk: Jwk = serde_json::from_value(value).unwrap();

        assert!(matches!(
            SigningKey::from_jwk(&jwk),
            Err(KeyError::UnsupportedKey(_))
        ));
    }

    #[tokio::test]
    async fn static_mode_returns_configured_secret() {
        let resolver = KeyResolver::from_config(&TrustConfig::new("foobar", "fred")).unwrap();
        let key = resolver.resolve_key("not even a token").await.unwrap();
        assert_eq!(key.family(), KeyFamily::Hmac);
        assert!(resolver.jwks().is_none());
    }

    #[tokio::test]
    async fn static_mode_without_secret_is_misconfiguration() {
        let mut config = TrustConfig::new("foobar", "fred");
        config.secret = None;
        let resolver = KeyResolver::from_config(&config).unwrap();

        let result = resolver.resolve_key("token").await;
        assert!(matches!(result, Err(KeyError::MissingSecret)));
    }

    #[tokio::test]
    async fn jwks_mode_requires_kid() {
        let fixture = rsa_fixture();
        let (_dir, path) = write_jwks(&[fixture.jwk("kid1")]);
        let resolver =
            KeyResolver::from_config(&TrustConfig::with_jwks(file_url(&path), AUDIENCE)).unwrap();

        let token = fixture.sign(&ClaimSet::new().with("aud", AUDIENCE), None);
        assert!(matches!(
            resolver.resolve_key(&token).await,
            Err(KeyError::MissingKeyId)
        ));

        assert!(matches!(
            resolver.resolve_key("garbage").await,
            Err(KeyError::MalformedHeader(_))
        ));
    }

    #[tokio::test]
    async fn jwks_mode_unknown_kid_fails() {
        let fixture = rsa_fixture();
        let (_dir, path) = write_jwks(&[fixture.jwk("kid1")]);
        let resolver =
            KeyResolver::from_config(&TrustConfig::with_jwks(file_url(&path), AUDIENCE)).unwrap();

        let token = fixture.sign(&ClaimSet::new().with("aud", AUDIENCE), Some("kid9"));
        assert!(matches!(
            resolver.resolve_key(&token).await,
            Err(KeyError::NoMatchingKey(_))
        ));
    }

    #[tokio::test]
    async fn jwks_end_to_end_validates_rsa_token() {
        let fixture = rsa_fixture();
        let (_dir, path) = write_jwks(&[fixture.jwk("kid1")]);
        let config = TrustConfig::with_jwks(file_url(&path), AUDIENCE);
        let resolver = KeyResolver::from_config(&config).unwrap();

        let claims = ClaimSet::new()
            .with("groups", serde_json::json!(["admin", "user"]))
            .with("aud", AUDIENCE);
        let token = fixture.sign(&claims, Some("kid1"));

        let key = resolver.resolve_key(&token).await.unwrap();
        let decoded = TokenValidator::from_config(&config)
            .unwrap()
            .validate(&token, &key, None)
            .unwrap();
        assert_eq!(decoded, claims);
    }

    #[tokio::test]
    async fn jwks_key_does_not_verify_hmac_token() {
        let fixture = rsa_fixture();
        let (_dir, path) = write_jwks(&[fixture.jwk("kid1")]);
        let config = TrustConfig::with_jwks(file_url(&path), AUDIENCE);
        let resolver = KeyResolver::from_config(&config).unwrap();

        // HS256 token carrying a valid kid, signed with the public key text
        let token = hs256_token(
            &ClaimSet::new().with("aud", AUDIENCE),
            fixture.public_pem.as_bytes(),
            Some("kid1"),
        );

        let key = resolver.resolve_key(&token).await.unwrap();
        let result = TokenValidator::from_config(&config)
            .unwrap()
            .validate(&token, &key, None);
        assert_eq!(result, Err(crate::auth::AuthError::InvalidToken));
    }
}
