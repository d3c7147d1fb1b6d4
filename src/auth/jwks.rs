// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JWKS (JSON Web Key Set) fetching.
//!
//! ## Behaviour
//!
//! - `http(s)://` key sets are fetched with a bounded timeout
//! - `file://` key sets are read from disk (offline fixtures, sidecar mounts)
//! - Nothing is cached here; every lookup reads the published set
//!
//! Dropping the returned future abandons the fetch, so an aborted request
//! never waits on a slow key server.

use std::time::Duration;

use jsonwebtoken::jwk::JwkSet;
use url::Url;

use super::keys::{KeyError, SigningKey};
use crate::config::ConfigError;

/// JWKS client bound to one endpoint.
#[derive(Clone)]
pub struct JwksClient {
    /// JWKS URL
    jwks_url: String,
    /// HTTP client
    client: reqwest::Client,
}

impl std::fmt::Debug for JwksClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwksClient")
            .field("jwks_url", &self.jwks_url)
            .finish()
    }
}

impl JwksClient {
    /// Create a new JWKS client.
    ///
    /// # Arguments
    /// - `jwks_url`: The JWKS endpoint, e.g. `https://login.example.com/discovery/keys`
    /// - `timeout`: Upper bound on a single fetch
    pub fn new(jwks_url: impl Into<String>, timeout: Duration) -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        Ok(Self {
            jwks_url: jwks_url.into(),
            client,
        })
    }

    /// Get the JWKS URL.
    pub fn jwks_url(&self) -> &str {
        &self.jwks_url
    }

    /// Fetch the published key set.
    pub async fn fetch(&self) -> Result<JwkSet, KeyError> {
        let url = Url::parse(&self.jwks_url)
            .map_err(|e| KeyError::Fetch(format!("invalid JWKS URL: {e}")))?;

        match url.scheme() {
            "file" => read_jwks_file(&url).await,
            "http" | "https" => self.fetch_http(url).await,
            other => Err(KeyError::Fetch(format!("unsupported JWKS URL scheme '{other}'"))),
        }
    }

    async fn fetch_http(&self, url: Url) -> Result<JwkSet, KeyError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| KeyError::Fetch(e.to_string()))?;

        if !response.status().is_success() {
            return Err(KeyError::Fetch(format!(
                "HTTP {} from JWKS endpoint",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| KeyError::MalformedKeySet(e.to_string()))
    }

    /// Get the verification key published under `kid`.
    pub async fn get_signing_key(&self, kid: &str) -> Result<SigningKey, KeyError> {
        let jwks = self.fetch().await?;

        let jwk = jwks
            .keys
            .iter()
            .find(|k| k.common.key_id.as_deref() == Some(kid))
            .ok_or_else(|| KeyError::NoMatchingKey(kid.to_string()))?;

        SigningKey::from_jwk(jwk)
    }
}

async fn read_jwks_file(url: &Url) -> Result<JwkSet, KeyError> {
    let path = url
        .to_file_path()
        .map_err(|_| KeyError::Fetch(format!("invalid file URL '{url}'")))?;

    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|e| KeyError::Fetch(format!("{}: {e}", path.display())))?;

    serde_json::from_slice(&bytes).map_err(|e| KeyError::MalformedKeySet(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::test_support::{file_url, rsa_fixture, write_jwks};

    #[test]
    fn client_keeps_url() {
        let client = JwksClient::new(
            "https://login.example.com/discovery/keys",
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(client.jwks_url(), "https://login.example.com/discovery/keys");
    }

    #[tokio::test]
    async fn reads_key_set_from_file_url() {
        let fixture = rsa_fixture();
        let (_dir, path) = write_jwks(&[fixture.jwk("kid1")]);
        let client = JwksClient::new(file_url(&path), Duration::from_secs(5)).unwrap();

        let jwks = client.fetch().await.unwrap();
        assert_eq!(jwks.keys.len(), 1);
        assert_eq!(jwks.keys[0].common.key_id.as_deref(), Some("kid1"));

        assert!(client.get_signing_key("kid1").await.is_ok());
    }

    #[tokio::test]
    async fn unknown_kid_is_no_matching_key() {
        let fixture = rsa_fixture();
        let (_dir, path) = write_jwks(&[fixture.jwk("kid1")]);
        let client = JwksClient::new(file_url(&path), Duration::from_secs(5)).unwrap();

        let result = client.get_signing_key("kid2").await;
        assert!(matches!(result, Err(KeyError::NoMatchingKey(kid)) if kid == "kid2"));
    }

    #[tokio::test]
    async fn malformed_document_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keys.json");
        std::fs::write(&path, b"{\"not\": \"a key set\"}").unwrap();
        let client = JwksClient::new(file_url(&path), Duration::from_secs(5)).unwrap();

        assert!(matches!(client.fetch().await, Err(KeyError::MalformedKeySet(_))));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_fetch_error() {
        let client = JwksClient::new("http://127.0.0.1:1/keys", Duration::from_secs(2)).unwrap();
        assert!(matches!(client.fetch().await, Err(KeyError::Fetch(_))));
    }

    #[tokio::test]
    async fn unsupported_scheme_is_fetch_error() {
        let client = JwksClient::new("ftp://keys.example/jwks", Duration::from_secs(2)).unwrap();
        assert!(matches!(client.fetch().await, Err(KeyError::Fetch(_))));
    }
}
