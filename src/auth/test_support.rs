// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Shared fixtures for auth tests.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use jsonwebtoken::{Algorithm, EncodingKey};
use rand::rngs::OsRng;
use rsa::pkcs1::{EncodeRsaPrivateKey, LineEnding};
use rsa::pkcs8::EncodePublicKey;
use rsa::traits::PublicKeyParts;
use rsa::RsaPrivateKey;
use serde_json::{json, Value};
use tempfile::TempDir;

use super::{generate_auth_token, ClaimSet};

/// RSA key pair plus its public parts in the encodings tests need.
pub(crate) struct RsaFixture {
    pub private_pem: String,
    pub public_pem: String,
    pub n: String,
    pub e: String,
}

impl RsaFixture {
    /// Public key as a JWK entry.
    pub fn jwk(&self, kid: &str) -> Value {
        json!({
            "kty": "RSA",
            "kid": kid,
            "use": "sig",
            "alg": "RS256",
            "n": self.n,
            "e": self.e,
        })
    }

    /// Sign `claims` with RS256.
    pub fn sign(&self, claims: &ClaimSet, kid: Option<&str>) -> String {
        let key = EncodingKey::from_rsa_pem(self.private_pem.as_bytes()).unwrap();
        generate_auth_token(claims, &key, Algorithm::RS256, kid).unwrap()
    }
}

/// Process-wide RSA fixture; key generation is slow, so it happens once.
pub(crate) fn rsa_fixture() -> &'static RsaFixture {
    static FIXTURE: OnceLock<RsaFixture> = OnceLock::new();
    FIXTURE.get_or_init(|| {
        let private_key = RsaPrivateKey::new(&mut OsRng, 2048).unwrap();
        let public_key = private_key.to_public_key();

        RsaFixture {
            private_pem: private_key
                .to_pkcs1_pem(LineEnding::LF)
                .unwrap()
                .as_str()
                .to_owned(),
            public_pem: public_key.to_public_key_pem(LineEnding::LF).unwrap(),
            n: URL_SAFE_NO_PAD.encode(public_key.n().to_bytes_be()),
            e: URL_SAFE_NO_PAD.encode(public_key.e().to_bytes_be()),
        }
    })
}

/// Sign `claims` with an HMAC secret.
pub(crate) fn hs_token(
    claims: &ClaimSet,
    secret: &[u8],
    algorithm: Algorithm,
    kid: Option<&str>,
) -> String {
    generate_auth_token(claims, &EncodingKey::from_secret(secret), algorithm, kid).unwrap()
}

pub(crate) fn hs256_token(claims: &ClaimSet, secret: &[u8], kid: Option<&str>) -> String {
    hs_token(claims, secret, Algorithm::HS256, kid)
}

/// Write a JWK Set containing `keys` to a fresh temp directory.
pub(crate) fn write_jwks(keys: &[Value]) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("keys.json");
    std::fs::write(&path, json!({ "keys": keys }).to_string()).unwrap();
    (dir, path)
}

pub(crate) fn file_url(path: &Path) -> String {
    url::Url::from_file_path(path).unwrap().to_string()
}
