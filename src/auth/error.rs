// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use jsonwebtoken::errors::ErrorKind;
use serde::Serialize;

/// Authentication error type.
///
/// Every rejection of a caller's token resolves to one of these variants.
/// Service misconfiguration is not an `AuthError`; see
/// [`ConfigError`](crate::config::ConfigError).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    /// Signed payload's expiry has passed
    TokenExpired,
    /// `aud` claim does not match the configured audience
    InvalidAudience,
    /// Token (or Authorization header) is malformed, or the signature does not verify
    InvalidToken,
    /// Token is valid but the caller lacks the required role
    Unauthorized,
    /// Any other decode/verify fault, including key resolution
    Unknown,
}

#[derive(Debug, Serialize)]
pub(crate) struct AuthErrorBody {
    pub(crate) code: &'static str,
    pub(crate) description: &'static str,
}

impl AuthError {
    /// Get the error code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::TokenExpired => "token_expired",
            AuthError::InvalidAudience => "invalid_audience",
            AuthError::InvalidToken => "invalid_token",
            AuthError::Unauthorized => "unauthorized",
            AuthError::Unknown => "unknown_error",
        }
    }

    /// Human-readable description returned to the caller.
    pub fn description(&self) -> &'static str {
        match self {
            AuthError::TokenExpired => "token is expired",
            AuthError::InvalidAudience => {
                "incorrect claims, please check the audience and issuer"
            }
            AuthError::InvalidToken => "invalid token",
            AuthError::Unauthorized => "not authorized",
            AuthError::Unknown => "Unable to parse authentication token.",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::TokenExpired
            | AuthError::InvalidAudience
            | AuthError::InvalidToken
            | AuthError::Unauthorized
            | AuthError::Unknown => StatusCode::UNAUTHORIZED,
        }
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code(), self.description())
    }
}

impl std::error::Error for AuthError {}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            ErrorKind::InvalidAudience => AuthError::InvalidAudience,
            ErrorKind::MissingRequiredClaim(claim) if claim == "aud" => AuthError::InvalidAudience,
            ErrorKind::InvalidToken
            | ErrorKind::InvalidSignature
            | ErrorKind::InvalidAlgorithm
            | ErrorKind::InvalidAlgorithmName
            | ErrorKind::MissingAlgorithm
            | ErrorKind::ImmatureSignature
            | ErrorKind::Base64(_)
            | ErrorKind::Utf8(_) => AuthError::InvalidToken,
            _ => AuthError::Unknown,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = Json(AuthErrorBody {
            code: self.code(),
            description: self.description(),
        });
        (self.status_code(), body).into_response()
    }
}
