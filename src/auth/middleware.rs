// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication middleware for Axum.
//!
//! The gate runs before the wrapped handlers: it pulls the bearer token out
//! of the `Authorization` header, resolves the signing key, validates the
//! token and stores the claims in request extensions as [`CurrentUser`].
//! Any failure short-circuits the request.
//!
//! ```rust,ignore
//! let protected = Router::new()
//!     .route("/", get(hello))
//!     .with_state(state.clone());
//! let protected = AuthGate::new(state).with_role("admin").apply(protected);
//! ```

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    Router,
};
use thiserror::Error;

use super::keys::KeyError;
use super::{AuthError, ClaimSet, CurrentUser, TokenValidator};
use crate::config::ConfigError;
use crate::error::ApiError;
use crate::state::AppState;

/// Outcome of a failed authentication attempt.
///
/// `Auth` is the caller's problem and is answered with its own status and
/// code. `Misconfigured` is ours and is answered with a generic 500.
#[derive(Debug, Error)]
pub enum GateError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("authentication is misconfigured: {0}")]
    Misconfigured(#[from] ConfigError),
}

impl From<KeyError> for GateError {
    fn from(err: KeyError) -> Self {
        match err {
            KeyError::MissingSecret => GateError::Misconfigured(ConfigError::MissingSecret),
            other => {
                tracing::warn!(error = %other, "signing key resolution failed");
                GateError::Auth(AuthError::Unknown)
            }
        }
    }
}

impl IntoResponse for GateError {
    fn into_response(self) -> Response {
        match self {
            GateError::Auth(err) => err.into_response(),
            GateError::Misconfigured(err) => {
                tracing::error!(error = %err, "rejecting request: authentication is misconfigured");
                ApiError::internal().into_response()
            }
        }
    }
}

/// Extract the bearer token from the `Authorization` header.
///
/// The token is the second space-separated segment of `Bearer <token>`.
/// A missing header, another scheme, or an empty token is `invalid_token`.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::InvalidToken)?
        .to_str()
        .map_err(|_| AuthError::InvalidToken)?;

    let mut parts = value.split(' ');
    let scheme = parts.next().unwrap_or_default();
    if !scheme.eq_ignore_ascii_case("Bearer") {
        return Err(AuthError::InvalidToken);
    }

    match parts.next() {
        Some(token) if !token.is_empty() => Ok(token),
        _ => Err(AuthError::InvalidToken),
    }
}

/// Authenticate a request from its headers.
///
/// Shared by the middleware and the [`CurrentUser`] extractor.
pub async fn authenticate(
    state: &AppState,
    headers: &HeaderMap,
    role_name: Option<&str>,
) -> Result<ClaimSet, GateError> {
    let token = bearer_token(headers)?;
    let validator = TokenValidator::from_config(&state.config)?;
    let key = state.keys.resolve_key(token).await?;
    Ok(validator.validate(token, &key, role_name)?)
}

/// Middleware state: the shared app state plus the role this gate requires.
#[derive(Clone)]
pub struct AuthGate {
    state: AppState,
    role: Option<Arc<str>>,
}

impl AuthGate {
    /// Gate that requires a valid token and no particular role.
    pub fn new(state: AppState) -> Self {
        Self { state, role: None }
    }

    /// Require membership in `role` (case-insensitive).
    pub fn with_role(mut self, role: impl AsRef<str>) -> Self {
        self.role = Some(Arc::from(role.as_ref()));
        self
    }

    pub fn role(&self) -> Option<&str> {
        self.role.as_deref()
    }

    /// Protect every route already registered on `router`.
    ///
    /// Uses `route_layer`, so `router` must have its routes added first and
    /// unmatched paths still answer 404 rather than 401.
    pub fn apply<S>(self, router: Router<S>) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        router.route_layer(middleware::from_fn_with_state(self, auth_middleware))
    }
}

/// Authentication middleware function.
pub async fn auth_middleware(
    State(gate): State<AuthGate>,
    mut request: Request,
    next: Next,
) -> Response {
    match authenticate(&gate.state, request.headers(), gate.role()).await {
        Ok(claims) => {
            tracing::debug!(sub = claims.subject(), "request authenticated");
            request.extensions_mut().insert(CurrentUser(claims));
            next.run(request).await
        }
        Err(err) => {
            if let GateError::Auth(auth) = &err {
                tracing::info!(code = auth.code(), path = %request.uri().path(), "request rejected");
            }
            err.into_response()
        }
    }
}
