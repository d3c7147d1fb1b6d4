// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::any::Any;

use axum::{
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer, trace::TraceLayer};

use crate::{auth::AuthGate, error::ApiError, state::AppState};

pub mod health;
pub mod hello;

/// Build the service router.
///
/// `/health/*` is public. Everything under `/v1` goes through the auth gate,
/// which requires `required_role` when one is given.
pub fn router(state: AppState, required_role: Option<&str>) -> Router {
    let protected = Router::new()
        .route("/", get(hello::hello))
        .route("/me", get(hello::whoami))
        .with_state(state.clone());

    let gate = match required_role {
        Some(role) => AuthGate::new(state.clone()).with_role(role),
        None => AuthGate::new(state.clone()),
    };

    let health = Router::new()
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .with_state(state);

    Router::new()
        .nest("/v1", gate.apply(protected))
        .merge(health)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!(panic = detail, "request handler panicked");
    ApiError::internal().into_response()
}
