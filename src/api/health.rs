// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::state::AppState;

/// Health check response with individual component status.
#[derive(Debug, Serialize)]
pub struct ReadyResponse {
    /// Overall health status ("ok" or "degraded").
    pub status: String,
    /// Individual health checks and their results.
    pub checks: HealthChecks,
}

/// Individual health check results.
#[derive(Debug, Serialize)]
pub struct HealthChecks {
    /// Whether the service process is running.
    pub service: String,
    /// Whether the trust configuration can authenticate requests.
    pub config: String,
    /// JWKS endpoint status.
    /// Only present in JWKS mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jwks: Option<String>,
}

/// Simple health check response for liveness probes.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
}

fn check_config(state: &AppState) -> String {
    match state.config.check_usable() {
        Ok(()) => "ok".to_string(),
        Err(err) => {
            tracing::warn!(error = %err, "trust configuration is not usable");
            "misconfigured".to_string()
        }
    }
}

/// Check if the JWKS endpoint serves a key set (JWKS mode only).
async fn check_jwks(state: &AppState) -> Option<String> {
    let client = state.keys.jwks()?;
    match client.fetch().await {
        Ok(_) => Some("ok".to_string()),
        Err(err) => {
            tracing::warn!(error = %err, url = client.jwks_url(), "JWKS endpoint unavailable");
            Some("unavailable".to_string())
        }
    }
}

/// Liveness probe handler.
///
/// Always returns 200 if the process is running.
/// Does not check dependencies - use readiness for that.
pub async fn liveness() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Readiness probe handler.
///
/// Returns 200 only if the service can authenticate requests, 503 otherwise.
pub async fn readiness(State(state): State<AppState>) -> (StatusCode, Json<ReadyResponse>) {
    let config = check_config(&state);
    let jwks = check_jwks(&state).await;

    let config_ok = config == "ok";
    let jwks_ok = jwks.as_ref().map(|s| s == "ok").unwrap_or(true);
    let all_ok = config_ok && jwks_ok;

    let response = ReadyResponse {
        status: if all_ok { "ok" } else { "degraded" }.to_string(),
        checks: HealthChecks {
            service: "ok".to_string(),
            config,
            jwks,
        },
    };

    let status = if all_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(response))
}
