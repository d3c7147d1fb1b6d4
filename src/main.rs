// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{env, net::SocketAddr};

use bearer_gate::{
    api::router,
    config::{
        resolve_from_env, TrustConfig, DEFAULT_HOST, DEFAULT_PORT, HOST_ENV, LOG_FORMAT_ENV,
        PORT_ENV, REQUIRED_ROLE_ENV,
    },
    state::AppState,
};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));

    let json = env::var(LOG_FORMAT_ENV)
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
    }
    tracing::info!("shutdown signal received");
}

#[tokio::main]
async fn main() {
    init_tracing();

    // Environment overrides are applied once, before any request is served
    let config = resolve_from_env(TrustConfig::default());
    tracing::info!(?config, "trust configuration resolved");

    if let Err(err) = config.check_usable() {
        tracing::warn!(error = %err, "requests to protected routes will fail until this is fixed");
    }

    let state = AppState::new(config).expect("Failed to initialize application state");

    let required_role = env::var(REQUIRED_ROLE_ENV).ok().filter(|role| !role.is_empty());
    let app = router(state, required_role.as_deref());

    // Parse bind address
    let host = env::var(HOST_ENV).unwrap_or_else(|_| DEFAULT_HOST.to_string());
    let port: u16 = env::var(PORT_ENV)
        .ok()
        .and_then(|port| port.parse().ok())
        .unwrap_or(DEFAULT_PORT);

    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .expect("Failed to parse bind address");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");

    tracing::info!(%addr, role = required_role.as_deref(), "bearer gate listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("HTTP server failed");
}
