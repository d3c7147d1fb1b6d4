// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::Json;

use crate::auth::{ClaimSet, CurrentUser};

/// Protected greeting.
pub async fn hello(user: CurrentUser) -> String {
    match user.claims().subject() {
        Some(sub) => format!("Hello {sub}!"),
        None => "Hello World!".to_string(),
    }
}

/// Echo the caller's verified claims.
pub async fn whoami(user: CurrentUser) -> Json<ClaimSet> {
    Json(user.0)
}
