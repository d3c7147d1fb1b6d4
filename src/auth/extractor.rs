// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractor for the authenticated caller.
//!
//! Use the `CurrentUser` extractor in handlers to read the validated claims:
//!
//! ```rust,ignore
//! async fn my_handler(user: CurrentUser) -> impl IntoResponse {
//!     // user.claims() is the verified ClaimSet
//! }
//! ```

use axum::{extract::FromRequestParts, http::request::Parts};

use super::middleware::{authenticate, GateError};
use super::CurrentUser;
use crate::state::AppState;

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = GateError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        // First check if the middleware already authenticated the request
        if let Some(user) = parts.extensions.get::<CurrentUser>().cloned() {
            return Ok(user);
        }

        // Not behind the gate: authenticate here, without a role requirement
        let claims = authenticate(state, &parts.headers, None).await?;
        let user = CurrentUser(claims);
        parts.extensions.insert(user.clone());
        Ok(user)
    }
}
