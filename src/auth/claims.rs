// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JWT claim set and the authenticated caller representation.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::AuthError;

/// Claims decoded from a verified token.
///
/// The payload is kept as-is: every claim the issuer put in the token is
/// available to handlers, not only the registered ones.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClaimSet(Map<String, Value>);

impl ClaimSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a claim, replacing any previous value.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Subject claim.
    pub fn subject(&self) -> Option<&str> {
        self.get("sub").and_then(Value::as_str)
    }

    /// Group names carried in `claim`.
    ///
    /// The claim must be a list of strings; a missing claim or any other
    /// shape is a malformed token, not a failed membership check.
    pub fn groups(&self, claim: &str) -> Result<Vec<&str>, AuthError> {
        let values = self
            .get(claim)
            .and_then(Value::as_array)
            .ok_or(AuthError::Unknown)?;

        values
            .iter()
            .map(|value| value.as_str().ok_or(AuthError::Unknown))
            .collect()
    }
}

/// The authenticated caller for the current request.
///
/// Inserted into request extensions by the auth middleware and read by the
/// [`CurrentUser`] extractor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentUser(pub ClaimSet);

impl CurrentUser {
    pub fn claims(&self) -> &ClaimSet {
        &self.0
    }
}
