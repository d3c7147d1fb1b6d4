// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Group membership checks for authorization.

use super::{AuthError, ClaimSet};

/// Check whether `required` appears in `groups`, ignoring case.
pub fn has_role<S: AsRef<str>>(groups: &[S], required: &str) -> bool {
    let required = required.to_lowercase();
    groups
        .iter()
        .any(|group| group.as_ref().to_lowercase() == required)
}

/// Enforce that the caller belongs to `role_name`.
///
/// Runs only when both a role is requested and a groups claim is configured.
/// Without a groups claim there is no group model to check against and the
/// token is accepted on authentication alone.
pub fn enforce_role(
    claims: &ClaimSet,
    groups_claim: Option<&str>,
    role_name: Option<&str>,
) -> Result<(), AuthError> {
    let (Some(groups_claim), Some(role_name)) = (groups_claim, role_name) else {
        return Ok(());
    };

    let groups = claims.groups(groups_claim)?;
    if has_role(&groups, role_name) {
        Ok(())
    } else {
        tracing::debug!(role = role_name, claim = groups_claim, "caller lacks required role");
        Err(AuthError::Unauthorized)
    }
}
