// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::auth::KeyResolver;
use crate::config::{ConfigError, TrustConfig};

/// Shared, read-only request state.
///
/// Built once at startup; the trust configuration never changes while the
/// server is running.
#[derive(Clone, Debug)]
pub struct AppState {
    pub config: Arc<TrustConfig>,
    pub keys: KeyResolver,
}

impl AppState {
    pub fn new(config: TrustConfig) -> Result<Self, ConfigError> {
        let keys = KeyResolver::from_config(&config)?;
        Ok(Self {
            config: Arc::new(config),
            keys,
        })
    }
}
