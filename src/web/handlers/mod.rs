//! API handlers.

pub mod config;

pub use config::*;

use crate::config::AccessConfig;
use crate::sync::RuntimeConfig;

/// Shared state for the API handlers.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    /// Access password; empty when no gate is configured.
    pub access_password: String,
    /// Runtime subscription descriptor string.
    pub subscription_sources: String,
}

impl AppState {
    /// Build state from the access configuration.
    pub fn new(access: &AccessConfig) -> Self {
        Self {
            access_password: access.password.clone(),
            subscription_sources: access.subscription_sources.clone(),
        }
    }

    /// The public view of this state.
    pub fn runtime_config(&self) -> RuntimeConfig {
        RuntimeConfig {
            has_env_password: !self.access_password.is_empty(),
            subscription_sources: self.subscription_sources.clone(),
        }
    }
}
