//! Subscription synchronization.
//!
//! This module reconciles remote subscriptions with the persisted settings
//! once per client session.

pub mod orchestrator;
pub mod runtime_config;

pub use orchestrator::{SyncOrchestrator, SyncReport, DEFAULT_FETCH_TIMEOUT};
pub use runtime_config::{HttpRuntimeConfigClient, RuntimeConfig, RuntimeConfigProvider};
