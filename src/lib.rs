//! subsync - subscription synchronizer
//!
//! Merges content sources published by remote subscriptions into a
//! persisted settings document, once per client session.

pub mod config;
pub mod error;
pub mod logging;
pub mod settings;
pub mod source;
pub mod sync;
pub mod web;

pub use config::Config;
pub use error::{Result, SubsyncError};
pub use settings::{
    parse_env_subscriptions, JsonFileStore, MemoryStore, RuntimeSubscriptionDescriptor, Settings,
    SettingsStore, Subscription,
};
pub use source::{
    merge_sources, FetchedSources, HttpSourceFetcher, Source, SourceFetcher, SourceGroup,
};
pub use sync::{
    HttpRuntimeConfigClient, RuntimeConfig, RuntimeConfigProvider, SyncOrchestrator, SyncReport,
};
pub use web::WebServer;
