//! Persisted client settings and the subscriptions they hold.

pub mod descriptors;
pub mod store;
pub mod types;

pub use descriptors::{descriptor_id, parse_env_subscriptions};
pub use store::{JsonFileStore, MemoryStore, SettingsStore};
pub use types::{RuntimeSubscriptionDescriptor, Settings, Subscription};
