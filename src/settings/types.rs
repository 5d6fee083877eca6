//! Persisted settings types.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::source::Source;

/// Full persisted client state.
///
/// Only the catalogs and the subscription list are interpreted here; every
/// other field is carried in `extra` and saved back untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Normal source catalog.
    #[serde(default)]
    pub sources: Vec<Source>,
    /// Restricted source catalog.
    #[serde(default)]
    pub adult_sources: Vec<Source>,
    /// Remote subscriptions.
    #[serde(default)]
    pub subscriptions: Vec<Subscription>,
    /// Fields owned by other parts of the client.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Key of the auto refresh flag in a stored subscription.
const AUTO_REFRESH: &str = "autoRefresh";

/// Key of the last refresh timestamp in a stored subscription.
const LAST_UPDATED: &str = "lastUpdated";

/// A remote URL that publishes source lists.
///
/// `autoRefresh` and `lastUpdated` live in `extra` next to any other stored
/// field, so whatever the client wrote there is saved back exactly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    /// Stable identifier.
    #[serde(default)]
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Subscription URL; unique within a settings object.
    #[serde(default)]
    pub url: String,
    /// All other fields, as stored.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Subscription {
    /// Create a subscription with auto refresh enabled.
    pub fn new(id: impl Into<String>, name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            url: url.into(),
            extra: Map::new(),
        }
        .with_auto_refresh(true)
    }

    /// Set the auto refresh flag.
    pub fn with_auto_refresh(mut self, auto_refresh: bool) -> Self {
        self.extra
            .insert(AUTO_REFRESH.to_string(), Value::Bool(auto_refresh));
        self
    }

    /// Whether the subscription takes part in a sync.
    ///
    /// Only a literal `false` turns auto refresh off; absent, null, or
    /// loosely typed values count as enabled.
    pub fn is_active(&self) -> bool {
        self.extra.get(AUTO_REFRESH) != Some(&Value::Bool(false))
    }

    /// Last successful fetch in Unix epoch milliseconds, if recorded as an
    /// integer.
    pub fn last_updated(&self) -> Option<i64> {
        self.extra.get(LAST_UPDATED).and_then(Value::as_i64)
    }

    /// Record a successful fetch at `millis`.
    pub fn set_last_updated(&mut self, millis: i64) {
        self.extra
            .insert(LAST_UPDATED.to_string(), Value::from(millis));
    }
}

/// A subscription announced by the runtime config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeSubscriptionDescriptor {
    /// Stable identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Subscription URL.
    pub url: String,
}

impl From<RuntimeSubscriptionDescriptor> for Subscription {
    fn from(descriptor: RuntimeSubscriptionDescriptor) -> Self {
        Subscription::new(descriptor.id, descriptor.name, descriptor.url)
    }
}
