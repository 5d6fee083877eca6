//! Source catalog types.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Catalog a source belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceGroup {
    /// Regular catalog.
    Normal,
    /// Restricted catalog.
    Adult,
}

impl SourceGroup {
    /// Wire name of the group.
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceGroup::Normal => "normal",
            SourceGroup::Adult => "adult",
        }
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value.as_str()? {
            "normal" => Some(SourceGroup::Normal),
            "adult" => Some(SourceGroup::Adult),
            _ => None,
        }
    }
}

/// A content source entry.
///
/// Only `id` is interpreted: it is the identity key when merging catalogs.
/// Everything else (name, API address, enabled flag, ...) belongs to the
/// client and is kept verbatim in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    /// Stable identity key.
    pub id: String,
    /// All other fields, as stored.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Source {
    /// Create a source with a display name and API base URL.
    pub fn new(id: impl Into<String>, name: impl Into<String>, base_url: impl Into<String>) -> Self {
        let mut extra = Map::new();
        extra.insert("name".to_string(), Value::String(name.into()));
        extra.insert("baseUrl".to_string(), Value::String(base_url.into()));
        Self {
            id: id.into(),
            extra,
        }
    }

    /// Set the catalog group.
    pub fn with_group(mut self, group: SourceGroup) -> Self {
        self.extra
            .insert("group".to_string(), Value::String(group.as_str().to_string()));
        self
    }

    /// Declared catalog group. Unknown values count as undeclared.
    pub fn group(&self) -> Option<SourceGroup> {
        self.extra.get("group").and_then(SourceGroup::from_value)
    }

    /// Whether the source is declared as belonging to the adult catalog.
    pub fn is_adult(&self) -> bool {
        self.group() == Some(SourceGroup::Adult)
    }
}

/// Sources returned by fetching one subscription.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchedSources {
    /// Entries for the normal catalog.
    pub normal_sources: Vec<Source>,
    /// Entries for the adult catalog.
    pub adult_sources: Vec<Source>,
}
