//! Parsing of runtime subscription descriptor strings.
//!
//! The runtime config carries subscriptions as a single string, usually set
//! from an environment variable. Two forms are accepted:
//!
//! - a JSON array whose elements are URL strings or `{url, name?, id?}`
//!   objects;
//! - a list separated by commas or newlines, each entry `url` or `name|url`.

use serde::Deserialize;
use uuid::Uuid;

use super::types::RuntimeSubscriptionDescriptor;
use crate::error::{Result, SubsyncError};

#[derive(Deserialize)]
#[serde(untagged)]
enum DescriptorEntry {
    Url(String),
    Detailed {
        url: String,
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        id: Option<String>,
    },
}

/// Identifier derived from the URL so the same URL maps to the same id on
/// every run.
pub fn descriptor_id(url: &str) -> String {
    format!("env-{}", Uuid::new_v5(&Uuid::NAMESPACE_URL, url.as_bytes()))
}

fn build_descriptor(
    id: Option<String>,
    name: Option<String>,
    url: &str,
) -> Result<RuntimeSubscriptionDescriptor> {
    let url = url.trim();
    let parsed = url::Url::parse(url).map_err(|e| {
        SubsyncError::Validation(format!("invalid subscription URL {url:?}: {e}"))
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(SubsyncError::Validation(format!(
            "unsupported subscription URL scheme: {}",
            parsed.scheme()
        )));
    }

    let non_empty = |value: Option<String>| {
        value
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let name = non_empty(name)
        .or_else(|| parsed.host_str().map(str::to_string))
        .unwrap_or_else(|| url.to_string());
    let id = non_empty(id).unwrap_or_else(|| descriptor_id(url));

    Ok(RuntimeSubscriptionDescriptor {
        id,
        name,
        url: url.to_string(),
    })
}

/// Parse a descriptor string into subscription descriptors.
///
/// Blank input yields an empty list. Any malformed entry fails the whole
/// parse, so a typo never half-applies a list.
pub fn parse_env_subscriptions(input: &str) -> Result<Vec<RuntimeSubscriptionDescriptor>> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(Vec::new());
    }

    if input.starts_with('[') {
        let entries: Vec<DescriptorEntry> = serde_json::from_str(input).map_err(|e| {
            SubsyncError::Validation(format!("malformed subscription list: {e}"))
        })?;

        return entries
            .into_iter()
            .map(|entry| match entry {
                DescriptorEntry::Url(url) => build_descriptor(None, None, &url),
                DescriptorEntry::Detailed { url, name, id } => build_descriptor(id, name, &url),
            })
            .collect();
    }

    input
        .split([',', '\n'])
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| match entry.split_once('|') {
            Some((name, url)) => build_descriptor(None, Some(name.to_string()), url),
            None => build_descriptor(None, None, entry),
        })
        .collect()
}
