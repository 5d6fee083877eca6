//! Runtime config: server-provided settings fetched at session start.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Deserializer, Serialize};

use crate::config::{AccessConfig, SyncConfig};
use crate::error::{Result, SubsyncError};
use crate::source::fetcher::build_client;

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Runtime configuration as served by `GET /api/config`.
///
/// Reports whether a password gate exists but never the password itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeConfig {
    /// Whether an access password is configured.
    #[serde(default)]
    pub has_env_password: bool,
    /// Runtime subscription descriptor string.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub subscription_sources: String,
}

impl RuntimeConfig {
    /// Build the runtime config from the local access settings.
    pub fn from_config(access: &AccessConfig) -> Self {
        Self {
            has_env_password: !access.password.is_empty(),
            subscription_sources: access.subscription_sources.clone(),
        }
    }
}

/// Source of the runtime config for a sync session.
#[async_trait]
pub trait RuntimeConfigProvider: Send + Sync {
    /// Retrieve the current runtime config.
    async fn fetch_runtime_config(&self) -> Result<RuntimeConfig>;
}

/// A fixed runtime config, typically built with [`RuntimeConfig::from_config`].
#[async_trait]
impl RuntimeConfigProvider for RuntimeConfig {
    async fn fetch_runtime_config(&self) -> Result<RuntimeConfig> {
        Ok(self.clone())
    }
}

/// Fetches the runtime config from a remote endpoint.
pub struct HttpRuntimeConfigClient {
    client: Client,
    url: String,
}

impl HttpRuntimeConfigClient {
    /// Create a client for the endpoint at `url`.
    pub fn new(url: impl Into<String>, config: &SyncConfig) -> Result<Self> {
        Ok(Self {
            client: build_client(config)?,
            url: url.into(),
        })
    }
}

#[async_trait]
impl RuntimeConfigProvider for HttpRuntimeConfigClient {
    async fn fetch_runtime_config(&self) -> Result<RuntimeConfig> {
        let response = self.client.get(&self.url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SubsyncError::Fetch(format!(
                "runtime config returned HTTP status {status}"
            )));
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}
