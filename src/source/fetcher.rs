//! Subscription source fetcher.
//!
//! Downloads a subscription URL and decodes it into normal and adult source
//! lists, with host validation and payload size limits.

use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::types::{FetchedSources, Source};
use crate::config::SyncConfig;
use crate::error::{Result, SubsyncError};

/// User agent sent with every request.
const USER_AGENT: &str = concat!("subsync/", env!("CARGO_PKG_VERSION"));

/// Turns a subscription URL into source lists.
#[async_trait]
pub trait SourceFetcher: Send + Sync {
    /// Fetch and decode the sources published at `url`.
    async fn fetch_sources(&self, url: &str) -> Result<FetchedSources>;
}

/// Build an HTTP client honoring the sync timeouts and redirect limit.
pub(crate) fn build_client(config: &SyncConfig) -> Result<Client> {
    Client::builder()
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .read_timeout(Duration::from_secs(config.read_timeout_secs))
        .timeout(Duration::from_secs(config.total_timeout_secs))
        .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| SubsyncError::Config(format!("failed to create HTTP client: {e}")))
}

/// HTTP implementation of [`SourceFetcher`].
pub struct HttpSourceFetcher {
    client: Client,
    max_payload_size: u64,
    allow_private_hosts: bool,
}

impl HttpSourceFetcher {
    /// Create a fetcher from the sync configuration.
    pub fn new(config: &SyncConfig) -> Result<Self> {
        Ok(Self {
            client: build_client(config)?,
            max_payload_size: config.max_payload_size_bytes,
            allow_private_hosts: config.allow_private_hosts,
        })
    }

    fn check_size(&self, size: u64) -> Result<()> {
        if size > self.max_payload_size {
            return Err(SubsyncError::Fetch(format!(
                "payload too large: {} bytes (max {} bytes)",
                size, self.max_payload_size
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl SourceFetcher for HttpSourceFetcher {
    async fn fetch_sources(&self, url: &str) -> Result<FetchedSources> {
        validate_url(url, self.allow_private_hosts)?;

        let mut response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SubsyncError::Fetch(format!("HTTP status {status}")));
        }

        if let Some(length) = response.content_length() {
            self.check_size(length)?;
        }

        // Content-Length may be absent; stop reading as soon as the cap is hit.
        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            self.check_size((body.len() + chunk.len()) as u64)?;
            body.extend_from_slice(&chunk);
        }

        parse_source_payload(&body)
    }
}

/// Validate a subscription URL.
///
/// Only http and https are accepted. Unless `allow_private` is set, hosts
/// that resolve to the local machine or a private network are rejected.
pub fn validate_url(url: &str, allow_private: bool) -> Result<()> {
    let parsed =
        url::Url::parse(url).map_err(|e| SubsyncError::Validation(format!("invalid URL: {e}")))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(SubsyncError::Validation(format!(
            "unsupported URL scheme: {}",
            parsed.scheme()
        )));
    }

    let host = parsed
        .host()
        .ok_or_else(|| SubsyncError::Validation("URL has no host".to_string()))?;

    if allow_private {
        return Ok(());
    }

    let rejected = match host {
        url::Host::Domain(domain) => is_internal_hostname(domain),
        url::Host::Ipv4(ip) => is_private_ip(IpAddr::V4(ip)),
        url::Host::Ipv6(ip) => is_private_ip(IpAddr::V6(ip)),
    };

    if rejected {
        return Err(SubsyncError::Validation(format!(
            "private host not allowed: {host}"
        )));
    }

    Ok(())
}

fn is_internal_hostname(host: &str) -> bool {
    const INTERNAL_SUFFIXES: [&str; 5] = [".local", ".localhost", ".internal", ".lan", ".home"];

    let host = host.trim_end_matches('.').to_lowercase();
    host == "localhost" || INTERNAL_SUFFIXES.iter().any(|s| host.ends_with(s))
}

fn is_private_ip(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            v4.is_loopback()
                || v4.is_private()
                || v4.is_link_local()
                || v4.is_broadcast()
                || v4.is_unspecified()
                || v4.is_documentation()
        }
        IpAddr::V6(v6) => {
            let first = v6.segments()[0];
            v6.is_loopback()
                || v6.is_unspecified()
                || (first & 0xfe00) == 0xfc00 // unique local
                || (first & 0xffc0) == 0xfe80 // link local
                || v6.to_ipv4_mapped().is_some_and(|v4| is_private_ip(IpAddr::V4(v4)))
        }
    }
}

/// Wire shapes accepted for a subscription payload.
#[derive(Deserialize)]
#[serde(untagged)]
enum SourcePayload {
    /// A bare array of entries; adult entries are told apart by `group`.
    List(Vec<Value>),
    /// Separate arrays per catalog.
    Catalog {
        sources: Vec<Value>,
        #[serde(default, rename = "adultSources")]
        adult_sources: Vec<Value>,
    },
}

fn decode_entry(value: Value) -> Option<Source> {
    match serde_json::from_value::<Source>(value) {
        Ok(source) => Some(source),
        Err(e) => {
            debug!(error = %e, "Skipping malformed source entry");
            None
        }
    }
}

/// Decode a subscription payload.
///
/// Entries marked `"group": "adult"` go to the adult list wherever they
/// appear. Entries that are not valid sources are skipped.
pub fn parse_source_payload(bytes: &[u8]) -> Result<FetchedSources> {
    let payload: SourcePayload = serde_json::from_slice(bytes)
        .map_err(|e| SubsyncError::Fetch(format!("malformed subscription payload: {e}")))?;

    let (primary, adult) = match payload {
        SourcePayload::List(entries) => (entries, Vec::new()),
        SourcePayload::Catalog {
            sources,
            adult_sources,
        } => (sources, adult_sources),
    };

    let mut fetched = FetchedSources::default();
    for source in primary.into_iter().filter_map(decode_entry) {
        if source.is_adult() {
            fetched.adult_sources.push(source);
        } else {
            fetched.normal_sources.push(source);
        }
    }
    fetched
        .adult_sources
        .extend(adult.into_iter().filter_map(decode_entry));

    Ok(fetched)
}
