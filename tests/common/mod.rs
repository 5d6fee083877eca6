//! Test helpers for sync integration tests.
//!
//! Provides scripted collaborators for the orchestrator and a tiny HTTP
//! server for exercising the real fetchers.
#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Mutex;

use async_trait::async_trait;
use axum::Router;
use subsync::{
    FetchedSources, Result, RuntimeConfig, RuntimeConfigProvider, Settings, SettingsStore, Source,
    SourceFetcher, SourceGroup, SubsyncError, Subscription,
};
use tokio::net::TcpListener;

/// Shorthand for a normal source.
pub fn source(id: &str) -> Source {
    Source::new(id, id.to_uppercase(), format!("https://{id}.example.com/api"))
}

/// Shorthand for an adult source.
pub fn adult_source(id: &str) -> Source {
    source(id).with_group(SourceGroup::Adult)
}

/// Shorthand for an enabled subscription.
pub fn subscription(id: &str, url: &str) -> Subscription {
    Subscription::new(id, id.to_uppercase(), url)
}

/// Runtime config carrying the given descriptor string.
pub fn runtime(subscription_sources: &str) -> RuntimeConfig {
    RuntimeConfig {
        has_env_password: false,
        subscription_sources: subscription_sources.to_string(),
    }
}

/// Scripted response for one URL.
#[derive(Clone)]
pub enum Reply {
    Sources(FetchedSources),
    Fail(String),
}

impl Reply {
    pub fn normal(sources: Vec<Source>) -> Self {
        Reply::Sources(FetchedSources {
            normal_sources: sources,
            adult_sources: vec![],
        })
    }

    pub fn both(normal: Vec<Source>, adult: Vec<Source>) -> Self {
        Reply::Sources(FetchedSources {
            normal_sources: normal,
            adult_sources: adult,
        })
    }

    pub fn empty() -> Self {
        Reply::Sources(FetchedSources::default())
    }
}

/// Fetcher answering from a fixed table and recording every call.
#[derive(Default)]
pub struct ScriptedFetcher {
    replies: HashMap<String, Reply>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(mut self, url: &str, reply: Reply) -> Self {
        self.replies.insert(url.to_string(), reply);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SourceFetcher for ScriptedFetcher {
    async fn fetch_sources(&self, url: &str) -> Result<FetchedSources> {
        self.calls.lock().unwrap().push(url.to_string());
        match self.replies.get(url) {
            Some(Reply::Sources(sources)) => Ok(sources.clone()),
            Some(Reply::Fail(message)) => Err(SubsyncError::Fetch(message.clone())),
            None => Err(SubsyncError::Fetch(format!("no reply scripted for {url}"))),
        }
    }
}

/// Runtime config provider that always fails.
pub struct FailingRuntimeConfig;

#[async_trait]
impl RuntimeConfigProvider for FailingRuntimeConfig {
    async fn fetch_runtime_config(&self) -> Result<RuntimeConfig> {
        Err(SubsyncError::Fetch("connection refused".to_string()))
    }
}

/// Store whose saves always fail.
pub struct ReadOnlyStore {
    pub settings: Settings,
    pub attempts: Mutex<usize>,
}

impl SettingsStore for ReadOnlyStore {
    fn get_settings(&self) -> Result<Settings> {
        Ok(self.settings.clone())
    }

    fn save_settings(&self, _settings: &Settings) -> Result<()> {
        *self.attempts.lock().unwrap() += 1;
        Err(SubsyncError::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "read-only file system",
        )))
    }
}

/// Serve `router` on an ephemeral local port.
pub async fn serve(router: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}
