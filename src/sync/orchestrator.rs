//! Session-scoped subscription synchronization.
//!
//! [`SyncOrchestrator::run`] reconciles the persisted settings with the
//! runtime config and every active subscription, once per orchestrator
//! instance. All failures are logged and contained; the caller never sees
//! an error.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, error, info, warn};

use super::runtime_config::{HttpRuntimeConfigClient, RuntimeConfig, RuntimeConfigProvider};
use crate::config::Config;
use crate::error::{Result, SubsyncError};
use crate::settings::{parse_env_subscriptions, JsonFileStore, Settings, SettingsStore, Subscription};
use crate::source::{merge_sources, FetchedSources, HttpSourceFetcher, Source, SourceFetcher};

/// Upper bound for a single remote call when none is configured.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(60);

/// Slack on top of the HTTP client's own total timeout.
const FETCH_TIMEOUT_GRACE: Duration = Duration::from_secs(5);

/// Outcome of one sync session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Subscriptions appended from the runtime config.
    pub subscriptions_added: usize,
    /// Entries appended to the normal catalog.
    pub sources_added: usize,
    /// Entries appended to the adult catalog.
    pub adult_sources_added: usize,
    /// Subscriptions fetched successfully.
    pub fetched: usize,
    /// Subscriptions whose fetch failed.
    pub failed: usize,
    /// Subscriptions skipped because auto refresh is off.
    pub skipped: usize,
    /// Whether the settings were saved.
    pub saved: bool,
}

/// Runs the subscription sync at most once per instance.
pub struct SyncOrchestrator {
    store: Arc<dyn SettingsStore>,
    runtime_config: Arc<dyn RuntimeConfigProvider>,
    fetcher: Arc<dyn SourceFetcher>,
    fetch_timeout: Duration,
    started: AtomicBool,
}

impl SyncOrchestrator {
    /// Create an orchestrator over the given collaborators.
    pub fn new(
        store: Arc<dyn SettingsStore>,
        runtime_config: Arc<dyn RuntimeConfigProvider>,
        fetcher: Arc<dyn SourceFetcher>,
    ) -> Self {
        Self {
            store,
            runtime_config,
            fetcher,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            started: AtomicBool::new(false),
        }
    }

    /// Wire up the file store and HTTP collaborators described by `config`.
    ///
    /// Without `sync.runtime_config_url` the runtime config comes from the
    /// local `[access]` section.
    pub fn from_config(config: &Config) -> Result<Self> {
        let store = Arc::new(JsonFileStore::new(&config.settings.path));
        let runtime_config: Arc<dyn RuntimeConfigProvider> = match &config.sync.runtime_config_url
        {
            Some(url) => Arc::new(HttpRuntimeConfigClient::new(url.clone(), &config.sync)?),
            None => Arc::new(RuntimeConfig::from_config(&config.access)),
        };
        let fetcher = Arc::new(HttpSourceFetcher::new(&config.sync)?);
        let timeout =
            Duration::from_secs(config.sync.total_timeout_secs).saturating_add(FETCH_TIMEOUT_GRACE);

        Ok(Self::new(store, runtime_config, fetcher).with_fetch_timeout(timeout))
    }

    /// Bound every remote call by `timeout`.
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Whether `run` has been called on this instance.
    pub fn has_run(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }

    /// Run the sync for this session.
    ///
    /// Only the first call does any work; later and concurrent calls return
    /// immediately.
    pub async fn run(&self) {
        if self.started.swap(true, Ordering::SeqCst) {
            debug!("Subscription sync already ran for this session");
            return;
        }

        let report = self.sync().await;
        info!(
            subscriptions_added = report.subscriptions_added,
            sources_added = report.sources_added,
            adult_sources_added = report.adult_sources_added,
            fetched = report.fetched,
            failed = report.failed,
            skipped = report.skipped,
            saved = report.saved,
            "Subscription sync finished"
        );
    }

    async fn sync(&self) -> SyncReport {
        let mut report = SyncReport::default();
        // Unreadable settings end the session: saving anything would
        // replace the user's data with defaults.
        let mut settings = match self.store.get_settings() {
            Ok(settings) => settings,
            Err(e) => {
                error!(error = %e, "Failed to load settings, skipping subscription sync");
                return report;
            }
        };
        let mut changed = false;

        match self
            .apply_runtime_subscriptions(&mut settings.subscriptions)
            .await
        {
            Ok(0) => {}
            Ok(added) => {
                report.subscriptions_added = added;
                changed = true;
            }
            Err(e) => error!(error = %e, "Failed to apply runtime subscriptions"),
        }

        let active: Vec<usize> = settings
            .subscriptions
            .iter()
            .enumerate()
            .filter(|(_, sub)| sub.is_active())
            .map(|(index, _)| index)
            .collect();
        report.skipped = settings.subscriptions.len() - active.len();

        if active.is_empty() {
            debug!("No subscriptions to refresh");
            if changed {
                report.saved = self.persist(&settings);
            }
            return report;
        }

        // Sequential on purpose: merge order and timestamps stay deterministic.
        for index in active {
            let (name, url) = {
                let sub = &settings.subscriptions[index];
                (sub.name.clone(), sub.url.clone())
            };

            let fetched = match self
                .bounded(self.fetcher.fetch_sources(&url))
                .await
            {
                Ok(fetched) => fetched,
                Err(e) => {
                    warn!(subscription = %name, url = %url, error = %e, "Failed to sync subscription");
                    report.failed += 1;
                    continue;
                }
            };
            report.fetched += 1;

            let FetchedSources {
                normal_sources,
                adult_sources,
            } = fetched;

            let added = merge_into(&mut settings.sources, normal_sources);
            if added > 0 {
                report.sources_added += added;
                changed = true;
            }

            let added = merge_into(&mut settings.adult_sources, adult_sources);
            if added > 0 {
                report.adult_sources_added += added;
                changed = true;
            }

            let sub = &mut settings.subscriptions[index];
            let previous = sub.last_updated();
            sub.set_last_updated(Utc::now().timestamp_millis());
            debug!(subscription = %name, previous = ?previous, "Subscription refreshed");
        }

        if changed {
            report.saved = self.persist(&settings);
        } else {
            debug!("Subscriptions up to date, nothing to save");
        }

        report
    }

    /// Append runtime subscriptions whose URL is not yet present.
    async fn apply_runtime_subscriptions(
        &self,
        subscriptions: &mut Vec<Subscription>,
    ) -> Result<usize> {
        let runtime = self
            .bounded(self.runtime_config.fetch_runtime_config())
            .await?;

        let raw = runtime.subscription_sources.trim();
        if raw.is_empty() {
            return Ok(0);
        }

        let mut added = 0;
        for descriptor in parse_env_subscriptions(raw)? {
            if subscriptions.iter().any(|s| s.url == descriptor.url) {
                continue;
            }
            info!(name = %descriptor.name, url = %descriptor.url, "Adding runtime subscription");
            subscriptions.push(descriptor.into());
            added += 1;
        }

        Ok(added)
    }

    async fn bounded<T>(&self, call: impl Future<Output = Result<T>>) -> Result<T> {
        match tokio::time::timeout(self.fetch_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(SubsyncError::Timeout(self.fetch_timeout)),
        }
    }

    /// Save failures are logged and swallowed like every other step.
    fn persist(&self, settings: &Settings) -> bool {
        match self.store.save_settings(settings) {
            Ok(()) => true,
            Err(e) => {
                error!(error = %e, "Failed to save settings");
                false
            }
        }
    }
}

/// Merge `incoming` into `catalog`, returning the number of appended entries.
fn merge_into(catalog: &mut Vec<Source>, incoming: Vec<Source>) -> usize {
    if incoming.is_empty() {
        return 0;
    }
    let before = catalog.len();
    *catalog = merge_sources(std::mem::take(catalog), incoming);
    catalog.len() - before
}
