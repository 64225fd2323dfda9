use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use hnfeed_core::{
    config::{PollerConfig, UPDATES_GROUP},
    Item, ItemId, NotificationEvent,
};
use hnfeed_hub::PublishReport;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::{
    error::Result,
    sink::NotificationSink,
    source::FeedSource,
    status::{PollerHandle, PollerState, PollerStatus},
};

/// Tunables for one poller instance.
#[derive(Debug, Clone)]
pub struct PollerSettings {
    pub group: String,
    pub interval: Duration,
    pub retry_interval: Duration,
    pub watch_count: usize,
    pub preview_len: usize,
    /// Treat a failed startup fetch as an empty baseline, so the first
    /// successful tick announces the whole watched window.
    pub announce_initial_snapshot: bool,
}

impl From<&PollerConfig> for PollerSettings {
    fn from(cfg: &PollerConfig) -> Self {
        Self {
            group: UPDATES_GROUP.to_string(),
            interval: cfg.interval(),
            retry_interval: cfg.retry_interval(),
            watch_count: cfg.watch_count,
            preview_len: cfg.preview_len,
            announce_initial_snapshot: cfg.announce_initial_snapshot,
        }
    }
}

/// What a successful tick did.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// No baseline existed yet; `count` ids became the baseline silently.
    Baseline { count: usize },
    /// Nothing new since the previous check.
    Unchanged,
    Notified {
        new_ids: Vec<ItemId>,
        report: PublishReport,
    },
}

/// Ids of `current` absent from `known`, in `current` order, without repeats.
pub fn diff_new_ids(known: &[ItemId], current: &[ItemId]) -> Vec<ItemId> {
    let known: HashSet<ItemId> = known.iter().copied().collect();
    let mut seen = HashSet::new();
    current
        .iter()
        .copied()
        .filter(|id| !known.contains(id) && seen.insert(*id))
        .collect()
}

/// Background task that diffs successive top-N snapshots.
///
/// The known-id baseline is owned here and nowhere else; ticks run strictly
/// one after another inside [`ChangePoller::run`].
pub struct ChangePoller {
    source: Arc<dyn FeedSource>,
    sink: Arc<dyn NotificationSink>,
    settings: PollerSettings,
    known: Option<Vec<ItemId>>,
    status_tx: watch::Sender<PollerStatus>,
}

impl ChangePoller {
    pub fn new(
        source: Arc<dyn FeedSource>,
        sink: Arc<dyn NotificationSink>,
        settings: PollerSettings,
    ) -> (Self, PollerHandle) {
        let (status_tx, status_rx) = watch::channel(PollerStatus::default());
        let poller = Self {
            source,
            sink,
            settings,
            known: None,
            status_tx,
        };
        (poller, PollerHandle::new(status_rx))
    }

    /// Current baseline, if one has been established.
    pub fn known_ids(&self) -> Option<&[ItemId]> {
        self.known.as_deref()
    }

    /// Take the startup snapshot. Never fails: a fetch error is logged and
    /// the first successful tick establishes the baseline instead.
    pub async fn initialize(&mut self) {
        match self.source.top_items(self.settings.watch_count).await {
            Ok(items) => {
                info!(count = items.len(), "poller baseline established");
                self.known = Some(ids_of(&items));
            }
            Err(e) => {
                error!(error = %e, "initial snapshot failed");
                self.known = if self.settings.announce_initial_snapshot {
                    Some(Vec::new())
                } else {
                    None
                };
            }
        }
        self.status_tx.send_modify(|s| s.state = PollerState::Running);
    }

    /// One check. On error the baseline is left as it was.
    pub async fn tick(&mut self) -> Result<TickOutcome> {
        let current = self.source.top_items(self.settings.watch_count).await?;
        let current_ids = ids_of(&current);

        let outcome = match &self.known {
            None => TickOutcome::Baseline {
                count: current_ids.len(),
            },
            Some(known) => {
                let new_ids = diff_new_ids(known, &current_ids);
                if new_ids.is_empty() {
                    TickOutcome::Unchanged
                } else {
                    let report = self.announce(&current, &new_ids).await?;
                    TickOutcome::Notified { new_ids, report }
                }
            }
        };

        // Only reached once any publish above has completed.
        self.known = Some(current_ids);
        self.status_tx.send_modify(|s| {
            s.last_check_time = Some(Utc::now());
            s.consecutive_failures = 0;
        });
        Ok(outcome)
    }

    /// Drive ticks until `shutdown` fires. A tick already in flight runs to
    /// completion; the wait between ticks is cut short.
    pub async fn run(mut self, shutdown: CancellationToken) {
        info!(
            interval_secs = self.settings.interval.as_secs(),
            watch_count = self.settings.watch_count,
            "change poller started"
        );
        self.initialize().await;

        while !shutdown.is_cancelled() {
            let delay = match self.tick().await {
                Ok(outcome) => {
                    log_outcome(&outcome);
                    self.settings.interval
                }
                Err(e) => {
                    self.status_tx.send_modify(|s| s.consecutive_failures += 1);
                    error!(
                        error = %e,
                        retry_secs = self.settings.retry_interval.as_secs(),
                        "poll tick failed"
                    );
                    self.settings.retry_interval
                }
            };

            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = tokio::time::sleep(delay) => {}
            }
        }

        self.status_tx.send_modify(|s| s.state = PollerState::Stopped);
        info!("change poller stopped");
    }

    async fn announce(&self, current: &[Item], new_ids: &[ItemId]) -> Result<PublishReport> {
        let event = NotificationEvent::from_delta(
            current,
            new_ids,
            self.settings.preview_len,
            Utc::now(),
        );
        let report = self.sink.notify(&self.settings.group, &event).await?;
        if report.failed > 0 {
            warn!(
                delivered = report.delivered,
                failed = report.failed,
                "new items announced with delivery failures"
            );
        }
        Ok(report)
    }
}

fn ids_of(items: &[Item]) -> Vec<ItemId> {
    items.iter().map(|i| i.id).collect()
}

fn log_outcome(outcome: &TickOutcome) {
    match outcome {
        TickOutcome::Baseline { count } => info!(count, "poller baseline established"),
        TickOutcome::Unchanged => debug!("no new items"),
        TickOutcome::Notified { new_ids, report } => info!(
            count = new_ids.len(),
            delivered = report.delivered,
            "new items announced"
        ),
    }
}
