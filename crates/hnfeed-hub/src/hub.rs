use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use futures_util::future::join_all;
use hnfeed_core::{config::UPDATES_GROUP, ConnId};
use hnfeed_protocol::EventFrame;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::HubError;
use crate::subscriber::Subscriber;

/// Outcome of one group publish.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PublishReport {
    pub delivered: usize,
    pub failed: usize,
}

/// Registry of named subscriber groups with fan-out publish.
///
/// Purely in-memory; rebuilt from nothing on restart. Membership does not
/// have to match the set of open connections at every instant: a send to a
/// dead handle is a per-member failure, logged and skipped.
///
/// Open connections are tracked apart from groups, so a connection that has
/// left every group is still reachable by [`BroadcastHub::close_all`].
pub struct BroadcastHub {
    groups: DashMap<String, HashMap<ConnId, Arc<dyn Subscriber>>>,
    connections: DashMap<ConnId, Arc<dyn Subscriber>>,
    seq: AtomicU64,
    send_timeout: Duration,
}

impl BroadcastHub {
    pub fn new(send_timeout: Duration) -> Self {
        Self {
            groups: DashMap::new(),
            connections: DashMap::new(),
            seq: AtomicU64::new(0),
            send_timeout,
        }
    }

    /// Connection opened: join the default updates group.
    pub fn on_connect(&self, subscriber: Arc<dyn Subscriber>) {
        info!(conn_id = %subscriber.conn_id(), "subscriber connected");
        self.connections
            .insert(subscriber.conn_id().clone(), Arc::clone(&subscriber));
        self.join(subscriber, UPDATES_GROUP);
    }

    /// Connection closed, for whatever reason: drop it from the default
    /// group and from every group it joined explicitly.
    pub fn on_disconnect(&self, conn_id: &ConnId) {
        self.connections.remove(conn_id);
        let mut left = 0usize;
        for mut group in self.groups.iter_mut() {
            if group.value_mut().remove(conn_id).is_some() {
                left += 1;
            }
        }
        self.groups.retain(|_, members| !members.is_empty());
        info!(%conn_id, groups = left, "subscriber disconnected");
    }

    /// Add `subscriber` to `group`. Returns false if it was already a member.
    pub fn join(&self, subscriber: Arc<dyn Subscriber>, group: &str) -> bool {
        let conn_id = subscriber.conn_id().clone();
        let added = self
            .groups
            .entry(group.to_string())
            .or_default()
            .insert(conn_id.clone(), subscriber)
            .is_none();
        if added {
            debug!(%conn_id, group, "joined group");
        }
        added
    }

    /// Remove `conn_id` from `group`. Returns false if it was not a member.
    pub fn leave(&self, conn_id: &ConnId, group: &str) -> bool {
        let removed = self
            .groups
            .get_mut(group)
            .map(|mut members| members.remove(conn_id).is_some())
            .unwrap_or(false);
        self.groups.remove_if(group, |_, members| members.is_empty());
        if removed {
            debug!(%conn_id, group, "left group");
        }
        removed
    }

    /// Open connections, whether or not they belong to any group.
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    pub fn member_count(&self, group: &str) -> usize {
        self.groups.get(group).map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_member(&self, conn_id: &ConnId, group: &str) -> bool {
        self.groups
            .get(group)
            .is_some_and(|members| members.contains_key(conn_id))
    }

    /// Groups `conn_id` currently belongs to, sorted by name.
    pub fn groups_of(&self, conn_id: &ConnId) -> Vec<String> {
        let mut names: Vec<String> = self
            .groups
            .iter()
            .filter(|g| g.value().contains_key(conn_id))
            .map(|g| g.key().clone())
            .collect();
        names.sort();
        names
    }

    /// Push `event` with `payload` to every current member of `group`.
    ///
    /// Sends run concurrently, each bounded by the hub's send timeout. A
    /// failing member never stops delivery to the others and never surfaces
    /// as an error here. An empty group is a silent no-op.
    pub async fn publish(&self, group: &str, event: &str, payload: impl Serialize) -> PublishReport {
        // Snapshot members so no shard lock is held across an await.
        let members: Vec<Arc<dyn Subscriber>> = self
            .groups
            .get(group)
            .map(|m| m.values().cloned().collect())
            .unwrap_or_default();

        if members.is_empty() {
            debug!(group, event, "publish to empty group");
            return PublishReport::default();
        }

        let frame = EventFrame::new(event, payload)
            .with_group(group)
            .with_seq(self.next_seq())
            .to_json();

        let outcomes = join_all(members.iter().map(|m| self.send_one(m.as_ref(), &frame))).await;

        let mut report = PublishReport::default();
        for outcome in outcomes {
            match outcome {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    warn!(group, event, error = %e, "broadcast send failed");
                    report.failed += 1;
                }
            }
        }
        info!(
            group,
            event,
            delivered = report.delivered,
            failed = report.failed,
            "published"
        );
        report
    }

    /// Close every open connection, grouped or not (process shutdown).
    pub async fn close_all(&self) {
        let open: Vec<Arc<dyn Subscriber>> = self
            .connections
            .iter()
            .map(|c| Arc::clone(c.value()))
            .collect();
        info!(count = open.len(), "closing all subscribers");
        join_all(open.iter().map(|s| s.close())).await;
    }

    fn next_seq(&self) -> u64 {
        self.seq.fetch_add(1, Ordering::Relaxed)
    }

    async fn send_one(&self, subscriber: &dyn Subscriber, frame: &str) -> Result<(), HubError> {
        match tokio::time::timeout(self.send_timeout, subscriber.send(frame)).await {
            Ok(result) => result,
            Err(_) => Err(HubError::Timeout {
                conn_id: subscriber.conn_id().clone(),
                ms: self.send_timeout.as_millis() as u64,
            }),
        }
    }
}
