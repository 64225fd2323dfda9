use async_trait::async_trait;
use hnfeed_core::NotificationEvent;
use hnfeed_hub::{BroadcastHub, PublishReport};
use hnfeed_protocol::methods::NEW_ITEMS_AVAILABLE;

use crate::error::Result;

/// Where the poller sends the events it builds.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn notify(&self, group: &str, event: &NotificationEvent) -> Result<PublishReport>;
}

/// Per-member failures stay inside the hub, so this never errors.
#[async_trait]
impl NotificationSink for BroadcastHub {
    async fn notify(&self, group: &str, event: &NotificationEvent) -> Result<PublishReport> {
        Ok(self.publish(group, NEW_ITEMS_AVAILABLE, event).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use hnfeed_core::{config::UPDATES_GROUP, ConnId, Item};
    use hnfeed_hub::{HubError, Subscriber};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    struct Capture {
        id: ConnId,
        frames: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Subscriber for Capture {
        fn conn_id(&self) -> &ConnId {
            &self.id
        }
        async fn send(&self, frame: &str) -> std::result::Result<(), HubError> {
            self.frames.lock().unwrap().push(frame.to_string());
            Ok(())
        }
        async fn close(&self) {}
    }

    #[tokio::test]
    async fn hub_sink_pushes_new_items_event() {
        let hub = BroadcastHub::new(Duration::from_secs(1));
        let sub = Arc::new(Capture {
            id: ConnId::from("c1"),
            frames: Mutex::new(Vec::new()),
        });
        hub.on_connect(sub.clone());

        let item = Item {
            id: 3,
            title: "Show HN".into(),
            url: "https://example.com".into(),
            score: 12,
            author: "carol".into(),
            created_at: 1_700_000_000,
            comment_count: 4,
        };
        let event = NotificationEvent::from_delta(&[item], &[3], 5, Utc::now());

        let report = hub.notify(UPDATES_GROUP, &event).await.unwrap();
        assert_eq!(report.delivered, 1);

        let frames = sub.frames.lock().unwrap();
        let v: serde_json::Value = serde_json::from_str(&frames[0]).unwrap();
        assert_eq!(v["event"], "NewItemsAvailable");
        assert_eq!(v["payload"]["count"], 1);
        assert_eq!(v["payload"]["preview"][0]["author"], "carol");
    }
}
