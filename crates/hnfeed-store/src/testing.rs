use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use hnfeed_core::{config::UpstreamConfig, ItemId};

use crate::error::{Result, StoreError};
use crate::store::ItemStore;
use crate::transport::Transport;

/// Scripted upstream: path -> body or HTTP status, with a request log.
#[derive(Default)]
pub struct FakeUpstream {
    responses: Mutex<HashMap<String, std::result::Result<String, u16>>>,
    delays: Mutex<HashMap<String, Duration>>,
    calls: Mutex<Vec<String>>,
}

impl FakeUpstream {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_top_ids(&self, ids: &[ItemId]) {
        self.set_body("/topstories.json", serde_json::to_string(ids).unwrap());
    }

    pub fn set_item(&self, id: ItemId) {
        let body = serde_json::json!({
            "id": id,
            "title": format!("Item {id}"),
            "url": format!("https://example.com/{id}"),
            "score": id * 10,
            "by": "alice",
            "time": 1_700_000_000 + id as i64,
            "descendants": 3,
            "type": "story",
        });
        self.set_body(&format!("/item/{id}.json"), body.to_string());
    }

    pub fn set_body(&self, path: &str, body: impl Into<String>) {
        self.responses
            .lock()
            .unwrap()
            .insert(path.to_string(), Ok(body.into()));
    }

    pub fn set_status(&self, path: &str, status: u16) {
        self.responses
            .lock()
            .unwrap()
            .insert(path.to_string(), Err(status));
    }

    pub fn set_delay(&self, path: &str, delay: Duration) {
        self.delays.lock().unwrap().insert(path.to_string(), delay);
    }

    pub fn calls_to(&self, path: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|p| *p == path).count()
    }
}

#[async_trait]
impl Transport for FakeUpstream {
    async fn get_text(&self, path: &str) -> Result<String> {
        self.calls.lock().unwrap().push(path.to_string());
        let delay = self.delays.lock().unwrap().get(path).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let response = self.responses.lock().unwrap().get(path).cloned();
        match response {
            Some(Ok(body)) => Ok(body),
            Some(Err(status)) => Err(StoreError::UpstreamStatus {
                status,
                url: path.to_string(),
            }),
            None => Err(StoreError::Unavailable(format!("no route for {path}"))),
        }
    }
}

pub fn store_with(upstream: Arc<FakeUpstream>) -> ItemStore {
    ItemStore::new(upstream, UpstreamConfig::default())
}
