use std::sync::Arc;

use hnfeed_core::{config::UpstreamConfig, Item, ItemId};
use serde::Deserialize;
use tracing::{debug, error, info, warn};

use crate::cache::TtlCache;
use crate::error::{Result, StoreError};
use crate::transport::{HttpTransport, Transport};

const TOP_IDS_KEY: &str = "top_ids";

/// Cache-backed client for the upstream ranked feed.
///
/// Shared behind an `Arc` by HTTP handlers and the change poller; all
/// methods take `&self`.
pub struct ItemStore {
    transport: Arc<dyn Transport>,
    upstream: UpstreamConfig,
    ids: TtlCache<&'static str, Arc<Vec<ItemId>>>,
    items: TtlCache<ItemId, Item>,
}

impl ItemStore {
    pub fn new(transport: Arc<dyn Transport>, upstream: UpstreamConfig) -> Self {
        let ttl = upstream.cache_ttl();
        Self {
            transport,
            upstream,
            ids: TtlCache::new(ttl),
            items: TtlCache::new(ttl),
        }
    }

    /// Build a store that talks to the configured upstream over HTTP.
    pub fn from_config(upstream: &UpstreamConfig) -> Result<Self> {
        let transport = HttpTransport::new(upstream)?;
        Ok(Self::new(Arc::new(transport), upstream.clone()))
    }

    /// Ordered list of top-item ids, from cache while fresh.
    ///
    /// Errors (`Http`, `Unavailable`, `UpstreamStatus`,
    /// `InvalidUpstreamFormat`) propagate to the caller.
    pub async fn get_top_ids(&self) -> Result<Arc<Vec<ItemId>>> {
        if let Some(ids) = self.ids.get(&TOP_IDS_KEY) {
            debug!(count = ids.len(), "using cached top ids");
            return Ok(ids);
        }

        info!("fetching top ids from upstream");
        let ids = match self.fetch_top_ids().await {
            Ok(ids) => Arc::new(ids),
            Err(e) => {
                error!(error = %e, "top ids fetch failed");
                return Err(e);
            }
        };

        self.ids.insert(TOP_IDS_KEY, Arc::clone(&ids));
        info!(count = ids.len(), "cached top ids");
        Ok(ids)
    }

    /// Resolve one item. `None` for missing, deleted or dead upstream
    /// entries, and for any fetch or decode failure (logged).
    pub async fn get_item(&self, id: ItemId) -> Option<Item> {
        if let Some(item) = self.items.get(&id) {
            return Some(item);
        }

        match self.fetch_item(id).await {
            Ok(Some(item)) => {
                debug!(id, title = %item.title, "cached item");
                self.items.insert(id, item.clone());
                Some(item)
            }
            Ok(None) => {
                warn!(id, "upstream has no live item for id");
                None
            }
            Err(e) => {
                warn!(id, error = %e, "item resolution failed");
                None
            }
        }
    }

    /// Number of per-item cache entries currently held.
    pub fn cached_item_count(&self) -> usize {
        self.items.len()
    }

    async fn fetch_top_ids(&self) -> Result<Vec<ItemId>> {
        let body = self.transport.get_text(&self.upstream.top_ids_path).await?;
        parse_top_ids(&body)
    }

    async fn fetch_item(&self, id: ItemId) -> Result<Option<Item>> {
        let path = self.upstream.item_path_for(id);
        let body = self
            .transport
            .get_text(&path)
            .await
            .map_err(|e| StoreError::ItemResolution {
                id,
                reason: e.to_string(),
            })?;
        decode_item(id, &body)
    }
}

fn parse_top_ids(body: &str) -> Result<Vec<ItemId>> {
    let ids: Vec<ItemId> = serde_json::from_str(body)
        .map_err(|e| StoreError::InvalidUpstreamFormat(format!("top ids: {e}")))?;
    if ids.is_empty() {
        return Err(StoreError::InvalidUpstreamFormat(
            "top ids: empty list".to_string(),
        ));
    }
    Ok(ids)
}

/// Upstream item shape. Every field is optional on the wire.
#[derive(Debug, Deserialize)]
struct UpstreamItem {
    #[serde(default)]
    id: ItemId,
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    score: i64,
    #[serde(default)]
    by: String,
    #[serde(default)]
    time: i64,
    #[serde(default)]
    descendants: i64,
    #[serde(default)]
    deleted: bool,
    #[serde(default)]
    dead: bool,
}

impl From<UpstreamItem> for Item {
    fn from(raw: UpstreamItem) -> Self {
        Item {
            id: raw.id,
            title: raw.title,
            url: raw.url,
            score: raw.score,
            author: raw.by,
            created_at: raw.time,
            comment_count: raw.descendants,
        }
    }
}

/// `Ok(None)` for a JSON `null`, a zero id, or a deleted/dead entry.
fn decode_item(id: ItemId, body: &str) -> Result<Option<Item>> {
    let raw: Option<UpstreamItem> =
        serde_json::from_str(body).map_err(|e| StoreError::ItemResolution {
            id,
            reason: format!("decode: {e}"),
        })?;

    Ok(raw
        .filter(|r| r.id != 0 && !r.deleted && !r.dead)
        .map(Item::from))
}
