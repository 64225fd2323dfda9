use async_trait::async_trait;
use hnfeed_core::Item;
use hnfeed_store::{ItemStore, StoreError};

/// Where the poller reads its snapshots from.
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// The first `n` resolved items, in upstream rank order.
    async fn top_items(&self, n: usize) -> Result<Vec<Item>, StoreError>;
}

#[async_trait]
impl FeedSource for ItemStore {
    async fn top_items(&self, n: usize) -> Result<Vec<Item>, StoreError> {
        self.get_page(n, 1).await
    }
}
