//! Page slicing over the cached id list.

use std::ops::Range;

use futures_util::future::join_all;
use hnfeed_core::Item;
use tracing::debug;

use crate::error::Result;
use crate::store::ItemStore;

/// `ceil(len / page_size)`; zero when `page_size` is zero.
pub fn total_pages(len: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    len.div_ceil(page_size)
}

/// Index range of the 1-based `page`, or `None` when the page starts past
/// the end of the list (or `page`/`page_size` is zero).
pub fn page_bounds(len: usize, page_size: usize, page: usize) -> Option<Range<usize>> {
    if page_size == 0 || page == 0 {
        return None;
    }
    let start = (page - 1).checked_mul(page_size)?;
    if start >= len {
        return None;
    }
    Some(start..start.saturating_add(page_size).min(len))
}

impl ItemStore {
    /// Items of one page, in rank order. Ids that fail to resolve are
    /// dropped rather than failing the page; a page past the end is empty.
    pub async fn get_page(&self, page_size: usize, page: usize) -> Result<Vec<Item>> {
        let ids = self.get_top_ids().await?;
        let Some(range) = page_bounds(ids.len(), page_size, page) else {
            debug!(page, page_size, total = ids.len(), "page beyond range");
            return Ok(Vec::new());
        };

        debug!(page, page_size, count = range.len(), "resolving page items");
        // join_all yields results in input order regardless of completion order.
        let resolved = join_all(ids[range].iter().map(|&id| self.get_item(id))).await;
        Ok(resolved.into_iter().flatten().collect())
    }

    pub async fn get_page_count(&self, page_size: usize) -> Result<usize> {
        let ids = self.get_top_ids().await?;
        Ok(total_pages(ids.len(), page_size))
    }
}
