//! `hnfeed-store`: cache-backed access to the upstream ranked feed.
//!
//! The [`ItemStore`] is the only component that talks to the upstream for
//! item data. Both namespaces it caches (the ordered top-id list and one
//! entry per item) expire after a fixed TTL and are replaced wholesale on
//! refresh. The [`pager`] functions slice the id list into pages and resolve
//! each page's items concurrently.

pub mod cache;
pub mod error;
pub mod pager;
pub mod store;
pub mod transport;

#[cfg(test)]
mod testing;

pub use cache::{CacheEntry, TtlCache};
pub use error::{Result, StoreError};
pub use store::ItemStore;
pub use transport::{HttpTransport, Transport};
