//! `hnfeed-core`: types, configuration and errors shared by every hnfeed crate.

pub mod config;
pub mod error;
pub mod types;

pub use error::{CoreError, Result};
pub use types::{ConnId, Item, ItemId, NotificationEvent};
