//! `hnfeed-poller`: detects new items in the upstream feed and announces them.
//!
//! # Tick
//!
//! | Step | Action                                                         |
//! |------|----------------------------------------------------------------|
//! | 1    | fetch the current top-N resolved items                         |
//! | 2    | `new = current - known` (order follows `current`)              |
//! | 3    | if `new` is non-empty, publish a `NotificationEvent`           |
//! | 4    | `known := current`, record the check time                      |
//!
//! A failed fetch or publish leaves `known` untouched and the loop retries
//! after the shorter retry interval instead of the full interval.

pub mod error;
pub mod poller;
pub mod sink;
pub mod source;
pub mod status;

pub use error::{PollerError, Result};
pub use poller::{diff_new_ids, ChangePoller, PollerSettings, TickOutcome};
pub use sink::NotificationSink;
pub use source::FeedSource;
pub use status::{PollerHandle, PollerState, PollerStatus};
