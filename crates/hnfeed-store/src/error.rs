use hnfeed_core::ItemId;
use thiserror::Error;

/// Errors raised while talking to the upstream feed.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Transport-level failure (connect, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The upstream could not be reached for a reason other than HTTP.
    #[error("Upstream unavailable: {0}")]
    Unavailable(String),

    /// The upstream answered with a non-2xx status.
    #[error("Upstream returned HTTP {status} for {url}")]
    UpstreamStatus { status: u16, url: String },

    /// The id list was empty or not a JSON array of integers.
    #[error("Invalid upstream format: {0}")]
    InvalidUpstreamFormat(String),

    /// A single item failed to load. Logged and downgraded to "absent"
    /// inside the store; never returned from `get_item`.
    #[error("Item {id} could not be resolved: {reason}")]
    ItemResolution { id: ItemId, reason: String },
}

impl StoreError {
    /// Short error code string surfaced to HTTP clients.
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::Http(_) | StoreError::Unavailable(_) | StoreError::UpstreamStatus { .. } => {
                "UPSTREAM_ERROR"
            }
            StoreError::InvalidUpstreamFormat(_) => "INVALID_UPSTREAM_FORMAT",
            StoreError::ItemResolution { .. } => "ITEM_RESOLUTION_FAILURE",
        }
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
