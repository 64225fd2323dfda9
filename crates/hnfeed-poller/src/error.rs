use hnfeed_store::StoreError;
use thiserror::Error;

/// Errors that fail a single poll tick.
#[derive(Debug, Error)]
pub enum PollerError {
    /// The snapshot could not be fetched from the item store.
    #[error("Fetch failed: {0}")]
    Fetch(#[from] StoreError),

    /// The notification could not be handed to the sink.
    #[error("Publish failed: {0}")]
    Publish(String),
}

pub type Result<T> = std::result::Result<T, PollerError>;
