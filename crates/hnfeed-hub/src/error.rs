use hnfeed_core::ConnId;
use thiserror::Error;

/// Per-subscriber delivery failures. The hub logs these and moves on; they
/// never reach a publisher.
#[derive(Debug, Error)]
pub enum HubError {
    /// The send did not complete within the hub's per-send budget.
    #[error("Send to {conn_id} timed out after {ms}ms")]
    Timeout { conn_id: ConnId, ms: u64 },

    /// The connection is already gone.
    #[error("Connection {conn_id} is closed")]
    Closed { conn_id: ConnId },
}
