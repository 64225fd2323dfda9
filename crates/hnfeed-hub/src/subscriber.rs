use async_trait::async_trait;
use hnfeed_core::ConnId;

use crate::error::HubError;

/// A live connection the hub can push frames to.
///
/// Implemented by the WebSocket transport in the gateway and by in-memory
/// fakes in tests. Must be `Send + Sync` so one handle can sit in several
/// groups and be driven from concurrent publishes.
#[async_trait]
pub trait Subscriber: Send + Sync {
    /// Stable identifier; membership is keyed by it.
    fn conn_id(&self) -> &ConnId;

    /// Deliver one serialized frame.
    async fn send(&self, frame: &str) -> Result<(), HubError>;

    /// Ask the transport to close the connection. Idempotent.
    async fn close(&self);
}
