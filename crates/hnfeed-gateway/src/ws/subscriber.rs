use async_trait::async_trait;
use hnfeed_core::ConnId;
use hnfeed_hub::{HubError, Subscriber};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Hub-facing handle for one `/updates` connection.
///
/// Frames go through a bounded channel drained by the connection loop, so a
/// slow socket shows up as a send that waits (and eventually times out in
/// the hub) rather than unbounded buffering.
pub struct WsSubscriber {
    conn_id: ConnId,
    tx: mpsc::Sender<String>,
    closed: CancellationToken,
}

impl WsSubscriber {
    pub fn new(conn_id: ConnId, tx: mpsc::Sender<String>, closed: CancellationToken) -> Self {
        Self { conn_id, tx, closed }
    }
}

#[async_trait]
impl Subscriber for WsSubscriber {
    fn conn_id(&self) -> &ConnId {
        &self.conn_id
    }

    async fn send(&self, frame: &str) -> Result<(), HubError> {
        if self.closed.is_cancelled() {
            return Err(HubError::Closed {
                conn_id: self.conn_id.clone(),
            });
        }
        self.tx
            .send(frame.to_string())
            .await
            .map_err(|_| HubError::Closed {
                conn_id: self.conn_id.clone(),
            })
    }

    async fn close(&self) {
        self.closed.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn send_forwards_to_connection_loop() {
        let (tx, mut rx) = mpsc::channel(2);
        let sub = WsSubscriber::new(ConnId::from("c1"), tx, CancellationToken::new());
        sub.send("hi").await.unwrap();
        assert_eq!(rx.recv().await.unwrap(), "hi");
    }

    #[tokio::test]
    async fn send_after_loop_exit_is_closed() {
        let (tx, rx) = mpsc::channel(2);
        drop(rx);
        let sub = WsSubscriber::new(ConnId::from("c1"), tx, CancellationToken::new());
        assert!(matches!(
            sub.send("hi").await,
            Err(HubError::Closed { .. })
        ));
    }

    #[tokio::test]
    async fn close_trips_token_and_blocks_sends() {
        let (tx, _rx) = mpsc::channel(2);
        let token = CancellationToken::new();
        let sub = WsSubscriber::new(ConnId::from("c1"), tx, token.clone());
        sub.close().await;
        sub.close().await;
        assert!(token.is_cancelled());
        assert!(sub.send("late").await.is_err());
    }
}
