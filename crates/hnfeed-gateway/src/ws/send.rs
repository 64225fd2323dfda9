use axum::extract::ws::{Message, WebSocket};
use futures_util::{stream::SplitSink, SinkExt};
use hnfeed_core::{config::MAX_PAYLOAD_BYTES, ConnId};
use hnfeed_protocol::{
    hello::{ClientPolicy, Hello, ServerInfo},
    methods::HELLO,
    EventFrame,
};

pub type WsSink = SplitSink<WebSocket, Message>;

/// Write one already-serialized frame as a text message.
pub async fn text(tx: &mut WsSink, frame: String) -> Result<(), axum::Error> {
    tx.send(Message::Text(frame.into())).await
}

/// First frame on every connection: who the client is and where it is subscribed.
pub fn hello_event(conn_id: &ConnId, groups: Vec<String>) -> EventFrame {
    EventFrame::new(
        HELLO,
        Hello {
            conn_id: conn_id.to_string(),
            server: ServerInfo {
                name: "hnfeed-gateway".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            groups,
            policy: ClientPolicy {
                max_message_size: MAX_PAYLOAD_BYTES,
            },
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn hello_carries_conn_id_and_groups() {
        let ev = hello_event(&ConnId::from("abc"), vec!["feed-updates".to_string()]);
        let v: Value = serde_json::from_str(&ev.to_json()).unwrap();
        assert_eq!(v["type"], "event");
        assert_eq!(v["event"], "hello");
        assert_eq!(v["payload"]["connId"], "abc");
        assert_eq!(v["payload"]["groups"][0], "feed-updates");
        assert_eq!(v["payload"]["policy"]["maxMessageSize"], 65536);
    }
}
