use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Any frame on the wire, discriminated by the `type` field.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Frame {
    Req(ReqFrame),
    Res(ResFrame),
    Event(EventFrame),
}

#[derive(Debug, Error)]
pub enum FrameError {
    #[error("malformed frame: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("expected a req frame, got {0}")]
    UnexpectedType(&'static str),
}

impl Frame {
    /// Parse a client text frame. Only `req` frames are accepted inbound.
    pub fn parse_request(text: &str) -> Result<ReqFrame, FrameError> {
        match serde_json::from_str::<Frame>(text)? {
            Frame::Req(req) => Ok(req),
            Frame::Res(_) => Err(FrameError::UnexpectedType("res")),
            Frame::Event(_) => Err(FrameError::UnexpectedType("event")),
        }
    }
}

/// Client -> Server method invocation.
/// Wire: `{ "type": "req", "id": "1", "method": "JoinUpdates", "params": {...} }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReqFrame {
    pub id: String,
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl ReqFrame {
    /// Decode `params` into `T`; absent params decode from an empty object.
    pub fn params_as<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        let raw = self
            .params
            .clone()
            .unwrap_or_else(|| Value::Object(Default::default()));
        serde_json::from_value(raw)
    }
}

/// Server -> Client answer to a single `req`.
/// Wire: `{ "type": "res", "id": "1", "ok": true, "payload": {...} }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResFrame {
    pub id: String,
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorShape>,
}

impl ResFrame {
    pub fn ok(id: impl Into<String>, payload: impl Serialize) -> Self {
        Self {
            id: id.into(),
            ok: true,
            payload: Some(serde_json::to_value(payload).unwrap_or(Value::Null)),
            error: None,
        }
    }

    pub fn err(id: impl Into<String>, code: &str, message: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ok: false,
            payload: None,
            error: Some(ErrorShape {
                code: code.to_string(),
                message: message.into(),
            }),
        }
    }

    pub fn to_json(&self) -> String {
        // A ResFrame holds only strings, bools and serde_json::Value.
        serde_json::to_string(&Frame::Res(self.clone())).unwrap_or_default()
    }
}

/// Server -> Client push.
/// Wire: `{ "type": "event", "event": "NewItemsAvailable", "group": "feed-updates", "seq": 4, "payload": {...} }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventFrame {
    pub event: String,
    /// Group the event was published to; absent for direct pushes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seq: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
}

impl EventFrame {
    pub fn new(event: impl Into<String>, payload: impl Serialize) -> Self {
        Self {
            event: event.into(),
            group: None,
            seq: None,
            payload: Some(serde_json::to_value(payload).unwrap_or(Value::Null)),
        }
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    pub fn with_seq(mut self, seq: u64) -> Self {
        self.seq = Some(seq);
        self
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(&Frame::Event(self.clone())).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorShape {
    pub code: String,
    pub message: String,
}

/// Params of `JoinUpdates` / `LeaveUpdates`: `{ "group"?: string }`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GroupParams {
    #[serde(default)]
    pub group: Option<String>,
}

impl GroupParams {
    pub fn group_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.group.as_deref().filter(|g| !g.is_empty()).unwrap_or(default)
    }
}
