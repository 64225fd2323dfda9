use std::sync::Arc;

use hnfeed_core::{config::UPDATES_GROUP, ConnId};
use hnfeed_hub::{BroadcastHub, Subscriber};
use hnfeed_protocol::{
    methods::{BAD_PARAMS, JOIN_UPDATES, LEAVE_UPDATES, METHOD_NOT_FOUND, PING},
    Frame, FrameError, GroupParams, ReqFrame, ResFrame,
};
use serde_json::json;
use tracing::{debug, warn};

use crate::ws::subscriber::WsSubscriber;

/// Process one inbound text frame. Returns the response to write back, or
/// `None` when the frame carried nothing to answer.
pub fn handle_text(
    conn_id: &ConnId,
    text: &str,
    subscriber: &Arc<WsSubscriber>,
    hub: &BroadcastHub,
) -> Option<ResFrame> {
    match Frame::parse_request(text) {
        Ok(req) => Some(route(&req, subscriber, hub)),
        Err(FrameError::Malformed(e)) => {
            warn!(%conn_id, error = %e, "malformed frame");
            None
        }
        Err(e @ FrameError::UnexpectedType(_)) => {
            debug!(%conn_id, error = %e, "ignoring non-request frame");
            None
        }
    }
}

/// Route a method call to the hub.
pub fn route(req: &ReqFrame, subscriber: &Arc<WsSubscriber>, hub: &BroadcastHub) -> ResFrame {
    match req.method.as_str() {
        PING => ResFrame::ok(&req.id, json!({ "pong": true })),

        JOIN_UPDATES => match req.params_as::<GroupParams>() {
            Ok(params) => {
                let group = params.group_or(UPDATES_GROUP);
                let joined = hub.join(subscriber.clone(), group);
                debug!(conn_id = %subscriber.conn_id(), group, joined, "join");
                ResFrame::ok(&req.id, json!({ "group": group, "joined": joined }))
            }
            Err(e) => ResFrame::err(&req.id, BAD_PARAMS, e.to_string()),
        },

        LEAVE_UPDATES => match req.params_as::<GroupParams>() {
            Ok(params) => {
                let group = params.group_or(UPDATES_GROUP);
                let left = hub.leave(subscriber.conn_id(), group);
                debug!(conn_id = %subscriber.conn_id(), group, left, "leave");
                ResFrame::ok(&req.id, json!({ "group": group, "left": left }))
            }
            Err(e) => ResFrame::err(&req.id, BAD_PARAMS, e.to_string()),
        },

        other => ResFrame::err(&req.id, METHOD_NOT_FOUND, format!("unknown method: {other}")),
    }
}
