use axum::{extract::State, Json};
use hnfeed_core::config::UPDATES_GROUP;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::app::AppState;

/// GET /health: liveness check with poller and cache counters.
pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "subscribers": state.hub.member_count(UPDATES_GROUP),
        "connections": state.hub.connection_count(),
        "poller": state.poller.status(),
        "cachedItems": state.store.cached_item_count(),
    }))
}
