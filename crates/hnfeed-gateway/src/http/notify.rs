use axum::{extract::State, Json};
use chrono::Utc;
use hnfeed_core::{config::UPDATES_GROUP, Item, NotificationEvent};
use hnfeed_hub::PublishReport;
use hnfeed_protocol::methods::NEW_ITEMS_AVAILABLE;
use std::sync::Arc;
use tracing::info;

use crate::app::AppState;

/// Canned event for exercising the push path end to end.
pub fn sample_event() -> NotificationEvent {
    let item = Item {
        id: 1,
        title: "Test notification".to_string(),
        url: "https://news.ycombinator.com".to_string(),
        score: 100,
        author: "hnfeed".to_string(),
        created_at: Utc::now().timestamp(),
        comment_count: 0,
    };
    NotificationEvent {
        count: 1,
        preview: vec![item],
        emitted_at: Utc::now(),
    }
}

/// POST /notify/test: publish the sample event to "feed-updates", bypassing the poller.
pub async fn notify_test_handler(State(state): State<Arc<AppState>>) -> Json<PublishReport> {
    let report = state
        .hub
        .publish(UPDATES_GROUP, NEW_ITEMS_AVAILABLE, sample_event())
        .await;
    info!(delivered = report.delivered, "test notification sent");
    Json(report)
}
