use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use hnfeed_core::config::HnfeedConfig;
use hnfeed_hub::BroadcastHub;
use hnfeed_poller::PollerHandle;
use hnfeed_store::ItemStore;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
};
use tracing::warn;

/// Central shared state, passed as Arc<AppState> to all Axum handlers.
pub struct AppState {
    pub config: HnfeedConfig,
    pub store: Arc<ItemStore>,
    pub hub: Arc<BroadcastHub>,
    /// Read-only view of the background poller.
    pub poller: PollerHandle,
}

impl AppState {
    pub fn new(
        config: HnfeedConfig,
        store: Arc<ItemStore>,
        hub: Arc<BroadcastHub>,
        poller: PollerHandle,
    ) -> Self {
        Self {
            config,
            store,
            hub,
            poller,
        }
    }
}

/// Assemble the full Axum router.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config.gateway.cors_origins);
    Router::new()
        .route("/health", get(crate::http::health::health_handler))
        .route("/items", get(crate::http::items::items_handler))
        .route("/notify/test", post(crate::http::notify::notify_test_handler))
        .route("/updates", get(crate::ws::connection::ws_handler))
        .with_state(state)
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match o.parse() {
            Ok(v) => Some(v),
            Err(_) => {
                warn!(origin = %o, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods(Any)
        .allow_headers(Any)
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use async_trait::async_trait;
    use hnfeed_core::config::UpstreamConfig;
    use hnfeed_store::{StoreError, Transport};
    use std::collections::HashMap;
    use std::time::Duration;

    /// Fixed upstream: path -> body. Unknown paths are unreachable.
    #[derive(Default)]
    pub struct StaticUpstream {
        pub bodies: HashMap<String, String>,
    }

    impl StaticUpstream {
        pub fn with_items(ids: &[u64]) -> Self {
            let mut bodies = HashMap::new();
            bodies.insert(
                "/topstories.json".to_string(),
                serde_json::to_string(ids).unwrap(),
            );
            for id in ids {
                bodies.insert(
                    format!("/item/{id}.json"),
                    serde_json::json!({
                        "id": id,
                        "title": format!("Story {id}"),
                        "url": "https://example.com",
                        "score": 7,
                        "by": "pg",
                        "time": 1_700_000_000,
                        "descendants": 2,
                    })
                    .to_string(),
                );
            }
            Self { bodies }
        }
    }

    #[async_trait]
    impl Transport for StaticUpstream {
        async fn get_text(&self, path: &str) -> hnfeed_store::Result<String> {
            self.bodies
                .get(path)
                .cloned()
                .ok_or_else(|| StoreError::Unavailable(format!("no route for {path}")))
        }
    }

    pub fn state_with(upstream: StaticUpstream) -> Arc<AppState> {
        let config = HnfeedConfig::default();
        let store = ItemStore::new(Arc::new(upstream), UpstreamConfig::default());
        Arc::new(AppState::new(
            config,
            Arc::new(store),
            Arc::new(BroadcastHub::new(Duration::from_millis(500))),
            PollerHandle::detached(),
        ))
    }
}
