use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use hnfeed_core::{
    config::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, MIN_PAGE_SIZE},
    Item,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

use crate::app::AppState;
use crate::http::error::ApiError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemsQuery {
    #[serde(default = "default_page_size")]
    pub page_size: i64,
    #[serde(default = "first_page")]
    pub page: u64,
}

fn default_page_size() -> i64 {
    DEFAULT_PAGE_SIZE as i64
}

fn first_page() -> u64 {
    1
}

impl ItemsQuery {
    /// `(page_size, page)` once both are inside their accepted ranges.
    pub fn validate(&self) -> Result<(usize, usize), ApiError> {
        let size_range = MIN_PAGE_SIZE as i64..=MAX_PAGE_SIZE as i64;
        if !size_range.contains(&self.page_size) {
            return Err(ApiError::BadRequest(format!(
                "pageSize must be between {MIN_PAGE_SIZE} and {MAX_PAGE_SIZE}"
            )));
        }
        if self.page < 1 {
            return Err(ApiError::BadRequest(
                "page must be greater than 0".to_string(),
            ));
        }
        // pages past usize::MAX are past the end anyway
        let page = usize::try_from(self.page).unwrap_or(usize::MAX);
        Ok((self.page_size as usize, page))
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemsPage {
    pub items: Vec<Item>,
    pub total_pages: usize,
    pub current_page: usize,
    pub page_size: usize,
}

/// GET /items?pageSize=&page=: one page of the ranked feed.
pub async fn items_handler(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ItemsQuery>, QueryRejection>,
) -> Result<Json<ItemsPage>, ApiError> {
    let Query(query) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let (page_size, page) = query.validate()?;

    info!(page, page_size, "fetching items page");
    let result = async {
        let items = state.store.get_page(page_size, page).await?;
        let total_pages = state.store.get_page_count(page_size).await?;
        Ok::<_, ApiError>(ItemsPage {
            items,
            total_pages,
            current_page: page,
            page_size,
        })
    }
    .await;

    if let Err(e) = &result {
        error!(page, page_size, error = %e, "items page failed");
    }
    result.map(Json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{build_router, test_support::*};
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    async fn get(upstream: StaticUpstream, uri: &str) -> (StatusCode, Value) {
        let router = build_router(state_with(upstream));
        let res = router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn bounds_are_inclusive() {
        let q = |page_size, page| ItemsQuery { page_size, page };
        assert_eq!(q(1, 1).validate().unwrap(), (1, 1));
        assert_eq!(q(100, 7).validate().unwrap(), (100, 7));
        assert!(q(0, 1).validate().is_err());
        assert!(q(101, 1).validate().is_err());
        assert!(q(10, 0).validate().is_err());
        assert_eq!(q(10, u64::MAX).validate().unwrap().0, 10);
    }

    #[tokio::test]
    async fn returns_requested_page() {
        let (status, body) = get(
            StaticUpstream::with_items(&[5, 4, 3, 2, 1]),
            "/items?pageSize=2&page=2",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["totalPages"], 3);
        assert_eq!(body["currentPage"], 2);
        assert_eq!(body["pageSize"], 2);
        let items = body["items"].as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["id"], 3);
        assert_eq!(items[1]["id"], 2);
        assert_eq!(items[0]["author"], "pg");
        assert_eq!(items[0]["commentCount"], 2);
    }

    #[tokio::test]
    async fn defaults_to_first_page_of_ten() {
        let ids: Vec<u64> = (1..=12).collect();
        let (status, body) = get(StaticUpstream::with_items(&ids), "/items").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["pageSize"], 10);
        assert_eq!(body["currentPage"], 1);
        assert_eq!(body["totalPages"], 2);
        assert_eq!(body["items"].as_array().unwrap().len(), 10);
    }

    #[tokio::test]
    async fn page_past_the_end_is_empty() {
        let (status, body) = get(StaticUpstream::with_items(&[1, 2]), "/items?pageSize=2&page=4").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["items"].as_array().unwrap().is_empty());
        assert_eq!(body["totalPages"], 1);
    }

    #[tokio::test]
    async fn huge_page_number_is_an_empty_page() {
        let (status, body) = get(
            StaticUpstream::with_items(&[1, 2]),
            "/items?page=18446744073709551615",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["items"].as_array().unwrap().is_empty());
        assert_eq!(body["totalPages"], 1);
    }

    #[tokio::test]
    async fn missing_item_shrinks_page() {
        let mut upstream = StaticUpstream::with_items(&[1, 2, 3]);
        upstream.bodies.insert("/item/2.json".into(), "null".into());
        let (_, body) = get(upstream, "/items?pageSize=3").await;
        let ids: Vec<u64> = body["items"]
            .as_array()
            .unwrap()
            .iter()
            .map(|i| i["id"].as_u64().unwrap())
            .collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[tokio::test]
    async fn out_of_range_params_are_rejected() {
        for uri in [
            "/items?pageSize=0",
            "/items?pageSize=101",
            "/items?page=0",
            "/items?page=-3",
            "/items?pageSize=abc",
        ] {
            let (status, body) = get(StaticUpstream::with_items(&[1]), uri).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
            assert_eq!(body["code"], "BAD_REQUEST");
        }
    }

    #[tokio::test]
    async fn unreachable_id_list_is_bad_gateway() {
        let (status, body) = get(StaticUpstream::default(), "/items").await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["code"], "UPSTREAM_ERROR");
    }

    #[tokio::test]
    async fn empty_id_list_is_bad_gateway() {
        let mut upstream = StaticUpstream::default();
        upstream
            .bodies
            .insert("/topstories.json".into(), "[]".into());
        let (status, body) = get(upstream, "/items").await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["code"], "INVALID_UPSTREAM_FORMAT");
    }
}
