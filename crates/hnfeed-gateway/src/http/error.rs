use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use hnfeed_store::StoreError;
use serde_json::json;
use thiserror::Error;

/// Errors surfaced by the HTTP handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Query parameters outside their accepted ranges.
    #[error("{0}")]
    BadRequest(String),

    /// The upstream id list could not be obtained.
    #[error(transparent)]
    Upstream(#[from] StoreError),
}

impl ApiError {
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::Upstream(e) => e.code(),
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.to_string(),
            "code": self.code(),
        }));
        (self.status(), body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_errors_map_to_bad_gateway() {
        let err = ApiError::from(StoreError::InvalidUpstreamFormat("empty".into()));
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(err.code(), "INVALID_UPSTREAM_FORMAT");
    }

    #[test]
    fn validation_errors_map_to_bad_request() {
        let err = ApiError::BadRequest("page must be greater than 0".into());
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
