use async_trait::async_trait;
use hnfeed_core::config::UpstreamConfig;
use tracing::{debug, warn};

use crate::error::{Result, StoreError};

/// Read-only access to the upstream HTTP source.
///
/// The store owns paths and decoding; a transport only turns a path into a
/// response body. Tests substitute an in-memory implementation.
#[async_trait]
pub trait Transport: Send + Sync {
    /// GET `path` (relative to the upstream base) and return the body text.
    /// Non-2xx answers are errors.
    async fn get_text(&self, path: &str) -> Result<String>;
}

pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(config: &UpstreamConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get_text(&self, path: &str) -> Result<String> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "upstream GET");

        let resp = self.client.get(&url).send().await.map_err(|e| {
            if e.is_connect() || e.is_timeout() {
                StoreError::Unavailable(e.to_string())
            } else {
                StoreError::Http(e)
            }
        })?;

        let status = resp.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), %url, "upstream error status");
            return Err(StoreError::UpstreamStatus {
                status: status.as_u16(),
                url,
            });
        }

        Ok(resp.text().await?)
    }
}
