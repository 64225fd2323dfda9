use std::time::Duration;

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_BIND: &str = "127.0.0.1";
/// Group every `/updates` connection joins on connect.
pub const UPDATES_GROUP: &str = "feed-updates";
pub const MIN_PAGE_SIZE: usize = 1;
pub const MAX_PAGE_SIZE: usize = 100;
pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const MAX_PAYLOAD_BYTES: usize = 64 * 1024; // hard cap per inbound WS frame

/// Top-level config (hnfeed.toml + HNFEED_* env overrides).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HnfeedConfig {
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub poller: PollerConfig,
    #[serde(default)]
    pub hub: HubConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Browser origins allowed by the CORS layer.
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
    /// Outbound frames buffered per WS connection before sends start waiting.
    #[serde(default = "default_ws_outbound_buffer")]
    pub ws_outbound_buffer: usize,
    #[serde(default = "default_ws_ping_interval_secs")]
    pub ws_ping_interval_secs: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
            cors_origins: default_cors_origins(),
            ws_outbound_buffer: default_ws_outbound_buffer(),
            ws_ping_interval_secs: default_ws_ping_interval_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Base URL without trailing slash.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_top_ids_path")]
    pub top_ids_path: String,
    /// Item path template; `{id}` is replaced with the item id.
    #[serde(default = "default_item_path")]
    pub item_path: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl UpstreamConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn item_path_for(&self, id: u64) -> String {
        self.item_path.replace("{id}", &id.to_string())
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            top_ids_path: default_top_ids_path(),
            item_path: default_item_path(),
            request_timeout_secs: default_request_timeout_secs(),
            cache_ttl_secs: default_cache_ttl_secs(),
            user_agent: default_user_agent(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollerConfig {
    #[serde(default = "bool_true")]
    pub enabled: bool,
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    /// Shorter wait used after a failed tick.
    #[serde(default = "default_retry_interval_secs")]
    pub retry_interval_secs: u64,
    /// How many top items make up one snapshot.
    #[serde(default = "default_watch_count")]
    pub watch_count: usize,
    #[serde(default = "default_preview_len")]
    pub preview_len: usize,
    /// When true, a failed startup fetch leaves an empty baseline and the
    /// first successful tick announces every item as new.
    #[serde(default)]
    pub announce_initial_snapshot: bool,
}

impl PollerConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn retry_interval(&self) -> Duration {
        Duration::from_secs(self.retry_interval_secs)
    }
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: default_interval_secs(),
            retry_interval_secs: default_retry_interval_secs(),
            watch_count: default_watch_count(),
            preview_len: default_preview_len(),
            announce_initial_snapshot: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HubConfig {
    /// Upper bound on a single subscriber send during a group publish.
    #[serde(default = "default_send_timeout_ms")]
    pub send_timeout_ms: u64,
}

impl HubConfig {
    pub fn send_timeout(&self) -> Duration {
        Duration::from_millis(self.send_timeout_ms)
    }
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            send_timeout_ms: default_send_timeout_ms(),
        }
    }
}

fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_cors_origins() -> Vec<String> {
    vec!["http://localhost:4200".to_string()]
}

fn default_ws_outbound_buffer() -> usize {
    64
}

fn default_ws_ping_interval_secs() -> u64 {
    30
}

fn default_base_url() -> String {
    "https://hacker-news.firebaseio.com/v0".to_string()
}

fn default_top_ids_path() -> String {
    "/topstories.json".to_string()
}

fn default_item_path() -> String {
    "/item/{id}.json".to_string()
}

fn default_request_timeout_secs() -> u64 {
    15
}

fn default_cache_ttl_secs() -> u64 {
    15 * 60
}

fn default_user_agent() -> String {
    "hnfeed-gateway".to_string()
}

fn default_interval_secs() -> u64 {
    5 * 60
}

fn default_retry_interval_secs() -> u64 {
    60
}

fn default_watch_count() -> usize {
    50
}

fn default_preview_len() -> usize {
    5
}

fn default_send_timeout_ms() -> u64 {
    2_000
}

fn bool_true() -> bool {
    true
}

impl HnfeedConfig {
    /// Load config from a TOML file with HNFEED_* env var overrides.
    ///
    /// Nested keys use a double underscore: `HNFEED_POLLER__INTERVAL_SECS=60`.
    pub fn load(config_path: Option<&str>) -> crate::error::Result<Self> {
        let path = config_path
            .map(String::from)
            .unwrap_or_else(default_config_path);

        Self::from_figment(
            Figment::new()
                .merge(Toml::file(&path))
                .merge(Env::prefixed("HNFEED_").split("__")),
        )
    }

    pub fn from_figment(figment: Figment) -> crate::error::Result<Self> {
        figment
            .extract()
            .map_err(|e| crate::error::CoreError::Config(e.to_string()))
    }
}

fn default_config_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.hnfeed/hnfeed.toml", home)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_source_yields_defaults() {
        let cfg = HnfeedConfig::from_figment(Figment::new().merge(Toml::string(""))).unwrap();
        assert_eq!(cfg.gateway.port, DEFAULT_PORT);
        assert_eq!(cfg.upstream.cache_ttl(), Duration::from_secs(900));
        assert_eq!(cfg.poller.interval(), Duration::from_secs(300));
        assert_eq!(cfg.poller.retry_interval(), Duration::from_secs(60));
        assert_eq!(cfg.poller.watch_count, 50);
        assert_eq!(cfg.poller.preview_len, 5);
        assert!(!cfg.poller.announce_initial_snapshot);
    }

    #[test]
    fn toml_overrides_single_fields() {
        let toml = r#"
            [upstream]
            base_url = "http://localhost:9000"
            cache_ttl_secs = 30

            [poller]
            interval_secs = 10
        "#;
        let cfg = HnfeedConfig::from_figment(Figment::new().merge(Toml::string(toml))).unwrap();
        assert_eq!(cfg.upstream.base_url, "http://localhost:9000");
        assert_eq!(cfg.upstream.cache_ttl_secs, 30);
        assert_eq!(cfg.upstream.top_ids_path, "/topstories.json");
        assert_eq!(cfg.poller.interval_secs, 10);
        assert_eq!(cfg.poller.retry_interval_secs, 60);
    }

    #[test]
    fn item_path_template_substitutes_id() {
        let cfg = UpstreamConfig::default();
        assert_eq!(cfg.item_path_for(8863), "/item/8863.json");
    }

    #[test]
    fn bad_type_is_config_error() {
        let toml = "[gateway]\nport = \"not a number\"";
        let err = HnfeedConfig::from_figment(Figment::new().merge(Toml::string(toml))).unwrap_err();
        assert_eq!(err.code(), "CONFIG_ERROR");
    }
}
