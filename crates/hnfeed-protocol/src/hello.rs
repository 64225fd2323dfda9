use serde::{Deserialize, Serialize};

/// Payload of the `hello` event pushed once right after a connection opens.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hello {
    pub conn_id: String,
    pub server: ServerInfo,
    /// Groups the connection was auto-joined to.
    pub groups: Vec<String>,
    pub policy: ClientPolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ClientPolicy {
    pub max_message_size: usize,
}
