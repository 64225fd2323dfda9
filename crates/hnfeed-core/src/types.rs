use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Stable upstream identifier. Zero is the upstream's "no such item" sentinel.
pub type ItemId = u64;

/// Immutable snapshot of one ranked item, decoded from an upstream response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: ItemId,
    pub title: String,
    /// Empty for text-only posts.
    pub url: String,
    pub score: i64,
    pub author: String,
    /// Unix timestamp, seconds.
    pub created_at: i64,
    pub comment_count: i64,
}

/// Pushed to the "feed-updates" group whenever a poll discovers new ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationEvent {
    /// Number of newly discovered ids (may exceed `preview.len()`).
    pub count: usize,
    /// Up to the first few new items, in upstream rank order.
    pub preview: Vec<Item>,
    pub emitted_at: DateTime<Utc>,
}

impl NotificationEvent {
    /// Build an event for `new_ids`, previewing the first `preview_len` of
    /// `current` whose id is new. `current` keeps its upstream rank order.
    pub fn from_delta(
        current: &[Item],
        new_ids: &[ItemId],
        preview_len: usize,
        emitted_at: DateTime<Utc>,
    ) -> Self {
        let preview = current
            .iter()
            .filter(|item| new_ids.contains(&item.id))
            .take(preview_len)
            .cloned()
            .collect();
        Self {
            count: new_ids.len(),
            preview,
            emitted_at,
        }
    }
}

/// Per-connection identifier (random UUID, not persisted).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnId(pub String);

impl ConnId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ConnId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ConnId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: ItemId) -> Item {
        Item {
            id,
            title: format!("item {id}"),
            url: String::new(),
            score: 1,
            author: "pg".into(),
            created_at: 1_700_000_000,
            comment_count: 0,
        }
    }

    #[test]
    fn item_serializes_camel_case() {
        let json = serde_json::to_string(&item(7)).unwrap();
        assert!(json.contains(r#""createdAt":1700000000"#));
        assert!(json.contains(r#""commentCount":0"#));
        assert!(json.contains(r#""author":"pg""#));
    }

    #[test]
    fn preview_keeps_rank_order_and_caps_length() {
        let current: Vec<Item> = (1..=8).map(item).collect();
        let new_ids = vec![8, 2, 3, 4, 5, 6, 7];
        let ev = NotificationEvent::from_delta(&current, &new_ids, 5, Utc::now());

        assert_eq!(ev.count, 7);
        let ids: Vec<ItemId> = ev.preview.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![2, 3, 4, 5, 6]);
    }

    #[test]
    fn event_wire_shape() {
        let ev = NotificationEvent::from_delta(&[item(3)], &[3], 5, Utc::now());
        let v = serde_json::to_value(&ev).unwrap();
        assert_eq!(v["count"], 1);
        assert_eq!(v["preview"][0]["id"], 3);
        assert!(v.get("emittedAt").is_some());
    }
}
