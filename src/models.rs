use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Theme metadata as returned by the `theme_information` action.
///
/// Only the fields we render are typed; everything else the API sends is
/// kept in `extra` so a cached record round-trips without loss.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeRecord {
    #[serde(deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub slug: String,
    #[serde(deserialize_with = "lenient_string")]
    pub version: String,
    #[serde(deserialize_with = "lenient_string")]
    pub preview_url: String,
    /// Either the author's username or, with extended author info, their display name.
    #[serde(deserialize_with = "lenient_author")]
    pub author: String,
    #[serde(deserialize_with = "lenient_string")]
    pub screenshot_url: String,
    /// Average rating on a 0-100 scale.
    #[serde(deserialize_with = "lenient_int")]
    pub rating: i64,
    #[serde(deserialize_with = "lenient_int")]
    pub num_ratings: i64,
    #[serde(deserialize_with = "lenient_int")]
    pub downloaded: i64,
    #[serde(deserialize_with = "lenient_string")]
    pub last_updated: String,
    #[serde(deserialize_with = "lenient_string")]
    pub homepage: String,
    #[serde(deserialize_with = "lenient_string")]
    pub download_link: String,
    pub sections: Option<Sections>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Sections {
    pub description: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ThemeRecord {
    /// Decodes a record from the raw JSON kept in a cache entry.
    pub fn from_value(value: Value) -> serde_json::Result<Self> {
        serde_json::from_value(value)
    }

    pub fn description(&self) -> Option<&str> {
        self.sections
            .as_ref()
            .and_then(|s| s.description.as_deref())
            .filter(|d| !d.is_empty())
    }
}

/// A stored value together with the moment it was written and how long it stays valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Full store key, prefix included.
    pub key: String,
    /// Raw JSON as received from the remote source.
    pub value: Value,
    pub stored_at: DateTime<Utc>,
    pub ttl_seconds: u64,
}

impl CacheEntry {
    pub fn new(
        key: impl Into<String>,
        value: Value,
        stored_at: DateTime<Utc>,
        ttl_seconds: u64,
    ) -> Self {
        Self {
            key: key.into(),
            value,
            stored_at,
            ttl_seconds,
        }
    }

    /// `None` when the TTL is too large to represent, i.e. the entry never expires.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        let ttl = TimeDelta::try_seconds(i64::try_from(self.ttl_seconds).ok()?)?;
        self.stored_at.checked_add_signed(ttl)
    }

    /// Valid iff `now < stored_at + ttl_seconds`.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at() {
            Some(expires_at) => now < expires_at,
            None => true,
        }
    }
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    })
}

// The API sends counts as numbers on some endpoints and as numeric strings on others.
fn lenient_int<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or(0),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .or_else(|_| s.parse::<f64>().map(|f| f as i64))
                .unwrap_or(0)
        }
        _ => 0,
    })
}

fn lenient_author<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Object(map) => ["display_name", "user_nicename"]
            .iter()
            .find_map(|k| map.get(*k).and_then(Value::as_str))
            .unwrap_or_default()
            .to_string(),
        _ => String::new(),
    })
}
