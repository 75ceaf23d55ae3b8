//! Read-through cache of theme information, keyed by slug.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::api::ThemeSource;
use crate::error::{Result, ThemeInfoError};
use crate::fields::FieldKey;
use crate::format::FieldFormatter;
use crate::models::ThemeRecord;
use crate::store::TtlStore;

pub const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60 * 24);
pub const DEFAULT_KEY_PREFIX: &str = "WPTIP_themeinfo_";
pub const DEFAULT_FIELD: &str = "name";

/// Source of "now" for expiry checks.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Returns cached theme records, fetching and storing them when missing or expired.
///
/// Build one per process and share it behind an `Arc`. Concurrent lookups
/// of the same slug share a single remote call.
pub struct ThemeInfoCache {
    store: Arc<dyn TtlStore>,
    source: Arc<dyn ThemeSource>,
    clock: Arc<dyn Clock>,
    formatter: FieldFormatter,
    key_prefix: String,
    ttl: Duration,
    in_flight: DashMap<String, Arc<Mutex<()>>>,
}

impl ThemeInfoCache {
    pub fn new(store: Arc<dyn TtlStore>, source: Arc<dyn ThemeSource>) -> Self {
        Self {
            store,
            source,
            clock: Arc::new(SystemClock),
            formatter: FieldFormatter,
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            ttl: DEFAULT_TTL,
            in_flight: DashMap::new(),
        }
    }

    /// Set how long fetched records stay valid.
    #[must_use]
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    #[must_use]
    pub fn key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }

    /// Set the clock entries are checked against. Stores still stamp
    /// `stored_at` with wall time, so this only moves the "now" side.
    #[must_use]
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Store key for a slug.
    pub fn key_for(&self, slug: &str) -> String {
        format!("{}{}", self.key_prefix, slug)
    }

    /// Returns the record for `slug`, from the store while it is valid,
    /// otherwise from the remote source. Failed fetches write nothing.
    pub async fn get(&self, slug: &str) -> Result<ThemeRecord> {
        let slug = normalize_slug(slug)?;
        let key = self.key_for(slug);

        if let Some(record) = self.lookup(&key).await {
            debug!("Cache hit for {}", key);
            return Ok(record);
        }

        let in_flight = InFlight::enter(&self.in_flight, &key);
        let _guard = in_flight.lock.lock().await;
        // Whoever held the lock before us may have already filled the entry.
        if let Some(record) = self.lookup(&key).await {
            debug!("Cache filled while waiting for {}", key);
            return Ok(record);
        }
        debug!("Cache miss for {}", key);
        self.fetch_and_store(slug, &key).await
    }

    /// Fetches `slug` from the remote source without touching the store.
    pub async fn fetch(&self, slug: &str) -> Result<ThemeRecord> {
        let slug = normalize_slug(slug)?;
        let value = self.source.fetch(slug).await?;
        Ok(ThemeRecord::from_value(value)?)
    }

    /// Fetches `slug` and overwrites whatever is stored for it, valid or not.
    pub async fn refresh(&self, slug: &str) -> Result<ThemeRecord> {
        let slug = normalize_slug(slug)?;
        let key = self.key_for(slug);
        self.fetch_and_store(slug, &key).await
    }

    /// Renders one field of a theme, `name` when no field is given.
    ///
    /// Unknown fields are rejected before any lookup happens.
    pub async fn render(&self, slug: &str, field: Option<&str>) -> Result<String> {
        let key: FieldKey = field.unwrap_or(DEFAULT_FIELD).parse()?;
        let record = self.get(slug).await?;
        Ok(self.formatter.render_key(&record, key))
    }

    /// Renders the theme details table for `slug`.
    pub async fn render_table(
        &self,
        slug: &str,
        title: Option<&str>,
        rows: &[(FieldKey, &str)],
    ) -> Result<String> {
        let record = self.get(slug).await?;
        Ok(self.formatter.render_table(&record, title, rows))
    }

    /// A valid, decodable entry for `key`. Store read failures count as misses.
    async fn lookup(&self, key: &str) -> Option<ThemeRecord> {
        let entry = match self.store.get(key).await {
            Ok(entry) => entry?,
            Err(e) => {
                warn!("Failed to read {} from the store: {}", key, e);
                return None;
            }
        };
        if !entry.is_valid_at(self.clock.now()) {
            debug!("Cache entry {} expired at {:?}", key, entry.expires_at());
            return None;
        }
        match ThemeRecord::from_value(entry.value) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("Discarding undecodable cache entry {}: {}", key, e);
                None
            }
        }
    }

    async fn fetch_and_store(&self, slug: &str, key: &str) -> Result<ThemeRecord> {
        info!("Fetching theme information for {}", slug);
        let value = self.source.fetch(slug).await?;
        let record = ThemeRecord::from_value(value.clone())?;

        // Store failures are logged, never returned.
        if let Err(e) = self.store.set(key, value, self.ttl.as_secs()).await {
            warn!("Failed to store {}: {}", key, e);
        } else {
            info!("Stored {} for {}s", key, self.ttl.as_secs());
        }
        Ok(record)
    }
}

/// Membership in the per-key lock map. Leaving, on return or when the
/// `get` future is dropped, removes the map entry once nobody else holds it.
struct InFlight<'a> {
    map: &'a DashMap<String, Arc<Mutex<()>>>,
    key: &'a str,
    lock: Arc<Mutex<()>>,
}

impl<'a> InFlight<'a> {
    fn enter(map: &'a DashMap<String, Arc<Mutex<()>>>, key: &'a str) -> Self {
        let lock = Arc::clone(&map.entry(key.to_string()).or_default());
        Self { map, key, lock }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        // Two references: the map's and ours.
        self.map.remove_if(self.key, |_, lock| {
            Arc::ptr_eq(lock, &self.lock) && Arc::strong_count(lock) == 2
        });
    }
}

fn normalize_slug(slug: &str) -> Result<&str> {
    let slug = slug.trim();
    if slug.is_empty() {
        return Err(ThemeInfoError::invalid("theme slug must not be empty"));
    }
    Ok(slug)
}

impl std::fmt::Debug for ThemeInfoCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThemeInfoCache")
            .field("key_prefix", &self.key_prefix)
            .field("ttl", &self.ttl)
            .field("in_flight", &self.in_flight.len())
            .finish()
    }
}
