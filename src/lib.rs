//! Fetch, cache and render theme information from the wordpress.org themes API.
//!
//! - `api` - HTTP client for the `theme_information` endpoint
//! - `store` - TTL key-value stores (in-memory and on-disk)
//! - `cache` - read-through cache with per-slug request coalescing
//! - `fields` / `format` - the known field set and its HTML rendering
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use wp_theme_info::{ApiClient, MemoryStore, ThemeInfoCache, DEFAULT_API_URL};
//!
//! # async fn run() -> wp_theme_info::Result<()> {
//! let client = ApiClient::new(DEFAULT_API_URL, Duration::from_secs(10))?;
//! let cache = ThemeInfoCache::new(Arc::new(MemoryStore::new()), Arc::new(client));
//! let html = cache.render("twentyseventeen", Some("downloaded")).await?;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod fields;
pub mod format;
pub mod models;
pub mod store;

pub use api::{ApiClient, DEFAULT_API_URL, ThemeSource};
pub use cache::{Clock, SystemClock, ThemeInfoCache};
pub use config::Config;
pub use error::{Result, ThemeInfoError};
pub use fields::{FieldKey, Kind, validate_field};
pub use format::{DEFAULT_TABLE_ROWS, FieldFormatter, default_link_text};
pub use models::{CacheEntry, ThemeRecord};
pub use store::{FileStore, MemoryStore, TtlStore};
