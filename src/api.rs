use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::StatusCode;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::error::{Result, ThemeInfoError};

pub const DEFAULT_API_URL: &str = "https://api.wordpress.org/themes/info/1.1/";

/// Anything that can produce the raw theme JSON for a slug.
#[async_trait]
pub trait ThemeSource: Send + Sync {
    async fn fetch(&self, slug: &str) -> Result<Value>;
}

/// Responsible for all communication with the wordpress.org themes API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    /// Builds a client against `base_url`; every request gives up after `timeout`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ThemeInfoError::invalid(format!("API url {base_url:?}: {e}")))?;

        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("wp-theme-info/", env!("CARGO_PKG_VERSION"))),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self { client, base_url })
    }

    /// The `theme_information` request URL for `slug`, query-encoded.
    pub fn theme_url(&self, slug: &str) -> Url {
        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .clear()
            .append_pair("action", "theme_information")
            .append_pair("request[slug]", slug);
        url
    }
}

#[async_trait]
impl ThemeSource for ApiClient {
    /// Fetches one theme's information. A single attempt, no retries.
    async fn fetch(&self, slug: &str) -> Result<Value> {
        let url = self.theme_url(slug);
        debug!("GET {}", url);
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if status != StatusCode::OK {
            warn!("Themes API returned {} for {}", status, slug);
            return Err(ThemeInfoError::Remote {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        let info: Value = serde_json::from_str(&body)?;

        // Unknown slugs come back as 200 with `false`, `null` or `{"error": ...}`.
        match &info {
            Value::Object(map) if !map.contains_key("error") => Ok(info),
            _ => Err(ThemeInfoError::NotFound {
                slug: slug.to_string(),
            }),
        }
    }
}
