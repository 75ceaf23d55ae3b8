//! Runtime configuration, loaded from environment variables.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;

use crate::api::DEFAULT_API_URL;
use crate::cache::{DEFAULT_KEY_PREFIX, DEFAULT_TTL};
use crate::error::{Result, ThemeInfoError};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
const CACHE_FILE: &str = "themes.json";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Base URL of the themes info endpoint.
    pub api_url: String,
    /// How long a fetched theme stays valid.
    pub ttl: Duration,
    /// Per-request timeout for the themes API.
    pub timeout: Duration,
    /// Prepended to the slug to form the store key.
    pub key_prefix: String,
    /// Directory holding the on-disk cache file. `None` if no home directory could be found.
    pub cache_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            ttl: DEFAULT_TTL,
            timeout: DEFAULT_TIMEOUT,
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            cache_dir: default_cache_dir(),
        }
    }
}

impl Config {
    /// Loads configuration from the process environment (and `.env`, if present).
    ///
    /// Recognized variables: `THEME_INFO_API_URL`, `THEME_INFO_TTL_SECS`,
    /// `THEME_INFO_TIMEOUT_SECS`, `THEME_INFO_KEY_PREFIX`, `THEME_INFO_CACHE_DIR`.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Same as [`Config::from_env`] but reads variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        Ok(Self {
            api_url: get("THEME_INFO_API_URL").unwrap_or(defaults.api_url),
            ttl: match get("THEME_INFO_TTL_SECS") {
                Some(v) => Duration::from_secs(parse_secs("THEME_INFO_TTL_SECS", &v)?),
                None => defaults.ttl,
            },
            timeout: match get("THEME_INFO_TIMEOUT_SECS") {
                Some(v) => Duration::from_secs(parse_secs("THEME_INFO_TIMEOUT_SECS", &v)?),
                None => defaults.timeout,
            },
            key_prefix: lookup("THEME_INFO_KEY_PREFIX").unwrap_or(defaults.key_prefix),
            cache_dir: get("THEME_INFO_CACHE_DIR")
                .map(PathBuf::from)
                .or(defaults.cache_dir),
        })
    }

    /// Full path of the on-disk cache file.
    pub fn cache_file(&self) -> Option<PathBuf> {
        self.cache_dir.as_ref().map(|dir| dir.join(CACHE_FILE))
    }
}

fn parse_secs(name: &str, value: &str) -> Result<u64> {
    value.parse().map_err(|_| {
        ThemeInfoError::invalid(format!(
            "{name} must be a whole number of seconds, got {value:?}"
        ))
    })
}

fn default_cache_dir() -> Option<PathBuf> {
    ProjectDirs::from("org", "wordpress", "wp-theme-info")
        .map(|dirs| dirs.cache_dir().to_path_buf())
}
