//! Error types for theme lookups and rendering.

use thiserror::Error;

/// Everything that can go wrong between a slug and a rendered field.
///
/// None of these are fatal; callers decide what to print instead.
#[derive(Debug, Error)]
pub enum ThemeInfoError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Themes API returned status {status}")]
    Remote { status: u16 },

    #[error("Failed to decode themes API response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Theme not found: {slug}")]
    NotFound { slug: String },

    #[error("Cache storage error: {message}")]
    Storage {
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },
}

impl ThemeInfoError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub(crate) fn storage(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Storage {
            message: message.into(),
            source: Some(source),
        }
    }
}

pub type Result<T> = std::result::Result<T, ThemeInfoError>;
