//! The fixed set of theme fields that can be rendered, and how each one is typed.

use std::fmt;
use std::str::FromStr;

use crate::error::ThemeInfoError;
use crate::models::ThemeRecord;

/// How a field's value is sanitized on output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Text,
    Url,
    Int,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKey {
    Name,
    Slug,
    Version,
    PreviewUrl,
    Author,
    ScreenshotUrl,
    Rating,
    NumRatings,
    Downloaded,
    LastUpdated,
    Homepage,
    DownloadLink,
}

impl FieldKey {
    pub const ALL: [FieldKey; 12] = [
        FieldKey::Name,
        FieldKey::Slug,
        FieldKey::Version,
        FieldKey::PreviewUrl,
        FieldKey::Author,
        FieldKey::ScreenshotUrl,
        FieldKey::Rating,
        FieldKey::NumRatings,
        FieldKey::Downloaded,
        FieldKey::LastUpdated,
        FieldKey::Homepage,
        FieldKey::DownloadLink,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FieldKey::Name => "name",
            FieldKey::Slug => "slug",
            FieldKey::Version => "version",
            FieldKey::PreviewUrl => "preview_url",
            FieldKey::Author => "author",
            FieldKey::ScreenshotUrl => "screenshot_url",
            FieldKey::Rating => "rating",
            FieldKey::NumRatings => "num_ratings",
            FieldKey::Downloaded => "downloaded",
            FieldKey::LastUpdated => "last_updated",
            FieldKey::Homepage => "homepage",
            FieldKey::DownloadLink => "download_link",
        }
    }

    pub fn kind(self) -> Kind {
        match self {
            FieldKey::PreviewUrl
            | FieldKey::ScreenshotUrl
            | FieldKey::Homepage
            | FieldKey::DownloadLink => Kind::Url,
            FieldKey::Rating | FieldKey::NumRatings | FieldKey::Downloaded => Kind::Int,
            FieldKey::Name
            | FieldKey::Slug
            | FieldKey::Version
            | FieldKey::Author
            | FieldKey::LastUpdated => Kind::Text,
        }
    }

    /// The string behind a `Text` or `Url` field, `None` for `Int` fields.
    pub fn as_text(self, record: &ThemeRecord) -> Option<&str> {
        match self {
            FieldKey::Name => Some(&record.name),
            FieldKey::Slug => Some(&record.slug),
            FieldKey::Version => Some(&record.version),
            FieldKey::Author => Some(&record.author),
            FieldKey::LastUpdated => Some(&record.last_updated),
            FieldKey::PreviewUrl => Some(&record.preview_url),
            FieldKey::ScreenshotUrl => Some(&record.screenshot_url),
            FieldKey::Homepage => Some(&record.homepage),
            FieldKey::DownloadLink => Some(&record.download_link),
            FieldKey::Rating | FieldKey::NumRatings | FieldKey::Downloaded => None,
        }
    }

    /// The number behind an `Int` field, `None` otherwise.
    pub fn as_int(self, record: &ThemeRecord) -> Option<i64> {
        match self {
            FieldKey::Rating => Some(record.rating),
            FieldKey::NumRatings => Some(record.num_ratings),
            FieldKey::Downloaded => Some(record.downloaded),
            _ => None,
        }
    }
}

impl FromStr for FieldKey {
    type Err = ThemeInfoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| ThemeInfoError::UnknownField(s.to_string()))
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// True iff `name` is one of the known, renderable fields.
pub fn validate_field(name: &str) -> bool {
    name.parse::<FieldKey>().is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_field() {
        assert!(validate_field("name"));
        assert!(validate_field("download_link"));
        assert!(!validate_field("bogus"));
        assert!(!validate_field("ratings"));
        assert!(!validate_field("Name"));
        assert!(!validate_field(""));
    }

    #[test]
    fn test_names_round_trip() {
        for key in FieldKey::ALL {
            assert_eq!(key.as_str().parse::<FieldKey>().unwrap(), key);
        }
    }

    #[test]
    fn test_kinds() {
        assert_eq!(FieldKey::Homepage.kind(), Kind::Url);
        assert_eq!(FieldKey::ScreenshotUrl.kind(), Kind::Url);
        assert_eq!(FieldKey::Downloaded.kind(), Kind::Int);
        assert_eq!(FieldKey::NumRatings.kind(), Kind::Int);
        assert_eq!(FieldKey::LastUpdated.kind(), Kind::Text);
    }

    #[test]
    fn test_accessors_match_kind() {
        let record = ThemeRecord {
            downloaded: 7,
            homepage: "https://wordpress.org/themes/x/".into(),
            ..Default::default()
        };
        for key in FieldKey::ALL {
            let is_int = key.kind() == Kind::Int;
            assert_eq!(key.as_int(&record).is_some(), is_int, "{key}");
            assert_eq!(key.as_text(&record).is_some(), !is_int, "{key}");
        }
        assert_eq!(FieldKey::Downloaded.as_int(&record), Some(7));
        assert_eq!(
            FieldKey::Homepage.as_text(&record),
            Some("https://wordpress.org/themes/x/")
        );
    }
}
