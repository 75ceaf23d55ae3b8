//! HTML rendering of theme fields.
//!
//! Every piece of text that ends up in markup goes through [`esc_html`], and
//! every URL through [`esc_url`], so a hostile API response can't inject markup.

use std::fmt::Write;

use url::Url;

use crate::error::Result;
use crate::fields::{FieldKey, Kind};
use crate::models::ThemeRecord;

/// Schemes a rendered link may point at. Anything else renders as an empty href.
const ALLOWED_SCHEMES: &[&str] = &["http", "https", "ftp", "ftps", "mailto"];

/// Rows shown by [`FieldFormatter::render_table`] when the caller doesn't pick its own.
pub const DEFAULT_TABLE_ROWS: &[(FieldKey, &str)] = &[
    (FieldKey::Name, "Theme Name:"),
    (FieldKey::Version, "Current Version:"),
    (FieldKey::LastUpdated, "Last Updated:"),
    (FieldKey::Downloaded, "Times Downloaded:"),
    (FieldKey::PreviewUrl, "Demo Url:"),
    (FieldKey::Homepage, "Download Link:"),
];

/// Renders fields of a [`ThemeRecord`] as small HTML fragments.
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldFormatter;

impl FieldFormatter {
    /// Renders a single field by name. Unknown names fail with `UnknownField`.
    pub fn render(&self, record: &ThemeRecord, field: &str) -> Result<String> {
        let key: FieldKey = field.parse()?;
        Ok(self.render_key(record, key))
    }

    /// Renders a known field, sanitized according to its [`Kind`].
    pub fn render_key(&self, record: &ThemeRecord, key: FieldKey) -> String {
        match key.kind() {
            Kind::Url => {
                let url = key.as_text(record).unwrap_or_default();
                let mut html = format!(r#"<a href="{}" class="wptip-info""#, esc_url(url));
                if let Some(description) = record.description() {
                    let _ = write!(html, r#" title="{}""#, esc_attr(description));
                }
                let _ = write!(html, ">{}</a>", esc_html(&record.name));
                html
            }
            Kind::Int => {
                let n = non_negative(key.as_int(record).unwrap_or_default());
                format!(r#"<span class="wptip-info">{n}</span>"#)
            }
            Kind::Text => {
                let text = key.as_text(record).unwrap_or_default();
                format!(r#"<span class="wptip-info">{}</span>"#, esc_html(text))
            }
        }
    }

    /// Renders the theme details table: one row per `(field, label)`, links
    /// labelled by [`default_link_text`].
    pub fn render_table(
        &self,
        record: &ThemeRecord,
        title: Option<&str>,
        rows: &[(FieldKey, &str)],
    ) -> String {
        self.render_table_with(record, title, rows, default_link_text)
    }

    /// Same as [`FieldFormatter::render_table`], with `link_text` choosing the
    /// visible text of each `Url` row. The result is escaped.
    pub fn render_table_with<F>(
        &self,
        record: &ThemeRecord,
        title: Option<&str>,
        rows: &[(FieldKey, &str)],
        link_text: F,
    ) -> String
    where
        F: Fn(&ThemeRecord, FieldKey) -> String,
    {
        let mut html = String::new();
        if let Some(title) = title.filter(|t| !t.is_empty()) {
            let _ = write!(html, "<h3 class=\"wptip-widget-title\">{}</h3>", esc_html(title));
        }
        html.push_str(
            r#"<table class="wptip-theme-details-widget table"><tbody class="table-hover">"#,
        );

        for &(key, label) in rows {
            let cell = match key.kind() {
                Kind::Url => format!(
                    r#"<a href="{}" class="wptip-info btn">{}</a>"#,
                    esc_url(key.as_text(record).unwrap_or_default()),
                    esc_html(&link_text(record, key))
                ),
                Kind::Int => non_negative(key.as_int(record).unwrap_or_default()).to_string(),
                Kind::Text => esc_html(key.as_text(record).unwrap_or_default()),
            };
            let _ = write!(
                html,
                r#"<tr class="wptip-widget-row"><td class="wptip-widget-col-header">{}</td><td class="wptip-widget-col-info">{}</td></tr>"#,
                esc_html(label),
                cell
            );
        }

        html.push_str("</tbody></table>");
        html
    }
}

/// "{name} demo" for the preview, "Download {name}" for the homepage, the
/// bare theme name for any other link.
pub fn default_link_text(record: &ThemeRecord, key: FieldKey) -> String {
    match key {
        FieldKey::PreviewUrl => format!("{} demo", record.name),
        FieldKey::Homepage => format!("Download {}", record.name),
        _ => record.name.clone(),
    }
}

fn non_negative(n: i64) -> u64 {
    n.max(0).unsigned_abs()
}

/// Escapes text for use inside an HTML element.
pub fn esc_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escapes text for use inside a double- or single-quoted attribute.
pub fn esc_attr(s: &str) -> String {
    esc_html(s)
}

/// Validates and normalizes a URL, then escapes it for an `href` attribute.
///
/// Protocol-relative URLs (`//host/path`, as the API sends screenshots) are
/// taken as https. Relative, malformed, or non-web URLs (`javascript:` and
/// friends) become an empty string.
pub fn esc_url(raw: &str) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        return String::new();
    }
    let parsed = match raw.strip_prefix("//") {
        Some(rest) => Url::parse(&format!("https://{rest}")),
        None => Url::parse(raw),
    };
    match parsed {
        Ok(url) if ALLOWED_SCHEMES.contains(&url.scheme()) => esc_attr(url.as_str()),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ThemeInfoError;
    use crate::models::Sections;

    fn record() -> ThemeRecord {
        ThemeRecord {
            name: "Tom & Jerry <b>".into(),
            slug: "tom-jerry".into(),
            version: "1.0".into(),
            downloaded: 1234,
            homepage: "http://example.com/?a=1&b=2".into(),
            preview_url: "https://wp-themes.com/tom-jerry/".into(),
            sections: Some(Sections {
                description: Some("A \"cat\" theme".into()),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let err = FieldFormatter.render(&record(), "bogus").unwrap_err();
        assert!(matches!(err, ThemeInfoError::UnknownField(f) if f == "bogus"));
    }

    #[test]
    fn test_negative_int_coerces_to_zero() {
        let record = ThemeRecord {
            downloaded: -5,
            ..Default::default()
        };
        let html = FieldFormatter.render(&record, "downloaded").unwrap();
        assert_eq!(html, r#"<span class="wptip-info">0</span>"#);
    }

    #[test]
    fn test_int_field() {
        let html = FieldFormatter.render(&record(), "downloaded").unwrap();
        assert_eq!(html, r#"<span class="wptip-info">1234</span>"#);
    }

    #[test]
    fn test_url_field_renders_anchor() {
        let html = FieldFormatter.render(&record(), "homepage").unwrap();
        assert_eq!(
            html,
            r#"<a href="http://example.com/?a=1&amp;b=2" class="wptip-info" title="A &quot;cat&quot; theme">Tom &amp; Jerry &lt;b&gt;</a>"#
        );
    }

    #[test]
    fn test_url_field_without_description_has_no_title() {
        let record = ThemeRecord {
            name: "Plain".into(),
            download_link: "https://downloads.wordpress.org/theme/plain.1.0.zip".into(),
            ..Default::default()
        };
        let html = FieldFormatter.render(&record, "download_link").unwrap();
        assert_eq!(
            html,
            r#"<a href="https://downloads.wordpress.org/theme/plain.1.0.zip" class="wptip-info">Plain</a>"#
        );
    }

    #[test]
    fn test_text_field_is_escaped() {
        let html = FieldFormatter.render(&record(), "name").unwrap();
        assert_eq!(html, r#"<span class="wptip-info">Tom &amp; Jerry &lt;b&gt;</span>"#);
    }

    #[test]
    fn test_esc_url_rejects_scripts_and_relative() {
        assert_eq!(esc_url("javascript:alert(1)"), "");
        assert_eq!(esc_url("/relative/path"), "");
        assert_eq!(esc_url("   "), "");
        assert_eq!(esc_url(" https://example.com "), "https://example.com/");
        assert_eq!(
            esc_url("//ts.w.org/wp-content/themes/x/screenshot.png"),
            "https://ts.w.org/wp-content/themes/x/screenshot.png"
        );
    }

    #[test]
    fn test_esc_url_encodes_quotes() {
        assert_eq!(
            esc_url(r#"https://example.com/"onmouseover=x"#),
            "https://example.com/%22onmouseover=x"
        );
    }

    #[test]
    fn test_table_uses_link_text() {
        let html = FieldFormatter.render_table(&record(), Some("Details"), DEFAULT_TABLE_ROWS);

        assert!(html.starts_with(
            r#"<h3 class="wptip-widget-title">Details</h3><table"#
        ));
        assert!(html.contains(r#"<td class="wptip-widget-col-header">Theme Name:</td>"#));
        assert!(html.contains(
            r#"<a href="https://wp-themes.com/tom-jerry/" class="wptip-info btn">Tom &amp; Jerry &lt;b&gt; demo</a>"#
        ));
        assert!(html.contains(">Download Tom &amp; Jerry &lt;b&gt;</a>"));
        assert!(html.contains(r#"<td class="wptip-widget-col-info">1234</td>"#));
        assert_eq!(html.matches("<tr ").count(), DEFAULT_TABLE_ROWS.len());
        assert!(html.ends_with("</tbody></table>"));
    }

    #[test]
    fn test_table_without_title() {
        let html = FieldFormatter.render_table(&record(), None, &[(FieldKey::Version, "V")]);
        assert!(html.starts_with("<table"));
        assert!(html.contains(r#"<td class="wptip-widget-col-info">1.0</td>"#));
    }

    #[test]
    fn test_table_link_text_override() {
        let html = FieldFormatter.render_table_with(
            &record(),
            None,
            &[(FieldKey::PreviewUrl, "Demo:"), (FieldKey::Version, "Version:")],
            |record, key| format!("See {} <{}>", record.slug, key),
        );

        assert!(html.contains(
            r#"<a href="https://wp-themes.com/tom-jerry/" class="wptip-info btn">See tom-jerry &lt;preview_url&gt;</a>"#
        ));
        assert!(html.contains(r#"<td class="wptip-widget-col-info">1.0</td>"#));
    }

    #[test]
    fn test_default_link_text() {
        let record = ThemeRecord {
            name: "Astra".into(),
            ..Default::default()
        };
        assert_eq!(default_link_text(&record, FieldKey::PreviewUrl), "Astra demo");
        assert_eq!(default_link_text(&record, FieldKey::Homepage), "Download Astra");
        assert_eq!(default_link_text(&record, FieldKey::DownloadLink), "Astra");
    }
}
