use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A normalized feed entry. Recomputed on every fetch; `id` is only used to
/// correlate with read state and is not guaranteed unique across feeds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pub_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iso_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_snippet: Option<String>,
    #[serde(default)]
    pub full_content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<String>,
    #[serde(default)]
    pub feed_title: String,
    #[serde(default)]
    pub feed_url: String,
}

impl Article {
    /// Best-effort identity: the first non-empty of guid, link, title.
    ///
    /// Two feeds publishing an entry with the same title and no guid or link
    /// collide. Read state depends on this staying stable across fetches, so
    /// changing the rule orphans existing read marks.
    pub fn resolve_id(guid: Option<&str>, link: Option<&str>, title: Option<&str>) -> String {
        [guid, link, title]
            .into_iter()
            .flatten()
            .find(|s| !s.is_empty())
            .map(String::from)
            .unwrap_or_default()
    }

    /// Publish date used for timeline ordering: `pub_date`, then `iso_date`,
    /// then the epoch so undated entries sort oldest.
    pub fn effective_date(&self) -> DateTime<Utc> {
        self.pub_date
            .as_deref()
            .and_then(parse_date)
            .or_else(|| self.iso_date.as_deref().and_then(parse_date))
            .unwrap_or_default()
    }

    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or("(Untitled)")
    }
}

/// Parses the date shapes feeds emit in practice: RFC 2822 (RSS), RFC 3339
/// (Atom) and bare `YYYY-MM-DD`.
pub fn parse_date(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    DateTime::parse_from_rfc2822(s)
        .or_else(|_| DateTime::parse_from_rfc3339(s))
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|ndt| ndt.and_utc())
        })
}
