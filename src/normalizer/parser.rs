use feed_rs::model::Entry;
use tracing::debug;

use crate::app::{Result, StreamletError};
use crate::domain::article::parse_date;

/// Feed-level fields as the parser found them, before normalization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawFeed {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub items: Vec<RawItem>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Enclosure {
    pub url: String,
    pub mime_type: Option<String>,
}

/// Union of the per-entry fields RSS 2.0 and Atom can carry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawItem {
    pub guid: Option<String>,
    pub link: Option<String>,
    pub title: Option<String>,
    /// Date as written in the document.
    pub pub_date: Option<String>,
    /// Same date rendered as RFC 3339, when it could be parsed.
    pub iso_date: Option<String>,
    pub author: Option<String>,
    pub enclosure: Option<Enclosure>,
    /// `url` attribute of a `media:content` element.
    pub media_content_url: Option<String>,
    /// RSS `<description>` or Atom `<content>`, raw HTML.
    pub content: Option<String>,
    /// RSS `<content:encoded>`.
    pub content_encoded: Option<String>,
    /// Atom `<summary>`.
    pub summary: Option<String>,
    pub categories: Vec<String>,
}

/// Turns a fetched document into a [`RawFeed`].
pub trait FeedParser {
    fn parse(&self, body: &[u8]) -> Result<RawFeed>;
}

/// RSS via the `rss` crate, which exposes `content:encoded` and namespaced
/// extensions; everything else (Atom, RSS 1.0, JSON Feed) via `feed-rs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardParser;

impl FeedParser for StandardParser {
    fn parse(&self, body: &[u8]) -> Result<RawFeed> {
        match rss::Channel::read_from(body) {
            Ok(channel) => Ok(from_rss(&channel)),
            Err(rss_err) => {
                debug!("Not an RSS channel ({}), trying feed-rs", rss_err);
                let feed = feed_rs::parser::parse(body)
                    .map_err(|e| StreamletError::FeedParse(e.to_string()))?;
                Ok(from_feed_rs(feed))
            }
        }
    }
}

fn non_empty(s: &str) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

fn to_iso(date: &str) -> Option<String> {
    parse_date(date).map(|dt| dt.to_rfc3339())
}

fn from_rss(channel: &rss::Channel) -> RawFeed {
    RawFeed {
        title: non_empty(channel.title()),
        description: non_empty(channel.description()),
        image: channel.image().map(|i| i.url().to_string()),
        items: channel.items().iter().map(raw_item_from_rss).collect(),
    }
}

fn raw_item_from_rss(item: &rss::Item) -> RawItem {
    let dc = item.dublin_core_ext();
    let pub_date = item
        .pub_date()
        .map(String::from)
        .or_else(|| dc.and_then(|dc| dc.dates().first().cloned()));
    let iso_date = pub_date.as_deref().and_then(to_iso);

    let media_content_url = item
        .extensions()
        .get("media")
        .and_then(|media| media.get("content"))
        .and_then(|contents| contents.iter().find_map(|c| c.attrs().get("url").cloned()));

    RawItem {
        guid: item.guid().map(|g| g.value().to_string()),
        link: item.link().map(String::from),
        title: item.title().map(String::from),
        pub_date,
        iso_date,
        author: item
            .author()
            .map(String::from)
            .or_else(|| dc.and_then(|dc| dc.creators().first().cloned())),
        enclosure: item.enclosure().map(|e| Enclosure {
            url: e.url().to_string(),
            mime_type: non_empty(e.mime_type()),
        }),
        media_content_url,
        content: item.description().map(String::from),
        content_encoded: item.content().map(String::from),
        summary: None,
        categories: item.categories().iter().map(|c| c.name().to_string()).collect(),
    }
}

fn from_feed_rs(feed: feed_rs::model::Feed) -> RawFeed {
    RawFeed {
        title: feed.title.map(|t| t.content),
        description: feed.description.map(|d| d.content),
        image: feed.logo.or(feed.icon).map(|i| i.uri),
        items: feed.entries.into_iter().map(raw_item_from_entry).collect(),
    }
}

fn raw_item_from_entry(entry: Entry) -> RawItem {
    let link = entry
        .links
        .iter()
        .find(|l| l.rel.as_deref().map_or(true, |rel| rel == "alternate"))
        .or_else(|| entry.links.first())
        .map(|l| l.href.clone());

    let enclosure = entry
        .links
        .iter()
        .find(|l| l.rel.as_deref() == Some("enclosure"))
        .map(|l| Enclosure {
            url: l.href.clone(),
            mime_type: l.media_type.clone(),
        });

    let media_content_url = entry
        .media
        .iter()
        .flat_map(|m| m.content.iter())
        .find_map(|c| c.url.as_ref().map(|u| u.to_string()));

    let date = entry.published.or(entry.updated).map(|dt| dt.to_rfc3339());
    let summary = entry.summary.map(|s| s.content);

    RawItem {
        guid: Some(entry.id).filter(|id| !id.is_empty()),
        link,
        title: entry.title.map(|t| t.content),
        pub_date: date.clone(),
        iso_date: date,
        author: entry.authors.first().map(|a| a.name.clone()),
        enclosure,
        media_content_url,
        content: entry
            .content
            .and_then(|c| c.body)
            .or_else(|| summary.clone()),
        content_encoded: None,
        summary,
        categories: entry.categories.into_iter().map(|c| c.term).collect(),
    }
}
