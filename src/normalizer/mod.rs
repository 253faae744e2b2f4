pub mod image;
pub mod parser;

use std::sync::Arc;

use html_escape::decode_html_entities;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::app::Result;
use crate::domain::{Article, ParsedFeed};

pub use image::extract_image;
pub use parser::{Enclosure, FeedParser, RawFeed, RawItem, StandardParser};

static RE_TAGS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)</?[^>]+>").expect("tag regex"));
static RE_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace regex"));

#[derive(Clone)]
pub struct Normalizer {
    parser: Arc<dyn FeedParser + Send + Sync>,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Normalizer {
    pub fn new() -> Self {
        Self::with_parser(Arc::new(StandardParser))
    }

    pub fn with_parser(parser: Arc<dyn FeedParser + Send + Sync>) -> Self {
        Self { parser }
    }

    pub fn normalize(&self, feed_url: &str, body: &[u8]) -> Result<ParsedFeed> {
        let raw = self.parser.parse(body)?;
        Ok(self.normalize_raw(feed_url, raw))
    }

    pub fn normalize_raw(&self, feed_url: &str, raw: RawFeed) -> ParsedFeed {
        let feed_title = raw
            .title
            .map(|t| decode_html_entities(&t).to_string())
            .unwrap_or_default();
        let description = raw
            .description
            .map(|d| decode_html_entities(&d).to_string())
            .unwrap_or_default();

        let items = raw
            .items
            .into_iter()
            .map(|item| normalize_item(item, &feed_title, feed_url))
            .collect();

        ParsedFeed {
            title: feed_title,
            description,
            image: raw.image,
            items,
        }
    }
}

fn normalize_item(item: RawItem, feed_title: &str, feed_url: &str) -> Article {
    let title = item.title.map(|t| decode_html_entities(&t).to_string());
    let id = Article::resolve_id(item.guid.as_deref(), item.link.as_deref(), title.as_deref());

    let image_url = extract_image(
        item.enclosure.as_ref(),
        item.media_content_url.as_deref(),
        item.content.as_deref(),
    );

    let full_content = first_non_empty(&[
        item.content_encoded.as_deref(),
        item.content.as_deref(),
        item.summary.as_deref(),
    ])
    .unwrap_or_default()
    .to_string();

    let content_snippet = item
        .content
        .as_deref()
        .or(item.summary.as_deref())
        .map(to_snippet)
        .filter(|s| !s.is_empty());

    Article {
        id,
        guid: item.guid,
        title,
        link: item.link,
        pub_date: item.pub_date,
        iso_date: item.iso_date,
        author: item.author,
        content: item.content,
        content_snippet,
        full_content,
        image_url,
        categories: item.categories,
        feed_title: feed_title.to_string(),
        feed_url: feed_url.to_string(),
    }
}

fn first_non_empty<'a>(candidates: &[Option<&'a str>]) -> Option<&'a str> {
    candidates
        .iter()
        .flatten()
        .copied()
        .find(|s| !s.trim().is_empty())
}

/// Plain-text rendering of an HTML fragment: tags stripped, entities
/// decoded, whitespace collapsed.
pub fn to_snippet(html: &str) -> String {
    let stripped = RE_TAGS.replace_all(html, " ");
    let decoded = decode_html_entities(&stripped);
    RE_WS.replace_all(&decoded, " ").trim().to_string()
}
