use once_cell::sync::Lazy;
use regex::Regex;

use crate::normalizer::parser::Enclosure;

static IMG_SRC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"<img[^>]+src="([^">]+)""#).expect("img src regex"));

/// Picks an article image, in order:
/// 1. an enclosure whose media type starts with `image`
/// 2. the `media:content` url
/// 3. the first `<img src="...">` in the raw content
pub fn extract_image(
    enclosure: Option<&Enclosure>,
    media_content_url: Option<&str>,
    content: Option<&str>,
) -> Option<String> {
    if let Some(enclosure) = enclosure {
        let is_image = enclosure
            .mime_type
            .as_deref()
            .is_some_and(|t| t.starts_with("image"));
        if is_image && !enclosure.url.is_empty() {
            return Some(enclosure.url.clone());
        }
    }

    if let Some(url) = media_content_url.filter(|u| !u.is_empty()) {
        return Some(url.to_string());
    }

    content.and_then(first_img_src)
}

pub fn first_img_src(html: &str) -> Option<String> {
    IMG_SRC
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}
