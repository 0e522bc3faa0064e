// src/specs/wiki.rs
//! Wikipedia page summary: `<base>/<title>` returns JSON whose `thumbnail.source`
//! is a small lead image for the page.

use serde::Deserialize;

use crate::core::net::PageSource;
use crate::error::{Error, Result};

#[derive(Debug, Deserialize)]
struct Summary {
    #[serde(default)]
    thumbnail: Option<Thumbnail>,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    source: String,
}

/// Summary endpoint for a page title; the title is percent-encoded as is.
pub fn summary_url(base: &str, title: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), urlencoding::encode(title.trim()))
}

/// Thumbnail URL of a summary document. `None` when the page has no image.
pub fn parse_summary(json: &str) -> Result<Option<String>> {
    let summary: Summary =
        serde_json::from_str(json).map_err(|e| Error::invalid("page summary", e.to_string()))?;
    Ok(summary.thumbnail.map(|t| t.source).filter(|s| !s.trim().is_empty()))
}

/// Image URL for the first title that has one. Lookup failures count as "no image".
pub fn find_image(source: &mut dyn PageSource, base: &str, titles: &[&str]) -> Option<String> {
    for title in titles.iter().filter(|t| !t.trim().is_empty()) {
        let url = summary_url(base, title);
        match source.get(&url).and_then(|doc| parse_summary(&doc)) {
            Ok(Some(img)) => return Some(img),
            Ok(None) => logd!("{}: page has no image", title),
            Err(e) => logd!("{}: {}", title, e),
        }
    }
    None
}
