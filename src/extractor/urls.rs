//! URL validation and classification
//!
//! Only a fixed set of link shapes is accepted: ordinary video pages,
//! b23.tv short links, and bangumi season/episode pages. Everything else
//! is rejected before any network traffic happens.

use lazy_static::lazy_static;
use regex::Regex;

use crate::utils::error::BiliDlError;

lazy_static! {
    static ref RE_VIDEO: Regex =
        Regex::new(r"^https?://(www\.)?bilibili\.com/video/[AaBb][Vv][0-9]").unwrap();
    static ref RE_SHORT: Regex = Regex::new(r"^https?://(www\.)?b23\.tv/[a-zA-Z0-9]+").unwrap();
    static ref RE_SEASON: Regex =
        Regex::new(r"^https?://(www\.)?bilibili\.com/bangumi/play/ss([0-9]+)").unwrap();
    static ref RE_EPISODE: Regex =
        Regex::new(r"^https?://(www\.)?bilibili\.com/bangumi/play/ep([0-9]+)").unwrap();
}

/// Classification of an accepted input URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageKind {
    /// Ordinary video page (av/BV id)
    Video,
    /// b23.tv short link, redirecting to an ordinary video page
    ShortLink,
    /// Bangumi season page, carrying the season id
    Season(u64),
    /// Bangumi episode page, carrying the episode id
    Episode(u64),
}

impl PageKind {
    pub fn is_bangumi(&self) -> bool {
        matches!(self, PageKind::Season(_) | PageKind::Episode(_))
    }
}

/// Validate and classify an input URL, rejecting unrecognized shapes.
pub fn classify(url: &str) -> Result<PageKind, BiliDlError> {
    if let Some(caps) = RE_EPISODE.captures(url) {
        let id = caps[2].parse().map_err(|_| BiliDlError::InvalidUrl(url.to_string()))?;
        return Ok(PageKind::Episode(id));
    }
    if let Some(caps) = RE_SEASON.captures(url) {
        let id = caps[2].parse().map_err(|_| BiliDlError::InvalidUrl(url.to_string()))?;
        return Ok(PageKind::Season(id));
    }
    if RE_VIDEO.is_match(url) {
        return Ok(PageKind::Video);
    }
    if RE_SHORT.is_match(url) {
        return Ok(PageKind::ShortLink);
    }
    Err(BiliDlError::InvalidUrl(url.to_string()))
}

/// Drop the query string; the page renders the same without it.
pub fn strip_query(url: &str) -> &str {
    url.split('?').next().unwrap_or(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_all_known_link_shapes() {
        assert_eq!(
            classify("https://www.bilibili.com/video/BV1xx411c7mD").unwrap(),
            PageKind::Video
        );
        assert_eq!(
            classify("http://bilibili.com/video/av170001").unwrap(),
            PageKind::Video
        );
        assert_eq!(classify("https://b23.tv/abc123").unwrap(), PageKind::ShortLink);
        assert_eq!(
            classify("https://www.bilibili.com/bangumi/play/ss33802").unwrap(),
            PageKind::Season(33802)
        );
        assert_eq!(
            classify("https://www.bilibili.com/bangumi/play/ep330798").unwrap(),
            PageKind::Episode(330798)
        );
    }

    #[test]
    fn rejects_everything_else() {
        for url in [
            "not a url",
            "https://example.com/video/BV1xx411c7mD",
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://www.bilibili.com/read/cv12345",
            "ftp://bilibili.com/video/BV1xx411c7mD",
            "",
        ] {
            assert!(classify(url).is_err(), "should reject {:?}", url);
        }
    }

    #[test]
    fn query_string_is_stripped() {
        assert_eq!(
            strip_query("https://www.bilibili.com/video/BV1xx?p=2&t=30"),
            "https://www.bilibili.com/video/BV1xx"
        );
        assert_eq!(strip_query("https://b23.tv/abc"), "https://b23.tv/abc");
    }

    #[test]
    fn bangumi_ids_survive_extra_path_segments() {
        assert_eq!(
            classify("https://www.bilibili.com/bangumi/play/ss33802/extra").unwrap(),
            PageKind::Season(33802)
        );
        assert_eq!(
            classify("http://bilibili.com/bangumi/play/ep1").unwrap(),
            PageKind::Episode(1)
        );
    }
}
