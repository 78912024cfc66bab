//! Embedded-JSON payload extraction
//!
//! bilibili pages embed their stream data in a `<script>` tag, either as a
//! `window.__playinfo__` object carrying the streams directly, or as a
//! `window.__INITIAL_STATE__` object carrying only content ids that have to
//! be resolved through the play-URL API. The exact markup has shifted across
//! page-template revisions, so extraction tries an ordered list of patterns
//! and stops at the first one that parses into a recognized shape.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::extractor::models::PlayData;

/// Site suffix appended to ordinary video page titles
pub const TITLE_SUFFIX: &str = " - 哔哩哔哩";
/// Site suffix appended to bangumi page titles
pub const BANGUMI_TITLE_SUFFIX: &str = " - 哔哩哔哩番剧";

// Page-template variants, oldest first. Order matters: the narrow
// `__playinfo__` forms must win over the catch-all `__INITIAL_STATE__` ones.
const PLAYINFO_PATTERNS: [&str; 8] = [
    r"<script>window\.__playinfo__=([^<]+)</script>",
    r"window\.__playinfo__=([^<]+?)</script>",
    r"<script>window\.__INITIAL_STATE__=(.+?);</script>",
    r#"<script id="[^"]*">window\.__playinfo__=([^<]+)</script>"#,
    r"<script>window\.__INITIAL_STATE__=(.+?);\(function",
    r"<script>window\.__INITIAL_STATE__=(.+?);window\.__INITIAL_STATE__",
    r"<script>window\.__INITIAL_STATE__=(.+?)</script>",
    r"<script>window\.__playinfo__=(.+?)</script>",
];

lazy_static! {
    static ref PLAYINFO_RES: Vec<Regex> = PLAYINFO_PATTERNS
        .iter()
        .map(|p| Regex::new(p).unwrap())
        .collect();
    static ref RE_TITLE: Regex = Regex::new(r"<title[^>]*>([^<]+)</title>").unwrap();
}

/// Recognized shapes of an embedded payload
#[derive(Debug)]
pub enum InlinePayload {
    /// `__playinfo__` object with the streams inline
    PlayInfo(PlayData),
    /// `__INITIAL_STATE__` object with content ids only; needs a play-URL
    /// API round trip before streams are known
    InitialState(VideoIds),
}

/// Content ids carried by an initial-state payload
#[derive(Debug, Clone, Deserialize)]
pub struct VideoIds {
    pub cid: Option<i64>,
    pub aid: Option<i64>,
    pub bvid: Option<String>,
}

impl VideoIds {
    /// A play-URL request needs the clip id plus at least one content id.
    pub fn is_complete(&self) -> bool {
        self.cid.is_some() && (self.aid.is_some() || self.bvid.is_some())
    }
}

/// Walk the pattern chain and return the first recognizable payload.
pub fn find_embedded_payload(html: &str) -> Option<InlinePayload> {
    for (i, re) in PLAYINFO_RES.iter().enumerate() {
        let Some(caps) = re.captures(html) else {
            continue;
        };
        let Ok(value) = serde_json::from_str::<Value>(&caps[1]) else {
            continue;
        };
        if let Some(payload) = sniff(value) {
            debug!("pattern {} matched embedded payload", i);
            return Some(payload);
        }
    }
    None
}

/// Decide once which schema a parsed blob matches.
fn sniff(value: Value) -> Option<InlinePayload> {
    if let Some(data) = value.get("data") {
        if data.get("dash").is_some() || data.get("durl").is_some() {
            let play_data: PlayData = serde_json::from_value(data.clone()).ok()?;
            return Some(InlinePayload::PlayInfo(play_data));
        }
    }
    if let Some(video_data) = value.get("videoData") {
        let ids: VideoIds = serde_json::from_value(video_data.clone()).ok()?;
        return Some(InlinePayload::InitialState(ids));
    }
    None
}

/// Raw `<title>` text, if the page has one.
pub fn extract_title(html: &str) -> Option<String> {
    RE_TITLE
        .captures(html)
        .map(|caps| caps[1].trim().to_string())
}

/// Page title with site suffixes stripped and path separators sanitized;
/// `fallback` when the page has no title tag.
pub fn page_title(html: &str, suffixes: &[&str], fallback: &str) -> String {
    let mut title = match extract_title(html) {
        Some(t) => t,
        None => return fallback.to_string(),
    };
    for suffix in suffixes {
        title = title.replace(suffix, "");
    }
    sanitize_title(&title)
}

/// Replace path-separator characters so the title is safe as a filename.
pub fn sanitize_title(title: &str) -> String {
    title.replace(['/', '\\'], "_")
}
