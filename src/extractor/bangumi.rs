//! Extractor for episodic (bangumi) pages
//!
//! Resolution degrades through a fixed chain: play-URL API keyed by the
//! episode id from the URL, season API resolving a bare season id to its
//! first episode, and finally ids dug out of the page's embedded state.
//! Only exhaustion of the whole chain is fatal.

use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use tracing::{info, warn};

use crate::extractor::api;
use crate::extractor::inline::{self, BANGUMI_TITLE_SUFFIX, TITLE_SUFFIX};
use crate::extractor::models::VideoInfo;
use crate::extractor::ordinary::OrdinaryExtractor;
use crate::extractor::select::select_streams;
use crate::extractor::traits::{ExtractContext, Extractor};
use crate::extractor::urls::PageKind;
use crate::utils::error::BiliDlError;

const FALLBACK_TITLE: &str = "bilibili_bangumi";

// Bangumi pages only embed `__INITIAL_STATE__`; the trailing variants cover
// the same template drift as the ordinary chain.
const STATE_PATTERNS: [&str; 5] = [
    r"<script>window\.__INITIAL_STATE__=(.+?);</script>",
    r"<script>window\.__INITIAL_STATE__=(.+?);\(function",
    r"<script>window\.__INITIAL_STATE__=(.+?);window\.__INITIAL_STATE__",
    r"<script>window\.__INITIAL_STATE__=(.+?)</script>",
    r"__INITIAL_STATE__=(.+?);</script>",
];

lazy_static! {
    static ref STATE_RES: Vec<Regex> = STATE_PATTERNS
        .iter()
        .map(|p| Regex::new(p).unwrap())
        .collect();
}

/// Slice of a bangumi page's embedded state the resolver cares about
#[derive(Debug, Default, Deserialize)]
pub struct BangumiState {
    #[serde(rename = "mediaInfo")]
    pub media_info: Option<MediaInfo>,
    #[serde(rename = "h1Title")]
    pub h1_title: Option<String>,
    #[serde(rename = "epInfo")]
    pub ep_info: Option<EpState>,
    #[serde(rename = "epId")]
    pub ep_id: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MediaInfo {
    pub title: Option<String>,
    pub season_id: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct EpState {
    pub id: Option<u64>,
    #[serde(rename = "titleFormat")]
    pub title_format: Option<String>,
    #[serde(rename = "longTitle")]
    pub long_title: Option<String>,
}

impl BangumiState {
    /// Series title, preferring the media info over the page heading.
    fn series_title(&self) -> Option<String> {
        self.media_info
            .as_ref()
            .and_then(|m| m.title.clone())
            .or_else(|| self.h1_title.clone())
    }

    /// "titleFormat longTitle" episode fragment, empty parts skipped.
    fn episode_fragment(&self) -> Option<String> {
        let ep = self.ep_info.as_ref()?;
        let (format, long) = (ep.title_format.as_deref()?, ep.long_title.as_deref()?);
        let fragment = format!("{} {}", format, long).trim().to_string();
        (!fragment.is_empty()).then_some(fragment)
    }

    fn episode_id(&self) -> Option<u64> {
        self.ep_info.as_ref().and_then(|e| e.id).or(self.ep_id)
    }

    fn season_id(&self) -> Option<u64> {
        self.media_info.as_ref().and_then(|m| m.season_id)
    }
}

/// Find and parse the page's `__INITIAL_STATE__` object.
pub fn parse_state(html: &str) -> Option<BangumiState> {
    for re in STATE_RES.iter() {
        let Some(caps) = re.captures(html) else {
            continue;
        };
        if let Ok(state) = serde_json::from_str::<BangumiState>(&caps[1]) {
            return Some(state);
        }
    }
    None
}

pub struct BangumiExtractor;

#[async_trait]
impl Extractor for BangumiExtractor {
    fn id(&self) -> &'static str {
        "bangumi"
    }

    fn supports(&self, kind: &PageKind) -> bool {
        kind.is_bangumi()
    }

    async fn extract(&self, ctx: &ExtractContext<'_>) -> Result<VideoInfo, BiliDlError> {
        match ctx.kind {
            PageKind::Episode(ep_id) => match from_episode(ctx, ep_id, None).await {
                Ok(info) => return Ok(info),
                Err(e) => warn!("episode API resolution failed ({}), trying page state", e),
            },
            PageKind::Season(season_id) => match from_season(ctx, season_id).await {
                Ok(info) => return Ok(info),
                Err(e) => warn!("season API resolution failed ({}), trying page state", e),
            },
            _ => {}
        }
        from_page_state(ctx).await
    }
}

/// Resolve streams for a known episode id.
async fn from_episode(
    ctx: &ExtractContext<'_>,
    ep_id: u64,
    title_override: Option<String>,
) -> Result<VideoInfo, BiliDlError> {
    let title = title_override.unwrap_or_else(|| {
        inline::page_title(ctx.html, &[BANGUMI_TITLE_SUFFIX, TITLE_SUFFIX], FALLBACK_TITLE)
    });

    let play_data = api::fetch_play_data(ctx.client, &ctx.api.bangumi_play_url(ep_id)).await?;
    let streams = select_streams(&play_data)?;
    Ok(VideoInfo {
        title,
        video_url: streams.video_url,
        audio_url: streams.audio_url,
        quality: streams.quality,
        resolution: streams.resolution,
    })
}

/// Resolve a bare season id to its first episode, folding the episode's
/// own titling into the series title.
async fn from_season(ctx: &ExtractContext<'_>, season_id: u64) -> Result<VideoInfo, BiliDlError> {
    let season = api::fetch_season(ctx.client, &ctx.api.season(season_id)).await?;
    let mut title = season.title.unwrap_or_else(|| FALLBACK_TITLE.to_string());

    let first = season.episodes.first().ok_or_else(|| {
        BiliDlError::ExtractionError("season carries no episodes".into())
    })?;
    info!("season {} resolved to first episode {}", season_id, first.id);

    let fragment = first.display_title();
    if !fragment.is_empty() {
        title = format!("{}_{}", title, fragment);
    }

    from_episode(ctx, first.id as u64, Some(inline::sanitize_title(&title))).await
}

/// Last link of the chain: dig ids out of the page's embedded state.
async fn from_page_state(ctx: &ExtractContext<'_>) -> Result<VideoInfo, BiliDlError> {
    let Some(state) = parse_state(ctx.html) else {
        // No bangumi state at all; some episodic pages embed an ordinary
        // playinfo payload instead.
        warn!("no bangumi state in page, trying ordinary extraction");
        return OrdinaryExtractor.extract(ctx).await;
    };

    let mut title = state.series_title().unwrap_or_else(|| {
        inline::page_title(ctx.html, &[BANGUMI_TITLE_SUFFIX, TITLE_SUFFIX], FALLBACK_TITLE)
    });
    if let Some(fragment) = state.episode_fragment() {
        title = format!("{}_{}", title, fragment);
    }
    let title = inline::sanitize_title(&title);

    if let Some(ep_id) = state.episode_id() {
        info!("page state carries episode id {}", ep_id);
        return from_episode(ctx, ep_id, Some(title)).await;
    }
    if let Some(season_id) = state.season_id() {
        info!("page state carries season id {}", season_id);
        let season = api::fetch_season(ctx.client, &ctx.api.season(season_id)).await?;
        let first = season.episodes.first().ok_or_else(|| {
            BiliDlError::ExtractionError("season carries no episodes".into())
        })?;
        let fragment = first.display_title();
        let title = if fragment.is_empty() {
            title
        } else {
            inline::sanitize_title(&format!("{}_{}", title, fragment))
        };
        return from_episode(ctx, first.id as u64, Some(title)).await;
    }

    Err(BiliDlError::ExtractionError(
        "neither episode nor season id could be determined".into(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_parses_ids_and_titles() {
        let html = r#"<script>window.__INITIAL_STATE__={"mediaInfo":{"title":"Some Show","season_id":33802},"epInfo":{"id":330798,"titleFormat":"第1话","longTitle":"Beginnings"}};</script>"#;
        let state = parse_state(html).unwrap();
        assert_eq!(state.series_title().as_deref(), Some("Some Show"));
        assert_eq!(state.episode_id(), Some(330798));
        assert_eq!(state.season_id(), Some(33802));
        assert_eq!(state.episode_fragment().as_deref(), Some("第1话 Beginnings"));
    }

    #[test]
    fn h1_title_backs_up_media_info() {
        let html = r#"<script>window.__INITIAL_STATE__={"h1Title":"Heading","epId":99};</script>"#;
        let state = parse_state(html).unwrap();
        assert_eq!(state.series_title().as_deref(), Some("Heading"));
        assert_eq!(state.episode_id(), Some(99));
        assert_eq!(state.season_id(), None);
    }

    #[test]
    fn bare_assignment_pattern_still_matches() {
        let html = r#"<script crossorigin>__INITIAL_STATE__={"epId":7};</script>"#;
        let state = parse_state(html).unwrap();
        assert_eq!(state.episode_id(), Some(7));
    }

    #[test]
    fn pages_without_state_yield_nothing() {
        assert!(parse_state("<html><body>nothing here</body></html>").is_none());
        assert!(parse_state("<script>window.__INITIAL_STATE__=broken;</script>").is_none());
    }
}
