//! Extractor for ordinary video pages (av/BV ids and short links)

use async_trait::async_trait;
use tracing::info;

use crate::extractor::api;
use crate::extractor::inline::{self, InlinePayload, TITLE_SUFFIX};
use crate::extractor::models::VideoInfo;
use crate::extractor::select::select_streams;
use crate::extractor::traits::{ExtractContext, Extractor};
use crate::extractor::urls::PageKind;
use crate::utils::error::BiliDlError;

const FALLBACK_TITLE: &str = "bilibili_video";

pub struct OrdinaryExtractor;

#[async_trait]
impl Extractor for OrdinaryExtractor {
    fn id(&self) -> &'static str {
        "ordinary-video"
    }

    fn supports(&self, kind: &PageKind) -> bool {
        matches!(kind, PageKind::Video | PageKind::ShortLink)
    }

    async fn extract(&self, ctx: &ExtractContext<'_>) -> Result<VideoInfo, BiliDlError> {
        let title = inline::page_title(ctx.html, &[TITLE_SUFFIX], FALLBACK_TITLE);

        let payload = inline::find_embedded_payload(ctx.html).ok_or_else(|| {
            BiliDlError::ExtractionError("no embedded stream data found in page".into())
        })?;

        let play_data = match payload {
            InlinePayload::PlayInfo(data) => {
                info!("stream data found inline in the page");
                data
            }
            InlinePayload::InitialState(ids) => {
                // The page only carries content ids; one play-URL round
                // trip resolves them into streams.
                let cid = ids.cid.ok_or_else(|| {
                    BiliDlError::ExtractionError("page state carries no cid".into())
                })?;
                let api_url = if let Some(bvid) = ids.bvid.as_deref() {
                    ctx.api.play_url(cid, bvid)
                } else if let Some(aid) = ids.aid {
                    ctx.api.play_url_by_aid(cid, aid)
                } else {
                    return Err(BiliDlError::ExtractionError(
                        "page state carries neither aid nor bvid".into(),
                    ));
                };
                info!("resolving streams through the play-URL API");
                api::fetch_play_data(ctx.client, &api_url).await?
            }
        };

        let streams = select_streams(&play_data)?;
        Ok(VideoInfo {
            title,
            video_url: streams.video_url,
            audio_url: streams.audio_url,
            quality: streams.quality,
            resolution: streams.resolution,
        })
    }
}
