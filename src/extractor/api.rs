//! bilibili web API endpoints and typed fetch helpers

use tracing::debug;

use crate::extractor::fetch::PageClient;
use crate::extractor::models::{PlayData, PlayUrlResponse, SeasonInfo, SeasonResponse};
use crate::utils::error::BiliDlError;

/// Highest quality tier the web API accepts (8K).
const QN_BEST: u32 = 127;
/// Request dash-format streams.
const FNVAL_DASH: u32 = 16;

/// Base URLs of the consumed APIs, overridable for tests
#[derive(Debug, Clone)]
pub struct ApiEndpoints {
    pub api_base: String,
}

impl Default for ApiEndpoints {
    fn default() -> Self {
        Self {
            api_base: "https://api.bilibili.com".to_string(),
        }
    }
}

impl ApiEndpoints {
    /// Player URL for ordinary content, keyed by content id and clip id,
    /// requesting the best available tier.
    pub fn play_url(&self, cid: i64, bvid: &str) -> String {
        format!(
            "{}/x/player/playurl?cid={}&bvid={}&qn={}&fnval={}&fourk=1",
            self.api_base, cid, bvid, QN_BEST, FNVAL_DASH
        )
    }

    /// Same request keyed by the numeric av id, for pages whose state
    /// carries no BV id.
    pub fn play_url_by_aid(&self, cid: i64, aid: i64) -> String {
        format!(
            "{}/x/player/playurl?cid={}&avid={}&qn={}&fnval={}&fourk=1",
            self.api_base, cid, aid, QN_BEST, FNVAL_DASH
        )
    }

    /// Season info (episode list) for bangumi content.
    pub fn season(&self, season_id: u64) -> String {
        format!("{}/pgc/view/web/season?season_id={}", self.api_base, season_id)
    }

    /// Player URL for bangumi content, keyed by episode id.
    pub fn bangumi_play_url(&self, ep_id: u64) -> String {
        format!(
            "{}/pgc/player/web/playurl?ep_id={}&qn={}&fnval={}&fourk=1",
            self.api_base, ep_id, QN_BEST, FNVAL_DASH
        )
    }
}

/// Fetch and unwrap a `{code, data|result}` play-URL envelope.
pub async fn fetch_play_data(client: &PageClient, url: &str) -> Result<PlayData, BiliDlError> {
    debug!("querying play-URL API: {}", url);
    let body = client.get_text(url).await?;
    let response: PlayUrlResponse = serde_json::from_str(&body)?;
    response.into_play_data()
}

/// Fetch and unwrap a season-info envelope.
pub async fn fetch_season(client: &PageClient, url: &str) -> Result<SeasonInfo, BiliDlError> {
    debug!("querying season API: {}", url);
    let body = client.get_text(url).await?;
    let response: SeasonResponse = serde_json::from_str(&body)?;
    response.into_season()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_request_best_tier() {
        let api = ApiEndpoints::default();
        assert_eq!(
            api.play_url(123, "BV1xx"),
            "https://api.bilibili.com/x/player/playurl?cid=123&bvid=BV1xx&qn=127&fnval=16&fourk=1"
        );
        assert_eq!(
            api.season(33802),
            "https://api.bilibili.com/pgc/view/web/season?season_id=33802"
        );
        assert_eq!(
            api.bangumi_play_url(330798),
            "https://api.bilibili.com/pgc/player/web/playurl?ep_id=330798&qn=127&fnval=16&fourk=1"
        );
    }
}
