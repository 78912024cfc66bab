//! Data structures for resolved video information and play-URL payloads

use serde::Deserialize;

use crate::utils::error::BiliDlError;

/// Resolved output of the extraction pipeline
#[derive(Debug, Clone, PartialEq)]
pub struct VideoInfo {
    /// Display title, sanitized for filesystem use
    pub title: String,
    /// Direct URL of the chosen video stream
    pub video_url: String,
    /// Direct URL of the chosen audio stream; `None` for muxed/legacy streams
    pub audio_url: Option<String>,
    /// Human-readable quality label ("1080P", "4K", ...)
    pub quality: String,
    /// "WxH" when the chosen stream carries dimensions
    pub resolution: String,
}

/// Envelope returned by the play-URL APIs and embedded in `window.__playinfo__`.
///
/// The x/player API and inline payloads carry the streams under `data`,
/// the pgc (bangumi) APIs under `result`.
#[derive(Debug, Deserialize)]
pub struct PlayUrlResponse {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
    pub data: Option<PlayData>,
    pub result: Option<PlayData>,
}

impl PlayUrlResponse {
    /// Unwrap the envelope, surfacing non-zero API codes as errors.
    pub fn into_play_data(self) -> Result<PlayData, BiliDlError> {
        if self.code != 0 {
            return Err(BiliDlError::ApiError {
                code: self.code,
                message: self.message,
            });
        }
        self.data
            .or(self.result)
            .ok_or_else(|| BiliDlError::ExtractionError("play-URL response carries no data".into()))
    }
}

/// Stream-bearing body of a play-URL response, in either of its two shapes
#[derive(Debug, Clone, Deserialize)]
pub struct PlayData {
    /// Separate video/audio track lists
    pub dash: Option<Dash>,
    /// Legacy single pre-muxed stream list
    pub durl: Option<Vec<DurlSegment>>,
    /// Quality tier of the served legacy stream
    pub quality: Option<i64>,
    #[serde(default)]
    pub accept_quality: Vec<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Dash {
    #[serde(default)]
    pub video: Vec<VideoStream>,
    #[serde(default)]
    pub audio: Vec<AudioStream>,
}

/// One video track of a dash manifest
#[derive(Debug, Clone, Deserialize)]
pub struct VideoStream {
    /// Quality tier code (80 = 1080P, ...)
    #[serde(default)]
    pub id: i64,
    #[serde(rename = "baseUrl", alias = "base_url")]
    pub base_url: String,
    #[serde(default)]
    pub bandwidth: i64,
    #[serde(default)]
    pub codecid: i64,
    pub width: Option<i64>,
    pub height: Option<i64>,
}

/// One audio track of a dash manifest
#[derive(Debug, Clone, Deserialize)]
pub struct AudioStream {
    #[serde(rename = "baseUrl", alias = "base_url")]
    pub base_url: String,
    #[serde(default)]
    pub bandwidth: i64,
    #[serde(default)]
    pub codecid: i64,
}

/// One entry of a legacy `durl` stream list
#[derive(Debug, Clone, Deserialize)]
pub struct DurlSegment {
    pub url: String,
    #[serde(default)]
    pub order: i64,
    #[serde(default)]
    pub size: i64,
}

/// Envelope of the season-info API
#[derive(Debug, Deserialize)]
pub struct SeasonResponse {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
    pub result: Option<SeasonInfo>,
}

impl SeasonResponse {
    pub fn into_season(self) -> Result<SeasonInfo, BiliDlError> {
        if self.code != 0 {
            return Err(BiliDlError::ApiError {
                code: self.code,
                message: self.message,
            });
        }
        self.result
            .ok_or_else(|| BiliDlError::ExtractionError("season response carries no result".into()))
    }
}

#[derive(Debug, Deserialize)]
pub struct SeasonInfo {
    pub title: Option<String>,
    #[serde(default)]
    pub episodes: Vec<EpisodeInfo>,
}

#[derive(Debug, Deserialize)]
pub struct EpisodeInfo {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub long_title: String,
}

impl EpisodeInfo {
    /// "title long_title" with surrounding whitespace trimmed; empty when both are.
    pub fn display_title(&self) -> String {
        format!("{} {}", self.title, self.long_title).trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_unwraps_data_or_result() {
        let ordinary: PlayUrlResponse =
            serde_json::from_str(r#"{"code":0,"data":{"durl":[{"url":"u"}]}}"#).unwrap();
        let data = ordinary.into_play_data().unwrap();
        assert_eq!(data.durl.unwrap()[0].url, "u");

        let bangumi: PlayUrlResponse =
            serde_json::from_str(r#"{"code":0,"result":{"durl":[{"url":"v"}]}}"#).unwrap();
        let data = bangumi.into_play_data().unwrap();
        assert_eq!(data.durl.unwrap()[0].url, "v");
    }

    #[test]
    fn envelope_surfaces_api_error_code() {
        let resp: PlayUrlResponse =
            serde_json::from_str(r#"{"code":-404,"message":"啥都木有"}"#).unwrap();
        match resp.into_play_data() {
            Err(BiliDlError::ApiError { code, message }) => {
                assert_eq!(code, -404);
                assert_eq!(message, "啥都木有");
            }
            other => panic!("expected ApiError, got {:?}", other),
        }
    }

    #[test]
    fn video_stream_accepts_both_url_spellings() {
        let camel: VideoStream =
            serde_json::from_str(r#"{"id":80,"baseUrl":"a","bandwidth":1}"#).unwrap();
        assert_eq!(camel.base_url, "a");

        let snake: VideoStream =
            serde_json::from_str(r#"{"id":80,"base_url":"b","bandwidth":1}"#).unwrap();
        assert_eq!(snake.base_url, "b");
    }

    #[test]
    fn episode_display_title_trims() {
        let ep = EpisodeInfo {
            id: 1,
            title: "第1话".into(),
            long_title: String::new(),
        };
        assert_eq!(ep.display_title(), "第1话");

        let empty = EpisodeInfo {
            id: 2,
            title: String::new(),
            long_title: String::new(),
        };
        assert_eq!(empty.display_title(), "");
    }
}
