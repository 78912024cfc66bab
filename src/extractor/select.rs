//! Best-stream selection and quality labeling

use tracing::info;

use crate::extractor::models::{AudioStream, PlayData, VideoStream};
use crate::utils::error::BiliDlError;

/// The stream pair picked out of a play-URL payload
#[derive(Debug, Clone)]
pub struct SelectedStreams {
    pub video_url: String,
    pub audio_url: Option<String>,
    pub quality: String,
    pub resolution: String,
}

/// Map a quality tier code to its display label.
pub fn quality_label(id: i64) -> String {
    let label = match id {
        16 => "240P",
        30 | 32 => "360P",
        48 | 74 => "720P",
        64 => "480P",
        66 | 116 => "720P60",
        70 => "1080P60",
        80 => "1080P",
        112 => "1080P+",
        120 => "4K",
        125 => "HDR",
        126 => "Dolby Vision",
        127 => "8K",
        128 => "4K HDR",
        129 => "8K HDR",
        other => return format!("unknown({})", other),
    };
    label.to_string()
}

/// Pick the best stream pair out of a dash or legacy payload.
///
/// Dash video tracks are ranked by quality tier, ties broken by bandwidth;
/// audio tracks by bandwidth, ties broken by codec id. A legacy `durl`
/// payload is pre-muxed, so its first entry is taken as-is and there is no
/// separate audio track.
pub fn select_streams(data: &PlayData) -> Result<SelectedStreams, BiliDlError> {
    if let Some(dash) = &data.dash {
        let video = best_video(&dash.video).ok_or_else(|| {
            BiliDlError::ExtractionError("dash manifest carries no video streams".into())
        })?;

        let quality = quality_label(video.id);
        let resolution = match (video.width, video.height) {
            (Some(w), Some(h)) => format!("{}x{}", w, h),
            _ => "unknown".to_string(),
        };
        info!("selected video stream: {} ({})", quality, resolution);

        let audio_url = best_audio(&dash.audio).map(|a| {
            info!("selected audio stream: {}Kbps", a.bandwidth / 1000);
            a.base_url.clone()
        });

        return Ok(SelectedStreams {
            video_url: video.base_url.clone(),
            audio_url,
            quality,
            resolution,
        });
    }

    if let Some(durl) = &data.durl {
        let first = durl.first().ok_or_else(|| {
            BiliDlError::ExtractionError("legacy stream list is empty".into())
        })?;
        let quality = match data.quality {
            Some(id) => quality_label(id),
            None => "unknown".to_string(),
        };
        info!("selected legacy stream: {}", quality);
        return Ok(SelectedStreams {
            video_url: first.url.clone(),
            audio_url: None,
            quality,
            resolution: "unknown".to_string(),
        });
    }

    Err(BiliDlError::ExtractionError(
        "payload carries neither dash nor durl streams".into(),
    ))
}

fn best_video(streams: &[VideoStream]) -> Option<&VideoStream> {
    streams.iter().max_by_key(|s| (s.id, s.bandwidth))
}

fn best_audio(streams: &[AudioStream]) -> Option<&AudioStream> {
    streams.iter().max_by_key(|s| (s.bandwidth, s.codecid))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::models::{Dash, DurlSegment};

    fn video(id: i64, bandwidth: i64, url: &str) -> VideoStream {
        VideoStream {
            id,
            base_url: url.to_string(),
            bandwidth,
            codecid: 7,
            width: None,
            height: None,
        }
    }

    fn audio(bandwidth: i64, codecid: i64, url: &str) -> AudioStream {
        AudioStream {
            base_url: url.to_string(),
            bandwidth,
            codecid,
        }
    }

    fn dash_payload(videos: Vec<VideoStream>, audios: Vec<AudioStream>) -> PlayData {
        PlayData {
            dash: Some(Dash {
                video: videos,
                audio: audios,
            }),
            durl: None,
            quality: None,
            accept_quality: vec![],
        }
    }

    #[test]
    fn highest_tier_wins_regardless_of_order() {
        for videos in [
            vec![video(64, 500, "a"), video(80, 700, "b"), video(32, 300, "c")],
            vec![video(32, 300, "c"), video(64, 500, "a"), video(80, 700, "b")],
            vec![video(80, 700, "b"), video(32, 300, "c"), video(64, 500, "a")],
        ] {
            let picked = select_streams(&dash_payload(videos, vec![])).unwrap();
            assert_eq!(picked.video_url, "b");
            assert_eq!(picked.quality, "1080P");
        }
    }

    #[test]
    fn bandwidth_breaks_tier_ties() {
        let videos = vec![video(80, 100, "low"), video(80, 900, "high")];
        let picked = select_streams(&dash_payload(videos, vec![])).unwrap();
        assert_eq!(picked.video_url, "high");
    }

    #[test]
    fn highest_bandwidth_audio_wins() {
        let audios = vec![audio(128_000, 0, "low"), audio(320_000, 0, "high")];
        let payload = dash_payload(vec![video(80, 100, "v")], audios);
        let picked = select_streams(&payload).unwrap();
        assert_eq!(picked.audio_url.as_deref(), Some("high"));
    }

    #[test]
    fn legacy_durl_takes_first_entry_and_own_quality() {
        let payload = PlayData {
            dash: None,
            durl: Some(vec![DurlSegment {
                url: "http://cdn/stream.flv".to_string(),
                order: 1,
                size: 1024,
            }]),
            quality: Some(80),
            accept_quality: vec![80, 64, 32],
        };
        let picked = select_streams(&payload).unwrap();
        assert_eq!(picked.video_url, "http://cdn/stream.flv");
        assert_eq!(picked.quality, "1080P");
        assert!(picked.audio_url.is_none());
    }

    #[test]
    fn resolution_comes_from_chosen_stream() {
        let mut v = video(120, 100, "v");
        v.width = Some(3840);
        v.height = Some(2160);
        let picked = select_streams(&dash_payload(vec![v], vec![])).unwrap();
        assert_eq!(picked.quality, "4K");
        assert_eq!(picked.resolution, "3840x2160");
    }

    #[test]
    fn unknown_tiers_render_with_their_code() {
        assert_eq!(quality_label(999), "unknown(999)");
        assert_eq!(quality_label(127), "8K");
        assert_eq!(quality_label(126), "Dolby Vision");
    }

    #[test]
    fn empty_payload_is_an_extraction_failure() {
        let payload = PlayData {
            dash: None,
            durl: None,
            quality: None,
            accept_quality: vec![],
        };
        assert!(select_streams(&payload).is_err());
    }
}
