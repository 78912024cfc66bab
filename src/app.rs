//! Top-level pipeline: fetch the page, resolve streams, download, mux

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::info;

use crate::downloader::{muxer, DownloadConfig, DownloadEngine, MuxOutcome};
use crate::extractor::{self, urls, ApiEndpoints, ExtractContext, PageClient, RetryPolicy};

/// Resolve and download one URL into `output_dir`.
pub async fn run(url: &str, output_dir: Option<PathBuf>, retry: usize) -> Result<()> {
    let kind = urls::classify(url)?;
    let clean_url = urls::strip_query(url);

    let output_dir = match output_dir {
        Some(dir) => dir,
        None => env::current_dir()?,
    };
    tokio::fs::create_dir_all(&output_dir)
        .await
        .with_context(|| format!("failed to create output directory {}", output_dir.display()))?;

    let retry_policy = RetryPolicy::with_attempts(retry);
    let client = PageClient::new(retry_policy.clone())?;
    let api = ApiEndpoints::default();

    info!("fetching page {}", clean_url);
    let html = client
        .get_text(clean_url)
        .await
        .context("failed to fetch the video page")?;

    let ctx = ExtractContext {
        client: &client,
        api: &api,
        url: clean_url,
        kind,
        html: &html,
    };
    let video = extractor::resolve(&ctx).await?;
    info!("title: {}", video.title);
    info!("quality: {} {}", video.quality, video.resolution);

    let engine = DownloadEngine::new(DownloadConfig {
        retry: retry_policy,
        ..Default::default()
    })?;

    let video_file = output_dir.join(format!("{}_video.mp4", video.title));
    engine
        .download(&video.video_url, clean_url, &video_file)
        .await
        .context("video download failed")?;

    let Some(audio_url) = &video.audio_url else {
        info!("video saved to {}", video_file.display());
        return Ok(());
    };

    let audio_file = output_dir.join(format!("{}_audio.m4a", video.title));
    engine
        .download(audio_url, clean_url, &audio_file)
        .await
        .context("audio download failed")?;

    let merged_file = output_dir.join(format!("{}.mp4", video.title));
    match muxer::merge_tracks(&video_file, &audio_file, &merged_file).await? {
        MuxOutcome::Merged => info!("merged file saved to {}", merged_file.display()),
        MuxOutcome::LeftSeparate => {
            info!("video file: {}", video_file.display());
            info!("audio file: {}", audio_file.display());
        }
    }

    Ok(())
}
