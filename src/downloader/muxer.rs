//! Track combining via an external ffmpeg
//!
//! Muxing is delegated to ffmpeg as an external collaborator. Without a
//! usable ffmpeg the step degrades instead of failing: both part files stay
//! on disk and the caller reports the two paths.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command as AsyncCommand;
use tracing::{debug, info, warn};

use crate::utils::error::BiliDlError;

/// Outcome of a merge attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MuxOutcome {
    /// Tracks were combined into the output file; part files are gone
    Merged,
    /// ffmpeg unavailable or unsuccessful; both part files remain
    LeftSeparate,
}

/// Find ffmpeg with priority: system PATH, then common install locations.
pub fn find_ffmpeg() -> Option<PathBuf> {
    if let Ok(path) = which::which("ffmpeg") {
        return Some(path);
    }

    let common_paths = [
        "/opt/homebrew/bin/ffmpeg",
        "/usr/local/bin/ffmpeg",
        "/usr/bin/ffmpeg",
    ];
    for path_str in common_paths {
        let path = PathBuf::from(path_str);
        if path.exists() {
            return Some(path);
        }
    }

    None
}

/// Combine a video and an audio track into `output` with a stream copy.
pub async fn merge_tracks(
    video: &Path,
    audio: &Path,
    output: &Path,
) -> Result<MuxOutcome, BiliDlError> {
    let Some(ffmpeg) = find_ffmpeg() else {
        warn!("ffmpeg not found; leaving video and audio tracks separate");
        return Ok(MuxOutcome::LeftSeparate);
    };
    debug!("muxing with {}", ffmpeg.display());

    let status = AsyncCommand::new(&ffmpeg)
        .arg("-y")
        .arg("-i")
        .arg(video)
        .arg("-i")
        .arg(audio)
        .args(["-c", "copy"])
        .arg(output)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await?;

    if !status.success() {
        warn!(
            "ffmpeg exited with {:?}; leaving tracks separate",
            status.code()
        );
        // Drop whatever half-written output ffmpeg left behind.
        if tokio::fs::try_exists(output).await.unwrap_or(false) {
            let _ = tokio::fs::remove_file(output).await;
        }
        return Ok(MuxOutcome::LeftSeparate);
    }

    tokio::fs::remove_file(video).await?;
    tokio::fs::remove_file(audio).await?;
    info!("merged tracks into {}", output.display());
    Ok(MuxOutcome::Merged)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_ffmpeg() {
        let result = find_ffmpeg();
        println!("ffmpeg found at: {:?}", result);
        // Don't assert - ffmpeg might not be installed in CI
    }
}
