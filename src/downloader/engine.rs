//! Sequential stream download engine

use std::path::Path;
use std::time::Duration;

use futures::StreamExt;
use reqwest::{header, Client};
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::downloader::progress::ProgressPrinter;
use crate::extractor::fetch::{self, RetryPolicy};
use crate::utils::error::BiliDlError;

/// Download configuration
#[derive(Debug, Clone)]
pub struct DownloadConfig {
    /// Retry policy applied to the whole transfer
    pub retry: RetryPolicy,
    /// Connect/read timeout for stream requests
    pub timeout: Duration,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::default(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Streams resolved URLs to local files, one transfer at a time
pub struct DownloadEngine {
    client: Client,
    config: DownloadConfig,
}

impl DownloadEngine {
    pub fn new(config: DownloadConfig) -> Result<Self, BiliDlError> {
        let client = Client::builder()
            .connect_timeout(config.timeout)
            .read_timeout(config.timeout)
            .build()?;
        Ok(Self { client, config })
    }

    /// Download a stream URL into `output_path`.
    ///
    /// A failed attempt removes the partial file before the next one; the
    /// retry policy bounds re-attempts of the whole transfer. There is no
    /// resume, so every attempt starts from byte zero.
    pub async fn download(
        &self,
        url: &str,
        referer: &str,
        output_path: &Path,
    ) -> Result<(), BiliDlError> {
        let mut attempt = 0;
        loop {
            match self.download_once(url, referer, output_path).await {
                Ok(()) => return Ok(()),
                Err(e) => {
                    remove_partial(output_path).await;
                    if attempt < self.config.retry.attempts {
                        warn!(
                            "download of {} failed (attempt {}): {}",
                            output_path.display(),
                            attempt + 1,
                            e
                        );
                        sleep(self.config.retry.delay_for(attempt)).await;
                        attempt += 1;
                    } else {
                        return Err(e);
                    }
                }
            }
        }
    }

    async fn download_once(
        &self,
        url: &str,
        referer: &str,
        output_path: &Path,
    ) -> Result<(), BiliDlError> {
        info!("downloading {}", output_path.display());

        let response = self
            .client
            .get(url)
            .header(header::USER_AGENT, fetch::random_user_agent())
            .header(header::REFERER, referer)
            .header(header::ORIGIN, fetch::ORIGIN)
            .header(header::ACCEPT, "*/*")
            .header(header::RANGE, "bytes=0-")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(BiliDlError::DownloadError(format!(
                "stream server answered HTTP {}",
                response.status()
            )));
        }

        let total = response.content_length();
        let mut printer = ProgressPrinter::new(total);
        let mut file = File::create(output_path).await?;
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            printer.advance(chunk.len() as u64);
        }

        file.flush().await?;
        printer.finish();
        debug!("finished {}", output_path.display());
        Ok(())
    }
}

async fn remove_partial(path: &Path) {
    if fs::try_exists(path).await.unwrap_or(false) {
        if let Err(e) = fs::remove_file(path).await {
            warn!("failed to remove partial file {}: {}", path.display(), e);
        } else {
            debug!("removed partial file {}", path.display());
        }
    }
}
