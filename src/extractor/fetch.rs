//! Page fetching with browser-like headers and bounded retries

use std::time::Duration;

use rand::Rng;
use reqwest::header;
use reqwest::Client;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::utils::error::BiliDlError;

pub const REFERER: &str = "https://www.bilibili.com/";
pub const ORIGIN: &str = "https://www.bilibili.com";

const PAGE_TIMEOUT: Duration = Duration::from_secs(15);

const USER_AGENTS: [&str; 3] = [
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/14.1.1 Safari/605.1.15",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:89.0) Gecko/20100101 Firefox/89.0",
];

/// Pick a browser User-Agent at random, a fresh one per request.
pub fn random_user_agent() -> &'static str {
    USER_AGENTS[rand::thread_rng().gen_range(0..USER_AGENTS.len())]
}

/// Bounded exponential backoff applied to fetches and downloads
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Re-attempts after the first try
    pub attempts: usize,
    /// Delay before the first retry; doubles per attempt
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    pub fn with_attempts(attempts: usize) -> Self {
        Self {
            attempts,
            ..Self::default()
        }
    }

    /// Backoff before retry number `attempt` (0-based), capped at 30 s.
    pub fn delay_for(&self, attempt: usize) -> Duration {
        let factor = 1u32 << attempt.min(5) as u32;
        self.base_delay.saturating_mul(factor).min(Duration::from_secs(30))
    }
}

/// HTTP client for page and API fetches
///
/// Sends a randomized browser User-Agent, a bilibili referer, and browser
/// Accept headers; gzip bodies are decompressed transparently. Redirects are
/// followed, which resolves b23.tv short links along the way.
pub struct PageClient {
    client: Client,
    retry: RetryPolicy,
}

impl PageClient {
    pub fn new(retry: RetryPolicy) -> Result<Self, BiliDlError> {
        let client = Client::builder()
            .timeout(PAGE_TIMEOUT)
            .cookie_store(true)
            .build()?;
        Ok(Self { client, retry })
    }

    /// Fetch a URL as text, retrying transient failures per the policy.
    pub async fn get_text(&self, url: &str) -> Result<String, BiliDlError> {
        let mut attempt = 0;
        loop {
            match self.get_text_once(url).await {
                Ok(text) => return Ok(text),
                Err(e) if attempt < self.retry.attempts => {
                    warn!(
                        "fetch of {} failed (attempt {}): {}",
                        url,
                        attempt + 1,
                        e
                    );
                    sleep(self.retry.delay_for(attempt)).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn get_text_once(&self, url: &str) -> Result<String, BiliDlError> {
        debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .header(header::USER_AGENT, random_user_agent())
            .header(header::REFERER, REFERER)
            .header(
                header::ACCEPT,
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
            )
            .header(
                header::ACCEPT_LANGUAGE,
                "zh-CN,zh;q=0.8,zh-TW;q=0.7,zh-HK;q=0.5,en-US;q=0.3,en;q=0.2",
            )
            .send()
            .await?
            .error_for_status()?;
        Ok(response.text().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_agent_pool_only_yields_known_entries() {
        for _ in 0..20 {
            assert!(USER_AGENTS.contains(&random_user_agent()));
        }
    }

    #[test]
    fn backoff_doubles_and_caps() {
        let policy = RetryPolicy {
            attempts: 10,
            base_delay: Duration::from_secs(1),
        };
        assert_eq!(policy.delay_for(0), Duration::from_secs(1));
        assert_eq!(policy.delay_for(1), Duration::from_secs(2));
        assert_eq!(policy.delay_for(2), Duration::from_secs(4));
        assert_eq!(policy.delay_for(20), Duration::from_secs(30));
    }
}
