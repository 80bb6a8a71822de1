use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use tracing::{error, info, warn};

use super::{CatalogCard, TCGDEX_API_URL};
use crate::error::{Error, Result};
use crate::models::SyncId;

pub const USER_AGENT: &str = "TCG-Fetcher/1.0";

/// Bounded retry with a linearly growing pause between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub timeout: Duration,
    pub backoff_step: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            timeout: Duration::from_secs(10),
            backoff_step: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    /// Pause after the given failed attempt (1-based).
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.backoff_step * attempt
    }
}

/// Raw byte transport to the catalog.
#[async_trait]
pub trait CatalogTransport: Send + Sync {
    async fn get_bytes(&self, url: &str, timeout: Duration) -> Result<Vec<u8>>;
}

#[async_trait]
impl CatalogTransport for reqwest::Client {
    async fn get_bytes(&self, url: &str, timeout: Duration) -> Result<Vec<u8>> {
        let response = self
            .get(url)
            .timeout(timeout)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.bytes().await?.to_vec())
    }
}

pub struct CatalogFetcher<T = reqwest::Client> {
    transport: T,
    base_url: String,
    policy: RetryPolicy,
}

impl CatalogFetcher {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_transport(reqwest::Client::new(), base_url, RetryPolicy::default())
    }
}

impl Default for CatalogFetcher {
    fn default() -> Self {
        Self::new(TCGDEX_API_URL)
    }
}

impl<T: CatalogTransport> CatalogFetcher<T> {
    pub fn with_transport(transport: T, base_url: impl Into<String>, policy: RetryPolicy) -> Self {
        Self {
            transport,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            policy,
        }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    pub fn card_url(&self, set_id: &str, number: u32) -> String {
        format!("{}/cards/{set_id}-{number:03}", self.base_url)
    }

    /// Fetch one card, retrying per the policy. `None` once attempts run out.
    pub async fn fetch_card(&self, set_id: &str, number: u32) -> Option<CatalogCard> {
        let url = self.card_url(set_id, number);
        let attempts = self.policy.attempts.max(1);

        for attempt in 1..=attempts {
            info!(%url, attempt, attempts, "fetching catalog card");
            let outcome = match self.transport.get_bytes(&url, self.policy.timeout).await {
                Ok(body) => serde_json::from_slice::<CatalogCard>(&body).map_err(Error::from),
                Err(error) => Err(error),
            };

            match outcome {
                Ok(card) => return Some(card),
                Err(error) if attempt == attempts => {
                    error!(set_id, number, attempts, error = %error, "giving up on catalog card");
                }
                Err(error) => {
                    let delay = self.policy.delay_after(attempt);
                    warn!(
                        set_id,
                        number,
                        attempt,
                        retry_in_secs = delay.as_secs(),
                        error = %error,
                        "catalog fetch failed"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
        None
    }

    /// Download `{image_base}/high.webp` into `{media_dir}/cards/{sync_id}.webp`.
    pub async fn download_image(
        &self,
        image_base: &str,
        sync_id: SyncId,
        media_dir: &Path,
    ) -> Option<PathBuf> {
        match self.try_download(image_base, sync_id, media_dir).await {
            Ok(path) => {
                info!(sync_id, path = %path.display(), "card image downloaded");
                Some(path)
            }
            Err(error) => {
                error!(sync_id, error = %error, "card image download failed");
                None
            }
        }
    }

    async fn try_download(
        &self,
        image_base: &str,
        sync_id: SyncId,
        media_dir: &Path,
    ) -> Result<PathBuf> {
        let url = format!("{}/high.webp", image_base.trim_end_matches('/'));
        let bytes = self.transport.get_bytes(&url, self.policy.timeout).await?;

        let dir = media_dir.join("cards");
        tokio::fs::create_dir_all(&dir).await?;
        let path = dir.join(format!("{sync_id}.webp"));
        tokio::fs::write(&path, bytes).await?;
        Ok(path)
    }
}
