//! Image download transport.

use anyhow::{Context, Result};
use futures::StreamExt;
use reqwest::Client;
use std::future::Future;
use std::path::Path;
use std::time::Duration;
use tokio::io::AsyncWriteExt;

use crate::utils::CHROME_USER_AGENT;

/// Fetches one image to a destination file.
pub trait ImageDownloader: Send + Sync {
    /// Download `url` to `dest`. On error `dest` must not exist afterwards.
    fn download(&self, url: &str, dest: &Path) -> impl Future<Output = Result<()>> + Send;
}

/// reqwest-backed downloader with browser-like headers.
#[derive(Debug, Clone)]
pub struct HttpDownloader {
    client: Client,
    timeout: Duration,
}

impl HttpDownloader {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(CHROME_USER_AGENT)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client, timeout })
    }
}

impl ImageDownloader for HttpDownloader {
    async fn download(&self, url: &str, dest: &Path) -> Result<()> {
        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .header("Accept", "image/avif,image/webp,image/apng,image/*,*/*;q=0.8")
            .send()
            .await
            .context("Failed to download image")?;

        if !response.status().is_success() {
            return Err(anyhow::anyhow!(
                "Image download failed with status: {}",
                response.status()
            ));
        }

        // Stream into a sibling .part file; only a complete download is
        // renamed onto the name the existence guard checks.
        let part = dest.with_extension("part");
        let mut file = tokio::fs::File::create(&part)
            .await
            .with_context(|| format!("Failed to create {}", part.display()))?;

        let mut stream = response.bytes_stream();
        let written: Result<()> = async {
            while let Some(chunk) = stream.next().await {
                let chunk = chunk.context("Failed to read image chunk")?;
                file.write_all(&chunk).await.context("Failed to write image chunk")?;
            }
            file.flush().await.context("Failed to flush image")?;
            Ok(())
        }
        .await;

        if let Err(e) = written {
            drop(file);
            let _ = tokio::fs::remove_file(&part).await;
            return Err(e);
        }
        drop(file);

        tokio::fs::rename(&part, dest)
            .await
            .with_context(|| format!("Failed to move image into {}", dest.display()))?;
        Ok(())
    }
}
