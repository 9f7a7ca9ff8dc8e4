//! Turns the current viewer page into a `(photoId, imageUrl, caption)` triple.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, trace, warn};

use super::js_scripts::{PHOTO_INFO_SCRIPT, READ_MORE_SCRIPT};
use crate::config::CrawlConfig;
use crate::crawl_engine::FetchError;
use crate::crawl_state::PhotoRecord;
use crate::page_driver::PageDriver;
use crate::utils::photo_id_from_url;

/// Bounds on how long extraction waits for the image to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractPolicy {
    /// Empty-image polls per page load.
    pub attempt_limit: u32,
    /// Reloads before giving up on the photo.
    pub reload_limit: u32,
    /// Pause between polls and after expanding the caption.
    pub step_delay: Duration,
}

impl ExtractPolicy {
    #[must_use]
    pub fn from_config(config: &CrawlConfig) -> Self {
        Self {
            attempt_limit: config.extract_attempt_limit().max(1),
            reload_limit: config.extract_reload_limit(),
            step_delay: config.step_delay(),
        }
    }
}

/// A fully extracted photo. `id` is `None` when the viewer URL carries no
/// identifier; such photos are downloaded but never recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedPhoto {
    pub id: Option<String>,
    pub source_url: String,
    pub image_url: String,
    pub caption: String,
}

impl ExtractedPhoto {
    #[must_use]
    pub fn to_record(&self) -> Option<PhotoRecord> {
        self.id.as_ref().map(|id| {
            PhotoRecord::new(
                id.clone(),
                self.source_url.clone(),
                self.image_url.clone(),
                self.caption.clone(),
            )
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PhotoInfo {
    #[serde(default)]
    image_url: Option<String>,
    #[serde(default)]
    caption: Option<String>,
}

#[derive(Debug, Clone, Copy)]
pub struct PhotoExtractor {
    policy: ExtractPolicy,
}

impl PhotoExtractor {
    #[must_use]
    pub fn new(policy: ExtractPolicy) -> Self {
        Self { policy }
    }

    #[must_use]
    pub fn policy(&self) -> ExtractPolicy {
        self.policy
    }

    /// Expand a collapsed caption. Idempotent, and a no-op when the
    /// disclosure control is absent.
    pub async fn expand_caption<D: PageDriver>(&self, page: &mut D) -> Result<bool, FetchError> {
        let present = page
            .evaluate(READ_MORE_SCRIPT)
            .await?
            .as_bool()
            .unwrap_or(false);
        if present {
            tokio::time::sleep(self.policy.step_delay).await;
        }
        Ok(present)
    }

    /// One read of image source and caption.
    ///
    /// `None` means the image has not rendered yet and the caller should retry.
    pub async fn read_photo_info<D: PageDriver>(
        &self,
        page: &mut D,
    ) -> Result<Option<(String, String)>, FetchError> {
        let value = page.evaluate(PHOTO_INFO_SCRIPT).await?;
        let info: PhotoInfo = serde_json::from_value(value).unwrap_or_default();
        match info.image_url.filter(|url| !url.is_empty()) {
            Some(image_url) => Ok(Some((image_url, info.caption.unwrap_or_default()))),
            None => Ok(None),
        }
    }

    /// Extract the photo the page currently shows.
    ///
    /// Polls up to `attempt_limit` times for a rendered image, then reloads
    /// the page and starts over, at most `reload_limit` times. A page that
    /// never renders an image fails with [`FetchError::ExtractionStalled`].
    pub async fn extract<D: PageDriver>(&self, page: &mut D) -> Result<ExtractedPhoto, FetchError> {
        let mut reloads = 0;

        loop {
            self.expand_caption(page).await?;

            for attempt in 1..=self.policy.attempt_limit {
                if let Some((image_url, caption)) = self.read_photo_info(page).await? {
                    let source_url = page.current_url().await?;
                    let id = photo_id_from_url(&source_url);
                    debug!(fbid = ?id, attempt, "Extracted photo");
                    return Ok(ExtractedPhoto {
                        id,
                        source_url,
                        image_url,
                        caption,
                    });
                }
                trace!(attempt, limit = self.policy.attempt_limit, "Image not rendered yet");
                tokio::time::sleep(self.policy.step_delay).await;
            }

            let url = page.current_url().await?;
            if reloads >= self.policy.reload_limit {
                return Err(FetchError::ExtractionStalled { url, reloads });
            }
            reloads += 1;
            warn!(%url, reloads, limit = self.policy.reload_limit, "Image never rendered, reloading page");
            page.reload().await.map_err(|e| FetchError::Navigation {
                url,
                message: format!("{e:#}"),
            })?;
        }
    }

    /// Save a screenshot unless one already exists at `path`.
    ///
    /// Returns whether a new screenshot was written.
    pub async fn capture_screenshot<D: PageDriver>(
        &self,
        page: &mut D,
        path: &Path,
    ) -> Result<bool, FetchError> {
        if tokio::fs::try_exists(path).await.unwrap_or(false) {
            trace!(path = %path.display(), "Screenshot already exists");
            return Ok(false);
        }
        page.screenshot(path).await.map_err(|e| FetchError::Persist {
            path: path.to_path_buf(),
            message: format!("{e:#}"),
        })?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page_extractor::js_scripts::{
        CAPTION_SELECTOR, PHOTO_IMG_SELECTOR, READ_MORE_SELECTOR,
    };

    #[test]
    fn scripts_use_the_published_selectors() {
        assert!(READ_MORE_SCRIPT.contains(READ_MORE_SELECTOR));
        assert!(PHOTO_INFO_SCRIPT.contains(PHOTO_IMG_SELECTOR));
        assert!(PHOTO_INFO_SCRIPT.contains(CAPTION_SELECTOR));
    }

    #[test]
    fn photo_info_tolerates_missing_fields() {
        let info: PhotoInfo = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(info.image_url.is_none());
        let info: PhotoInfo =
            serde_json::from_value(serde_json::json!({ "imageUrl": "http://x/1.jpg", "caption": null }))
                .unwrap();
        assert_eq!(info.image_url.as_deref(), Some("http://x/1.jpg"));
        assert!(info.caption.is_none());
    }

    #[test]
    fn record_requires_identifier() {
        let mut photo = ExtractedPhoto {
            id: Some("100".into()),
            source_url: "https://www.facebook.com/photo/?fbid=100".into(),
            image_url: "http://x/100.jpg".into(),
            caption: "a".into(),
        };
        assert_eq!(photo.to_record().map(|r| r.id), Some("100".to_string()));
        photo.id = None;
        assert!(photo.to_record().is_none());
    }
}
