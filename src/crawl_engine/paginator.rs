//! "Next photo" navigation with stall detection.

use std::time::Duration;
use tracing::{debug, info, trace};

use super::crawl_types::FetchError;
use crate::config::CrawlConfig;
use crate::page_driver::PageDriver;
use crate::page_extractor::js_scripts::NEXT_PHOTO_SELECTOR;
use crate::utils::photo_id_from_url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginatePolicy {
    /// Clicks without an identity change before giving up.
    pub stall_limit: u32,
    pub step_delay: Duration,
    /// Hard-navigate to the new URL once the identity changed.
    pub full_reload: bool,
}

impl PaginatePolicy {
    #[must_use]
    pub fn from_config(config: &CrawlConfig) -> Self {
        Self {
            stall_limit: config.pagination_stall_limit().max(1),
            step_delay: config.step_delay(),
            full_reload: config.full_reload(),
        }
    }
}

/// Result of one pagination step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance {
    /// The viewer now shows a different photo.
    Moved { id: Option<String>, url: String },
    /// The "next" control no longer changes the photo.
    EndOfAlbum,
}

#[derive(Debug, Clone, Copy)]
pub struct Paginator {
    policy: PaginatePolicy,
}

impl Paginator {
    #[must_use]
    pub fn new(policy: PaginatePolicy) -> Self {
        Self { policy }
    }

    /// Click "next" until the page identity differs from the previous photo.
    ///
    /// Identity is the photo id when there is one, the full URL otherwise.
    pub async fn advance_from<D: PageDriver>(
        &self,
        page: &mut D,
        previous_id: Option<&str>,
        previous_url: &str,
    ) -> Result<Advance, FetchError> {
        for click in 1..=self.policy.stall_limit {
            page.click(NEXT_PHOTO_SELECTOR).await?;
            tokio::time::sleep(self.policy.step_delay).await;

            let url = page.current_url().await?;
            let id = photo_id_from_url(&url);
            let moved = match previous_id {
                Some(previous) => id.as_deref() != Some(previous),
                None => url != previous_url,
            };

            if moved {
                debug!(fbid = ?id, clicks = click, "Advanced to next photo");
                if self.policy.full_reload {
                    page.navigate(&url)
                        .await
                        .map_err(|e| FetchError::Navigation {
                            url: url.clone(),
                            message: format!("{e:#}"),
                        })?;
                }
                return Ok(Advance::Moved { id, url });
            }
            trace!(click, limit = self.policy.stall_limit, "Photo unchanged after next");
        }

        info!(
            fbid = ?previous_id,
            clicks = self.policy.stall_limit,
            "Next control stopped changing the photo, treating as end of album"
        );
        Ok(Advance::EndOfAlbum)
    }
}
