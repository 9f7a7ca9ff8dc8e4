//! chromiumoxide-backed `PageDriver`.

use anyhow::{Context, Result};
use chromiumoxide::cdp::browser_protocol::emulation::SetDeviceMetricsOverrideParams;
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::{Browser, Page};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

use super::page_load::wait_for_page_load;
use super::{PageDriver, StoredCookie};
use crate::browser_setup::{LaunchedBrowser, launch_browser};
use crate::config::CrawlConfig;
use crate::crawl_engine::page_timeout::with_page_timeout;
use crate::utils::{VIEWPORT_HEIGHT, VIEWPORT_WIDTH};

/// One browser process with a single page.
pub struct ChromiumDriver {
    browser: Browser,
    handler: JoinHandle<()>,
    page: Page,
    user_data_dir: PathBuf,
    page_load_timeout: Duration,
}

impl ChromiumDriver {
    /// Launch a fresh browser and open a blank page sized to the desktop viewport.
    pub async fn launch(config: &CrawlConfig) -> Result<Self> {
        let LaunchedBrowser {
            mut browser,
            handler,
            user_data_dir,
        } = launch_browser(
            config.headless(),
            config.executable_path().map(PathBuf::as_path),
        )
        .await?;

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                let _ = browser.close().await;
                handler.abort();
                let _ = std::fs::remove_dir_all(&user_data_dir);
                return Err(anyhow::Error::new(e).context("Failed to open browser page"));
            }
        };

        page.execute(
            SetDeviceMetricsOverrideParams::builder()
                .width(i64::from(VIEWPORT_WIDTH))
                .height(i64::from(VIEWPORT_HEIGHT))
                .device_scale_factor(1.0)
                .mobile(false)
                .build()
                .map_err(anyhow::Error::msg)?,
        )
        .await
        .context("Failed to set viewport")?;

        Ok(Self {
            browser,
            handler,
            page,
            user_data_dir,
            page_load_timeout: config.page_load_timeout(),
        })
    }
}

impl PageDriver for ChromiumDriver {
    async fn navigate(&mut self, url: &str) -> Result<()> {
        debug!(url, "Navigating");
        let page = &self.page;
        with_page_timeout(
            async {
                page.goto(url)
                    .await
                    .with_context(|| format!("Failed to navigate to {url}"))?;
                Ok(())
            },
            self.page_load_timeout,
            "Navigation",
        )
        .await?;
        wait_for_page_load(page, self.page_load_timeout).await
    }

    async fn evaluate(&mut self, script: &str) -> Result<Value> {
        let page = &self.page;
        let result = with_page_timeout(
            async { page.evaluate(script).await.context("Script evaluation failed") },
            self.page_load_timeout,
            "Evaluate",
        )
        .await?;
        Ok(result.value().cloned().unwrap_or(Value::Null))
    }

    async fn click(&mut self, selector: &str) -> Result<bool> {
        // DOM click, not a mouse event: the viewer overlays its own controls
        let selector_literal = serde_json::to_string(selector)?;
        let script = format!(
            "(() => {{ const el = document.querySelector({selector_literal}); if (el) {{ el.click(); }} return Boolean(el); }})()"
        );
        let clicked = self.evaluate(&script).await?;
        Ok(clicked.as_bool().unwrap_or(false))
    }

    async fn current_url(&mut self) -> Result<String> {
        match self.page.url().await {
            Ok(Some(url)) => Ok(url),
            Ok(None) => {
                trace!("Page URL is None (page not yet navigated)");
                Ok("about:blank".to_string())
            }
            Err(e) => Err(anyhow::Error::new(e).context("Failed to read page URL")),
        }
    }

    async fn reload(&mut self) -> Result<()> {
        let page = &self.page;
        with_page_timeout(
            async {
                page.reload().await.context("Failed to reload page")?;
                Ok(())
            },
            self.page_load_timeout,
            "Reload",
        )
        .await?;
        wait_for_page_load(page, self.page_load_timeout).await
    }

    async fn screenshot(&mut self, path: &Path) -> Result<()> {
        let params = ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Jpeg)
            .build();
        self.page
            .save_screenshot(params, path)
            .await
            .with_context(|| format!("Failed to save screenshot to {}", path.display()))?;
        Ok(())
    }

    async fn apply_cookies(&mut self, cookies: &[StoredCookie]) -> Result<()> {
        if cookies.is_empty() {
            return Ok(());
        }
        let params = cookies
            .iter()
            .map(StoredCookie::to_cookie_param)
            .collect::<Result<Vec<_>>>()?;
        self.page
            .set_cookies(params)
            .await
            .context("Failed to apply cookies")?;
        debug!(count = cookies.len(), "Applied cookies");
        Ok(())
    }

    async fn close(self) -> Result<()> {
        let Self {
            mut browser,
            handler,
            page,
            user_data_dir,
            ..
        } = self;

        if let Err(e) = page.close().await {
            trace!("Page close failed (browser may already be gone): {e}");
        }

        let mut errors = Vec::new();
        if let Err(e) = browser.close().await {
            warn!("Failed to close browser: {e}");
            errors.push(format!("close: {e}"));
        }
        // Wait for the process to exit so the profile directory is unlocked
        if let Err(e) = browser.wait().await {
            warn!("Failed to wait for browser exit: {e}");
            errors.push(format!("wait: {e}"));
        }
        handler.abort();

        if let Err(e) = std::fs::remove_dir_all(&user_data_dir) {
            warn!(
                "Failed to clean up browser profile {}: {e}",
                user_data_dir.display()
            );
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(anyhow::anyhow!("Browser shutdown incomplete: {}", errors.join("; ")))
        }
    }
}
