//! Document-ready wait after navigation.

use anyhow::Result;
use chromiumoxide::Page;
use std::time::{Duration, Instant};

const READY_STATE_SCRIPT: &str = r#"
    (function() {
        return {
            readyState: document.readyState,
            bodyExists: document.body !== null
        };
    })()
"#;

/// Poll `document.readyState` until the page reports `complete`.
///
/// `goto` resolves on the HTTP response; the photo viewer keeps rendering
/// long after that. Gives up quietly after `max_wait` and lets the
/// extractor's own retry loop deal with a half-rendered page.
pub async fn wait_for_page_load(page: &Page, max_wait: Duration) -> Result<()> {
    let start = Instant::now();
    let poll_interval = Duration::from_millis(100);

    loop {
        if start.elapsed() >= max_wait {
            log::warn!(
                "Timeout waiting for page load after {}s, proceeding anyway",
                max_wait.as_secs()
            );
            break;
        }

        match page.evaluate(READY_STATE_SCRIPT).await {
            Ok(result) => {
                if let Ok(value) = result.into_value::<serde_json::Value>() {
                    let complete = value.get("readyState").and_then(|v| v.as_str()) == Some("complete");
                    let body_exists = value
                        .get("bodyExists")
                        .and_then(serde_json::Value::as_bool)
                        .unwrap_or(false);
                    if complete && body_exists {
                        log::debug!("Page ready after {:.2}s", start.elapsed().as_secs_f64());
                        break;
                    }
                }
            }
            Err(e) => log::debug!("Failed to check readyState: {e}, retrying"),
        }

        tokio::time::sleep(poll_interval).await;
    }

    Ok(())
}
