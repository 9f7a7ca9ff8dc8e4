//! Credential artifact: cookies captured by a separate login flow.

use anyhow::{Context, Result};
use chromiumoxide::cdp::browser_protocol::network::{CookieParam, CookieSameSite, TimeSinceEpoch};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One browser cookie as exported by a DevTools-style cookie dump.
///
/// Extra keys (`size`, `session`, `priority`, ...) are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredCookie {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    /// Seconds since the epoch; `-1` marks a session cookie.
    #[serde(default)]
    pub expires: Option<f64>,
    #[serde(default)]
    pub http_only: bool,
    #[serde(default)]
    pub secure: bool,
    #[serde(default)]
    pub same_site: Option<String>,
}

impl StoredCookie {
    /// Convert to the CDP `Network.setCookies` parameter.
    pub fn to_cookie_param(&self) -> Result<CookieParam> {
        let mut builder = CookieParam::builder()
            .name(self.name.clone())
            .value(self.value.clone())
            .http_only(self.http_only)
            .secure(self.secure);

        if let Some(domain) = &self.domain {
            builder = builder.domain(domain.clone());
        }
        if let Some(path) = &self.path {
            builder = builder.path(path.clone());
        }
        if let Some(expires) = self.expires.filter(|e| *e > 0.0) {
            builder = builder.expires(TimeSinceEpoch::new(expires));
        }
        let same_site = match self.same_site.as_deref() {
            Some(s) if s.eq_ignore_ascii_case("strict") => Some(CookieSameSite::Strict),
            Some(s) if s.eq_ignore_ascii_case("lax") => Some(CookieSameSite::Lax),
            Some(s) if s.eq_ignore_ascii_case("none") => Some(CookieSameSite::None),
            _ => None,
        };
        if let Some(same_site) = same_site {
            builder = builder.same_site(same_site);
        }

        builder
            .build()
            .map_err(|e| anyhow::anyhow!("Invalid cookie '{}': {e}", self.name))
    }
}

/// Read the cookie artifact.
///
/// A missing or blank file means "no cookies", not an error: the crawl
/// still works for public albums.
pub async fn load_cookies(path: &Path) -> Result<Vec<StoredCookie>> {
    if !tokio::fs::try_exists(path).await.unwrap_or(false) {
        log::info!("No cookie file at {}, continuing without cookies", path.display());
        return Ok(Vec::new());
    }

    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read cookie file {}", path.display()))?;
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }

    serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse cookie file {}", path.display()))
}
