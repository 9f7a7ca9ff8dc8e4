//! Type-safe builder for `CrawlConfig` using the typestate pattern
//!
//! The only required field is the target URL; `build()` exists only once it
//! has been set, and runs the same validation as the file loader.

use std::marker::PhantomData;

use super::loader::ConfigError;
use super::types::CrawlConfig;
use crate::utils::normalize_url;

// Type states for the builder
pub struct WithTargetUrl;

pub struct CrawlConfigBuilder<State = ()> {
    pub(crate) config: CrawlConfig,
    pub(crate) _phantom: PhantomData<State>,
}

impl Default for CrawlConfigBuilder<()> {
    fn default() -> Self {
        Self {
            config: CrawlConfig::default(),
            _phantom: PhantomData,
        }
    }
}

impl CrawlConfig {
    /// Create a builder for configuring a `CrawlConfig` with a fluent interface
    #[must_use]
    pub fn builder() -> CrawlConfigBuilder<()> {
        CrawlConfigBuilder::default()
    }
}

impl CrawlConfigBuilder<()> {
    pub fn target_url(self, url: impl Into<String>) -> CrawlConfigBuilder<WithTargetUrl> {
        let mut config = self.config;
        config.target_url = normalize_url(&url.into());

        CrawlConfigBuilder {
            config,
            _phantom: PhantomData,
        }
    }
}

// Build method only available when the target URL is set
impl CrawlConfigBuilder<WithTargetUrl> {
    pub fn build(self) -> Result<CrawlConfig, ConfigError> {
        let mut config = self.config;
        config.validate()?;
        Ok(config)
    }
}
