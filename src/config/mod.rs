//! Configuration module for the photo crawler
//!
//! This module provides the `CrawlConfig` struct, its JSON loader and its
//! type-safe builder, all funnelled through one validation pass.

// Sub-modules
pub mod builder;
pub mod getters;
pub mod loader;
pub mod methods;
pub mod types;

// Re-exports for public API
pub use builder::{CrawlConfigBuilder, WithTargetUrl};
pub use loader::ConfigError;
pub use types::{BrowserConfig, CrawlConfig, LaunchMode};
