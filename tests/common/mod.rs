//! Scripted fakes for the photoscrape test suite.
//!
//! `FakePage` plays a photo viewer over an in-memory album so the whole
//! fetch loop runs without a browser.

#![allow(dead_code)]

use anyhow::{Result, anyhow};
use serde_json::{Value, json};
use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use photoscrape::config::CrawlConfig;
use photoscrape::content_saver::ImageDownloader;
use photoscrape::crawl_engine::SessionSettings;
use photoscrape::crawl_state::CrawlSnapshot;
use photoscrape::page_driver::{PageDriver, StoredCookie};
use photoscrape::page_extractor::js_scripts::{
    NEXT_PHOTO_SELECTOR, PHOTO_INFO_SCRIPT, READ_MORE_SCRIPT,
};
use photoscrape::recovery::{Prompt, RecoveryError};
use photoscrape::supervisor::{ConnectivityProbe, LaunchFailure, RetryPolicy, SessionLauncher, WorkerSettings};

pub const VIEWER: &str = "https://www.facebook.com/photo/?fbid=";

pub fn photo_url(id: &str) -> String {
    format!("{VIEWER}{id}&set=a.1")
}

pub fn image_url(id: &str) -> String {
    format!("http://x/{id}.jpg")
}

#[derive(Debug, Clone)]
pub struct FakePhoto {
    pub url: String,
    pub image_url: String,
    pub caption: String,
}

impl FakePhoto {
    pub fn with_id(id: &str) -> Self {
        Self {
            url: photo_url(id),
            image_url: image_url(id),
            caption: format!("caption {id}"),
        }
    }

    /// A photo whose viewer URL carries no identifier.
    pub fn without_id(slug: &str) -> Self {
        Self {
            url: format!("https://www.facebook.com/photo/{slug}"),
            image_url: format!("http://x/{slug}.jpg"),
            caption: String::new(),
        }
    }
}

/// A photo viewer over a fixed album.
///
/// "Next" moves to the following photo; after the last one it wraps to the
/// first (`cycles`) or stays put.
#[derive(Debug)]
pub struct FakePage {
    pub album: Vec<FakePhoto>,
    pub cycles: bool,
    pub cursor: usize,
    /// Failures still to inject when reading photo info, by photo URL.
    pub failures: HashMap<String, u32>,
    /// Empty image reads still to serve, by photo URL.
    pub unrendered: HashMap<String, u32>,
    pub navigations: Vec<String>,
    pub reloads: u32,
    pub clicks: u32,
    pub info_reads: u32,
    pub screenshots: Vec<PathBuf>,
    pub cookies_applied: usize,
    /// Set by `close`, which consumes the page.
    pub closed: Arc<AtomicBool>,
}

impl FakePage {
    pub fn album(ids: &[&str]) -> Self {
        Self::from_photos(ids.iter().map(|id| FakePhoto::with_id(id)).collect())
    }

    pub fn from_photos(album: Vec<FakePhoto>) -> Self {
        Self {
            album,
            cycles: true,
            cursor: 0,
            failures: HashMap::new(),
            unrendered: HashMap::new(),
            navigations: Vec::new(),
            reloads: 0,
            clicks: 0,
            info_reads: 0,
            screenshots: Vec::new(),
            cookies_applied: 0,
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Stop at the last photo instead of wrapping around.
    pub fn without_cycle(mut self) -> Self {
        self.cycles = false;
        self
    }

    /// Fail the next `times` info reads on photo `id`.
    pub fn failing_at(mut self, id: &str, times: u32) -> Self {
        self.failures.insert(photo_url(id), times);
        self
    }

    /// Serve an empty image source `times` times on photo `id`.
    pub fn unrendered_at(mut self, id: &str, times: u32) -> Self {
        self.unrendered.insert(photo_url(id), times);
        self
    }

    fn current(&self) -> &FakePhoto {
        &self.album[self.cursor]
    }

    fn take(counter: &mut HashMap<String, u32>, url: &str) -> bool {
        match counter.get_mut(url) {
            Some(remaining) if *remaining > 0 => {
                *remaining -= 1;
                true
            }
            _ => false,
        }
    }
}

impl PageDriver for FakePage {
    async fn navigate(&mut self, url: &str) -> Result<()> {
        self.navigations.push(url.to_string());
        self.cursor = self
            .album
            .iter()
            .position(|p| p.url == url)
            .ok_or_else(|| anyhow!("no such page: {url}"))?;
        Ok(())
    }

    async fn evaluate(&mut self, script: &str) -> Result<Value> {
        if script == READ_MORE_SCRIPT {
            return Ok(Value::Bool(false));
        }
        if script == PHOTO_INFO_SCRIPT {
            self.info_reads += 1;
            let url = self.current().url.clone();
            if Self::take(&mut self.failures, &url) {
                return Err(anyhow!("Evaluate timeout after 60 seconds"));
            }
            if Self::take(&mut self.unrendered, &url) {
                return Ok(json!({ "imageUrl": "", "caption": "" }));
            }
            let photo = self.current();
            return Ok(json!({ "imageUrl": photo.image_url, "caption": photo.caption }));
        }
        Err(anyhow!("unexpected script"))
    }

    async fn click(&mut self, selector: &str) -> Result<bool> {
        if selector != NEXT_PHOTO_SELECTOR {
            return Ok(false);
        }
        self.clicks += 1;
        if self.cursor + 1 < self.album.len() {
            self.cursor += 1;
        } else if self.cycles {
            self.cursor = 0;
        }
        Ok(true)
    }

    async fn current_url(&mut self) -> Result<String> {
        Ok(self.current().url.clone())
    }

    async fn reload(&mut self) -> Result<()> {
        self.reloads += 1;
        Ok(())
    }

    async fn screenshot(&mut self, path: &Path) -> Result<()> {
        tokio::fs::write(path, b"screenshot").await?;
        self.screenshots.push(path.to_path_buf());
        Ok(())
    }

    async fn apply_cookies(&mut self, cookies: &[StoredCookie]) -> Result<()> {
        self.cookies_applied = cookies.len();
        Ok(())
    }

    async fn close(self) -> Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// Writes a stub image and remembers every URL it fetched.
#[derive(Debug, Default)]
pub struct FakeDownloader {
    pub downloads: Mutex<Vec<String>>,
    pub failing: HashSet<String>,
}

impl FakeDownloader {
    pub fn failing_on(urls: &[&str]) -> Self {
        Self {
            downloads: Mutex::new(Vec::new()),
            failing: urls.iter().map(|u| (*u).to_string()).collect(),
        }
    }

    pub fn downloaded(&self) -> Vec<String> {
        self.downloads.lock().unwrap().clone()
    }
}

impl ImageDownloader for FakeDownloader {
    async fn download(&self, url: &str, dest: &Path) -> Result<()> {
        if self.failing.contains(url) {
            return Err(anyhow!("HTTP 503 for {url}"));
        }
        tokio::fs::write(dest, url.as_bytes()).await?;
        self.downloads.lock().unwrap().push(url.to_string());
        Ok(())
    }
}

/// Offline for the first `offline` probes, online afterwards.
#[derive(Debug, Default)]
pub struct FakeProbe {
    offline: AtomicU32,
    pub probes: AtomicU32,
}

impl FakeProbe {
    pub fn online() -> Self {
        Self::default()
    }

    pub fn offline_for(probes: u32) -> Self {
        Self {
            offline: AtomicU32::new(probes),
            probes: AtomicU32::new(0),
        }
    }

    pub fn probe_count(&self) -> u32 {
        self.probes.load(Ordering::SeqCst)
    }
}

impl ConnectivityProbe for FakeProbe {
    async fn is_online(&self) -> bool {
        self.probes.fetch_add(1, Ordering::SeqCst);
        self.offline
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_err()
    }
}

/// Replays scripted attempt outcomes and records every seed it was given.
#[derive(Debug, Default)]
pub struct FakeLauncher {
    outcomes: Mutex<VecDeque<Result<CrawlSnapshot, LaunchFailure>>>,
    pub seeds: Mutex<Vec<CrawlSnapshot>>,
}

impl FakeLauncher {
    pub fn scripted(outcomes: Vec<Result<CrawlSnapshot, LaunchFailure>>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into()),
            seeds: Mutex::new(Vec::new()),
        }
    }

    pub fn launches(&self) -> usize {
        self.seeds.lock().unwrap().len()
    }
}

impl SessionLauncher for FakeLauncher {
    async fn launch(&self, seed: CrawlSnapshot) -> Result<CrawlSnapshot, LaunchFailure> {
        self.seeds.lock().unwrap().push(seed);
        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(LaunchFailure::Failed {
                    message: "browser crashed".to_string(),
                    snapshot: None,
                })
            })
    }
}

/// Answers prompts from a script and records the questions asked.
#[derive(Debug, Default)]
pub struct ScriptedPrompt {
    pub confirms: VecDeque<bool>,
    pub selections: VecDeque<Option<usize>>,
    pub asked: Vec<String>,
}

impl ScriptedPrompt {
    pub fn new(confirms: &[bool], selections: &[Option<usize>]) -> Self {
        Self {
            confirms: confirms.iter().copied().collect(),
            selections: selections.iter().copied().collect(),
            asked: Vec::new(),
        }
    }
}

impl Prompt for ScriptedPrompt {
    async fn confirm(&mut self, message: &str) -> Result<bool, RecoveryError> {
        self.asked.push(message.to_string());
        Ok(self.confirms.pop_front().unwrap_or(false))
    }

    async fn select(&mut self, message: &str, _options: &[String]) -> Result<Option<usize>, RecoveryError> {
        self.asked.push(message.to_string());
        Ok(self.selections.pop_front().flatten())
    }
}

/// A config rooted in `dir` with every delay switched off.
pub fn test_config(dir: &Path, target: &str) -> CrawlConfig {
    CrawlConfig::builder()
        .target_url(target)
        .data_dir(dir.join("data"))
        .fail_log_dir(dir.join("fail"))
        .cookie_path(dir.join("cookie").join("cookie.json"))
        .step_delay_ms(0)
        .main_retry_wait_secs(0)
        .task_retry_wait_secs(0)
        .extract_attempt_limit(3)
        .extract_reload_limit(1)
        .pagination_stall_limit(5)
        .build()
        .unwrap()
}

pub fn session_settings(dir: &Path) -> SessionSettings {
    SessionSettings::from_config(&test_config(dir, &photo_url("1")))
}

pub fn worker_settings(dir: &Path, task_retry_limit: u32) -> WorkerSettings {
    let mut settings = WorkerSettings::from_config(&test_config(dir, &photo_url("1")));
    settings.retry = RetryPolicy::new(task_retry_limit, Duration::ZERO);
    settings.connectivity_interval = Duration::from_millis(1);
    settings
}
