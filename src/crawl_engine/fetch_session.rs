//! The per-target crawl loop.
//!
//! `Start -> Navigating -> ExtractingPhoto -> Deduplicating -> Downloading
//! -> Advancing -> {ExtractingPhoto | Done}`, with `Failed` reachable from
//! every state. The session writes through a [`CrawlState`] handle: a photo
//! is recorded, and the position moves onto it, only once its image is on
//! disk. Whatever fails afterwards, the state names the last completed photo.

use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

use super::crawl_types::{FetchError, SessionReport, Termination};
use super::paginator::{Advance, PaginatePolicy, Paginator};
use crate::config::CrawlConfig;
use crate::content_saver::{ImageDownloader, ensure_dir, export_work_log};
use crate::crawl_state::CrawlState;
use crate::page_driver::PageDriver;
use crate::page_extractor::{ExtractPolicy, ExtractedPhoto, PhotoExtractor};
use crate::utils::{epoch_millis, photo_id_from_url};

/// Observable state of a session, mostly for logs and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Start,
    Navigating,
    ExtractingPhoto,
    Deduplicating,
    Downloading,
    Advancing,
    Done,
    Failed,
}

/// Everything a session needs from the configuration.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub data_dir: PathBuf,
    pub work_log_dir: PathBuf,
    pub screenshot: bool,
    pub extract: ExtractPolicy,
    pub paginate: PaginatePolicy,
}

impl SessionSettings {
    #[must_use]
    pub fn from_config(config: &CrawlConfig) -> Self {
        Self {
            data_dir: config.data_dir().to_path_buf(),
            work_log_dir: config.work_log_dir().to_path_buf(),
            screenshot: config.screenshot(),
            extract: ExtractPolicy::from_config(config),
            paginate: PaginatePolicy::from_config(config),
        }
    }
}

enum Step {
    Navigate,
    ResumeCheck,
    Extract,
    Dedup(ExtractedPhoto),
    Download(ExtractedPhoto),
    Advance { id: Option<String>, url: String },
    Finish(Termination),
}

pub struct FetchSession<'a, D, L> {
    page: &'a mut D,
    downloader: &'a L,
    state: CrawlState,
    extractor: PhotoExtractor,
    paginator: Paginator,
    data_dir: PathBuf,
    work_log_dir: PathBuf,
    screenshot: bool,
    phase: SessionPhase,
    new_photos: usize,
}

impl<'a, D: PageDriver, L: ImageDownloader> FetchSession<'a, D, L> {
    pub fn new(page: &'a mut D, downloader: &'a L, state: CrawlState, settings: &SessionSettings) -> Self {
        Self {
            page,
            downloader,
            state,
            extractor: PhotoExtractor::new(settings.extract),
            paginator: Paginator::new(settings.paginate),
            data_dir: settings.data_dir.clone(),
            work_log_dir: settings.work_log_dir.clone(),
            screenshot: settings.screenshot,
            phase: SessionPhase::Start,
            new_photos: 0,
        }
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Photos recorded by this session so far.
    #[must_use]
    pub fn new_photos(&self) -> usize {
        self.new_photos
    }

    /// Crawl from the state's current URL until the album cycles back or ends.
    ///
    /// On success the full photo map is exported; on failure the shared
    /// state already holds the last completed position.
    pub async fn run(&mut self) -> Result<SessionReport, FetchError> {
        let mut step = Step::Navigate;
        let outcome = loop {
            match self.execute(step).await {
                Ok(Step::Finish(termination)) => break self.finish(termination).await,
                Ok(next) => step = next,
                Err(e) => break Err(e),
            }
        };

        if let Err(e) = &outcome {
            error!(phase = ?self.phase, current_url = %self.state.current_url(), "Fetch session failed: {e}");
            self.phase = SessionPhase::Failed;
        }
        outcome
    }

    async fn execute(&mut self, step: Step) -> Result<Step, FetchError> {
        match step {
            Step::Navigate => self.navigate().await,
            Step::ResumeCheck => self.resume_check().await,
            Step::Extract => {
                self.enter(SessionPhase::ExtractingPhoto);
                Ok(Step::Dedup(self.extractor.extract(self.page).await?))
            }
            Step::Dedup(photo) => Ok(self.deduplicate(photo)),
            Step::Download(photo) => self.download(photo).await,
            Step::Advance { id, url } => self.advance(id.as_deref(), &url).await,
            Step::Finish(termination) => Ok(Step::Finish(termination)),
        }
    }

    fn enter(&mut self, phase: SessionPhase) {
        debug!(from = ?self.phase, to = ?phase, "Session phase");
        self.phase = phase;
    }

    async fn navigate(&mut self) -> Result<Step, FetchError> {
        self.enter(SessionPhase::Navigating);
        ensure_dir(&self.data_dir).await.map_err(|e| FetchError::Persist {
            path: self.data_dir.clone(),
            message: format!("{e:#}"),
        })?;

        let url = self.state.current_url();
        info!(%url, resumed = self.state.len(), "Opening album");
        self.page
            .navigate(&url)
            .await
            .map_err(|e| FetchError::Navigation {
                url,
                message: format!("{e:#}"),
            })?;
        Ok(Step::ResumeCheck)
    }

    /// A resumed session lands on a photo it already has; step past it
    /// before extracting anything.
    async fn resume_check(&mut self) -> Result<Step, FetchError> {
        if self.state.is_empty() {
            return Ok(Step::Extract);
        }

        let url = self.page.current_url().await?;
        match photo_id_from_url(&url) {
            Some(id) if self.state.contains(&id) => {
                info!(fbid = %id, "Resume anchor already fetched, advancing past it");
                self.advance(Some(&id), &url).await
            }
            _ => Ok(Step::Extract),
        }
    }

    fn deduplicate(&mut self, photo: ExtractedPhoto) -> Step {
        self.enter(SessionPhase::Deduplicating);
        match &photo.id {
            Some(id) if self.state.contains(id) => {
                info!(fbid = %id, "Pagination returned to a fetched photo, album complete");
                Step::Finish(Termination::CycledBack)
            }
            _ => Step::Download(photo),
        }
    }

    async fn download(&mut self, photo: ExtractedPhoto) -> Result<Step, FetchError> {
        self.enter(SessionPhase::Downloading);

        let name = photo
            .id
            .clone()
            .unwrap_or_else(|| format!("{}_unknown_fbid", epoch_millis()));
        let image_path = self.data_dir.join(format!("{name}.jpg"));

        if file_exists(&image_path).await {
            debug!(path = %image_path.display(), "Image already on disk, skipping download");
        } else {
            self.downloader
                .download(&photo.image_url, &image_path)
                .await
                .map_err(|e| FetchError::Download {
                    url: photo.image_url.clone(),
                    message: format!("{e:#}"),
                })?;
            tokio::time::sleep(self.extractor.policy().step_delay).await;
        }

        if self.screenshot {
            let shot = self.data_dir.join(format!("{name}_screenshot.jpg"));
            self.extractor.capture_screenshot(self.page, &shot).await?;
        }

        match photo.to_record() {
            Some(record) => {
                if self.state.record(record) {
                    self.new_photos += 1;
                    info!(fbid = %name, total = self.state.len(), "Photo recorded");
                }
            }
            None => info!(file = %image_path.display(), "Photo has no identifier, saved without recording"),
        }

        Ok(Step::Advance {
            id: photo.id,
            url: photo.source_url,
        })
    }

    async fn advance(&mut self, id: Option<&str>, url: &str) -> Result<Step, FetchError> {
        self.enter(SessionPhase::Advancing);
        match self.paginator.advance_from(self.page, id, url).await? {
            Advance::Moved { .. } => Ok(Step::Extract),
            Advance::EndOfAlbum => Ok(Step::Finish(Termination::EndOfAlbum)),
        }
    }

    async fn finish(&mut self, termination: Termination) -> Result<SessionReport, FetchError> {
        let snapshot = self.state.snapshot();
        let export_path = export_work_log(&self.work_log_dir, &snapshot.photo_data)
            .await
            .map_err(|e| FetchError::Persist {
                path: self.work_log_dir.clone(),
                message: format!("{e:#}"),
            })?;
        self.enter(SessionPhase::Done);

        Ok(SessionReport {
            new_photos: self.new_photos,
            total_photos: snapshot.photo_data.len(),
            export_path,
            termination,
        })
    }
}

async fn file_exists(path: &Path) -> bool {
    tokio::fs::try_exists(path).await.unwrap_or(false)
}
