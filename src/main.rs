// photoscrape: resumable photo-album crawler.
//
// Without a subcommand this process is the coordinator (Tier A): it picks the
// starting point, then relaunches crawl attempts until one completes. The
// hidden `worker` subcommand is one such attempt in a child process.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

use photoscrape::config::{CrawlConfig, LaunchMode};
use photoscrape::crawl_engine::CrawlError;
use photoscrape::crawl_state::CrawlState;
use photoscrape::logging::init_tracing;
use photoscrape::recovery::{RecoveryLogStore, StartMode, TerminalPrompt, initial_snapshot};
use photoscrape::supervisor::{
    DnsProbe, InProcessLauncher, InterruptSignal, ProcessLauncher, RunSummary, SessionLauncher,
    Supervisor, spawn_interrupt_handler, worker_main,
};
use photoscrape::utils::{WORKER_EXIT_FAILURE, WORKER_EXIT_INTERRUPTED};

#[derive(Debug, Parser)]
#[command(
    name = "photoscrape",
    version,
    about = "Download every photo of an album, resuming after crashes"
)]
struct Cli {
    /// JSON configuration file
    #[arg(short, long, value_name = "FILE", default_value = "config.json")]
    config: PathBuf,

    /// Override the configured album URL
    #[arg(long, value_name = "URL")]
    target_url: Option<String>,

    /// Resume from this fail log without prompting
    #[arg(long, value_name = "FAIL_LOG", conflicts_with = "fresh")]
    resume: Option<PathBuf>,

    /// Ignore existing fail logs and start from the target URL
    #[arg(long, default_value_t = false)]
    fresh: bool,

    /// Run attempts inside this process instead of a worker process
    #[arg(long, default_value_t = false)]
    in_process: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run one crawl attempt; seed snapshot on stdin, final snapshot on stdout
    #[command(hide = true)]
    Worker,
}

impl Cli {
    fn start_mode(&self) -> StartMode {
        match (&self.resume, self.fresh) {
            (Some(path), _) => StartMode::Resume(path.clone()),
            (None, true) => StartMode::Fresh,
            (None, false) => StartMode::Interactive,
        }
    }

    fn load_config(&self) -> Result<CrawlConfig> {
        let mut config = CrawlConfig::parse_json_file(&self.config)?;
        if let Some(url) = &self.target_url {
            config = config.with_target_url(url);
        }
        config.validate()?;
        if self.in_process {
            config = config.with_launch_mode(LaunchMode::InProcess);
        }
        Ok(config)
    }
}

fn exit_code(code: i32) -> ExitCode {
    ExitCode::from(u8::try_from(code).unwrap_or(1))
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let config = match cli.load_config() {
        Ok(config) => config,
        Err(e) => {
            error!("{e:#}");
            return exit_code(WORKER_EXIT_FAILURE);
        }
    };

    if matches!(cli.command, Some(Command::Worker)) {
        return exit_code(worker_main(&config).await);
    }

    match coordinate(&cli, config).await {
        Ok(summary) => {
            info!(
                attempts = summary.attempts,
                photos = summary.photos,
                "Crawl finished"
            );
            ExitCode::SUCCESS
        }
        Err(CrawlError::Interrupted) => {
            info!("Crawl interrupted");
            exit_code(WORKER_EXIT_INTERRUPTED)
        }
        Err(e) => {
            error!("{e}");
            exit_code(WORKER_EXIT_FAILURE)
        }
    }
}

async fn coordinate(cli: &Cli, config: CrawlConfig) -> Result<RunSummary, CrawlError> {
    let store = RecoveryLogStore::new(config.fail_log_dir());
    let mut prompt = TerminalPrompt::default();
    let seed = initial_snapshot(&store, &mut prompt, cli.start_mode(), config.target_url()).await?;
    info!(url = %seed.current_url, known = seed.photo_data.len(), "Starting crawl");

    let state = CrawlState::new(seed);
    let probe = DnsProbe::new(config.connectivity_host());
    let interrupt = InterruptSignal::new();
    spawn_interrupt_handler(interrupt.clone());

    match config.launch_mode() {
        LaunchMode::Process => {
            let launcher = ProcessLauncher::new(&cli.config, config.target_url(), interrupt.clone())
                .context("Failed to prepare worker launcher")?;
            supervise(&launcher, &probe, &store, &config, &state, interrupt).await
        }
        LaunchMode::InProcess => {
            let launcher = InProcessLauncher::new(config.clone(), state.clone(), interrupt.clone());
            supervise(&launcher, &probe, &store, &config, &state, interrupt).await
        }
    }
}

async fn supervise<L: SessionLauncher>(
    launcher: &L,
    probe: &DnsProbe,
    store: &RecoveryLogStore,
    config: &CrawlConfig,
    state: &CrawlState,
    interrupt: InterruptSignal,
) -> Result<RunSummary, CrawlError> {
    Supervisor::from_config(launcher, probe, store, config)
        .with_interrupt(interrupt)
        .run(state)
        .await
}
