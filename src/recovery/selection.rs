//! Startup choice between a fresh crawl and resuming a RecoveryLog.

use std::future::Future;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin};

use super::errors::RecoveryError;
use super::log_store::RecoveryLogStore;
use crate::crawl_state::CrawlSnapshot;

/// Operator interaction used when choosing a RecoveryLog.
pub trait Prompt: Send {
    /// Yes/no question. End of input counts as "no".
    fn confirm(&mut self, message: &str) -> impl Future<Output = Result<bool, RecoveryError>> + Send;

    /// Pick one of `options`; `None` when the operator cancels.
    fn select(
        &mut self,
        message: &str,
        options: &[String],
    ) -> impl Future<Output = Result<Option<usize>, RecoveryError>> + Send;
}

/// Line-based prompt on stdin/stdout.
pub struct TerminalPrompt {
    lines: Lines<BufReader<Stdin>>,
}

impl Default for TerminalPrompt {
    fn default() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }
}

impl TerminalPrompt {
    async fn ask(&mut self, question: &str) -> Result<Option<String>, RecoveryError> {
        let mut stdout = tokio::io::stdout();
        stdout
            .write_all(question.as_bytes())
            .await
            .map_err(|e| RecoveryError::Prompt(e.to_string()))?;
        stdout
            .flush()
            .await
            .map_err(|e| RecoveryError::Prompt(e.to_string()))?;
        self.lines
            .next_line()
            .await
            .map_err(|e| RecoveryError::Prompt(e.to_string()))
    }
}

impl Prompt for TerminalPrompt {
    async fn confirm(&mut self, message: &str) -> Result<bool, RecoveryError> {
        loop {
            let Some(answer) = self.ask(&format!("{message} [y/n] ")).await? else {
                return Ok(false);
            };
            match answer.trim().to_ascii_lowercase().as_str() {
                "y" | "yes" => return Ok(true),
                "n" | "no" => return Ok(false),
                _ => continue,
            }
        }
    }

    async fn select(&mut self, message: &str, options: &[String]) -> Result<Option<usize>, RecoveryError> {
        let mut menu = format!("{message}\n");
        for (i, option) in options.iter().enumerate() {
            menu.push_str(&format!("  {}) {option}\n", i + 1));
        }
        menu.push_str("Enter a number (empty to cancel): ");

        loop {
            let Some(answer) = self.ask(&menu).await? else {
                return Ok(None);
            };
            let answer = answer.trim();
            if answer.is_empty() {
                return Ok(None);
            }
            match answer.parse::<usize>() {
                Ok(n) if (1..=options.len()).contains(&n) => return Ok(Some(n - 1)),
                _ => continue,
            }
        }
    }
}

/// Ask the operator which RecoveryLog to resume, if any.
///
/// No candidates: fresh crawl. One: confirm. Several: confirm, then pick.
pub async fn select_recovery_log<P: Prompt>(
    store: &RecoveryLogStore,
    prompt: &mut P,
) -> Result<Option<PathBuf>, RecoveryError> {
    let logs = store.list().await?;
    if logs.is_empty() {
        return Ok(None);
    }

    if !prompt
        .confirm("Fail log detected, do you want to use it?")
        .await?
    {
        return Ok(None);
    }

    if let [only] = logs.as_slice() {
        return Ok(Some(only.clone()));
    }

    let options: Vec<String> = logs
        .iter()
        .map(|p| {
            p.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| p.display().to_string())
        })
        .collect();
    let choice = prompt.select("Which file to use?", &options).await?;
    Ok(choice.and_then(|i| logs.get(i).cloned()))
}

/// How the starting point of a run is chosen.
#[derive(Debug, Clone, Default)]
pub enum StartMode {
    /// Offer existing RecoveryLogs interactively.
    #[default]
    Interactive,
    /// Resume from this artifact without asking.
    Resume(PathBuf),
    /// Ignore RecoveryLogs.
    Fresh,
}

/// Build the snapshot a run starts from.
///
/// Resuming replaces the position and photo map wholesale; otherwise the
/// crawl starts empty at `target_url`.
pub async fn initial_snapshot<P: Prompt>(
    store: &RecoveryLogStore,
    prompt: &mut P,
    mode: StartMode,
    target_url: &str,
) -> Result<CrawlSnapshot, RecoveryError> {
    let chosen = match mode {
        StartMode::Fresh => None,
        StartMode::Resume(path) => Some(path),
        StartMode::Interactive => select_recovery_log(store, prompt).await?,
    };

    let Some(path) = chosen else {
        return Ok(CrawlSnapshot::fresh(target_url));
    };

    let mut snapshot = store.consume(&path).await?;
    if snapshot.current_url.trim().is_empty() {
        // Older artifacts may lack a position; fall back to the frontier
        snapshot.current_url = snapshot
            .photo_data
            .last()
            .map_or_else(|| target_url.to_string(), |r| r.source_url.clone());
    }
    Ok(snapshot)
}
