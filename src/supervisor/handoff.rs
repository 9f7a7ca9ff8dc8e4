//! Worker <-> supervisor snapshot channel.
//!
//! The supervisor writes the seed snapshot to the worker's stdin and closes
//! it; the worker answers with exactly one JSON line on stdout carrying its
//! final snapshot, on success and on failure alike. Same shape as a
//! RecoveryLog file.

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use crate::crawl_state::CrawlSnapshot;

/// Send one snapshot and close the writer.
pub async fn send_snapshot<W: AsyncWrite + Unpin>(mut writer: W, snapshot: &CrawlSnapshot) -> Result<()> {
    let mut line = snapshot.to_message()?;
    line.push('\n');
    writer
        .write_all(line.as_bytes())
        .await
        .context("Failed to write snapshot to channel")?;
    writer.flush().await.context("Failed to flush snapshot channel")?;
    writer.shutdown().await.context("Failed to close snapshot channel")?;
    Ok(())
}

/// Receive the seed snapshot (worker side): the whole input is one document.
pub async fn receive_seed<R: AsyncRead + Unpin>(mut reader: R) -> Result<CrawlSnapshot> {
    let mut raw = String::new();
    reader
        .read_to_string(&mut raw)
        .await
        .context("Failed to read seed snapshot")?;
    CrawlSnapshot::from_message(&raw)
}

/// Receive the worker's final snapshot (supervisor side).
///
/// Takes the last line that parses as a snapshot; `None` if the worker died
/// before reporting.
pub async fn receive_report<R: AsyncRead + Unpin>(reader: R) -> Result<Option<CrawlSnapshot>> {
    let mut lines = BufReader::new(reader).lines();
    let mut latest = None;
    while let Some(line) = lines.next_line().await.context("Failed to read worker output")? {
        if line.trim().is_empty() {
            continue;
        }
        match CrawlSnapshot::from_message(&line) {
            Ok(snapshot) => latest = Some(snapshot),
            Err(e) => log::warn!("Ignoring unexpected worker output: {e:#}"),
        }
    }
    Ok(latest)
}
