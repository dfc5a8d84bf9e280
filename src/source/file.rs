use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

use quotaboard_core::snapshot::parse_snapshots;
use quotaboard_core::SnapshotSet;

use super::SourceMessage;
use crate::state::SharedState;

/// Read and decode a snapshot document
pub async fn read_snapshots(path: &Path) -> Result<SnapshotSet> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read snapshot file: {:?}", path))?;
    parse_snapshots(&content).with_context(|| format!("Failed to parse snapshot file: {:?}", path))
}

/// Source that re-reads a snapshot document on every refresh
pub struct FileSource {
    path: PathBuf,
    refresh: Duration,
    state: SharedState,
}

impl FileSource {
    /// Create a new file source
    pub fn new(path: PathBuf, refresh: Duration, state: SharedState) -> Self {
        Self {
            path,
            refresh,
            state,
        }
    }

    /// Start reading in a background task
    pub fn start(self) -> mpsc::Receiver<SourceMessage> {
        let (tx, rx) = mpsc::channel(32);

        tokio::spawn(async move {
            self.run(tx).await;
        });

        rx
    }

    /// Run the refresh loop
    async fn run(self, tx: mpsc::Sender<SourceMessage>) {
        let mut backoff_ms: u64 = 0;
        let mut last_error: Option<String> = None;
        let mut last_error_at: Option<Instant> = None;
        let mut first = true;

        loop {
            if !self.state.read().running {
                break;
            }

            // Read immediately on start, then once per interval
            if !first {
                let interval = self.refresh + Duration::from_millis(backoff_ms);
                tokio::time::sleep(interval).await;
            }
            first = false;

            match read_snapshots(&self.path).await {
                Ok(set) => {
                    backoff_ms = 0;
                    last_error = None;
                    last_error_at = None;
                    tracing::debug!(accounts = set.len(), "snapshot file refreshed");

                    if tx.send(SourceMessage::SnapshotsUpdated(set)).await.is_err() {
                        break; // Receiver dropped
                    }
                }
                Err(e) => {
                    let err_str = format!("{:#}", e);
                    // Repeat the same error at most every few seconds
                    let should_send = match &last_error {
                        Some(prev) if prev == &err_str => last_error_at
                            .map(|t| t.elapsed() >= Duration::from_secs(5))
                            .unwrap_or(true),
                        _ => true,
                    };

                    if should_send {
                        tracing::warn!(error = %err_str, "snapshot refresh failed");
                        if tx.send(SourceMessage::Error(err_str.clone())).await.is_err() {
                            break;
                        }
                        last_error_at = Some(Instant::now());
                    }

                    last_error = Some(err_str);
                    backoff_ms = if backoff_ms == 0 {
                        500
                    } else {
                        (backoff_ms * 2).min(10_000)
                    };
                }
            }
        }
    }
}
