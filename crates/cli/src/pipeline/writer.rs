//! OutcomeWriter - single task appending records to the route files

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use contracts::Route;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, instrument};

use super::OutcomeRecord;
use crate::error::CliError;

pub const SUCCESS_FILE: &str = "success.jsonl";
pub const FAILURE_FILE: &str = "failure.jsonl";

/// Records written per route
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriterStats {
    pub success: u64,
    pub failure: u64,
}

/// Handle to the running writer task
///
/// Senders apply backpressure when the queue is full; records are never
/// dropped.
pub struct OutcomeWriter {
    tx: mpsc::Sender<OutcomeRecord>,
    worker_handle: JoinHandle<Result<WriterStats, CliError>>,
}

impl OutcomeWriter {
    /// Create the route files in `output_dir` (truncating old ones) and
    /// spawn the writer task
    pub async fn spawn(output_dir: &Path, queue_capacity: usize) -> Result<Self> {
        tokio::fs::create_dir_all(output_dir)
            .await
            .with_context(|| format!("Failed to create output dir {}", output_dir.display()))?;

        let success = RouteFile::create(output_dir.join(SUCCESS_FILE)).await?;
        let failure = RouteFile::create(output_dir.join(FAILURE_FILE)).await?;

        let (tx, rx) = mpsc::channel(queue_capacity);
        let worker_handle = tokio::spawn(writer_loop(rx, success, failure));

        Ok(Self { tx, worker_handle })
    }

    /// A sender for worker tasks
    pub fn sender(&self) -> mpsc::Sender<OutcomeRecord> {
        self.tx.clone()
    }

    /// Close the queue, wait for pending records and flush
    ///
    /// Completes once every other sender has been dropped too.
    #[instrument(name = "outcome_writer_shutdown", skip(self))]
    pub async fn shutdown(self) -> Result<WriterStats> {
        drop(self.tx);
        let stats = self
            .worker_handle
            .await
            .context("Outcome writer task panicked")??;
        debug!(?stats, "Outcome writer finished");
        Ok(stats)
    }
}

struct RouteFile {
    path: PathBuf,
    out: BufWriter<File>,
}

impl RouteFile {
    async fn create(path: PathBuf) -> Result<Self> {
        let file = File::create(&path)
            .await
            .map_err(|e| CliError::outcome_write(&path, e))?;
        Ok(Self {
            path,
            out: BufWriter::new(file),
        })
    }

    async fn append(&mut self, line: &[u8]) -> Result<(), CliError> {
        self.out
            .write_all(line)
            .await
            .map_err(|e| CliError::outcome_write(&self.path, e))
    }

    async fn flush(&mut self) -> Result<(), CliError> {
        self.out
            .flush()
            .await
            .map_err(|e| CliError::outcome_write(&self.path, e))
    }
}

async fn writer_loop(
    mut rx: mpsc::Receiver<OutcomeRecord>,
    mut success: RouteFile,
    mut failure: RouteFile,
) -> Result<WriterStats, CliError> {
    let mut stats = WriterStats::default();

    while let Some(record) = rx.recv().await {
        let mut line = serde_json::to_vec(&record).map_err(|e| {
            CliError::outcome_write(&success.path, std::io::Error::other(e))
        })?;
        line.push(b'\n');

        match record.route {
            Route::Success => {
                success.append(&line).await?;
                stats.success += 1;
            }
            Route::Failure => {
                failure.append(&line).await?;
                stats.failure += 1;
            }
        }
    }

    success.flush().await?;
    failure.flush().await?;
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_records_go_to_route_files() {
        let dir = tempdir().unwrap();
        let writer = OutcomeWriter::spawn(dir.path(), 4).await.unwrap();

        let tx = writer.sender();
        tx.send(OutcomeRecord::malformed(1, "{}".into(), "missing field 'to'"))
            .await
            .unwrap();
        drop(tx);

        let stats = writer.shutdown().await.unwrap();
        assert_eq!(stats, WriterStats { success: 0, failure: 1 });

        let failure = std::fs::read_to_string(dir.path().join(FAILURE_FILE)).unwrap();
        let record: OutcomeRecord = serde_json::from_str(failure.trim()).unwrap();
        assert_eq!(record.line, 1);
        assert!(std::fs::read_to_string(dir.path().join(SUCCESS_FILE))
            .unwrap()
            .is_empty());
    }
}
