//! FileGateway - appends every message to a JSON-lines outbox

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{SecondsFormat, Utc};
use contracts::{ContractError, GatewayClient, RecipientId};
use serde::Serialize;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, error, instrument};

/// Configuration for FileGateway
#[derive(Debug, Clone)]
pub struct FileGatewayConfig {
    /// Outbox file, created if missing and appended to otherwise
    pub path: PathBuf,
}

impl FileGatewayConfig {
    /// Create config from params map
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self, ContractError> {
        let path = params
            .get("path")
            .map(|p| p.trim())
            .filter(|p| !p.is_empty())
            .ok_or_else(|| {
                ContractError::config_validation(
                    "gateway.params.path",
                    "file gateway requires a 'path' parameter",
                )
            })?;
        Ok(Self {
            path: PathBuf::from(path),
        })
    }
}

/// One outbox line
#[derive(Debug, Serialize)]
struct OutboxEntry<'a> {
    id: &'a str,
    to: &'a str,
    body: &'a str,
    sent_at: String,
}

/// Gateway writing messages to an outbox file
pub struct FileGateway {
    name: String,
    path: PathBuf,
    file: Mutex<File>,
    seq: AtomicU64,
}

impl FileGateway {
    /// Open (or create) the outbox file
    pub async fn new(name: impl Into<String>, config: FileGatewayConfig) -> std::io::Result<Self> {
        if let Some(parent) = config.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&config.path)
            .await?;

        Ok(Self {
            name: name.into(),
            path: config.path,
            file: Mutex::new(file),
            seq: AtomicU64::new(0),
        })
    }

    /// Create from params map (for factory)
    pub async fn from_params(
        name: impl Into<String>,
        params: &HashMap<String, String>,
    ) -> Result<Self, ContractError> {
        let config = FileGatewayConfig::from_params(params)?;
        Ok(Self::new(name, config).await?)
    }

    /// Outbox location
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn append(&self, line: &[u8]) -> std::io::Result<()> {
        let mut file = self.file.lock().await;
        file.write_all(line).await?;
        file.flush().await
    }
}

impl GatewayClient for FileGateway {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "file_gateway_send",
        skip(self, body),
        fields(gateway = %self.name, recipient = %recipient)
    )]
    async fn send(&self, recipient: &RecipientId, body: &str) -> Result<String, ContractError> {
        let seq = self.seq.fetch_add(1, Ordering::Relaxed) + 1;
        let id = format!("{}-{seq}", self.name);
        let entry = OutboxEntry {
            id: &id,
            to: recipient.as_str(),
            body,
            sent_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        };

        let mut line = serde_json::to_vec(&entry)
            .map_err(|e| ContractError::gateway(&self.name, e.to_string()))?;
        line.push(b'\n');

        self.append(&line).await.map_err(|e| {
            error!(path = %self.path.display(), error = %e, "Outbox write failed");
            ContractError::gateway(&self.name, e.to_string())
        })?;

        debug!(id = %id, "Message appended to outbox");
        Ok(id)
    }
}
