//! JSONL audit sink
//!
//! Appends one JSON object per line. Writes are serialized through a mutex so
//! concurrent handlers never interleave partial lines.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::Mutex;

use super::{AuditEvent, AuditFilter, AuditSink};
use crate::error::{HubError, HubResult};

pub struct JsonlAuditSink {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonlAuditSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn ensure_parent_dir(&self) -> HubResult<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| unavailable("failed to create audit dir", e))?;
        }
        Ok(())
    }

    fn parse_line(line: &str) -> Option<AuditEvent> {
        if line.trim().is_empty() {
            return None;
        }
        serde_json::from_str(line).ok()
    }
}

fn unavailable(context: &str, error: impl std::fmt::Display) -> HubError {
    HubError::BackendUnavailable(format!("audit sink: {}: {}", context, error))
}

#[async_trait]
impl AuditSink for JsonlAuditSink {
    async fn log(&self, event: AuditEvent) -> HubResult<()> {
        let mut json =
            serde_json::to_string(&event).map_err(|e| unavailable("failed to serialize", e))?;
        json.push('\n');

        let _guard = self.write_lock.lock().await;
        self.ensure_parent_dir().await?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| unavailable("failed to open", e))?;

        file.write_all(json.as_bytes())
            .await
            .map_err(|e| unavailable("failed to write", e))?;
        file.flush()
            .await
            .map_err(|e| unavailable("failed to flush", e))?;

        Ok(())
    }

    async fn query(&self, filter: AuditFilter) -> HubResult<Vec<AuditEvent>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.path)
            .await
            .map_err(|e| unavailable("failed to open", e))?;

        let mut lines = BufReader::new(file).lines();
        let mut results = VecDeque::new();

        while let Some(line) = lines
            .next_line()
            .await
            .map_err(|e| unavailable("failed to read", e))?
        {
            let Some(event) = Self::parse_line(&line) else {
                continue;
            };
            if !filter.matches(&event) {
                continue;
            }
            results.push_back(event);

            // Keep only the newest `limit` matches
            if filter.limit.is_some_and(|limit| results.len() > limit) {
                results.pop_front();
            }
        }

        Ok(results.into())
    }
}
