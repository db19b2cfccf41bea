use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::error::{Result, ScrapingError};
use crate::parser::ScrapeRecord;

/// The persisted snapshot: the latest record plus when it was taken.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub scraped_at: DateTime<Utc>,
    pub record: ScrapeRecord,
}

/// Holds at most one record. Every upsert replaces the previous one wholesale.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn upsert(&self, record: &ScrapeRecord) -> Result<StoredRecord>;
    async fn load(&self) -> Result<Option<StoredRecord>>;
}

pub struct FileRecordStore {
    path: PathBuf,
}

impl FileRecordStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "record".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl RecordStore for FileRecordStore {
    async fn upsert(&self, record: &ScrapeRecord) -> Result<StoredRecord> {
        let stored = StoredRecord {
            scraped_at: Utc::now(),
            record: record.clone(),
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    ScrapingError::StorageError(format!("Failed to create store directory {:?}: {}", parent, e))
                })?;
            }
        }

        let json = serde_json::to_string_pretty(&stored)
            .map_err(|e| ScrapingError::StorageError(format!("JSON serialization failed: {}", e)))?;

        // write aside then rename so readers never see a half-written document
        let staging = self.staging_path();
        tokio::fs::write(&staging, json)
            .await
            .map_err(|e| ScrapingError::StorageError(format!("Failed to write {:?}: {}", staging, e)))?;
        tokio::fs::rename(&staging, &self.path)
            .await
            .map_err(|e| ScrapingError::StorageError(format!("Failed to replace {:?}: {}", self.path, e)))?;

        info!(path = ?self.path, "Stored scrape record");
        Ok(stored)
    }

    async fn load(&self) -> Result<Option<StoredRecord>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = ?self.path, "No stored record yet");
                return Ok(None);
            }
            Err(e) => {
                return Err(ScrapingError::StorageError(format!("Failed to read {:?}: {}", self.path, e)));
            }
        };

        let stored = serde_json::from_str(&content)
            .map_err(|e| ScrapingError::StorageError(format!("Corrupt record in {:?}: {}", self.path, e)))?;
        Ok(Some(stored))
    }
}

#[derive(Default)]
pub struct MemoryRecordStore {
    slot: RwLock<Option<StoredRecord>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn upsert(&self, record: &ScrapeRecord) -> Result<StoredRecord> {
        let stored = StoredRecord {
            scraped_at: Utc::now(),
            record: record.clone(),
        };
        *self.slot.write().await = Some(stored.clone());
        Ok(stored)
    }

    async fn load(&self) -> Result<Option<StoredRecord>> {
        Ok(self.slot.read().await.clone())
    }
}
