// src/core/credential_store.rs
//! Durable storage for the single access credential.
//!
//! No validation happens here: whether a stored code is accepted is only
//! known once the service answers an authenticated call.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::RwLock;
use tracing::{debug, info, warn};

use crate::error::{ClientError, Result};

pub trait CredentialStore: Send + Sync {
    fn get(&self) -> Option<String>;
    fn set(&self, credential: &str) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

/// On-disk record; the field name is the persisted key.
#[derive(Debug, Serialize, Deserialize)]
struct CredentialRecord {
    app_access_code: String,
    stored_at: DateTime<Utc>,
}

/// Credential persisted as a small JSON file so it survives restarts.
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl CredentialStore for FileCredentialStore {
    fn get(&self) -> Option<String> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!(
                    "Failed to read credential file {}: {}",
                    self.path.display(),
                    e
                );
                return None;
            }
        };

        match serde_json::from_str::<CredentialRecord>(&content) {
            Ok(record) if !record.app_access_code.is_empty() => Some(record.app_access_code),
            Ok(_) => None,
            Err(e) => {
                warn!(
                    "Ignoring unreadable credential file {}: {}",
                    self.path.display(),
                    e
                );
                None
            }
        }
    }

    fn set(&self, credential: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                ClientError::Storage(format!(
                    "Failed to create directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let record = CredentialRecord {
            app_access_code: credential.to_string(),
            stored_at: Utc::now(),
        };
        let content = serde_json::to_string_pretty(&record)
            .map_err(|e| ClientError::Storage(e.to_string()))?;

        std::fs::write(&self.path, content).map_err(|e| {
            ClientError::Storage(format!("Failed to write {}: {}", self.path.display(), e))
        })?;

        info!("Stored access code at {}", self.path.display());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                info!("Cleared stored access code");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No stored access code to clear");
                Ok(())
            }
            Err(e) => Err(ClientError::Storage(format!(
                "Failed to remove {}: {}",
                self.path.display(),
                e
            ))),
        }
    }
}

/// Process-local store; nothing outlives the value.
#[derive(Default)]
pub struct MemoryCredentialStore {
    credential: RwLock<Option<String>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_credential(credential: &str) -> Self {
        Self {
            credential: RwLock::new(Some(credential.to_string())),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self) -> Option<String> {
        self.credential
            .read()
            .map(|guard| guard.clone())
            .unwrap_or(None)
    }

    fn set(&self, credential: &str) -> Result<()> {
        let mut guard = self
            .credential
            .write()
            .map_err(|_| ClientError::Storage("credential lock poisoned".to_string()))?;
        *guard = Some(credential.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let mut guard = self
            .credential
            .write()
            .map_err(|_| ClientError::Storage("credential lock poisoned".to_string()))?;
        *guard = None;
        Ok(())
    }
}
