// src/utils.rs
use anyhow::{Context, Result};
use std::path::Path;

use crate::error::ClientError;

pub const RESUME_EXTENSIONS: &[&str] = &["pdf", "txt"];

/// Get file extension in lowercase
pub fn get_file_extension(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
}

/// Reject resumes the service cannot read (anything but PDF or TXT)
pub fn check_resume_name(filename: &str) -> crate::error::Result<()> {
    match get_file_extension(filename) {
        Some(ext) if RESUME_EXTENSIONS.contains(&ext.as_str()) => Ok(()),
        _ => Err(ClientError::Validation(format!(
            "Unsupported resume format: {}. PDF or TXT files only.",
            filename
        ))),
    }
}

/// Content type sent with an uploaded resume
pub fn resume_content_type(filename: &str) -> Option<&'static str> {
    match get_file_extension(filename).as_deref() {
        Some("pdf") => Some("application/pdf"),
        Some("txt") => Some("text/plain"),
        _ => None,
    }
}

/// Ensure directory exists
pub async fn ensure_directory(path: &Path) -> Result<()> {
    if !path.exists() {
        tokio::fs::create_dir_all(path)
            .await
            .with_context(|| format!("Failed to create directory: {}", path.display()))?;
    }
    Ok(())
}

/// Read a text input file with proper error context
pub async fn read_file_content(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read file: {}", path.display()))
}

/// Write bytes, creating the parent directory if needed
pub async fn write_file_bytes(path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_directory(parent).await?;
    }

    tokio::fs::write(path, content)
        .await
        .with_context(|| format!("Failed to write file: {}", path.display()))
}
