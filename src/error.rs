use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TinyError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("File is empty: {0}")]
    EmptyFile(PathBuf),

    #[error("Upload failed: {0}")]
    Upload(String),

    #[error("Invalid response: {0}")]
    Parse(String),

    #[error("Download failed: {0}")]
    Download(String),

    #[error("Invalid batch size: {0}. Must be at least 1")]
    InvalidBatchSize(usize),

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),

    #[error("Walkdir error: {0}")]
    WalkdirError(#[from] walkdir::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Cannot back up {0}: not a directory")]
    BackupSourceNotDirectory(PathBuf),
}

pub type Result<T> = std::result::Result<T, TinyError>;
