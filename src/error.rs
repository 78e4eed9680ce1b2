// file: src/error.rs
// description: Custom error types and result type aliases
// reference: https://docs.rs/thiserror

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SyncError>;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("SSH verification failed: {0}")]
    SshVerification(String),

    #[error("Failed to spawn {program}: {source}")]
    CommandSpawn {
        program: String,
        source: std::io::Error,
    },

    #[error("Workspace directory error for {path}: {source}")]
    Workspace {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Validation error: {0}")]
    Validation(String),
}
