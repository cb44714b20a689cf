//! Store error types
//!
//! Only the write path produces these: the read path absorbs every failure
//! and falls back to an empty document.

use std::path::PathBuf;
use thiserror::Error;

/// Failure while persisting a category store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("failed to create memory directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to create temporary file in {dir}: {source}")]
    TempFile {
        dir: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to serialize {collection} document: {source}")]
    Serialize {
        collection: &'static str,
        source: serde_json::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to replace {path}: {source}")]
    Persist {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to lock {path}: {source}")]
    Lock {
        path: PathBuf,
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, StoreError>;
