//! Error types for replaydeck-core
//!
//! Failures are split into two groups: errors that abort an operation
//! (returned as [`CoreError`]) and per-item failures that are recorded in a
//! [`FailureLog`] while the surrounding walk carries on.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for replaydeck operations
#[derive(Error, Debug)]
pub enum CoreError {
    // ===================
    // IO Errors
    // ===================
    #[error("Failed to read file: {path}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("Failed to read directory: {path}")]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid path: {path} - {reason}")]
    InvalidPath { path: PathBuf, reason: String },

    #[error("Access denied: {path} is outside the browsing root")]
    AccessDenied { path: PathBuf },

    // ===================
    // Parse Errors
    // ===================
    #[error("Failed to parse JSON in {path}: {message}")]
    JsonParse {
        path: PathBuf,
        message: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize analysis for {path}")]
    JsonSerialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    // ===================
    // Decoder Errors
    // ===================
    #[error("Failed to parse replay {path}: {message}")]
    Decode { path: PathBuf, message: String },

    #[error("No replay decoder configured (cannot analyze {path})")]
    DecoderUnavailable { path: PathBuf },

    // ===================
    // Config Errors
    // ===================
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

impl CoreError {
    /// Map an I/O error on `path` to `FileNotFound` or `FileRead`.
    pub fn from_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            CoreError::FileNotFound { path }
        } else {
            CoreError::FileRead { path, source }
        }
    }

    /// True for errors caused by a missing file or directory
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            CoreError::FileNotFound { .. } | CoreError::DirectoryNotFound { .. }
        )
    }

    /// True for replay content the decoder could not handle
    pub fn is_decode_failure(&self) -> bool {
        matches!(
            self,
            CoreError::Decode { .. } | CoreError::DecoderUnavailable { .. }
        )
    }
}

/// A single per-item failure recorded during a walk
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ItemFailure {
    /// Path of the file (or directory) that failed
    pub path: PathBuf,
    pub message: String,
}

/// Per-item failures collected while a bulk operation keeps going
///
/// Nothing recorded here aborts the operation that produced it.
#[derive(Debug, Default, Clone, serde::Serialize)]
#[serde(transparent)]
pub struct FailureLog {
    pub failures: Vec<ItemFailure>,
}

impl FailureLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, path: impl Into<PathBuf>, message: impl Into<String>) {
        self.failures.push(ItemFailure {
            path: path.into(),
            message: message.into(),
        });
    }

    pub fn len(&self) -> usize {
        self.failures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }
}
