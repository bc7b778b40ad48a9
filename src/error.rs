//! Error types for loading and merging tables

use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConflictPolicy;

/// Errors produced while loading or merging tables
#[derive(Debug, Error)]
pub enum MergeError {
    #[error("Failed to parse {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    #[error("Key column '{column}' not found in table {table}")]
    MissingKeyColumn { column: String, table: usize },

    #[error("At least two tables are required to merge, got {found}")]
    EmptyInput { found: usize },

    #[error("Joining on {on:?} would produce the column '{column}' twice")]
    DuplicateColumn { column: String, on: Vec<String> },

    #[error("Conflict policy '{policy}' is not supported yet")]
    UnimplementedPolicy { policy: ConflictPolicy },

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MergeError {
    pub(crate) fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        MergeError::Parse {
            path: path.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, MergeError>;
