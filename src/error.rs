//! Error types shared by the store operations.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IssueError {
    /// A required argument was missing or malformed.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Filesystem failure while creating, reading or writing a document.
    #[error("{action} {}: {source}", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The index statistics could not be updated. Never fatal for an append.
    #[error("index not updated ({}): {reason}", .path.display())]
    IndexUpdate { path: PathBuf, reason: String },
}

impl IssueError {
    pub fn io(action: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        IssueError::Io {
            action,
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, IssueError>;
