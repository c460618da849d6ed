//! Error types / 错误类型

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Library error / 库错误类型
///
/// Per-id fetch problems never show up here: they are folded into
/// [`crate::models::Outcome`] and handled by the acquisition loop.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
    #[error("store traversal failed: {0}")]
    Traversal(#[from] walkdir::Error),
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, ArchiveError>;
