pub mod config;
pub mod error;
pub mod models;
pub mod storage;
pub mod search;
pub mod download;

pub use error::{ArchiveError, Result};
