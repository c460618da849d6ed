//! Local record store / 本地记录存储
//!
//! One file per comic, named after its zero-padded id. The store is written by
//! the download loop and read by the search engine, never both at once.
//! 下载与搜索不会同时访问存储目录，因此不加锁

pub mod local;

pub use local::{Entries, LocalStore};

use std::path::PathBuf;

/// File extension of stored records / 存储文件扩展名
pub const RECORD_EXTENSION: &str = "json";

/// Minimum width of the zero-padded id in file names / 文件名中编号的最小宽度
pub const ID_WIDTH: usize = 4;

/// One stored record as read back from disk / 从磁盘读取的记录
#[derive(Debug, Clone)]
pub struct StoredEntry {
    pub path: PathBuf,
    pub bytes: Vec<u8>,
}

/// File name for `id`, e.g. `0042.json` / 生成记录文件名
pub fn record_file_name(id: u32) -> String {
    format!("{:0width$}.{}", id, RECORD_EXTENSION, width = ID_WIDTH)
}
