use std::cmp::Ordering;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use super::{record_file_name, StoredEntry};
use crate::error::{ArchiveError, Result};

/// Directory-backed store / 基于目录的存储
///
/// Blocking std IO; async callers go through `spawn_blocking`.
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Get root directory / 获取根目录
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Deterministic path of the record for `id` / 记录路径
    pub fn path_for(&self, id: u32) -> PathBuf {
        self.root.join(record_file_name(id))
    }

    /// Create the root directory if missing / 确保目录存在
    pub fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.root)?;
        Ok(())
    }

    /// Persist `bytes` as the record for `id`, replacing any previous one / 写入记录
    ///
    /// The payload goes to a temporary file in the same directory first and is
    /// renamed into place only once fully written, so a failed write never
    /// leaves a truncated record behind.
    pub fn write(&self, id: u32, bytes: &[u8]) -> io::Result<PathBuf> {
        let dest = self.path_for(id);

        let mut tmp = tempfile::Builder::new()
            .prefix(".")
            .suffix(".part")
            .tempfile_in(&self.root)?;
        tmp.write_all(bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&dest).map_err(|e| e.error)?;

        Ok(dest)
    }

    /// Lazily walk every stored file / 遍历所有记录
    ///
    /// Entries come back in natural file-name order within each directory, so
    /// `9999.json` is yielded before `10000.json`.
    pub fn list(&self) -> Entries {
        let walker = WalkDir::new(&self.root)
            .sort_by(|a, b| compare_names(a.file_name(), b.file_name()))
            .into_iter();
        Entries { walker }
    }
}

fn compare_names(a: &std::ffi::OsStr, b: &std::ffi::OsStr) -> Ordering {
    natord::compare(&a.to_string_lossy(), &b.to_string_lossy())
}

/// Iterator returned by [`LocalStore::list`] / 记录迭代器
pub struct Entries {
    walker: walkdir::IntoIter,
}

impl Iterator for Entries {
    type Item = Result<StoredEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.walker.next()? {
                Ok(entry) => entry,
                Err(e) => return Some(Err(ArchiveError::Traversal(e))),
            };
            if entry.file_type().is_dir() {
                continue;
            }

            let path = entry.into_path();
            return Some(match fs::read(&path) {
                Ok(bytes) => Ok(StoredEntry { path, bytes }),
                Err(source) => Err(ArchiveError::Read { path, source }),
            });
        }
    }
}
