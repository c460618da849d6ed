//! Search engine - sequential scan over the store / 搜索引擎
//!
//! No index: every stored record is read, parsed and matched on each call.
//! - Records that fail to parse are treated as empty and never match
//!   / 解析失败的记录视为空记录
//! - A read or traversal error aborts the whole search / 读取错误立即终止

use super::query::SearchQuery;
use crate::error::Result;
use crate::models::Comic;
use crate::storage::LocalStore;

/// Scan statistics / 扫描统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    pub scanned: usize,
    pub malformed: usize,
    pub matched: usize,
}

/// Search the store, calling `on_match` with each matching comic number as
/// soon as it is found, in traversal order / 流式报告匹配结果
pub fn search<F>(store: &LocalStore, query: &SearchQuery, mut on_match: F) -> Result<SearchStats>
where
    F: FnMut(u32),
{
    let mut stats = SearchStats::default();
    if query.is_empty() {
        return Ok(stats);
    }

    for entry in store.list() {
        let entry = entry?;
        stats.scanned += 1;

        let comic = match Comic::from_slice(&entry.bytes) {
            Ok(c) => c,
            Err(e) => {
                tracing::debug!("Skipping unparsable record {:?}: {}", entry.path, e);
                stats.malformed += 1;
                Comic::default()
            }
        };

        if query.matches(&comic.searchable_text()) {
            stats.matched += 1;
            on_match(comic.num);
        }
    }

    Ok(stats)
}
