//! Search module - boolean full-text search over stored comics / 搜索模块
//!
//! Matching rules / 匹配规则：
//! - Searchable text is title, safe_title, transcript and alt joined by newlines, lower-cased
//! - A record matches when every term is a substring of that text (AND)
//! - No ranking, results are streamed in store traversal order

pub mod engine;
pub mod query;

pub use engine::{search, SearchStats};
pub use query::SearchQuery;
