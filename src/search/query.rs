//! Search query / 搜索查询

/// Lower-cased substring terms, all of which must match / 所有词都需命中
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    terms: Vec<String>,
}

impl SearchQuery {
    pub fn new<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            terms: terms
                .into_iter()
                .map(|t| t.as_ref().to_lowercase())
                .collect(),
        }
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// An empty query matches nothing / 空查询不匹配任何记录
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Substring containment of every term in already lower-cased `text`.
    ///
    /// Callers check [`SearchQuery::is_empty`] first; on its own an empty
    /// query is vacuously true here.
    pub fn matches(&self, text: &str) -> bool {
        self.terms.iter().all(|term| text.contains(term.as_str()))
    }
}
