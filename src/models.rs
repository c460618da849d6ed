use bytes::Bytes;
use serde::{Deserialize, Deserializer, Serialize};

/// Comic metadata as served by `/{num}/info.0.json` / 漫画元数据
///
/// Only the fields used for searching are modelled; anything else in the
/// payload is ignored. Missing or `null` fields fall back to their defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Comic {
    #[serde(deserialize_with = "null_as_default")]
    pub num: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub safe_title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub transcript: String,
    #[serde(deserialize_with = "null_as_default")]
    pub alt: String,
}

/// `null` 视为默认值
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl Comic {
    /// Parse a stored or fetched payload / 解析 JSON 负载
    pub fn from_slice(payload: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(payload)
    }

    /// Lower-cased text the search engine matches against / 用于搜索的小写文本
    ///
    /// Fields are joined with a newline so a term can never match across the
    /// boundary of two fields by accident.
    pub fn searchable_text(&self) -> String {
        [
            self.title.as_str(),
            self.safe_title.as_str(),
            self.transcript.as_str(),
            self.alt.as_str(),
        ]
        .join("\n")
        .to_lowercase()
    }
}

/// Result of one fetch attempt / 单次获取结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// 200, body written to the store verbatim
    Success(Bytes),
    /// 404, the id does not exist and is skipped
    NotFound,
    /// Network error, unexpected status or local write failure; retried
    TransientFailure(String),
}
