//! Application configuration module / 应用配置模块
//!
//! Configuration is an explicit value: loaded from an optional JSON file,
//! overridden by command line flags, validated, then handed to each component.
//! 配置作为显式值传递给各组件，不使用全局状态

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{ArchiveError, Result};

/// Default remote endpoint / 默认远程地址
pub const DEFAULT_BASE_URL: &str = "https://xkcd.com";

/// Application configuration / 应用配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Download configuration / 下载配置
    pub download: DownloadConfig,
    /// Storage configuration / 存储配置
    pub storage: StorageConfig,
}

/// Download configuration / 下载配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    /// Remote base URL, without the `/{id}/info.0.json` suffix / 远程基础地址
    pub base_url: String,
    /// Stop after this many failures in a row / 连续失败上限
    pub max_failures: u32,
    /// First id to request / 起始编号
    pub start_id: u32,
    /// Per-request timeout, `None` keeps the client default / 请求超时(秒)
    pub request_timeout_secs: Option<u64>,
    /// User-Agent header / 请求 UA
    pub user_agent: String,
}

/// Storage configuration / 存储配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Data directory path / 数据目录路径
    pub data_dir: String,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            max_failures: 5,
            start_id: 1,
            request_timeout_secs: None,
            user_agent: concat!("xkcd-archive/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: ".".to_string(),
        }
    }
}

impl DownloadConfig {
    /// URL of the metadata document for `id` / 获取指定编号的元数据地址
    pub fn resource_url(&self, id: u32) -> String {
        format!("{}/{}/info.0.json", self.base_url.trim_end_matches('/'), id)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

impl AppConfig {
    /// Get the full data directory path / 获取完整的数据目录路径
    pub fn get_data_dir(&self) -> PathBuf {
        PathBuf::from(&self.storage.data_dir)
    }

    /// Reject values the acquisition loop cannot work with / 校验配置
    pub fn validate(&self) -> Result<()> {
        if self.download.max_failures == 0 {
            return Err(ArchiveError::Config(
                "max_failures must be a positive integer".to_string(),
            ));
        }
        if self.download.start_id == 0 {
            return Err(ArchiveError::Config("start_id must be at least 1".to_string()));
        }
        let url = url::Url::parse(&self.download.base_url).map_err(|e| {
            ArchiveError::Config(format!("invalid base_url {:?}: {}", self.download.base_url, e))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ArchiveError::Config(format!(
                "base_url must be http or https, got {:?}",
                url.scheme()
            )));
        }
        if self.storage.data_dir.is_empty() {
            return Err(ArchiveError::Config("data_dir must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Load configuration from a JSON file / 从 JSON 文件加载配置
///
/// Sections and fields that are absent keep their defaults.
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        ArchiveError::Config(format!("failed to read config file {:?}: {}", path, e))
    })?;

    let config: AppConfig = serde_json::from_str(&content).map_err(|e| {
        ArchiveError::Config(format!("failed to parse config file {:?}: {}", path, e))
    })?;

    tracing::info!("Loaded configuration from {:?}", path);
    Ok(config)
}
