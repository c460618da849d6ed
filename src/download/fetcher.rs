//! HTTP fetch-and-store / HTTP 获取并存储
//!
//! Status handling / 状态码处理:
//! - 200: full body read, then written to the store / 写入存储
//! - 404: not found / 不存在
//! - anything else, transport or write errors: transient / 临时失败

use async_trait::async_trait;
use reqwest::{Client, StatusCode};

use super::Acquire;
use crate::config::DownloadConfig;
use crate::error::Result;
use crate::models::Outcome;
use crate::storage::LocalStore;

/// Production [`Acquire`] implementation / 基于 reqwest 的实现
pub struct HttpFetcher {
    client: Client,
    config: DownloadConfig,
}

impl HttpFetcher {
    pub fn new(config: DownloadConfig) -> Result<Self> {
        let mut builder = Client::builder().user_agent(config.user_agent.clone());
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;
        Ok(Self { client, config })
    }

    /// Reuse an existing client / 复用已有客户端
    pub fn with_client(client: Client, config: DownloadConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl Acquire for HttpFetcher {
    async fn acquire(&self, id: u32, store: &LocalStore) -> Outcome {
        let url = self.config.resource_url(id);
        tracing::debug!("GET {}", url);

        let response = match self.client.get(&url).send().await {
            Ok(r) => r,
            Err(e) => return Outcome::TransientFailure(format!("request failed: {}", e)),
        };

        match response.status() {
            StatusCode::OK => {}
            StatusCode::NOT_FOUND => return Outcome::NotFound,
            status => return Outcome::TransientFailure(format!("unexpected status {}", status)),
        }

        let body = match response.bytes().await {
            Ok(b) => b,
            Err(e) => return Outcome::TransientFailure(format!("failed to read body: {}", e)),
        };

        // Use sync IO on the blocking pool / 使用同步IO
        let target = store.clone();
        let payload = body.clone();
        match tokio::task::spawn_blocking(move || target.write(id, &payload)).await {
            Ok(Ok(path)) => {
                tracing::debug!("Stored #{} at {:?} ({} bytes)", id, path, body.len());
                Outcome::Success(body)
            }
            Ok(Err(e)) => Outcome::TransientFailure(format!("failed to write record: {}", e)),
            Err(e) => Outcome::TransientFailure(format!("write task failed: {}", e)),
        }
    }
}
