//! Download module / 下载模块
//!
//! Walks comic ids upwards from the start id, one request at a time:
//! - Success: counter reset, next id / 成功：计数清零，下一个
//! - NotFound: counter +1, next id / 不存在：计数+1，跳过
//! - TransientFailure: counter +1, same id again / 临时失败：计数+1，重试
//!
//! The loop stops once the consecutive failure counter reaches the cap; that
//! is its only exit.

pub mod fetcher;

pub use fetcher::HttpFetcher;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::config::DownloadConfig;
use crate::models::Outcome;
use crate::storage::LocalStore;

/// Fetch-and-store seam driven by the loop / 获取并存储
#[async_trait]
pub trait Acquire: Send + Sync {
    /// Request `id` and, on success, persist the payload into `store`.
    async fn acquire(&self, id: u32, store: &LocalStore) -> Outcome;
}

/// What the loop did with one outcome / 单步动作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Stored,
    Skipped,
    Retry,
}

/// Loop state / 循环状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcquisitionState {
    current_id: u32,
    consecutive_failures: u32,
    max_failures: u32,
    exhausted: bool,
}

impl AcquisitionState {
    pub fn new(start_id: u32, max_failures: u32) -> Self {
        Self {
            current_id: start_id.max(1),
            consecutive_failures: 0,
            max_failures: max_failures.max(1),
            exhausted: false,
        }
    }

    pub fn current_id(&self) -> u32 {
        self.current_id
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    pub fn max_failures(&self) -> u32 {
        self.max_failures
    }

    /// Apply the outcome for `current_id` / 根据结果转移状态
    pub fn apply(&mut self, outcome: &Outcome) -> Step {
        match outcome {
            Outcome::Success(_) => {
                self.consecutive_failures = 0;
                self.advance();
                Step::Stored
            }
            Outcome::NotFound => {
                self.consecutive_failures += 1;
                self.advance();
                Step::Skipped
            }
            Outcome::TransientFailure(_) => {
                self.consecutive_failures += 1;
                Step::Retry
            }
        }
    }

    /// Terminal state: failure cap reached / 是否停止
    pub fn is_stopped(&self) -> bool {
        self.consecutive_failures >= self.max_failures || self.exhausted
    }

    fn advance(&mut self) {
        match self.current_id.checked_add(1) {
            Some(next) => self.current_id = next,
            None => self.exhausted = true,
        }
    }
}

/// Summary of one acquisition run / 下载统计
#[derive(Debug, Clone)]
pub struct AcquisitionReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Total requests issued, retries included
    pub attempts: u64,
    pub stored: u64,
    pub skipped: u64,
    pub retried: u64,
    /// Last id requested
    pub last_id: u32,
    /// Counter value at the time the loop stopped
    pub consecutive_failures: u32,
}

/// Run the acquisition loop until the failure cap is reached / 运行下载循环
pub async fn run<A>(source: &A, store: &LocalStore, config: &DownloadConfig) -> AcquisitionReport
where
    A: Acquire + ?Sized,
{
    let mut state = AcquisitionState::new(config.start_id, config.max_failures);
    let started_at = Utc::now();
    let mut report = AcquisitionReport {
        started_at,
        finished_at: started_at,
        attempts: 0,
        stored: 0,
        skipped: 0,
        retried: 0,
        last_id: state.current_id(),
        consecutive_failures: 0,
    };

    tracing::info!(
        "Download: dir {:?}, max failures {}, starting at #{}",
        store.root(),
        state.max_failures(),
        state.current_id()
    );

    loop {
        let id = state.current_id();
        tracing::info!("Trying XKCD #{}", id);

        let outcome = source.acquire(id, store).await;
        report.attempts += 1;
        report.last_id = id;

        match state.apply(&outcome) {
            Step::Stored => {
                report.stored += 1;
                tracing::info!("#{} OK", id);
            }
            Step::Skipped => {
                report.skipped += 1;
                tracing::warn!(
                    "#{} not found, error {} of {}, skip",
                    id,
                    state.consecutive_failures(),
                    state.max_failures()
                );
            }
            Step::Retry => {
                report.retried += 1;
                if let Outcome::TransientFailure(reason) = &outcome {
                    tracing::warn!(
                        "#{} failed ({}), error {} of {}, retry",
                        id,
                        reason,
                        state.consecutive_failures(),
                        state.max_failures()
                    );
                }
            }
        }

        if state.is_stopped() {
            break;
        }
    }

    report.finished_at = Utc::now();
    report.consecutive_failures = state.consecutive_failures();
    tracing::info!(
        "Max error reached, stopping: {} stored, {} skipped, {} retried in {}s",
        report.stored,
        report.skipped,
        report.retried,
        (report.finished_at - report.started_at).num_seconds()
    );
    report
}
