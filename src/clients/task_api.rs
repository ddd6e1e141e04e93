//! 远程 Task API 抽象
//!
//! 查询客户端只依赖这个 trait，HTTP 实现和测试用的假实现都实现它

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AppResult;
use crate::models::ProcessorTier;

/// 创建任务后返回的运行信息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRun {
    pub run_id: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub processor: Option<String>,
    #[serde(default)]
    pub error: Option<Value>,
}

/// 已完成任务的结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRunResult {
    pub run: TaskRun,
    #[serde(default)]
    pub output: Value,
}

/// 一次轮询的结果
#[derive(Debug, Clone, PartialEq)]
pub enum RunPoll {
    Completed(TaskRunResult),
    /// 在本次等待窗口内还没有完成
    Pending,
}

#[async_trait]
pub trait TaskApi: Send + Sync {
    /// 提交任务，返回运行 ID
    async fn create_run(&self, input: &str, processor: ProcessorTier) -> AppResult<TaskRun>;

    /// 等待任务结果，服务端最多挂起 `wait`
    async fn poll_result(&self, run_id: &str, wait: Duration) -> AppResult<RunPoll>;
}
