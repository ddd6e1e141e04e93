//! 查询服务 - 业务能力层
//!
//! 只负责"一个提示词 + 一个处理器"的查询：提交任务、等待结果、
//! 把任何失败都转换成 status = error 的结果记录

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{sleep, Instant};
use tracing::{debug, error, info};

use crate::clients::{RunPoll, TaskApi, TaskRunResult};
use crate::config::Config;
use crate::error::{ApiError, AppError, AppResult};
use crate::models::{CostTable, ProcessorSlot, ProcessorTier, QueryResult};

/// 等待策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    /// 单个任务的最长等待时间
    pub ceiling: Duration,
    /// 每次轮询让服务端挂起的最长时间
    pub poll_window: Duration,
    /// 未完成时下一次轮询前的停顿
    pub poll_interval: Duration,
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            ceiling: Duration::from_secs(3600),
            poll_window: Duration::from_secs(600),
            poll_interval: Duration::from_secs(5),
        }
    }
}

impl From<&Config> for WaitPolicy {
    fn from(config: &Config) -> Self {
        Self {
            ceiling: config.result_timeout(),
            poll_window: config.poll_window(),
            poll_interval: config.poll_interval(),
        }
    }
}

/// 查询服务
///
/// 可以廉价 clone，供并发任务各自持有
#[derive(Clone)]
pub struct QueryService {
    api: Arc<dyn TaskApi>,
    costs: Arc<CostTable>,
    wait: WaitPolicy,
}

impl QueryService {
    pub fn new(api: Arc<dyn TaskApi>, costs: CostTable, wait: WaitPolicy) -> Self {
        Self {
            api,
            costs: Arc::new(costs),
            wait,
        }
    }

    pub fn costs(&self) -> &CostTable {
        &self.costs
    }

    /// 查询单个处理器
    ///
    /// 永远返回一条结果记录，错误不会向上传播
    pub async fn query(&self, prompt: &str, tier: ProcessorTier, brand: &str) -> QueryResult {
        info!("[{}/{}] 🔍 开始查询", brand, tier);
        let started = Instant::now();
        let outcome = self.run_to_completion(prompt, tier, brand).await;
        self.settle(brand, tier.into(), started, outcome)
    }

    /// 把一次查询的结局统一转换成结果记录
    pub fn settle(
        &self,
        brand: &str,
        slot: ProcessorSlot,
        started: Instant,
        outcome: AppResult<TaskRunResult>,
    ) -> QueryResult {
        let latency = started.elapsed().as_secs_f64();
        let cost = self.costs.cost_of(slot);

        match outcome {
            Ok(result) => {
                info!("[{}/{}] ✓ 查询成功 (run: {}, 耗时: {:.2}s)", brand, slot, result.run.run_id, latency);
                QueryResult::succeeded(brand, slot, result.run.run_id, result.output, latency, cost)
            }
            Err(e) => {
                error!("[{}/{}] ❌ 查询失败: {}", brand, slot, e);
                QueryResult::failed(brand, slot, e.to_string(), latency, cost)
            }
        }
    }

    async fn run_to_completion(
        &self,
        prompt: &str,
        tier: ProcessorTier,
        brand: &str,
    ) -> AppResult<TaskRunResult> {
        let deadline = Instant::now() + self.wait.ceiling;

        let run = tokio::time::timeout_at(deadline, self.api.create_run(prompt, tier))
            .await
            .map_err(|_| timeout_error("<pending>", self.wait.ceiling))??;
        info!("[{}/{}] 任务已创建: {}", brand, tier, run.run_id);

        loop {
            let now = Instant::now();
            if now >= deadline {
                return Err(timeout_error(&run.run_id, self.wait.ceiling));
            }
            let window = self.wait.poll_window.min(deadline - now);

            debug!("[{}/{}] 轮询任务 {} (窗口: {}s)", brand, tier, run.run_id, window.as_secs());
            let poll = tokio::time::timeout_at(deadline, self.api.poll_result(&run.run_id, window))
                .await
                .map_err(|_| timeout_error(&run.run_id, self.wait.ceiling))??;

            match poll {
                RunPoll::Completed(result) => return Ok(result),
                RunPoll::Pending => {
                    debug!("[{}/{}] 任务 {} 尚未完成", brand, tier, run.run_id);
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    sleep(self.wait.poll_interval.min(remaining)).await;
                }
            }
        }
    }
}

fn timeout_error(run_id: &str, ceiling: Duration) -> AppError {
    AppError::Api(ApiError::Timeout {
        run_id: run_id.to_string(),
        waited_secs: ceiling.as_secs(),
    })
}

#[cfg(test)]
pub(crate) mod testing {
    //! 测试用的 Task API 假实现

    use std::collections::{HashMap, HashSet};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::{json, Value};

    use super::*;
    use crate::clients::TaskRun;

    /// 每个档位的预设行为
    #[derive(Clone)]
    pub enum Behavior {
        /// 第 n 次轮询时完成
        CompleteAfter(usize, Value),
        FailOnCreate(String),
        FailOnPoll(String),
        NeverComplete,
        Panic,
    }

    pub struct FakeTaskApi {
        behaviors: HashMap<ProcessorTier, Behavior>,
        runs: Mutex<HashMap<String, (ProcessorTier, usize)>>,
        next_id: AtomicUsize,
        pub created: Mutex<HashSet<ProcessorTier>>,
    }

    impl FakeTaskApi {
        pub fn new(behaviors: impl IntoIterator<Item = (ProcessorTier, Behavior)>) -> Self {
            Self {
                behaviors: behaviors.into_iter().collect(),
                runs: Mutex::new(HashMap::new()),
                next_id: AtomicUsize::new(1),
                created: Mutex::new(HashSet::new()),
            }
        }

        /// 所有档位都立即返回完整的三个组件
        pub fn all_succeed() -> Self {
            Self::new(
                ProcessorTier::ALL
                    .iter()
                    .map(|tier| (*tier, Behavior::CompleteAfter(1, widget_output()))),
            )
        }
    }

    pub fn widget_output() -> Value {
        json!({
            "type": "json",
            "content": {
                "media_segments": {"online": 12},
                "sentiment": {"positive": 0.7, "neutral": 0.2, "negative": 0.1},
                "platform_heat_spike_map": {"linkedin": "high"}
            },
            "basis": []
        })
    }

    #[async_trait]
    impl TaskApi for FakeTaskApi {
        async fn create_run(&self, _input: &str, processor: ProcessorTier) -> AppResult<TaskRun> {
            self.created.lock().unwrap().insert(processor);
            match self.behaviors.get(&processor) {
                Some(Behavior::FailOnCreate(msg)) => Err(AppError::Other(msg.clone())),
                Some(Behavior::Panic) => panic!("{} exploded", processor),
                None => Err(AppError::Other(format!("no behavior for {}", processor))),
                Some(_) => {
                    let id = format!("trun_{}", self.next_id.fetch_add(1, Ordering::SeqCst));
                    self.runs.lock().unwrap().insert(id.clone(), (processor, 0));
                    Ok(TaskRun {
                        run_id: id,
                        status: "queued".to_string(),
                        processor: Some(processor.to_string()),
                        error: None,
                    })
                }
            }
        }

        async fn poll_result(&self, run_id: &str, _wait: Duration) -> AppResult<RunPoll> {
            let (tier, polls) = {
                let mut runs = self.runs.lock().unwrap();
                let entry = runs
                    .get_mut(run_id)
                    .ok_or_else(|| AppError::Other(format!("unknown run {}", run_id)))?;
                entry.1 += 1;
                *entry
            };
            match self.behaviors.get(&tier) {
                Some(Behavior::CompleteAfter(n, output)) if polls >= *n => {
                    Ok(RunPoll::Completed(TaskRunResult {
                        run: TaskRun {
                            run_id: run_id.to_string(),
                            status: "completed".to_string(),
                            processor: Some(tier.to_string()),
                            error: None,
                        },
                        output: output.clone(),
                    }))
                }
                Some(Behavior::FailOnPoll(msg)) => Err(AppError::Other(msg.clone())),
                _ => Ok(RunPoll::Pending),
            }
        }
    }
}
