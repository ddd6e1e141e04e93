//! 多处理器并发查询
//!
//! 同一个提示词同时发给所有档位，等全部完成后一起返回（fan-out / fan-in）

use futures::future::join_all;
use tokio::time::Instant;
use tracing::{error, info};

use crate::error::AppError;
use crate::models::{ProcessorTier, QueryResult};
use crate::services::QueryService;

/// 并发查询所有档位
///
/// 每个档位恰好对应一条结果；某个档位的任务崩溃不会影响其他档位
pub async fn query_all(
    service: &QueryService,
    prompt: &str,
    brand: &str,
    tiers: &[ProcessorTier],
) -> Vec<QueryResult> {
    if tiers.is_empty() {
        return Vec::new();
    }

    info!("[{}] 🚀 并发查询 {} 个处理器", brand, tiers.len());
    let started = Instant::now();

    let handles: Vec<_> = tiers
        .iter()
        .map(|&tier| {
            let service = service.clone();
            let prompt = prompt.to_string();
            let brand = brand.to_string();
            let handle =
                tokio::spawn(async move { service.query(&prompt, tier, &brand).await });
            (tier, handle)
        })
        .collect();

    let (tiers_in_flight, handles): (Vec<_>, Vec<_>) = handles.into_iter().unzip();
    let joined = join_all(handles).await;

    let results: Vec<QueryResult> = tiers_in_flight
        .into_iter()
        .zip(joined)
        .map(|(tier, outcome)| match outcome {
            Ok(result) => result,
            Err(e) => {
                error!("[{}/{}] 任务执行失败: {}", brand, tier, e);
                service.settle(
                    brand,
                    tier.into(),
                    started,
                    Err(AppError::Other(format!("查询任务异常终止: {}", e))),
                )
            }
        })
        .collect();

    let success = results.iter().filter(|r| r.is_success()).count();
    info!("[{}] ✓ 并发查询完成: 成功 {}/{}", brand, success, results.len());

    results
}
