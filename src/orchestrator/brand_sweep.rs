//! 品牌扫描 - 编排层
//!
//! 按顺序处理每个品牌：构建报告提示词 → 并发查询所有档位 → 保存该品牌的结果。
//! 全部品牌完成后保存合并文件 `all_results.json`。

use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::error::{AppError, AppResult};
use crate::models::{ProcessorSlot, ProcessorTier, QueryResult, RunPlan};
use crate::orchestrator::fan_out::query_all;
use crate::services::{prompt_builder, query_parser, QueryService, ResultSaver};
use crate::utils::logging;

pub const COMBINED_RESULTS_FILE: &str = "all_results.json";

/// 一次品牌扫描的汇总
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub total_brands: usize,
    pub total_processors: usize,
    pub total_queries: usize,
    pub successful_queries: usize,
    pub failed_queries: usize,
    pub results: Vec<QueryResult>,
}

impl RunSummary {
    fn new(total_brands: usize, total_processors: usize, results: Vec<QueryResult>) -> Self {
        let successful_queries = results.iter().filter(|r| r.is_success()).count();
        Self {
            total_brands,
            total_processors,
            total_queries: results.len(),
            successful_queries,
            failed_queries: results.len() - successful_queries,
            results,
        }
    }
}

/// 处理单个品牌
///
/// 品牌级别的失败会变成一条 processor = unknown 的错误记录
pub async fn process_brand(
    service: &QueryService,
    brand: &str,
    tiers: &[ProcessorTier],
) -> Vec<QueryResult> {
    match try_process_brand(service, brand, tiers).await {
        Ok(results) => results,
        Err(e) => {
            error!("[{}] ❌ 处理品牌失败: {}", brand, e);
            vec![QueryResult::failed(
                brand,
                ProcessorSlot::Unknown,
                e.to_string(),
                0.0,
                0.0,
            )]
        }
    }
}

async fn try_process_brand(
    service: &QueryService,
    brand: &str,
    tiers: &[ProcessorTier],
) -> AppResult<Vec<QueryResult>> {
    if brand.trim().is_empty() {
        return Err(AppError::Other("品牌名不能为空".to_string()));
    }
    info!("[{}] 开始处理品牌", brand);
    info!(
        "[{}] 检索范围: {}",
        brand,
        query_parser::narrative(&prompt_builder::brand_query(brand))
    );

    let prompt = prompt_builder::brand_report(brand);
    info!("[{}] 已生成提示词 ({} 字符)", brand, prompt.len());

    let results = query_all(service, &prompt, brand, tiers).await;
    info!("[{}] 全部查询完成", brand);

    Ok(results)
}

/// 依次处理所有品牌
///
/// 保存失败只记录日志，不会中断其他品牌
pub async fn process_all_brands(service: &QueryService, plan: &RunPlan) -> RunSummary {
    logging::log_run_start(&plan.brands, &plan.processors);

    let saver = ResultSaver::new(&plan.output_dir);
    let mut all_results = Vec::new();

    for (index, brand) in plan.brands.iter().enumerate() {
        logging::log_brand_start(index + 1, plan.brands.len(), brand);

        let brand_results = process_brand(service, brand, &plan.processors).await;

        if let Err(e) = saver.save_brand_results(brand, &brand_results).await {
            error!("[{}] 保存品牌结果失败: {}", brand, e);
        }

        all_results.extend(brand_results);
    }

    match saver
        .save_results(&all_results, Some(COMBINED_RESULTS_FILE))
        .await
    {
        Ok(path) => info!("📁 全部结果已保存至 {}", path.display()),
        Err(e) => error!("保存合并结果失败: {}", e),
    }

    let summary = RunSummary::new(plan.brands.len(), plan.processors.len(), all_results);
    logging::log_run_summary(&summary);
    summary
}
