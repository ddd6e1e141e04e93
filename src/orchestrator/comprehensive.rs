//! 综合测试 - 编排层
//!
//! 每个品牌选一个问题，依次在每个档位上查询（串行，相邻两次之间固定停顿），
//! 提取组件后汇总成分析报告。

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{error, info};

use crate::models::{BenchmarkRecord, QueryResult, RunPlan};
use crate::report::Report;
use crate::services::prompt_builder::{self, QuestionChoice};
use crate::services::{QueryService, ResultSaver};
use crate::utils::logging;

/// 综合测试的输出
#[derive(Debug)]
pub struct ComprehensiveOutcome {
    pub records: Vec<BenchmarkRecord>,
    pub report: Report,
    pub detailed_results_file: PathBuf,
    pub analysis_report_file: PathBuf,
}

/// 逐个品牌、逐个档位地执行查询
pub async fn run_benchmark(
    service: &QueryService,
    plan: &RunPlan,
    throttle: Duration,
) -> Vec<BenchmarkRecord> {
    info!(
        "开始综合测试: {} 个品牌 × {} 个处理器",
        plan.brands.len(),
        plan.processors.len()
    );

    let mut records = Vec::with_capacity(plan.brands.len() * plan.processors.len());

    for (index, brand) in plan.brands.iter().enumerate() {
        let choice = QuestionChoice::rotate(index);
        let question = choice.question_for(brand);
        let prompt = prompt_builder::build(brand, choice.template);

        logging::log_benchmark_brand(brand, choice.category, &question);

        for tier in &plan.processors {
            info!("[{}/{}] 开始测试", brand, tier);

            let result = service.query(&prompt, *tier, brand).await;
            let record = BenchmarkRecord::new(result, choice.category, question.as_str(), prompt.as_str());
            log_outcome(&record);
            records.push(record);

            tokio::time::sleep(throttle).await;
        }
    }

    records
}

fn log_outcome(record: &BenchmarkRecord) {
    let result = &record.result;
    if result.is_success() {
        info!(
            "✓ {}: 成功 (耗时: {:.2}s, 成本: ${:.3}, 组件提取: {})",
            result.processor,
            result.latency_seconds,
            result.cost_usd,
            record.widgets.extraction_success
        );
    } else {
        error!(
            "✗ {}: 失败 - {}",
            result.processor,
            result.error.as_deref().unwrap_or("unknown error")
        );
    }
}

/// 执行综合测试，保存明细和分析报告
pub async fn run_comprehensive(
    service: &QueryService,
    plan: &RunPlan,
    throttle: Duration,
) -> Result<ComprehensiveOutcome> {
    let records = run_benchmark(service, plan, throttle).await;

    let results: Vec<QueryResult> = records.iter().map(|r| r.result.clone()).collect();
    let report = Report::summarize_with_groups(
        &results,
        service.costs(),
        &plan.processors,
        &plan.brands,
    );

    let saver = ResultSaver::new(&plan.output_dir);
    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S").to_string();

    let detailed_results_file = saver
        .save_results(&records, Some(&format!("detailed_results_{}.json", timestamp)))
        .await
        .context("保存测试明细失败")?;
    info!("测试明细已保存至: {}", detailed_results_file.display());

    let analysis_report_file = saver
        .save_document(&report, &format!("analysis_report_{}.json", timestamp))
        .await
        .context("保存分析报告失败")?;
    info!("分析报告已保存至: {}", analysis_report_file.display());

    logging::log_report(&report);

    Ok(ComprehensiveOutcome {
        records,
        report,
        detailed_results_file,
        analysis_report_file,
    })
}
