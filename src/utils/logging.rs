/// 日志工具模块
///
/// 提供日志格式化和输出的辅助函数
use tracing::info;

use crate::models::ProcessorTier;
use crate::orchestrator::RunSummary;
use crate::report::{AggregateStats, Report};

/// 记录品牌扫描的启动信息
///
/// # 参数
/// - `brands`: 待测品牌
/// - `processors`: 待测档位
pub fn log_run_start(brands: &[String], processors: &[ProcessorTier]) {
    let names: Vec<&str> = processors.iter().map(|p| p.as_str()).collect();
    info!("{}", "=".repeat(60));
    info!("🚀 Parallel AI 品牌扫描启动");
    info!(
        "开始时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("🏷️  品牌 ({}): {}", brands.len(), brands.join(", "));
    info!("⚙️  处理器 ({}): {}", processors.len(), names.join(", "));
    info!("{}", "=".repeat(60));
}

/// 记录单个品牌开始处理
pub fn log_brand_start(position: usize, total: usize, brand: &str) {
    info!("\n{}", "=".repeat(60));
    info!("📦 处理品牌 {}/{}: {}", position, total, brand);
    info!("{}", "=".repeat(60));
}

/// 记录综合测试中当前品牌选中的问题
pub fn log_benchmark_brand(brand: &str, category: &str, question: &str) {
    info!("\n{}", "─".repeat(60));
    info!("🏷️  品牌: {}", brand);
    info!("📂 分类: {}", category);
    info!("❓ 问题: {}", truncate_text(question, 120));
    info!("{}", "─".repeat(60));
}

/// 打印品牌扫描的最终统计
pub fn log_run_summary(summary: &RunSummary) {
    info!("\n{}", "=".repeat(60));
    info!("📊 品牌扫描完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("🏷️  品牌数: {}", summary.total_brands);
    info!("⚙️  处理器数: {}", summary.total_processors);
    info!("✅ 成功: {}/{}", summary.successful_queries, summary.total_queries);
    info!("❌ 失败: {}", summary.failed_queries);
    info!("{}", "=".repeat(60));
}

/// 打印汇总报告
pub fn log_report(report: &Report) {
    info!("\n{}", "=".repeat(60));
    info!("📊 测试报告");
    info!("{}", "=".repeat(60));
    log_stats("总体", &report.summary);

    info!("\n按处理器:");
    for (processor, stats) in &report.processor_stats {
        log_stats(processor.as_str(), &stats.stats);
    }

    info!("\n按品牌:");
    for (brand, stats) in &report.brand_stats {
        log_stats(brand, stats);
    }
    info!("{}", "=".repeat(60));
}

fn log_stats(label: &str, stats: &AggregateStats) {
    info!(
        "  {:<12} 成功 {}/{} ({:.1}%) | 组件提取 {:.1}% | 平均耗时 {:.2}s | 成本 ${:.2}",
        label,
        stats.successful_tests,
        stats.total_tests,
        stats.success_rate * 100.0,
        stats.widget_extraction_rate * 100.0,
        stats.average_latency_seconds,
        stats.total_cost_usd
    );
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度（按字符计）
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
