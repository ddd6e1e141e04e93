//! 统计汇总
//!
//! 对一组查询结果计算全局、按处理器、按品牌三种口径的统计。
//! 所有比率和平均值在分母为 0 时取 0；数值不做四舍五入，只在打印时格式化。

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::{CostTable, ProcessorSlot, ProcessorTier, QueryResult};

/// 一组结果的统计
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregateStats {
    pub total_tests: usize,
    pub successful_tests: usize,
    pub failed_tests: usize,
    pub success_rate: f64,
    /// 只统计成功的结果
    pub successful_widget_extractions: usize,
    pub widget_extraction_rate: f64,
    /// 只统计成功的结果
    pub total_latency_seconds: f64,
    pub average_latency_seconds: f64,
    /// 统计全部结果，失败的查询同样计费
    pub total_cost_usd: f64,
}

impl AggregateStats {
    pub fn from_results<'a>(results: impl IntoIterator<Item = &'a QueryResult>) -> Self {
        let mut stats = Self::default();

        for result in results {
            stats.total_tests += 1;
            stats.total_cost_usd += result.cost_usd;

            if result.is_success() {
                stats.successful_tests += 1;
                stats.total_latency_seconds += result.latency_seconds;
                if result.widgets().extraction_success {
                    stats.successful_widget_extractions += 1;
                }
            }
        }

        stats.failed_tests = stats.total_tests - stats.successful_tests;
        stats.success_rate = ratio(stats.successful_tests as f64, stats.total_tests);
        stats.widget_extraction_rate = ratio(
            stats.successful_widget_extractions as f64,
            stats.successful_tests,
        );
        stats.average_latency_seconds = ratio(stats.total_latency_seconds, stats.successful_tests);
        stats
    }
}

fn ratio(numerator: f64, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator / denominator as f64
    }
}

/// 单个处理器的统计
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessorStats {
    #[serde(flatten)]
    pub stats: AggregateStats,
    pub cost_per_test: f64,
}

/// 汇总报告
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub summary: AggregateStats,
    /// 按档位顺序排列，`unknown` 在最后
    pub processor_stats: BTreeMap<ProcessorSlot, ProcessorStats>,
    pub brand_stats: BTreeMap<String, AggregateStats>,
}

impl Report {
    /// 汇总；只包含结果中出现过的处理器和品牌
    pub fn summarize(results: &[QueryResult], costs: &CostTable) -> Self {
        Self::summarize_with_groups(results, costs, &[], &[])
    }

    /// 汇总，并保证 `tiers` 和 `brands` 中的每一项都出现在报告里
    ///
    /// 没有结果的分组统计全部为 0
    pub fn summarize_with_groups(
        results: &[QueryResult],
        costs: &CostTable,
        tiers: &[ProcessorTier],
        brands: &[String],
    ) -> Self {
        let mut by_processor: BTreeMap<ProcessorSlot, Vec<&QueryResult>> = tiers
            .iter()
            .map(|tier| (ProcessorSlot::Tier(*tier), Vec::new()))
            .collect();
        let mut by_brand: BTreeMap<String, Vec<&QueryResult>> = brands
            .iter()
            .map(|brand| (brand.clone(), Vec::new()))
            .collect();

        for result in results {
            by_processor.entry(result.processor).or_default().push(result);
            by_brand.entry(result.brand.clone()).or_default().push(result);
        }

        let processor_stats = by_processor
            .into_iter()
            .map(|(slot, group)| {
                let stats = ProcessorStats {
                    stats: AggregateStats::from_results(group),
                    cost_per_test: costs.cost_of(slot),
                };
                (slot, stats)
            })
            .collect();

        let brand_stats = by_brand
            .into_iter()
            .map(|(brand, group)| (brand, AggregateStats::from_results(group)))
            .collect();

        Self {
            summary: AggregateStats::from_results(results),
            processor_stats,
            brand_stats,
        }
    }
}
