use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::processor::ProcessorSlot;
use super::widgets::ExtractedWidgets;

/// 单次查询的状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryStatus {
    Success,
    Error,
}

/// 单次 "提示词 + 处理器" 查询的结果
///
/// 由查询客户端在请求结束时创建，之后不再修改
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub brand: String,
    pub processor: ProcessorSlot,
    pub run_id: Option<String>,
    /// 远程服务返回的原始输出
    pub output: Option<Value>,
    pub status: QueryStatus,
    /// 仅在 status = error 时存在
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub latency_seconds: f64,
    pub cost_usd: f64,
    pub timestamp: DateTime<Local>,
}

impl QueryResult {
    /// 成功结果
    ///
    /// 输出为 null 时按没有输出保存
    pub fn succeeded(
        brand: impl Into<String>,
        processor: ProcessorSlot,
        run_id: impl Into<String>,
        output: Value,
        latency_seconds: f64,
        cost_usd: f64,
    ) -> Self {
        Self {
            brand: brand.into(),
            processor,
            run_id: Some(run_id.into()),
            output: Some(output).filter(|v| !v.is_null()),
            status: QueryStatus::Success,
            error: None,
            latency_seconds: latency_seconds.max(0.0),
            cost_usd: cost_usd.max(0.0),
            timestamp: Local::now(),
        }
    }

    /// 失败结果
    pub fn failed(
        brand: impl Into<String>,
        processor: ProcessorSlot,
        error: impl Into<String>,
        latency_seconds: f64,
        cost_usd: f64,
    ) -> Self {
        Self {
            brand: brand.into(),
            processor,
            run_id: None,
            output: None,
            status: QueryStatus::Error,
            error: Some(error.into()),
            latency_seconds: latency_seconds.max(0.0),
            cost_usd: cost_usd.max(0.0),
            timestamp: Local::now(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == QueryStatus::Success
    }

    /// 从输出中提取三个组件；失败的结果一律视为提取失败
    pub fn widgets(&self) -> ExtractedWidgets {
        if self.is_success() {
            ExtractedWidgets::extract(self.output.as_ref())
        } else {
            ExtractedWidgets::empty()
        }
    }
}

/// 综合测试中的一条记录：查询结果 + 提示词上下文 + 提取出的组件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkRecord {
    #[serde(flatten)]
    pub result: QueryResult,
    pub category: String,
    pub question: String,
    pub prompt: String,
    pub widgets: ExtractedWidgets,
}

impl BenchmarkRecord {
    pub fn new(
        result: QueryResult,
        category: impl Into<String>,
        question: impl Into<String>,
        prompt: impl Into<String>,
    ) -> Self {
        let widgets = result.widgets();
        Self {
            result,
            category: category.into(),
            question: question.into(),
            prompt: prompt.into(),
            widgets,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProcessorTier;
    use serde_json::json;

    #[test]
    fn test_error_field_present_iff_error_status() {
        let ok = QueryResult::succeeded("BMW", ProcessorTier::Pro.into(), "trun_1", json!({}), 1.5, 0.1);
        let value = serde_json::to_value(&ok).unwrap();
        assert!(value.get("error").is_none());
        assert_eq!(value["status"], "success");
        assert_eq!(value["processor"], "pro");

        let err = QueryResult::failed("BMW", ProcessorSlot::Unknown, "boom", 0.0, 0.0);
        let value = serde_json::to_value(&err).unwrap();
        assert_eq!(value["error"], "boom");
        assert_eq!(value["status"], "error");
        assert_eq!(value["processor"], "unknown");
        assert!(value["run_id"].is_null());
    }

    #[test]
    fn test_negative_measurements_are_clamped() {
        let r = QueryResult::failed("BMW", ProcessorTier::Lite.into(), "x", -1.0, -0.5);
        assert_eq!(r.latency_seconds, 0.0);
        assert_eq!(r.cost_usd, 0.0);
    }

    #[test]
    fn test_failed_result_has_no_widgets() {
        let r = QueryResult::failed("BMW", ProcessorTier::Lite.into(), "x", 0.2, 0.005);
        assert!(!r.widgets().extraction_success);
    }

    #[test]
    fn test_benchmark_record_flattens_result() {
        let output = json!({"content": {"media_segments": [], "sentiment": {}, "platform_heat_spike_map": {}}});
        let result = QueryResult::succeeded("FIFA", ProcessorTier::Core.into(), "trun_9", output, 3.0, 0.025);
        let record = BenchmarkRecord::new(result, "Topic Trends", "q", "p");
        assert!(record.widgets.extraction_success);

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["brand"], "FIFA");
        assert_eq!(value["category"], "Topic Trends");
        assert_eq!(value["widgets"]["extraction_success"], true);

        let back: BenchmarkRecord = serde_json::from_value(value).unwrap();
        assert_eq!(back, record);
    }
}
