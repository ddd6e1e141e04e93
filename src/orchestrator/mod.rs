//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责批量调度和统计，不做具体的查询或解析。
//!
//! ## 模块划分
//!
//! ### `fan_out` - 多处理器并发查询
//! - 同一提示词同时发给多个档位
//! - 每个档位恰好一条结果，任务崩溃在汇合点转成错误结果
//!
//! ### `brand_sweep` - 品牌扫描
//! - 依次处理每个品牌（品牌之间串行）
//! - 每个品牌内部并发查询所有档位
//! - 保存单品牌文件和合并文件
//!
//! ### `comprehensive` - 综合测试
//! - 每个品牌轮换选择一个问题
//! - 档位之间串行执行，每次查询后固定停顿
//! - 输出测试明细和分析报告
//!
//! ## 层次关系
//!
//! ```text
//! brand_sweep / comprehensive (处理 Vec<Brand>)
//!     ↓
//! fan_out (处理 Vec<ProcessorTier>)
//!     ↓
//! services::QueryService (处理单次查询)
//!     ↓
//! clients::TaskApi (远程任务接口)
//! ```

pub mod brand_sweep;
pub mod comprehensive;
pub mod fan_out;

// 重新导出主要类型
pub use brand_sweep::{process_all_brands, process_brand, RunSummary, COMBINED_RESULTS_FILE};
pub use comprehensive::{run_benchmark, run_comprehensive, ComprehensiveOutcome};
pub use fan_out::query_all;
