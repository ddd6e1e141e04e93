//! # Parallel Bench
//!
//! 对 Parallel AI Task API 各处理器档位做品牌分析基准测试
//!
//! ## 架构设计
//!
//! 本系统采用四层架构：
//!
//! ### ① 客户端层（Clients）
//! - `clients/` - 远程 Task API 的接口和 HTTP 实现
//! - `TaskApi` - 创建任务、轮询结果两个能力
//! - `ParallelClient` - 基于 reqwest 的实现
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单次查询
//! - `QueryService` - 提交任务并等待结果，任何失败都落成一条结果记录
//! - `prompt_builder` / `query_parser` - 提示词模板、检索语句转自然语言
//! - `ResultSaver` - 写入和读取 JSON 结果文件
//!
//! ### ③ 统计层（Report）
//! - `report` - 全局、按处理器、按品牌的统计
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/fan_out` - 单个品牌的多档位并发查询
//! - `orchestrator/brand_sweep` - 品牌扫描
//! - `orchestrator/comprehensive` - 综合测试
//!
//! ## 模块结构

pub mod app;
pub mod clients;
pub mod config;
pub mod error;
pub mod logger;
pub mod models;
pub mod orchestrator;
pub mod report;
pub mod services;
pub mod utils;

// 重新导出常用类型
pub use clients::{ParallelClient, TaskApi};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{
    BenchmarkRecord, CostTable, ExtractedWidgets, ProcessorSlot, ProcessorTier, QueryResult,
    QueryStatus, RunPlan,
};
pub use orchestrator::{process_all_brands, process_brand, query_all, run_comprehensive, RunSummary};
pub use report::Report;
pub use services::{QueryService, ResultSaver, WaitPolicy};
