use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::clients::ParallelClient;
use crate::config::Config;
use crate::logger;
use crate::models::{CostTable, RunPlan};
use crate::orchestrator::{self, ComprehensiveOutcome, RunSummary};
use crate::report::Report;
use crate::services::{QueryService, WaitPolicy};
use crate::utils::logging;

/// 应用主结构
pub struct App {
    config: Config,
    service: QueryService,
}

impl App {
    /// 初始化应用：日志 → HTTP 客户端 → 查询服务
    pub fn initialize(config: Config) -> Result<Self> {
        logger::init(&config.log_level, config.log_file.as_deref()).context("初始化日志失败")?;

        let client = ParallelClient::new(&config).context("创建 Task API 客户端失败")?;
        let service = QueryService::new(
            Arc::new(client),
            CostTable::standard(),
            WaitPolicy::from(&config),
        );

        info!("✓ 应用初始化完成: {}", config.api_base_url);
        Ok(Self { config, service })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// 读取运行计划
    ///
    /// 配置了 `RUN_PLAN_FILE` 时从文件加载，否则使用 `fallback`
    pub async fn load_plan(&self, fallback: RunPlan) -> Result<RunPlan> {
        match &self.config.run_plan_file {
            Some(path) => RunPlan::from_toml_file(path)
                .await
                .with_context(|| format!("加载运行计划 {} 失败", path.display())),
            None => Ok(fallback),
        }
    }

    /// 品牌扫描，完成后打印统计报告
    pub async fn run_brand_sweep(&self, plan: &RunPlan) -> Result<RunSummary> {
        if plan.brands.is_empty() {
            warn!("⚠️ 运行计划中没有品牌，程序结束");
        }

        let summary = orchestrator::process_all_brands(&self.service, plan).await;
        let report = Report::summarize(&summary.results, self.service.costs());
        logging::log_report(&report);

        Ok(summary)
    }

    /// 综合测试
    pub async fn run_comprehensive(&self, plan: &RunPlan) -> Result<ComprehensiveOutcome> {
        orchestrator::run_comprehensive(&self.service, plan, self.config.throttle()).await
    }
}
