use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{AppError, AppResult, ConfigError};

pub const API_KEY_VAR: &str = "PARALLEL_API_KEY";
/// 自定义运行单独使用的日志文件
pub const CUSTOM_RUN_LOG_FILE: &str = "logs/custom_run.log";

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    // --- Task API 配置 ---
    pub api_key: String,
    pub api_base_url: String,
    /// 单个任务结果的最长等待时间（秒）
    pub result_timeout_secs: u64,
    /// 每次轮询时让服务端最多挂起的时间（秒）
    pub poll_window_secs: u64,
    /// 任务未完成时两次轮询之间的间隔（秒）
    pub poll_interval_secs: u64,
    // --- 运行配置 ---
    /// 品牌扫描结果目录
    pub output_dir: PathBuf,
    /// 综合测试结果目录
    pub comprehensive_output_dir: PathBuf,
    /// 综合测试中相邻两次查询之间的停顿（秒）
    pub throttle_secs: u64,
    /// 可选的 TOML 运行计划
    pub run_plan_file: Option<PathBuf>,
    // --- 日志配置 ---
    pub log_level: String,
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base_url: "https://api.parallel.ai".to_string(),
            result_timeout_secs: 3600,
            poll_window_secs: 600,
            poll_interval_secs: 5,
            output_dir: PathBuf::from("results"),
            comprehensive_output_dir: PathBuf::from("test_results"),
            throttle_secs: 2,
            run_plan_file: None,
            log_level: "info".to_string(),
            log_file: Some(PathBuf::from("logs/parallel_testing.log")),
        }
    }
}

impl Config {
    /// 从环境变量读取配置；缺少 API key 时直接报错
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// 使用任意的变量来源读取配置
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> AppResult<Self> {
        let default = Self::default();

        let api_key = lookup(API_KEY_VAR)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| AppError::env_var_not_found(API_KEY_VAR))?;

        Ok(Self {
            api_key,
            api_base_url: lookup("PARALLEL_API_BASE_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or(default.api_base_url),
            result_timeout_secs: parse_var(&lookup, "RESULT_TIMEOUT_SECS", default.result_timeout_secs)?,
            poll_window_secs: parse_var(&lookup, "POLL_WINDOW_SECS", default.poll_window_secs)?,
            poll_interval_secs: parse_var(&lookup, "POLL_INTERVAL_SECS", default.poll_interval_secs)?,
            output_dir: lookup("OUTPUT_DIR").map(PathBuf::from).unwrap_or(default.output_dir),
            comprehensive_output_dir: lookup("COMPREHENSIVE_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(default.comprehensive_output_dir),
            throttle_secs: parse_var(&lookup, "THROTTLE_SECS", default.throttle_secs)?,
            run_plan_file: lookup("RUN_PLAN_FILE").map(PathBuf::from),
            log_level: lookup("LOG_LEVEL").unwrap_or(default.log_level),
            log_file: match lookup("LOG_FILE") {
                Some(v) if v.is_empty() => None,
                Some(v) => Some(PathBuf::from(v)),
                None => default.log_file,
            },
        })
    }

    pub fn result_timeout(&self) -> Duration {
        Duration::from_secs(self.result_timeout_secs)
    }

    pub fn poll_window(&self) -> Duration {
        Duration::from_secs(self.poll_window_secs.max(1))
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn throttle(&self) -> Duration {
        Duration::from_secs(self.throttle_secs)
    }

    /// 自定义运行的配置：日志写到 `logs/custom_run.log`
    pub fn for_custom_run(mut self) -> Self {
        self.log_file = Some(PathBuf::from(CUSTOM_RUN_LOG_FILE));
        self
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    var_name: &str,
    default: T,
) -> AppResult<T> {
    match lookup(var_name) {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|_| {
            AppError::Config(ConfigError::EnvVarParseFailed {
                var_name: var_name.to_string(),
                value,
                expected_type: std::any::type_name::<T>().to_string(),
            })
        }),
    }
}
