use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::fs;

use super::processor::ProcessorTier;
use crate::error::{AppError, AppResult, FileError};

/// 默认测试品牌
pub const DEFAULT_BRANDS: [&str; 10] = [
    "Stellantis",
    "BMW",
    "Toyota",
    "Ford",
    "Honda",
    "Tesla",
    "Mercedes",
    "Volkswagen",
    "Audi",
    "Hyundai",
];

/// 综合测试使用的品牌
pub const COMPREHENSIVE_BRANDS: [&str; 4] = ["Stellantis", "Airbus", "FIFA", "Bayer"];

/// 一次运行的计划：测哪些品牌、用哪些档位、结果写到哪里
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunPlan {
    pub brands: Vec<String>,
    #[serde(default = "default_processors")]
    pub processors: Vec<ProcessorTier>,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_processors() -> Vec<ProcessorTier> {
    ProcessorTier::DEEP_RESEARCH.to_vec()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("results")
}

impl Default for RunPlan {
    fn default() -> Self {
        Self {
            brands: DEFAULT_BRANDS.iter().map(|b| b.to_string()).collect(),
            processors: default_processors(),
            output_dir: default_output_dir(),
        }
    }
}

impl RunPlan {
    pub fn new(
        brands: impl IntoIterator<Item = impl Into<String>>,
        processors: impl IntoIterator<Item = ProcessorTier>,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            brands: brands.into_iter().map(Into::into).collect(),
            processors: processors.into_iter().collect(),
            output_dir: output_dir.into(),
        }
    }

    /// 小规模的自定义运行
    pub fn custom() -> Self {
        Self::new(
            ["Tesla", "BMW", "Toyota"],
            [ProcessorTier::Pro, ProcessorTier::Ultra],
            "custom_results",
        )
    }

    /// 综合测试：4 个品牌 × 全部 9 个档位
    pub fn comprehensive(output_dir: impl Into<PathBuf>) -> Self {
        Self::new(COMPREHENSIVE_BRANDS, ProcessorTier::ALL, output_dir)
    }

    /// 从 TOML 文件加载运行计划
    pub async fn from_toml_file(path: &Path) -> AppResult<Self> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;

        let plan: RunPlan = toml::from_str(&content).map_err(|e| {
            AppError::File(FileError::TomlParseFailed {
                path: path.display().to_string(),
                source: Box::new(e),
            })
        })?;

        tracing::info!(
            "已加载运行计划 {}: {} 个品牌, {} 个处理器",
            path.display(),
            plan.brands.len(),
            plan.processors.len()
        );

        Ok(plan)
    }
}
