//! 结果保存服务 - 业务能力层
//!
//! 只负责把结果写成 JSON 文件、再读回来，不关心流程

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::fs;
use tracing::{error, info};

use crate::error::{AppError, AppResult, FileError};

/// 结果保存服务
///
/// 每个文件是一个缩进格式的 JSON 数组
#[derive(Debug, Clone)]
pub struct ResultSaver {
    output_dir: PathBuf,
}

impl ResultSaver {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// 保存一组结果
    ///
    /// 未指定文件名时使用 `results_{时间戳}.json`
    pub async fn save_results<T: Serialize>(
        &self,
        results: &[T],
        filename: Option<&str>,
    ) -> AppResult<PathBuf> {
        let filename = filename
            .map(str::to_string)
            .unwrap_or_else(|| timestamped("results"));
        self.save_document(&results, &filename).await
    }

    /// 保存单个品牌的结果，文件名为 `{品牌}_{时间戳}.json`
    pub async fn save_brand_results<T: Serialize>(
        &self,
        brand: &str,
        results: &[T],
    ) -> AppResult<PathBuf> {
        let filename = timestamped(&sanitize_brand(brand));
        self.save_results(results, Some(&filename)).await
    }

    /// 保存任意 JSON 文档（例如分析报告）
    pub async fn save_document<T: Serialize + ?Sized>(
        &self,
        document: &T,
        filename: &str,
    ) -> AppResult<PathBuf> {
        let filepath = self.output_dir.join(filename);
        let path_str = filepath.display().to_string();

        fs::create_dir_all(&self.output_dir).await.map_err(|e| {
            AppError::File(FileError::CreateDirFailed {
                path: self.output_dir.display().to_string(),
                source: Box::new(e),
            })
        })?;

        let json = serde_json::to_string_pretty(document).map_err(|e| {
            AppError::File(FileError::SerializeFailed {
                path: path_str.clone(),
                source: Box::new(e),
            })
        })?;

        if let Err(e) = fs::write(&filepath, json).await {
            error!("保存结果到 {} 失败: {}", path_str, e);
            return Err(AppError::file_write_failed(path_str, e));
        }

        info!("💾 结果已保存至 {}", path_str);
        Ok(filepath)
    }

    /// 读取 `save_results` 写出的文件
    pub async fn load_results<T: DeserializeOwned>(&self, filename: &str) -> AppResult<Vec<T>> {
        let filepath = self.output_dir.join(filename);
        let path_str = filepath.display().to_string();

        let content = fs::read_to_string(&filepath).await.map_err(|e| {
            error!("读取结果 {} 失败: {}", path_str, e);
            AppError::file_read_failed(path_str.clone(), e)
        })?;

        serde_json::from_str(&content).map_err(|e| {
            AppError::File(FileError::JsonParseFailed {
                path: path_str,
                source: Box::new(e),
            })
        })
    }
}

/// `{context}_{时间戳}.json`，时间戳精确到毫秒
pub fn timestamped(context: &str) -> String {
    format!(
        "{}_{}.json",
        context,
        chrono::Local::now().format("%Y%m%d_%H%M%S_%3f")
    )
}

/// 品牌名 -> 文件名安全的形式
pub fn sanitize_brand(brand: &str) -> String {
    static WHITESPACE: OnceLock<Regex> = OnceLock::new();
    static DISALLOWED: OnceLock<Regex> = OnceLock::new();

    let whitespace = WHITESPACE.get_or_init(|| Regex::new(r"\s+").expect("valid regex"));
    let disallowed = DISALLOWED.get_or_init(|| Regex::new(r"[^a-z0-9_\-]").expect("valid regex"));

    let lowered = brand.trim().to_lowercase();
    let underscored = whitespace.replace_all(&lowered, "_");
    let cleaned = disallowed.replace_all(&underscored, "").into_owned();

    if cleaned.is_empty() {
        "brand".to_string()
    } else {
        cleaned
    }
}
