//! 日志初始化
//!
//! 同时输出到终端和日志文件；`RUST_LOG` 优先于配置的日志级别

use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::error::{AppError, AppResult, FileError};

/// 初始化全局日志
///
/// 重复调用时保留第一次的设置
pub fn init(level: &str, log_file: Option<&Path>) -> AppResult<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let stdout_layer = fmt::layer().with_target(false);

    let file_layer = match log_file {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).map_err(|e| {
                    AppError::File(FileError::CreateDirFailed {
                        path: parent.display().to_string(),
                        source: Box::new(e),
                    })
                })?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| AppError::file_write_failed(path.display().to_string(), e))?;

            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_target(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    // 已经初始化过（例如测试中多次调用）时忽略
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_creates_log_directory() {
        let dir = tempfile::tempdir().unwrap();
        let log_file = dir.path().join("logs").join("run.log");

        init("debug", Some(&log_file)).unwrap();
        assert!(log_file.exists());

        // 第二次调用不报错
        init("info", None).unwrap();
    }
}
