//! 日志初始化（宿主应用可选调用）
//!
//! 按日滚动写入文件，EnvFilter 控制级别；返回的 guard
//! 负责冲刷后台写线程，宿主需持有到退出。

use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

pub struct LoggingGuard {
    _guard: WorkerGuard,
    log_dir: PathBuf,
}

impl LoggingGuard {
    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }
}

/// 在 log_dir 下初始化文件日志；重复初始化时返回 None
pub fn init(log_dir: &Path) -> Option<LoggingGuard> {
    std::fs::create_dir_all(log_dir).ok()?;

    let file_appender = tracing_appender::rolling::daily(log_dir, "scriptdoc.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("scriptdoc=info"));

    let subscriber = tracing_subscriber::registry().with(env_filter).with(
        tracing_subscriber::fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_target(true),
    );

    if subscriber.try_init().is_err() {
        return None;
    }

    Some(LoggingGuard {
        _guard: guard,
        log_dir: log_dir.to_path_buf(),
    })
}
