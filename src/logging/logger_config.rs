//! 日志配置模块
//!
//! 描述日志级别、输出目标和格式，并定义核心问题日志分类

use chrono::{DateTime, Utc};
use log::{LevelFilter, Record};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::str::FromStr;

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggerConfig {
    /// 日志级别
    pub level: LogLevel,
    /// 日志输出目标
    pub targets: Vec<LogTarget>,
    /// 文件日志格式
    pub format: LogFormat,
}

impl LoggerConfig {
    /// 是否需要写文件
    pub fn file_path(&self) -> Option<&PathBuf> {
        self.targets.iter().find_map(|t| match t {
            LogTarget::File { path } => Some(path),
            LogTarget::Console => None,
        })
    }

    pub fn has_console(&self) -> bool {
        self.targets.iter().any(|t| matches!(t, LogTarget::Console))
    }
}

/// 日志级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            _ => Err(format!("无效的日志级别: {}", s)),
        }
    }
}

/// 日志输出目标
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum LogTarget {
    Console,
    File { path: PathBuf },
}

/// 日志格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogFormat {
    /// `[时间] [级别] [目标] - 消息`
    Plain,
    /// 每行一个 JSON 对象
    Json,
}

/// 核心问题日志分类
/// 只记录这4类核心问题，避免日志冗余
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CoreLogCategory {
    /// 渲染 PDF/DOCX 失败
    RenderFailure,
    /// 报告数据违反契约
    ContractViolation,
    /// 用户操作（生成、导出、状态转换）
    UserOperations,
    /// 配置警告
    ConfigWarning,
}

impl CoreLogCategory {
    pub const ALL: [CoreLogCategory; 4] = [
        CoreLogCategory::RenderFailure,
        CoreLogCategory::ContractViolation,
        CoreLogCategory::UserOperations,
        CoreLogCategory::ConfigWarning,
    ];

    /// 日志宏写入的消息前缀
    pub fn prefix(&self) -> &'static str {
        match self {
            CoreLogCategory::RenderFailure => "[渲染失败]",
            CoreLogCategory::ContractViolation => "[契约违反]",
            CoreLogCategory::UserOperations => "[用户操作]",
            CoreLogCategory::ConfigWarning => "[配置警告]",
        }
    }

    /// 按消息前缀识别分类
    pub fn from_message(message: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| message.starts_with(c.prefix()))
    }
}

impl Display for CoreLogCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let category_name = match self {
            CoreLogCategory::RenderFailure => "渲染失败",
            CoreLogCategory::ContractViolation => "契约违反",
            CoreLogCategory::UserOperations => "用户操作",
            CoreLogCategory::ConfigWarning => "配置警告",
        };
        write!(f, "{}", category_name)
    }
}

/// 结构化日志记录（JSON 格式文件日志的一行）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredLog {
    pub timestamp: DateTime<Utc>,
    pub level: String,
    pub target: String,
    pub message: String,
    pub module: Option<String>,
    pub line: Option<u32>,
    /// 核心问题分类
    pub category: Option<CoreLogCategory>,
}

impl StructuredLog {
    pub fn from_record(record: &Record) -> Self {
        let message = record.args().to_string();
        Self {
            timestamp: Utc::now(),
            level: record.level().to_string(),
            target: record.target().to_string(),
            category: CoreLogCategory::from_message(&message),
            message,
            module: record.module_path().map(str::to_string),
            line: record.line(),
        }
    }
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            targets: vec![LogTarget::Console],
            format: LogFormat::Plain,
        }
    }
}
