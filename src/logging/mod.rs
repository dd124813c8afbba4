//! # 日志记录模块 (Logging Module)
//!
//! ## 业务说明
//! 记录报告生成、校验、渲染和导出过程中的核心事件，便于排查渲染失败和数据契约问题
//!
//! ## 日志策略
//! - **渲染失败**: PDF/DOCX 后端出错时记录报告编号和格式
//! - **契约违反**: 报告分类与测试数据变体不一致、必填字段缺失
//! - **用户操作**: 生成、导出、状态转换
//! - **配置警告**: 无法解析的环境变量或配置项
//!
//! ## Rust知识点
//! - **日志宏**: 使用log crate的宏系统，分类前缀写在消息开头
//! - **环境配置**: 无文件输出时通过env_logger读取 `RUST_LOG`

pub mod logger_config;
pub mod simple_logger;

pub use logger_config::*;
pub use simple_logger::*;

/// 便捷日志宏 - 记录核心问题日志
/// 只记录4类核心问题，避免日志冗余

/// 记录渲染失败日志
#[macro_export]
macro_rules! log_render_failure {
    ($msg:expr) => {
        log::error!("[渲染失败] {}", $msg)
    };
    ($msg:expr, $($arg:tt)*) => {
        log::error!("[渲染失败] {}", format!($msg, $($arg)*))
    };
}

/// 记录数据契约违反日志
#[macro_export]
macro_rules! log_contract_violation {
    ($msg:expr) => {
        log::error!("[契约违反] {}", $msg)
    };
    ($msg:expr, $($arg:tt)*) => {
        log::error!("[契约违反] {}", format!($msg, $($arg)*))
    };
}

/// 记录用户操作日志
#[macro_export]
macro_rules! log_user_operation {
    ($msg:expr) => {
        log::info!("[用户操作] {}", $msg)
    };
    ($msg:expr, $($arg:tt)*) => {
        log::info!("[用户操作] {}", format!($msg, $($arg)*))
    };
}

/// 记录用户配置操作警告
#[macro_export]
macro_rules! log_config_warning {
    ($msg:expr) => {
        log::warn!("[配置警告] {}", $msg)
    };
    ($msg:expr, $($arg:tt)*) => {
        log::warn!("[配置警告] {}", format!($msg, $($arg)*))
    };
}

// 重新导出宏
pub use crate::log_config_warning;
pub use crate::log_contract_violation;
pub use crate::log_render_failure;
pub use crate::log_user_operation;

#[cfg(test)]
mod tests {
    fn lookup(key: &str) -> Result<u8, String> {
        key.parse::<u8>().map_err(|e| e.to_string())
    }

    #[test]
    fn test_macros_usable_as_expressions() {
        // 宏展开为表达式，可直接作为 match 分支和闭包体
        match lookup("x") {
            Ok(_) => {}
            Err(e) => crate::log_config_warning!("无法解析 {}: {}", "x", e),
        }

        let outcome: Result<(), String> = Err("boom".to_string());
        let _ = outcome.map_err(|e| crate::log_render_failure!("格式=PDF 错误={}", e));
        if let Err(e) = lookup("y") {
            crate::log_contract_violation!(e)
        }
        crate::log_user_operation!("导出 {} 个文件", 2)
    }
}
