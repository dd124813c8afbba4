/// 错误处理模块
///
/// 业务说明：
/// 本模块是错误处理的统一入口点，重新导出 utils::error 中的所有错误类型，
/// 其他模块可以通过 `use crate::error::*` 引入。
///
/// 使用示例：
/// ```rust
/// use tc_report_lib::error::{AppError, AppResult};
///
/// fn require_number(number: &str) -> AppResult<&str> {
///     if number.is_empty() {
///         return Err(AppError::contract_violation("header.reportNumber", "报告编号为空"));
///     }
///     Ok(number)
/// }
///
/// assert!(require_number("").is_err());
/// ```
///
/// 调用链：
/// 其他模块 -> error模块 -> utils::error实际定义

pub use crate::utils::error::*;
