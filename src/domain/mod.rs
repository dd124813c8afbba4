//! 领域层
//!
//! 同步、无副作用的报告计算，以及渲染前的格式无关文档树

pub mod services;
pub mod document;

pub use services::*;
pub use document::{build_document as build_report_document, ReportDocument};
