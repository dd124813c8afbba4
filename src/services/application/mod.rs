/// 应用层服务模块
///
/// 应用层负责协调领域服务和基础设施服务，实现完整的业务流程
/// 提供面向调用方的异步API

/// 报告导出服务 - 渲染并写入导出目录
pub mod report_export_service;

// 重新导出服务接口和实现
pub use report_export_service::{ExportedReport, IReportExportService, ReportExportService};
