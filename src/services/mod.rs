/// 服务层模块，包含应用层的服务定义
///
/// 领域计算位于 `domain::services`，渲染后端位于 `infrastructure::render`，
/// 这里只放协调它们并产生副作用（写文件）的应用服务。

/// 应用层服务模块
pub mod application;

// 重新导出应用层服务
pub use application::{ExportedReport, IReportExportService, ReportExportService};
