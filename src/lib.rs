/// T&C 报告引擎 - 核心库
///
/// 分层：
/// - `models`：报告数据模型与五类设备测试数据
/// - `domain`：结果判定、领域计算、合成数据、校验、生命周期、格式无关文档树
/// - `infrastructure`：PDF / DOCX 渲染后端
/// - `services`：异步导出服务
/// - `utils` / `logging`：错误、配置、时间、日志
pub mod models;
pub mod utils;
pub mod error;
pub mod logging;
pub mod domain;
pub mod infrastructure;
pub mod services;

// 重新导出常用类型，方便使用
pub use models::*;
pub use utils::{AppConfig, AppError, AppResult};
pub use domain::{
    build_report_document, next_revision, transition, GeneratedReport, GeneratorOptions,
    ReportDocument, ReportStatistics, ReportValidator, SamplingProfile, SyntheticReportGenerator,
};
pub use infrastructure::{renderer_for, DocumentFormat, DocxRenderer, PdfRenderer, ReportRenderer};
pub use services::*;
