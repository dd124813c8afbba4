//! 基础设施层模块
//!
//! 包含 PDF / DOCX 文档渲染后端

pub mod render;

// 重新导出基础设施组件
pub use render::{renderer_for, DocumentFormat, DocxRenderer, PdfRenderer, ReportRenderer};
