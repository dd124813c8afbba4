//! 文档渲染后端
//!
//! 两个后端都从 `domain::document` 的同一棵文档树降级输出：
//! - `pdf_renderer`：printpdf 绘制，分页由 `pdf_layout` 预先计算
//! - `docx_renderer`：tera 模板（`docx_templates`）渲染 WordprocessingML 部件并打包为 zip
//!
//! 渲染是同步、进程内的纯变换，失败时不返回任何部分字节。

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::models::Report;
use crate::utils::error::AppResult;

pub mod docx_renderer;
pub mod docx_templates;
pub mod pdf_layout;
pub mod pdf_renderer;

pub use docx_renderer::DocxRenderer;
pub use pdf_renderer::PdfRenderer;

/// 输出文档格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Pdf,
    Docx,
}

impl DocumentFormat {
    pub const ALL: [DocumentFormat; 2] = [DocumentFormat::Pdf, DocumentFormat::Docx];

    pub fn extension(&self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "pdf",
            DocumentFormat::Docx => "docx",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "application/pdf",
            DocumentFormat::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
        }
    }

    /// 建议的文件名：`{报告编号}.pdf` / `{报告编号}.docx`
    ///
    /// 路径分隔符等文件系统不接受的字符替换为 `_`
    pub fn file_name(&self, report_number: &str) -> String {
        let stem: String = report_number
            .trim()
            .chars()
            .map(|c| match c {
                '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
                c if c.is_control() => '_',
                c => c,
            })
            .collect();
        let stem = if stem.is_empty() { "report".to_string() } else { stem };
        format!("{}.{}", stem, self.extension())
    }
}

impl Display for DocumentFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentFormat::Pdf => write!(f, "PDF"),
            DocumentFormat::Docx => write!(f, "DOCX"),
        }
    }
}

impl FromStr for DocumentFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pdf" => Ok(DocumentFormat::Pdf),
            "docx" | "word" => Ok(DocumentFormat::Docx),
            _ => Err(format!("Invalid DocumentFormat: {}", s)),
        }
    }
}

/// 报告渲染器接口
#[cfg_attr(test, mockall::automock)]
pub trait ReportRenderer: Send + Sync {
    /// 输出格式
    fn format(&self) -> DocumentFormat;

    /// 渲染报告为完整的文件字节
    fn render(&self, report: &Report) -> AppResult<Vec<u8>>;
}

/// 按格式创建默认渲染器
pub fn renderer_for(format: DocumentFormat) -> Box<dyn ReportRenderer> {
    match format {
        DocumentFormat::Pdf => Box::new(PdfRenderer::new()),
        DocumentFormat::Docx => Box::new(DocxRenderer::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_names() {
        assert_eq!(DocumentFormat::Pdf.file_name("CB-202410-042"), "CB-202410-042.pdf");
        assert_eq!(DocumentFormat::Docx.file_name("CB-202410-042"), "CB-202410-042.docx");
        assert_eq!(DocumentFormat::Pdf.file_name("a/b:c"), "a_b_c.pdf");
        assert_eq!(DocumentFormat::Docx.file_name("  "), "report.docx");
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("PDF".parse::<DocumentFormat>().unwrap(), DocumentFormat::Pdf);
        assert_eq!("word".parse::<DocumentFormat>().unwrap(), DocumentFormat::Docx);
        assert!("xlsx".parse::<DocumentFormat>().is_err());
    }

    #[test]
    fn test_renderer_for_reports_its_format() {
        for format in DocumentFormat::ALL {
            assert_eq!(renderer_for(format).format(), format);
        }
    }
}
