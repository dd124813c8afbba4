//! PDF 渲染后端
//!
//! 排版由 `pdf_layout` 完成，这里只负责把排版元素交给 printpdf 绘制。

use printpdf::*;
use std::io::BufWriter;

use super::pdf_layout::{self, Element, LayoutPlan, PAGE_HEIGHT, PAGE_WIDTH};
use super::{DocumentFormat, ReportRenderer};
use crate::domain::document::build_document;
use crate::models::Report;
use crate::utils::error::{AppError, AppResult};

/// 1pt = 0.3528mm
const MM_PER_PT: f32 = 0.3528;

/// A4 纵向 PDF 渲染器
#[derive(Debug, Clone, Default)]
pub struct PdfRenderer;

impl PdfRenderer {
    pub fn new() -> Self {
        Self
    }

    /// 报告的分页排版结果，不生成字节
    pub fn layout_report(&self, report: &Report) -> AppResult<LayoutPlan> {
        let document = build_document(report).map_err(|e| {
            crate::log_render_failure!("格式=PDF 报告={} 错误={}", report.report_number(), e);
            e
        })?;
        Ok(pdf_layout::layout(&document))
    }

    fn draw(&self, title: &str, plan: &LayoutPlan) -> AppResult<Vec<u8>> {
        let (doc, first_page, first_layer) =
            PdfDocument::new(title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");

        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| AppError::pdf_error(format!("添加字体失败: {}", e)))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| AppError::pdf_error(format!("添加字体失败: {}", e)))?;

        for (index, page) in plan.pages.iter().enumerate() {
            let (page_index, layer_index) = if index == 0 {
                (first_page, first_layer)
            } else {
                doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), format!("Layer {}", index + 1))
            };
            let layer = doc.get_page(page_index).get_layer(layer_index);
            layer.set_fill_color(Color::Greyscale(Greyscale::new(0.0, None)));

            for element in &page.elements {
                match element {
                    Element::Text { x, y, size, bold: is_bold, text } => {
                        let font = if *is_bold { &bold } else { &regular };
                        layer.use_text(text.as_str(), *size, Mm(*x), Mm(PAGE_HEIGHT - *y), font);
                    }
                    Element::Line { x1, y1, x2, y2, thickness } => {
                        layer.set_outline_color(Color::Greyscale(Greyscale::new(0.0, None)));
                        layer.set_outline_thickness(*thickness);
                        layer.add_line(segment(*x1, *y1, *x2, *y2));
                    }
                    Element::Fill { x, y, width, height, gray } => {
                        // 以线宽等于矩形高度的水平线填充
                        let middle = *y + *height / 2.0;
                        layer.set_outline_color(Color::Greyscale(Greyscale::new(*gray, None)));
                        layer.set_outline_thickness(*height / MM_PER_PT);
                        layer.add_line(segment(*x, middle, *x + *width, middle));
                    }
                }
            }
        }

        let mut writer = BufWriter::new(Vec::new());
        doc.save(&mut writer)
            .map_err(|e| AppError::pdf_error(format!("保存PDF失败: {}", e)))?;
        writer
            .into_inner()
            .map_err(|e| AppError::pdf_error(format!("写出PDF字节失败: {}", e)))
    }
}

/// 页面顶部坐标系下的线段
fn segment(x1: f32, y1: f32, x2: f32, y2: f32) -> Line {
    Line {
        points: vec![
            (Point::new(Mm(x1), Mm(PAGE_HEIGHT - y1)), false),
            (Point::new(Mm(x2), Mm(PAGE_HEIGHT - y2)), false),
        ],
        is_closed: false,
    }
}

impl ReportRenderer for PdfRenderer {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::Pdf
    }

    fn render(&self, report: &Report) -> AppResult<Vec<u8>> {
        let plan = self.layout_report(report)?;
        let title = format!("T&C Report {}", report.report_number());
        let bytes = self.draw(&title, &plan).map_err(|e| {
            crate::log_render_failure!("格式=PDF 报告={} 错误={}", report.report_number(), e);
            e
        })?;
        log::debug!(
            "PDF渲染完成: {} ({} 页, {} 字节)",
            report.report_number(),
            plan.page_count(),
            bytes.len()
        );
        Ok(bytes)
    }
}
