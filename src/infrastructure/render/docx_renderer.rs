//! DOCX 渲染后端
//!
//! 文档树先整理成模板视图（列宽预先换算为 twip / 百分比单位），
//! 再由 `docx_templates` 中的 tera 模板输出各个 OOXML 部件，最后打包为 zip：
//! - `word/document.xml`：页眉带表格、章节标题、信息网格、数据表、签名
//! - `word/styles.xml`：`SectionTitle` / `TableCaption` / `Note` 段落样式
//! - `word/footer1.xml`：项目名、报告编号和 `PAGE` / `NUMPAGES` 域
//! - `docProps/core.xml`：标题、主题和创建/修改时间取自报告本身
//!
//! zip 条目使用固定时间戳，同一报告的输出逐字节相同。

use std::io::{Cursor, Read, Write};

use serde::Serialize;
use tera::{Context, Tera};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use super::docx_templates::{self, APP, CONTENT_TYPES, CORE, DOCUMENT, DOCUMENT_RELS, FOOTER, PACKAGE_RELS, STYLES};
use super::{DocumentFormat, ReportRenderer};
use crate::domain::document::{
    build_document, grid_rows, Block, Cell, Footer, HeaderBand, InfoItem, ReportDocument, Section,
    SignatureBox, Table,
};
use crate::models::Report;
use crate::utils::error::{AppError, AppResult};

/// A4，单位 twip
const PAGE_WIDTH_TWIPS: u32 = 11906;
const PAGE_HEIGHT_TWIPS: u32 = 16838;
const MARGIN_TWIPS: u32 = 850;
const CONTENT_WIDTH_TWIPS: u32 = PAGE_WIDTH_TWIPS - 2 * MARGIN_TWIPS;

const BAND_WIDTHS: [u32; 3] = [25, 50, 25];
const GRID_WIDTHS: [u32; 4] = [18, 32, 18, 32];

/// 包内部件与对应模板，按写入 zip 的顺序
const PARTS: [(&str, &str); 8] = [
    ("[Content_Types].xml", CONTENT_TYPES),
    ("_rels/.rels", PACKAGE_RELS),
    ("word/document.xml", DOCUMENT),
    ("word/styles.xml", STYLES),
    ("word/footer1.xml", FOOTER),
    ("word/_rels/document.xml.rels", DOCUMENT_RELS),
    ("docProps/core.xml", CORE),
    ("docProps/app.xml", APP),
];

/// Word 文档渲染器
#[derive(Debug, Clone, Default)]
pub struct DocxRenderer;

impl DocxRenderer {
    pub fn new() -> Self {
        Self
    }

    /// 把文档树打包为 docx 字节
    pub fn package(&self, report: &Report, document: &ReportDocument) -> AppResult<Vec<u8>> {
        let engine = docx_templates::engine()?;
        let context = Context::from_serialize(DocxView::new(report, document))?;

        // 全部部件渲染成功后才开始打包
        let parts = PARTS
            .iter()
            .map(|(name, template)| render_part(&engine, template, &context).map(|xml| (*name, xml)))
            .collect::<AppResult<Vec<_>>>()?;

        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .last_modified_time(zip::DateTime::default());

        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, content) in &parts {
            zip.start_file(*name, options)?;
            zip.write_all(content.as_bytes())?;
        }
        Ok(zip.finish()?.into_inner())
    }
}

fn render_part(engine: &Tera, template: &str, context: &Context) -> AppResult<String> {
    engine
        .render(template, context)
        .map_err(|e| AppError::docx_error(format!("生成文档部件 {} 失败: {}", template, AppError::from(e))))
}

impl ReportRenderer for DocxRenderer {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::Docx
    }

    fn render(&self, report: &Report) -> AppResult<Vec<u8>> {
        let bytes = build_document(report)
            .and_then(|document| self.package(report, &document))
            .map_err(|e| {
                crate::log_render_failure!("格式=DOCX 报告={} 错误={}", report.report_number(), e);
                e
            })?;
        log::debug!("DOCX渲染完成: {} ({} 字节)", report.report_number(), bytes.len());
        Ok(bytes)
    }
}

/// 读取 docx 中 `word/document.xml` 的全部文字，按出现顺序
pub fn document_text(bytes: &[u8]) -> AppResult<Vec<String>> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    let mut xml = String::new();
    archive
        .by_name("word/document.xml")?
        .read_to_string(&mut xml)?;

    let mut texts = Vec::new();
    let mut rest = xml.as_str();
    while let Some(start) = rest.find("<w:t") {
        rest = &rest[start + 4..];
        // 跳过 <w:tbl> <w:tc> <w:tab/> 等同前缀的元素
        if !(rest.starts_with('>') || rest.starts_with(' ')) {
            continue;
        }
        let Some(open_end) = rest.find('>') else { break };
        let Some(close) = rest.find("</w:t>") else { break };
        if close < open_end {
            continue;
        }
        texts.push(decode_entities(&rest[open_end + 1..close])?);
        rest = &rest[close..];
    }
    Ok(texts)
}

/// 还原预定义实体和数字字符引用
fn decode_entities(text: &str) -> AppResult<String> {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp + 1..];
        let end = tail
            .find(';')
            .ok_or_else(|| AppError::docx_error(format!("未结束的实体引用: {}", tail)))?;
        let entity = &tail[..end];
        let decoded = match entity {
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            _ => entity
                .strip_prefix("#x")
                .or_else(|| entity.strip_prefix("#X"))
                .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                .or_else(|| entity.strip_prefix('#').and_then(|dec| dec.parse().ok()))
                .and_then(char::from_u32),
        };
        out.push(decoded.ok_or_else(|| AppError::docx_error(format!("无法识别的实体: &{};", entity)))?);
        rest = &tail[end + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

/// 百分比列宽换算为表格网格（twip）与单元格宽度（五十分之一百分比）
#[derive(Debug, Serialize)]
struct Geometry {
    grid: Vec<u32>,
    cells: Vec<u32>,
}

impl Geometry {
    fn new(widths: &[u32]) -> Self {
        Self {
            grid: widths.iter().map(|w| w * CONTENT_WIDTH_TWIPS / 100).collect(),
            cells: widths.iter().map(|w| w * 50).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PageView {
    width: u32,
    height: u32,
    margin: u32,
    content_width: u32,
    center: u32,
}

#[derive(Debug, Serialize)]
struct CoreView<'a> {
    title: &'a str,
    subject: &'a str,
    creator: &'a str,
    keywords: &'a str,
    created: String,
    modified: String,
}

#[derive(Debug, Serialize)]
struct CellView<'a> {
    text: &'a str,
    bold: bool,
    width: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GridCellView<'a> {
    label: &'a str,
    value: &'a str,
    label_width: u32,
    value_width: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SignatureView<'a> {
    role: &'a str,
    name: &'a str,
    date_line: &'a str,
    width: u32,
}

#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
enum PartView<'a> {
    InfoGrid {
        grid: Vec<u32>,
        rows: Vec<Vec<GridCellView<'a>>>,
    },
    Caption {
        text: &'a str,
    },
    Table {
        grid: Vec<u32>,
        columns: Vec<CellView<'a>>,
        rows: Vec<Vec<CellView<'a>>>,
    },
    Note {
        text: &'a str,
    },
    Paragraph {
        label: &'a str,
        text: &'a str,
    },
    Signatures {
        grid: Vec<u32>,
        boxes: Vec<SignatureView<'a>>,
    },
}

#[derive(Debug, Serialize)]
struct SectionView<'a> {
    title: &'a str,
    parts: Vec<PartView<'a>>,
}

/// 模板上下文
#[derive(Debug, Serialize)]
struct DocxView<'a> {
    header: &'a HeaderBand,
    band: Geometry,
    sections: Vec<SectionView<'a>>,
    footer: &'a Footer,
    page: PageView,
    core: CoreView<'a>,
}

impl<'a> DocxView<'a> {
    fn new(report: &'a Report, document: &'a ReportDocument) -> Self {
        Self {
            header: &document.header,
            band: Geometry::new(&BAND_WIDTHS),
            sections: document.sections.iter().map(section_view).collect(),
            footer: &document.footer,
            page: PageView {
                width: PAGE_WIDTH_TWIPS,
                height: PAGE_HEIGHT_TWIPS,
                margin: MARGIN_TWIPS,
                content_width: CONTENT_WIDTH_TWIPS,
                center: CONTENT_WIDTH_TWIPS / 2,
            },
            core: CoreView {
                title: &document.title,
                subject: report.report_type.label(),
                creator: &report.header.tested_by,
                keywords: report.report_number(),
                created: report.created_at.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
                modified: report.updated_at.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
            },
        }
    }
}

fn section_view(section: &Section) -> SectionView<'_> {
    SectionView {
        title: &section.title,
        parts: section.blocks.iter().map(part_view).collect(),
    }
}

fn part_view(block: &Block) -> PartView<'_> {
    match block {
        Block::InfoGrid { items } => info_grid_view(items),
        Block::Caption { text } => PartView::Caption { text },
        Block::Table(table) => table_view(table),
        Block::Note { text } => PartView::Note { text },
        Block::Paragraph { label, text } => PartView::Paragraph { label, text },
        Block::Signatures { boxes } => signatures_view(boxes),
    }
}

/// 信息网格：标签/值/标签/值四列，无边框
fn info_grid_view(items: &[InfoItem]) -> PartView<'_> {
    let geometry = Geometry::new(&GRID_WIDTHS);
    let rows = grid_rows(items)
        .into_iter()
        .map(|(left, right)| {
            [Some(left), right]
                .into_iter()
                .enumerate()
                .map(|(i, item)| GridCellView {
                    label: item.map(|it| it.label.as_str()).unwrap_or(""),
                    value: item.map(|it| it.value.as_str()).unwrap_or(""),
                    label_width: geometry.cells[i * 2],
                    value_width: geometry.cells[i * 2 + 1],
                })
                .collect()
        })
        .collect();
    PartView::InfoGrid { grid: geometry.grid, rows }
}

/// 数据表：浅灰边框，表头灰底加粗并在续页重复
fn table_view(table: &Table) -> PartView<'_> {
    let widths: Vec<u32> = table.columns.iter().map(|c| c.width).collect();
    let geometry = Geometry::new(&widths);
    let columns = table
        .columns
        .iter()
        .zip(&geometry.cells)
        .map(|(column, width)| CellView { text: &column.title, bold: true, width: *width })
        .collect();
    let rows = table
        .rows
        .iter()
        .map(|row| {
            row.iter()
                .zip(&geometry.cells)
                .map(|(Cell { text, bold }, width)| CellView { text, bold: *bold, width: *width })
                .collect()
        })
        .collect();
    PartView::Table { grid: geometry.grid, columns, rows }
}

fn signatures_view(boxes: &[SignatureBox]) -> PartView<'_> {
    let count = boxes.len().max(1) as u32;
    let widths: Vec<u32> = (0..count)
        .map(|i| if i == count - 1 { 100 - (100 / count) * (count - 1) } else { 100 / count })
        .collect();
    let geometry = Geometry::new(&widths);
    let boxes = boxes
        .iter()
        .zip(&geometry.cells)
        .map(|(signature, width)| SignatureView {
            role: &signature.role,
            name: &signature.name,
            date_line: &signature.date_line,
            width: *width,
        })
        .collect();
    PartView::Signatures { grid: geometry.grid, boxes }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::document::NOTES_AND_RECOMMENDATIONS;
    use crate::domain::services::synthetic_report_generator::{GeneratorOptions, SyntheticReportGenerator};
    use crate::models::ReportType;
    use chrono::{TimeZone, Utc};

    fn report(report_type: ReportType) -> Report {
        let options = GeneratorOptions::at(Utc.with_ymd_and_hms(2024, 10, 15, 9, 0, 0).unwrap())
            .with_report_type(report_type);
        SyntheticReportGenerator::from_seed(11).generate(&options).unwrap().report
    }

    fn read_part(bytes: &[u8], name: &str) -> String {
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut content = String::new();
        archive.by_name(name).unwrap().read_to_string(&mut content).unwrap();
        content
    }

    #[test]
    fn test_decode_entities() {
        assert_eq!(decode_entities("T&amp;C &lt;Report&gt;").unwrap(), "T&C <Report>");
        assert_eq!(decode_entities("400&#x2F;1 &#39;x&#x27;").unwrap(), "400/1 'x'");
        assert!(decode_entities("a &bogus; b").is_err());
    }

    #[test]
    fn test_special_characters_survive_rendering() {
        let mut r = report(ReportType::Grounding);
        r.header.project_name = "Substation <A> & \"B\" / 'C'".to_string();
        r.notes = Some("Line one\nLine two\u{7}".to_string());
        let bytes = DocxRenderer::new().render(&r).unwrap();

        let xml = read_part(&bytes, "word/document.xml");
        assert!(!xml.contains("<A>"));
        assert!(!xml.contains('\u{7}'));

        let texts = document_text(&bytes).unwrap();
        assert!(texts.iter().any(|t| t == "Substation <A> & \"B\" / 'C'"));
        assert!(texts.iter().any(|t| t == "Line one"));
        assert!(texts.iter().any(|t| t == "Line two"));

        let core = read_part(&bytes, "docProps/core.xml");
        assert!(core.contains(&format!("<cp:keywords>{}</cp:keywords>", r.report_number())));
    }

    #[test]
    fn test_render_is_byte_identical() {
        let r = report(ReportType::Transformer);
        let renderer = DocxRenderer::new();
        assert_eq!(renderer.render(&r).unwrap(), renderer.render(&r).unwrap());
    }

    #[test]
    fn test_package_contains_all_parts() {
        let bytes = DocxRenderer::new().render(&report(ReportType::Switchgear)).unwrap();
        let archive = ZipArchive::new(Cursor::new(bytes.as_slice())).unwrap();
        let names: Vec<&str> = archive.file_names().collect();
        for part in [
            "[Content_Types].xml",
            "_rels/.rels",
            "word/document.xml",
            "word/styles.xml",
            "word/footer1.xml",
            "word/_rels/document.xml.rels",
            "docProps/core.xml",
            "docProps/app.xml",
        ] {
            assert!(names.contains(&part), "缺少 {}", part);
        }
    }

    #[test]
    fn test_document_contains_sections_in_order() {
        let mut r = report(ReportType::ProtectionRelay);
        r.notes = Some("Relay firmware v2.1".to_string());
        let document = build_document(&r).unwrap();
        let texts = document_text(&DocxRenderer::new().render(&r).unwrap()).unwrap();

        let mut last = 0;
        for title in document.section_titles() {
            let position = texts.iter().position(|t| t == title).unwrap_or_else(|| panic!("缺少 {}", title));
            assert!(position >= last);
            last = position;
        }
        assert!(texts.iter().any(|t| t == NOTES_AND_RECOMMENDATIONS));
        assert!(texts.iter().any(|t| t == "Relay firmware v2.1"));
    }

    #[test]
    fn test_footer_and_core_properties() {
        let r = report(ReportType::Cable);
        let bytes = DocxRenderer::new().render(&r).unwrap();

        let footer = read_part(&bytes, "word/footer1.xml");
        assert!(footer.contains(" PAGE "));
        assert!(footer.contains(" NUMPAGES "));
        assert!(footer.contains(&format!("Report No: {}", r.report_number())));

        let core = read_part(&bytes, "docProps/core.xml");
        assert!(core.contains(&r.created_at.format("%Y-%m-%dT%H:%M:%SZ").to_string()));
        assert!(core.contains(r.report_type.label()));

        let document = read_part(&bytes, "word/document.xml");
        assert!(document.contains("<w:tblHeader/>"));
        assert!(document.contains("w:fill=\"D9D9D9\""));
        assert!(document.contains("<w:pgSz w:w=\"11906\" w:h=\"16838\"/>"));
    }

    #[test]
    fn test_variant_mismatch_is_rejected() {
        let mut r = report(ReportType::Transformer);
        r.test_data = report(ReportType::ProtectionRelay).test_data;
        let err = DocxRenderer::new().render(&r).unwrap_err();
        assert!(err.is_contract_violation());
    }
}
