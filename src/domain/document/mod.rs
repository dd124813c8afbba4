//! 格式无关的报告文档结构
//!
//! PDF 与 DOCX 两个渲染后端都从同一棵 `ReportDocument` 树降级输出，
//! 章节顺序、表格列和文字内容只在 `builder` 中决定一次。
//!
//! 结构：
//! - 页眉带：固定标签、居中的报告类型与项目名、右侧报告编号/修订号/日期
//! - 章节列表：每个章节由若干块（信息网格、小标题、表格、说明、段落、签名）组成
//! - 页脚：项目名、报告编号，页码由后端计算

use serde::Serialize;

pub mod builder;

pub use builder::build_document;

/// 页眉左侧固定标签
pub const HEADER_LABEL: &str = "T&C REPORT";
/// 页眉左侧副标签
pub const HEADER_SUB_LABEL: &str = "Testing & Commissioning";
/// 可选字段缺失时的占位
pub const NOT_AVAILABLE: &str = "N/A";
/// 签名栏空白线
pub const BLANK_SIGNATURE: &str = "________________";
/// 签名日期空白线
pub const BLANK_DATE: &str = "____________";

/// 章节标题
pub const PROJECT_INFORMATION: &str = "PROJECT INFORMATION";
pub const EQUIPMENT_INFORMATION: &str = "EQUIPMENT INFORMATION";
pub const NOTES_AND_RECOMMENDATIONS: &str = "NOTES & RECOMMENDATIONS";
pub const SIGNATURES: &str = "SIGNATURES";

/// 通用结果表列：(列名, 宽度百分比)
pub const RESULT_COLUMNS: [(&str, u32); 7] = [
    ("Test", 30),
    ("Setting", 15),
    ("Measured", 15),
    ("Unit", 10),
    ("Tol %", 10),
    ("Dev %", 10),
    ("Result", 10),
];

/// 报告文档
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportDocument {
    /// 文档元数据标题
    pub title: String,
    pub header: HeaderBand,
    pub sections: Vec<Section>,
    pub footer: Footer,
}

impl ReportDocument {
    /// 按顺序列出章节标题
    pub fn section_titles(&self) -> Vec<&str> {
        self.sections.iter().map(|s| s.title.as_str()).collect()
    }

    pub fn section(&self, title: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.title == title)
    }

    /// 文档中所有可见文字，按阅读顺序（不含页码）
    pub fn visible_text(&self) -> Vec<String> {
        let mut texts = self.header.texts();
        for section in &self.sections {
            texts.push(section.title.clone());
            for block in &section.blocks {
                texts.extend(block.texts());
            }
        }
        texts.push(self.footer.project_line.clone());
        texts.push(self.footer.report_number_line.clone());
        texts
    }
}

/// 页眉带
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderBand {
    pub label: String,
    pub sub_label: String,
    /// 报告类型名称（居中）
    pub title: String,
    /// 项目名称（居中）
    pub subtitle: String,
    pub report_number: String,
    /// `Rev: N`
    pub revision_line: String,
    /// `Date: Oct 15, 2024`
    pub date_line: String,
}

impl HeaderBand {
    fn texts(&self) -> Vec<String> {
        vec![
            self.label.clone(),
            self.sub_label.clone(),
            self.title.clone(),
            self.subtitle.clone(),
            self.report_number.clone(),
            self.revision_line.clone(),
            self.date_line.clone(),
        ]
    }
}

/// 页脚
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Footer {
    /// `T&C Report - <项目名>`
    pub project_line: String,
    /// `Report No: <编号>`
    pub report_number_line: String,
}

impl Footer {
    /// 页码文字，页号从 1 开始
    pub fn page_label(page: usize, total: usize) -> String {
        format!("Page {} of {}", page, total)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub title: String,
    pub blocks: Vec<Block>,
}

impl Section {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            blocks: Vec::new(),
        }
    }

    pub fn push(&mut self, block: Block) -> &mut Self {
        self.blocks.push(block);
        self
    }

    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.blocks.iter().filter_map(|b| match b {
            Block::Table(t) => Some(t),
            _ => None,
        })
    }
}

/// 章节内容块
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Block {
    /// 两列的标签/值网格
    InfoGrid { items: Vec<InfoItem> },
    /// 表格上方的加粗小标题
    Caption { text: String },
    Table(Table),
    /// 小号说明文字
    Note { text: String },
    /// 带加粗标签的段落
    Paragraph { label: String, text: String },
    /// 三栏签名
    Signatures { boxes: Vec<SignatureBox> },
}

impl Block {
    pub fn caption(text: impl Into<String>) -> Self {
        Block::Caption { text: text.into() }
    }

    pub fn note(text: impl Into<String>) -> Self {
        Block::Note { text: text.into() }
    }

    fn texts(&self) -> Vec<String> {
        match self {
            Block::InfoGrid { items } => items
                .iter()
                .flat_map(|i| [i.label.clone(), i.value.clone()])
                .collect(),
            Block::Caption { text } | Block::Note { text } => vec![text.clone()],
            Block::Table(table) => {
                let mut texts: Vec<String> = table.columns.iter().map(|c| c.title.clone()).collect();
                for row in &table.rows {
                    texts.extend(row.iter().map(|c| c.text.clone()));
                }
                texts
            }
            Block::Paragraph { label, text } => vec![label.clone(), text.clone()],
            Block::Signatures { boxes } => boxes
                .iter()
                .flat_map(|b| [b.role.clone(), b.name.clone(), b.date_line.clone()])
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InfoItem {
    /// 带冒号的标签，例如 `Project Name:`
    pub label: String,
    pub value: String,
}

impl InfoItem {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// 信息网格按两列排布：前一半在左列，其余在右列
pub fn grid_rows(items: &[InfoItem]) -> Vec<(&InfoItem, Option<&InfoItem>)> {
    let left = (items.len() + 1) / 2;
    items[..left]
        .iter()
        .enumerate()
        .map(|(i, item)| (item, items.get(left + i)))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub title: String,
    /// 占表格宽度的百分比
    pub width: u32,
}

/// 表格，各列宽度之和为 100
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(columns: &[(&str, u32)]) -> Self {
        Self {
            columns: columns
                .iter()
                .map(|(title, width)| Column {
                    title: title.to_string(),
                    width: *width,
                })
                .collect(),
            rows: Vec::new(),
        }
    }

    /// 等宽列
    pub fn even(titles: &[&str]) -> Self {
        let n = titles.len().max(1) as u32;
        let base = 100 / n;
        let columns: Vec<(&str, u32)> = titles
            .iter()
            .enumerate()
            .map(|(i, t)| {
                // 余数补给最后一列
                let width = if i as u32 == n - 1 { 100 - base * (n - 1) } else { base };
                (*t, width)
            })
            .collect();
        Self::new(&columns)
    }

    pub fn push_row(&mut self, row: Vec<Cell>) -> &mut Self {
        self.rows.push(row);
        self
    }

    pub fn column_titles(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.title.as_str()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cell {
    pub text: String,
    pub bold: bool,
}

impl Cell {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: false,
        }
    }

    pub fn bold(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureBox {
    /// `Tested By` / `Reviewed By` / `Approved By`
    pub role: String,
    /// 签名人，缺失时为空白线
    pub name: String,
    pub date_line: String,
}
