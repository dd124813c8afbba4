//! PDF 分页排版
//!
//! 两阶段：先把文档树依次排到若干页上得到总页数，再给每一页补上页脚和 `Page N of M`。
//! 坐标单位为毫米，y 从页面顶部向下计算，绘制时再换算为 PDF 坐标。
//!
//! 内置字体只覆盖 WinAnsi 字符，排版前统一做 ASCII 化（`°` → `deg`，`²` → `2`，`μ` → `u`）。

use serde::Serialize;

use crate::domain::document::{
    grid_rows, Block, Cell, Footer, HeaderBand, ReportDocument, Section, SignatureBox, Table,
};

pub const PAGE_WIDTH: f32 = 210.0;
pub const PAGE_HEIGHT: f32 = 297.0;
pub const MARGIN_X: f32 = 15.0;
pub const MARGIN_TOP: f32 = 15.0;
/// 正文区域下边界，再往下是页脚
pub const CONTENT_BOTTOM: f32 = 272.0;
pub const FOOTER_RULE_Y: f32 = 278.0;
pub const FOOTER_TEXT_Y: f32 = 283.0;
pub const CONTENT_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN_X;

const PT_TO_MM: f32 = 0.3528;

const HEADER_LABEL_SIZE: f32 = 10.0;
const TITLE_SIZE: f32 = 14.0;
const SECTION_SIZE: f32 = 10.0;
const BODY_SIZE: f32 = 9.0;
const TABLE_SIZE: f32 = 8.0;
const SMALL_SIZE: f32 = 7.0;

const HEADER_BAND_HEIGHT: f32 = 20.0;
const SECTION_BAR_HEIGHT: f32 = 6.5;
const SIGNATURE_HEIGHT: f32 = 24.0;
const CELL_PADDING_X: f32 = 1.5;
const CELL_PADDING_Y: f32 = 1.2;
const GRID_LABEL_WIDTH: f32 = 32.0;

/// 表头与阴影底色（灰度，1.0 为白）
pub const HEADER_FILL: f32 = 0.9;
pub const SECTION_FILL: f32 = 0.93;

/// 排版元素
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Element {
    /// `y` 为基线位置
    Text {
        x: f32,
        y: f32,
        size: f32,
        bold: bool,
        text: String,
    },
    Line {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        thickness: f32,
    },
    /// `y` 为矩形上边
    Fill {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        gray: f32,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PageLayout {
    pub elements: Vec<Element>,
}

impl PageLayout {
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.elements.iter().filter_map(|e| match e {
            Element::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

/// 完整排版结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutPlan {
    pub pages: Vec<PageLayout>,
}

impl LayoutPlan {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.pages.iter().flat_map(|p| p.texts())
    }

    pub fn contains_text(&self, needle: &str) -> bool {
        self.texts().any(|t| t == needle)
    }
}

/// 排版文档
pub fn layout(document: &ReportDocument) -> LayoutPlan {
    let mut layouter = Layouter::new();
    layouter.header_band(&document.header);
    for section in &document.sections {
        layouter.section(section);
    }
    let mut pages = layouter.finish();

    // 第二阶段：总页数已知
    let total = pages.len();
    for (index, page) in pages.iter_mut().enumerate() {
        footer(page, &document.footer, index + 1, total);
    }
    LayoutPlan { pages }
}

/// 内置字体可用的 ASCII 文本
pub fn sanitize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '°' => out.push_str(" deg"),
            '²' => out.push('2'),
            '³' => out.push('3'),
            'μ' | 'µ' => out.push('u'),
            'Ω' => out.push_str("Ohm"),
            '–' | '—' => out.push('-'),
            '‘' | '’' => out.push('\''),
            '“' | '”' => out.push('"'),
            '\t' => out.push(' '),
            '\n' => out.push('\n'),
            c if c.is_ascii() && !c.is_ascii_control() => out.push(c),
            _ => out.push('?'),
        }
    }
    out
}

fn line_height(size: f32) -> f32 {
    size * PT_TO_MM * 1.35
}

/// Helvetica 字宽近似（单位 em）
fn char_width(c: char) -> f32 {
    match c {
        'i' | 'j' | 'l' | '.' | ',' | ':' | ';' | '\'' | '|' | '!' => 0.28,
        ' ' | 'f' | 't' | 'r' | 'I' | '(' | ')' | '-' | '/' | '[' | ']' => 0.33,
        'm' | 'w' | 'M' | 'W' | '@' | '%' => 0.83,
        'A'..='Z' | '&' | '_' => 0.67,
        _ => 0.556,
    }
}

/// 估算文本宽度（mm）
pub fn text_width(text: &str, size: f32, bold: bool) -> f32 {
    let em: f32 = text.chars().map(char_width).sum();
    let factor = if bold { 1.05 } else { 1.0 };
    em * size * PT_TO_MM * factor
}

/// 按宽度折行，保留原有换行
pub fn wrap(text: &str, size: f32, bold: bool, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut current = String::new();
        for word in paragraph.split(' ').filter(|w| !w.is_empty()) {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{} {}", current, word)
            };
            if text_width(&candidate, size, bold) <= max_width {
                current = candidate;
                continue;
            }
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            // 单词本身超宽时按字符硬切
            for c in word.chars() {
                current.push(c);
                if text_width(&current, size, bold) > max_width && current.chars().count() > 1 {
                    current.pop();
                    lines.push(std::mem::take(&mut current));
                    current.push(c);
                }
            }
        }
        lines.push(current);
    }
    lines
}

struct MeasuredRow {
    cells: Vec<(Vec<String>, bool)>,
    height: f32,
}

struct Layouter {
    done: Vec<PageLayout>,
    current: PageLayout,
    y: f32,
}

impl Layouter {
    fn new() -> Self {
        Self {
            done: Vec::new(),
            current: PageLayout::default(),
            y: MARGIN_TOP,
        }
    }

    fn finish(mut self) -> Vec<PageLayout> {
        self.done.push(self.current);
        self.done
    }

    fn new_page(&mut self) {
        self.done.push(std::mem::take(&mut self.current));
        self.y = MARGIN_TOP;
    }

    fn remaining(&self) -> f32 {
        CONTENT_BOTTOM - self.y
    }

    /// 剩余空间不足时换页；页首不再换页
    fn ensure(&mut self, height: f32) {
        if height > self.remaining() && self.y > MARGIN_TOP {
            self.new_page();
        }
    }

    fn text(&mut self, x: f32, y: f32, size: f32, bold: bool, text: &str) {
        if text.is_empty() {
            return;
        }
        self.current.elements.push(Element::Text {
            x,
            y,
            size,
            bold,
            text: text.to_string(),
        });
    }

    fn centered(&mut self, center: f32, y: f32, size: f32, bold: bool, text: &str) {
        let x = center - text_width(text, size, bold) / 2.0;
        self.text(x, y, size, bold, text);
    }

    fn right_aligned(&mut self, right: f32, y: f32, size: f32, bold: bool, text: &str) {
        let x = right - text_width(text, size, bold);
        self.text(x, y, size, bold, text);
    }

    fn line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, thickness: f32) {
        self.current.elements.push(Element::Line {
            x1,
            y1,
            x2,
            y2,
            thickness,
        });
    }

    fn fill(&mut self, x: f32, y: f32, width: f32, height: f32, gray: f32) {
        self.current.elements.push(Element::Fill {
            x,
            y,
            width,
            height,
            gray,
        });
    }

    fn header_band(&mut self, header: &HeaderBand) {
        let top = self.y;
        let right = MARGIN_X + CONTENT_WIDTH;
        let center = MARGIN_X + CONTENT_WIDTH / 2.0;

        self.text(MARGIN_X, top + 6.0, HEADER_LABEL_SIZE, true, &sanitize(&header.label));
        self.text(MARGIN_X, top + 11.0, SMALL_SIZE, false, &sanitize(&header.sub_label));

        self.centered(center, top + 7.0, TITLE_SIZE, true, &sanitize(&header.title));
        self.centered(center, top + 13.0, BODY_SIZE, false, &sanitize(&header.subtitle));

        self.right_aligned(right, top + 5.0, BODY_SIZE, true, &sanitize(&header.report_number));
        self.right_aligned(right, top + 10.0, TABLE_SIZE, false, &sanitize(&header.revision_line));
        self.right_aligned(right, top + 14.5, TABLE_SIZE, false, &sanitize(&header.date_line));

        self.line(MARGIN_X, top + HEADER_BAND_HEIGHT - 2.0, right, top + HEADER_BAND_HEIGHT - 2.0, 0.8);
        self.y = top + HEADER_BAND_HEIGHT + 2.0;
    }

    fn section(&mut self, section: &Section) {
        // 标题与第一块内容的开头放在同一页
        let first_block = section.blocks.first().map(|b| self.lead_height(b)).unwrap_or(0.0);
        self.ensure(SECTION_BAR_HEIGHT + 2.0 + first_block);

        let top = self.y;
        self.fill(MARGIN_X, top, CONTENT_WIDTH, SECTION_BAR_HEIGHT, SECTION_FILL);
        self.text(MARGIN_X + 2.0, top + 4.6, SECTION_SIZE, true, &sanitize(&section.title));
        self.y = top + SECTION_BAR_HEIGHT + 2.0;

        for block in &section.blocks {
            self.block(block);
        }
        self.y += 2.0;
    }

    /// 块开头不可拆分部分的高度
    fn lead_height(&self, block: &Block) -> f32 {
        match block {
            Block::InfoGrid { .. } => line_height(TABLE_SIZE) + 1.0,
            Block::Caption { .. } => line_height(BODY_SIZE) + 2.0 * (line_height(TABLE_SIZE) + 2.0 * CELL_PADDING_Y),
            Block::Table(_) => 2.0 * (line_height(TABLE_SIZE) + 2.0 * CELL_PADDING_Y),
            Block::Note { .. } => line_height(TABLE_SIZE),
            Block::Paragraph { .. } => 2.0 * line_height(BODY_SIZE),
            Block::Signatures { .. } => SIGNATURE_HEIGHT,
        }
    }

    fn block(&mut self, block: &Block) {
        match block {
            Block::InfoGrid { items } => {
                let half = CONTENT_WIDTH / 2.0;
                let value_width = half - GRID_LABEL_WIDTH - 2.0;
                let lh = line_height(TABLE_SIZE);
                for (left, right) in grid_rows(items) {
                    let columns: Vec<(f32, Vec<String>, String)> = std::iter::once(Some(left))
                        .chain(std::iter::once(right))
                        .enumerate()
                        .filter_map(|(i, item)| {
                            item.map(|item| {
                                (
                                    MARGIN_X + i as f32 * half,
                                    wrap(&sanitize(&item.value), TABLE_SIZE, false, value_width),
                                    sanitize(&item.label),
                                )
                            })
                        })
                        .collect();
                    let lines = columns.iter().map(|(_, v, _)| v.len()).max().unwrap_or(1);
                    let height = lines as f32 * lh + 1.0;
                    self.ensure(height);
                    let baseline = self.y + lh * 0.75;
                    for (x, values, label) in &columns {
                        self.text(*x, baseline, TABLE_SIZE, true, label);
                        for (i, value) in values.iter().enumerate() {
                            self.text(x + GRID_LABEL_WIDTH, baseline + i as f32 * lh, TABLE_SIZE, false, value);
                        }
                    }
                    self.y += height;
                }
                self.y += 2.0;
            }
            Block::Caption { text } => {
                let lh = line_height(BODY_SIZE);
                self.ensure(self.lead_height(block));
                self.text(MARGIN_X, self.y + lh * 0.75, BODY_SIZE, true, &sanitize(text));
                self.y += lh + 0.5;
            }
            Block::Table(table) => self.table(table),
            Block::Note { text } => {
                self.wrapped_lines(text, TABLE_SIZE, false);
                self.y += 2.0;
            }
            Block::Paragraph { label, text } => {
                self.ensure(self.lead_height(block));
                let lh = line_height(BODY_SIZE);
                self.text(MARGIN_X, self.y + lh * 0.75, BODY_SIZE, true, &sanitize(label));
                self.y += lh;
                self.wrapped_lines(text, BODY_SIZE, false);
                self.y += 2.0;
            }
            Block::Signatures { boxes } => self.signatures(boxes),
        }
    }

    fn wrapped_lines(&mut self, text: &str, size: f32, bold: bool) {
        let lh = line_height(size);
        for line in wrap(&sanitize(text), size, bold, CONTENT_WIDTH) {
            self.ensure(lh);
            self.text(MARGIN_X, self.y + lh * 0.75, size, bold, &line);
            self.y += lh;
        }
    }

    fn measure_row(cells: &[Cell], widths: &[f32]) -> MeasuredRow {
        let lh = line_height(TABLE_SIZE);
        let cells: Vec<(Vec<String>, bool)> = cells
            .iter()
            .zip(widths)
            .map(|(cell, width)| {
                let lines = wrap(&sanitize(&cell.text), TABLE_SIZE, cell.bold, width - 2.0 * CELL_PADDING_X);
                (lines, cell.bold)
            })
            .collect();
        let lines = cells.iter().map(|(l, _)| l.len()).max().unwrap_or(1).max(1);
        MeasuredRow {
            cells,
            height: lines as f32 * lh + 2.0 * CELL_PADDING_Y,
        }
    }

    fn draw_row(&mut self, row: &MeasuredRow, widths: &[f32], shaded: bool) {
        let top = self.y;
        let lh = line_height(TABLE_SIZE);
        if shaded {
            self.fill(MARGIN_X, top, CONTENT_WIDTH, row.height, HEADER_FILL);
        }

        let mut x = MARGIN_X;
        for ((lines, bold), width) in row.cells.iter().zip(widths) {
            for (i, line) in lines.iter().enumerate() {
                let baseline = top + CELL_PADDING_Y + lh * 0.75 + i as f32 * lh;
                self.text(x + CELL_PADDING_X, baseline, TABLE_SIZE, *bold, line);
            }
            self.line(x, top, x, top + row.height, 0.3);
            x += width;
        }
        let right = MARGIN_X + CONTENT_WIDTH;
        self.line(right, top, right, top + row.height, 0.3);
        self.line(MARGIN_X, top, right, top, 0.3);
        self.line(MARGIN_X, top + row.height, right, top + row.height, 0.3);
        self.y = top + row.height;
    }

    /// 表格：行不跨页，续页重复表头
    fn table(&mut self, table: &Table) {
        let widths: Vec<f32> = table
            .columns
            .iter()
            .map(|c| c.width as f32 / 100.0 * CONTENT_WIDTH)
            .collect();
        let header_cells: Vec<Cell> = table.columns.iter().map(|c| Cell::bold(c.title.clone())).collect();
        let header = Self::measure_row(&header_cells, &widths);
        let rows: Vec<MeasuredRow> = table.rows.iter().map(|r| Self::measure_row(r, &widths)).collect();

        let first = rows.first().map(|r| r.height).unwrap_or(0.0);
        self.ensure(header.height + first);
        self.draw_row(&header, &widths, true);

        for row in &rows {
            if row.height > self.remaining() {
                self.new_page();
                self.draw_row(&header, &widths, true);
            }
            self.draw_row(row, &widths, false);
        }
        self.y += 3.0;
    }

    fn signatures(&mut self, boxes: &[SignatureBox]) {
        self.ensure(SIGNATURE_HEIGHT);
        let top = self.y;
        let width = CONTENT_WIDTH / boxes.len().max(1) as f32;
        for (i, signature) in boxes.iter().enumerate() {
            let x = MARGIN_X + i as f32 * width;
            self.text(x, top + 4.0, BODY_SIZE, true, &sanitize(&signature.role));
            self.text(x, top + 14.0, BODY_SIZE, false, &sanitize(&signature.name));
            self.text(x, top + 19.0, SMALL_SIZE, false, &sanitize(&signature.date_line));
        }
        self.y = top + SIGNATURE_HEIGHT;
    }
}

fn footer(page: &mut PageLayout, footer: &Footer, number: usize, total: usize) {
    let right = MARGIN_X + CONTENT_WIDTH;
    let page_label = Footer::page_label(number, total);
    let center_text = sanitize(&footer.report_number_line);

    page.elements.push(Element::Line {
        x1: MARGIN_X,
        y1: FOOTER_RULE_Y,
        x2: right,
        y2: FOOTER_RULE_Y,
        thickness: 0.3,
    });
    page.elements.push(Element::Text {
        x: MARGIN_X,
        y: FOOTER_TEXT_Y,
        size: SMALL_SIZE,
        bold: false,
        text: sanitize(&footer.project_line),
    });
    page.elements.push(Element::Text {
        x: MARGIN_X + CONTENT_WIDTH / 2.0 - text_width(&center_text, SMALL_SIZE, false) / 2.0,
        y: FOOTER_TEXT_Y,
        size: SMALL_SIZE,
        bold: false,
        text: center_text,
    });
    page.elements.push(Element::Text {
        x: right - text_width(&page_label, SMALL_SIZE, false),
        y: FOOTER_TEXT_Y,
        size: SMALL_SIZE,
        bold: false,
        text: page_label,
    });
}
