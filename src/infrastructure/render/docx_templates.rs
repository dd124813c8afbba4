//! DOCX 部件模板
//!
//! 所有 OOXML 部件都是 tera 模板，模板名以 `.xml` 结尾，tera 会自动转义变量。
//! 段落、文字片段、表格行列等重复结构放在 `docx/macros.xml` 的宏里。

use std::collections::HashMap;

use tera::{try_get_value, Tera, Value};

use crate::utils::error::AppResult;

pub const CONTENT_TYPES: &str = "docx/content_types.xml";
pub const PACKAGE_RELS: &str = "docx/package_rels.xml";
pub const DOCUMENT: &str = "docx/document.xml";
pub const STYLES: &str = "docx/styles.xml";
pub const FOOTER: &str = "docx/footer.xml";
pub const DOCUMENT_RELS: &str = "docx/document_rels.xml";
pub const CORE: &str = "docx/core.xml";
pub const APP: &str = "docx/app.xml";

const MACROS_TEMPLATE: &str = r#"{% macro run(text, bold=false, size=0) -%}
<w:r>{% if bold or size > 0 %}<w:rPr>{% if bold %}<w:b/>{% endif %}{% if size > 0 %}<w:sz w:val="{{ size }}"/><w:szCs w:val="{{ size }}"/>{% endif %}</w:rPr>{% endif %}{% for line in text | xml_lines %}{% if not loop.first %}<w:br/>{% endif %}<w:t xml:space="preserve">{{ line }}</w:t>{% endfor %}</w:r>
{%- endmacro run %}

{% macro para(text="", bold=false, size=0, style="", align="", keep_next=false, before=0, after=0) -%}
<w:p>{% if style or align or keep_next or before > 0 or after > 0 %}<w:pPr>{% if style %}<w:pStyle w:val="{{ style }}"/>{% endif %}{% if keep_next %}<w:keepNext/>{% endif %}{% if before > 0 or after > 0 %}<w:spacing{% if before > 0 %} w:before="{{ before }}"{% endif %}{% if after > 0 %} w:after="{{ after }}"{% endif %}/>{% endif %}{% if align %}<w:jc w:val="{{ align }}"/>{% endif %}</w:pPr>{% endif %}{% if text %}{{ self::run(text=text, bold=bold, size=size) }}{% endif %}</w:p>
{%- endmacro para %}

{% macro tbl_open(grid, bordered=false) -%}
<w:tbl><w:tblPr><w:tblW w:w="5000" w:type="pct"/><w:tblLayout w:type="fixed"/><w:tblBorders>
{%- if bordered -%}
<w:top w:val="single" w:sz="4" w:space="0" w:color="BFBFBF"/><w:left w:val="single" w:sz="4" w:space="0" w:color="BFBFBF"/><w:bottom w:val="single" w:sz="4" w:space="0" w:color="BFBFBF"/><w:right w:val="single" w:sz="4" w:space="0" w:color="BFBFBF"/><w:insideH w:val="single" w:sz="4" w:space="0" w:color="BFBFBF"/><w:insideV w:val="single" w:sz="4" w:space="0" w:color="BFBFBF"/>
{%- else -%}
<w:top w:val="nil"/><w:left w:val="nil"/><w:bottom w:val="nil"/><w:right w:val="nil"/><w:insideH w:val="nil"/><w:insideV w:val="nil"/>
{%- endif -%}
</w:tblBorders></w:tblPr><w:tblGrid>{% for w in grid %}<w:gridCol w:w="{{ w }}"/>{% endfor %}</w:tblGrid>
{%- endmacro tbl_open %}

{% macro tr_open(header=false) -%}
<w:tr><w:trPr><w:cantSplit/>{% if header %}<w:tblHeader/>{% endif %}</w:trPr>
{%- endmacro tr_open %}

{% macro tc_open(width, fill="") -%}
<w:tc><w:tcPr><w:tcW w:w="{{ width }}" w:type="pct"/>{% if fill %}<w:shd w:val="clear" w:color="auto" w:fill="{{ fill }}"/>{% endif %}</w:tcPr>
{%- endmacro tc_open %}

{% macro field(instr) -%}
<w:fldSimple w:instr=" {{ instr }} "><w:r><w:rPr><w:sz w:val="14"/></w:rPr><w:t>1</w:t></w:r></w:fldSimple>
{%- endmacro field %}
"#;

const DOCUMENT_TEMPLATE: &str = r#"{%- import "docx/macros.xml" as m -%}
<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><w:body>
{{ m::tbl_open(grid=band.grid) }}{{ m::tr_open() }}
{{ m::tc_open(width=band.cells.0) }}{{ m::para(text=header.label, bold=true, size=20) }}{{ m::para(text=header.subLabel, size=14) }}</w:tc>
{{ m::tc_open(width=band.cells.1) }}{{ m::para(text=header.title, bold=true, size=28, align="center") }}{{ m::para(text=header.subtitle, align="center") }}</w:tc>
{{ m::tc_open(width=band.cells.2) }}{{ m::para(text=header.reportNumber, bold=true, align="right") }}{{ m::para(text=header.revisionLine, size=16, align="right") }}{{ m::para(text=header.dateLine, size=16, align="right") }}</w:tc>
</w:tr></w:tbl>
<w:p><w:pPr><w:pBdr><w:bottom w:val="single" w:sz="12" w:space="1" w:color="000000"/></w:pBdr></w:pPr></w:p>
{%- for section in sections %}
{{ m::para(text=section.title, style="SectionTitle") }}
{%- for part in section.parts %}
{%- if part.kind == "infoGrid" %}
{{ m::tbl_open(grid=part.grid) }}
{%- for row in part.rows %}{{ m::tr_open() }}{% for item in row %}{{ m::tc_open(width=item.labelWidth) }}{{ m::para(text=item.label, bold=true, size=16) }}</w:tc>{{ m::tc_open(width=item.valueWidth) }}{{ m::para(text=item.value, size=16) }}</w:tc>{% endfor %}</w:tr>{% endfor %}</w:tbl>{{ m::para() }}
{%- elif part.kind == "caption" %}
{{ m::para(text=part.text, style="TableCaption") }}
{%- elif part.kind == "table" %}
{{ m::tbl_open(grid=part.grid, bordered=true) }}{{ m::tr_open(header=true) }}
{%- for column in part.columns %}{{ m::tc_open(width=column.width, fill="D9D9D9") }}{{ m::para(text=column.text, bold=true, size=16, keep_next=true) }}</w:tc>{% endfor %}</w:tr>
{%- for row in part.rows %}
{{ m::tr_open() }}{% for cell in row %}{{ m::tc_open(width=cell.width) }}{{ m::para(text=cell.text, bold=cell.bold, size=16) }}</w:tc>{% endfor %}</w:tr>
{%- endfor %}</w:tbl>{{ m::para() }}
{%- elif part.kind == "note" %}
{{ m::para(text=part.text, style="Note") }}
{%- elif part.kind == "paragraph" %}
{{ m::para(text=part.label, bold=true, keep_next=true, before=80) }}{{ m::para(text=part.text, after=80) }}
{%- elif part.kind == "signatures" %}
{{ m::tbl_open(grid=part.grid) }}{{ m::tr_open() }}
{%- for signature in part.boxes %}{{ m::tc_open(width=signature.width) }}{{ m::para(text=signature.role, bold=true) }}{{ m::para() }}{{ m::para(text=signature.name) }}{{ m::para(text=signature.dateLine, size=14) }}</w:tc>{% endfor %}</w:tr></w:tbl>{{ m::para() }}
{%- endif %}
{%- endfor %}
{%- endfor %}
<w:sectPr><w:footerReference w:type="default" r:id="rId2"/><w:pgSz w:w="{{ page.width }}" w:h="{{ page.height }}"/><w:pgMar w:top="{{ page.margin }}" w:right="{{ page.margin }}" w:bottom="1134" w:left="{{ page.margin }}" w:header="567" w:footer="567" w:gutter="0"/></w:sectPr>
</w:body></w:document>
"#;

const FOOTER_TEMPLATE: &str = r#"{%- import "docx/macros.xml" as m -%}
<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:ftr xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><w:p><w:pPr><w:pBdr><w:top w:val="single" w:sz="4" w:space="4" w:color="808080"/></w:pBdr><w:tabs><w:tab w:val="center" w:pos="{{ page.center }}"/><w:tab w:val="right" w:pos="{{ page.contentWidth }}"/></w:tabs></w:pPr>
{{ m::run(text=footer.projectLine, size=14) }}<w:r><w:tab/></w:r>{{ m::run(text=footer.reportNumberLine, size=14) }}<w:r><w:tab/></w:r>
{{- m::run(text="Page ", size=14) }}{{ m::field(instr="PAGE") }}{{ m::run(text=" of ", size=14) }}{{ m::field(instr="NUMPAGES") }}</w:p></w:ftr>
"#;

const CORE_TEMPLATE: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
<dc:title>{{ core.title | xml_text }}</dc:title><dc:subject>{{ core.subject | xml_text }}</dc:subject><dc:creator>{{ core.creator | xml_text }}</dc:creator><cp:keywords>{{ core.keywords | xml_text }}</cp:keywords>
<dcterms:created xsi:type="dcterms:W3CDTF">{{ core.created }}</dcterms:created><dcterms:modified xsi:type="dcterms:W3CDTF">{{ core.modified }}</dcterms:modified>
</cp:coreProperties>
"#;

const CONTENT_TYPES_TEMPLATE: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
<Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/>
<Override PartName="/word/footer1.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.footer+xml"/>
<Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/>
<Override PartName="/docProps/app.xml" ContentType="application/vnd.openxmlformats-officedocument.extended-properties+xml"/>
</Types>
"#;

const PACKAGE_RELS_TEMPLATE: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>
<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/>
<Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties" Target="docProps/app.xml"/>
</Relationships>
"#;

const DOCUMENT_RELS_TEMPLATE: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/footer" Target="footer1.xml"/>
</Relationships>
"#;

const STYLES_TEMPLATE: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
<w:docDefaults><w:rPrDefault><w:rPr><w:rFonts w:ascii="Arial" w:hAnsi="Arial" w:cs="Arial" w:eastAsia="Arial"/><w:sz w:val="18"/><w:szCs w:val="18"/></w:rPr></w:rPrDefault>
<w:pPrDefault><w:pPr><w:spacing w:after="0" w:line="240" w:lineRule="auto"/></w:pPr></w:pPrDefault></w:docDefaults>
<w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/><w:qFormat/></w:style>
<w:style w:type="paragraph" w:customStyle="1" w:styleId="SectionTitle"><w:name w:val="Section Title"/><w:basedOn w:val="Normal"/>
<w:pPr><w:keepNext/><w:shd w:val="clear" w:color="auto" w:fill="EDEDED"/><w:spacing w:before="200" w:after="100"/></w:pPr><w:rPr><w:b/><w:sz w:val="20"/><w:szCs w:val="20"/></w:rPr></w:style>
<w:style w:type="paragraph" w:customStyle="1" w:styleId="TableCaption"><w:name w:val="Table Caption"/><w:basedOn w:val="Normal"/>
<w:pPr><w:keepNext/><w:spacing w:before="120" w:after="60"/></w:pPr><w:rPr><w:b/></w:rPr></w:style>
<w:style w:type="paragraph" w:customStyle="1" w:styleId="Note"><w:name w:val="Note"/><w:basedOn w:val="Normal"/>
<w:pPr><w:spacing w:before="40" w:after="80"/></w:pPr><w:rPr><w:sz w:val="16"/><w:szCs w:val="16"/></w:rPr></w:style>
<w:style w:type="table" w:default="1" w:styleId="TableNormal"><w:name w:val="Normal Table"/>
<w:tblPr><w:tblCellMar><w:left w:w="85" w:type="dxa"/><w:right w:w="85" w:type="dxa"/></w:tblCellMar></w:tblPr></w:style>
</w:styles>
"#;

const APP_TEMPLATE: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties"><Application>tc-report-engine</Application></Properties>
"#;

/// 去掉 XML 1.0 不允许出现的字符
pub fn xml_chars(text: &str) -> String {
    text.chars()
        .filter(|c| matches!(c, '\t' | '\n' | '\r') || (*c as u32 >= 0x20 && *c != '\u{FFFE}' && *c != '\u{FFFF}'))
        .collect()
}

/// 过滤器：清理非法字符
fn xml_text(value: &Value, _: &HashMap<String, Value>) -> tera::Result<Value> {
    let text = try_get_value!("xml_text", "value", String, value);
    Ok(Value::String(xml_chars(&text)))
}

/// 过滤器：按换行拆成多行，每行单独输出 `<w:t>`，行间插入 `<w:br/>`
fn xml_lines(value: &Value, _: &HashMap<String, Value>) -> tera::Result<Value> {
    let text = try_get_value!("xml_lines", "value", String, value);
    let text = text.replace("\r\n", "\n");
    Ok(Value::Array(
        text.split('\n')
            .map(|line| Value::String(xml_chars(line)))
            .collect(),
    ))
}

/// 创建加载了全部 DOCX 模板的引擎
pub fn engine() -> AppResult<Tera> {
    let mut tera = Tera::default();
    tera.register_filter("xml_text", xml_text);
    tera.register_filter("xml_lines", xml_lines);
    tera.add_raw_templates(vec![
        ("docx/macros.xml", MACROS_TEMPLATE),
        (DOCUMENT, DOCUMENT_TEMPLATE),
        (FOOTER, FOOTER_TEMPLATE),
        (CORE, CORE_TEMPLATE),
        (CONTENT_TYPES, CONTENT_TYPES_TEMPLATE),
        (PACKAGE_RELS, PACKAGE_RELS_TEMPLATE),
        (DOCUMENT_RELS, DOCUMENT_RELS_TEMPLATE),
        (STYLES, STYLES_TEMPLATE),
        (APP, APP_TEMPLATE),
    ])?;
    Ok(tera)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tera::Context;

    #[test]
    fn test_all_templates_compile() {
        let tera = engine().unwrap();
        for name in [CONTENT_TYPES, PACKAGE_RELS, DOCUMENT, STYLES, FOOTER, DOCUMENT_RELS, CORE, APP] {
            assert!(tera.get_template_names().any(|n| n == name), "缺少模板 {}", name);
        }
    }

    #[test]
    fn test_run_macro_escapes_and_breaks_lines() {
        let mut tera = engine().unwrap();
        tera.add_raw_template(
            "inline_run.xml",
            r#"{%- import "docx/macros.xml" as m -%}{{ m::run(text=value, bold=true) }}"#,
        )
        .unwrap();
        let mut context = Context::new();
        context.insert("value", "A & B <x>\nsecond\u{1}");
        let out = tera.render("inline_run.xml", &context).unwrap();
        assert_eq!(
            out,
            "<w:r><w:rPr><w:b/></w:rPr><w:t xml:space=\"preserve\">A &amp; B &lt;x&gt;</w:t><w:br/><w:t xml:space=\"preserve\">second</w:t></w:r>"
        );
    }

    #[test]
    fn test_xml_chars() {
        assert_eq!(xml_chars("a\u{0}b\u{1F}c\td"), "abc\td");
        assert_eq!(xml_chars("Ω 33 kV"), "Ω 33 kV");
    }
}
