//! 渲染集成测试
//!
//! 同一份报告分别经过 PDF 排版和 DOCX 打包，章节与结果表内容必须一致。

use chrono::{TimeZone, Utc};
use tc_report_lib::domain::document::build_document;
use tc_report_lib::infrastructure::render::docx_renderer::document_text;
use tc_report_lib::infrastructure::render::pdf_layout::sanitize;
use tc_report_lib::{
    DocxRenderer, GeneratorOptions, PdfRenderer, Report, ReportRenderer, ReportType,
    SamplingProfile, SyntheticReportGenerator,
};

fn report(seed: u64, report_type: ReportType, fault_rate: f64) -> Report {
    let options = GeneratorOptions::at(Utc.with_ymd_and_hms(2024, 10, 15, 9, 0, 0).unwrap())
        .with_report_type(report_type)
        .with_profile(SamplingProfile::with_fault_rate(fault_rate).unwrap());
    SyntheticReportGenerator::from_seed(seed)
        .generate(&options)
        .unwrap()
        .report
}

/// 按顺序出现
fn assert_in_order(haystack: &[String], needles: &[String], backend: &str) {
    let mut from = 0;
    for needle in needles {
        let offset = haystack[from..]
            .iter()
            .position(|t| t == needle)
            .unwrap_or_else(|| panic!("{} 缺少或顺序错误: {}", backend, needle));
        from += offset + 1;
    }
}

#[test]
fn test_pdf_and_docx_share_section_order() {
    for seed in [1_u64, 2, 3] {
        for report_type in ReportType::ALL {
            let mut r = report(seed, report_type, 0.0);
            r.notes = Some("Tested per site procedure".to_string());
            let document = build_document(&r).unwrap();
            let titles: Vec<String> = document.section_titles().into_iter().map(String::from).collect();
            assert_eq!(titles.len(), 5, "{:?}", titles);

            let plan = PdfRenderer::new().layout_report(&r).unwrap();
            let pdf_texts: Vec<String> = plan.texts().map(String::from).collect();
            let sanitized: Vec<String> = titles.iter().map(|t| sanitize(t)).collect();
            assert_in_order(&pdf_texts, &sanitized, "PDF");

            let docx_texts = document_text(&DocxRenderer::new().render(&r).unwrap()).unwrap();
            assert_in_order(&docx_texts, &titles, "DOCX");
        }
    }
}

#[test]
fn test_result_rows_appear_in_both_outputs() {
    let r = report(8, ReportType::Transformer, 0.3);
    let docx_texts = document_text(&DocxRenderer::new().render(&r).unwrap()).unwrap();
    let plan = PdfRenderer::new().layout_report(&r).unwrap();

    for entry in r.test_data.test_results() {
        let verdict = entry.result.to_string();
        assert!(docx_texts.iter().any(|t| t == &entry.test_name), "DOCX 缺少 {}", entry.test_name);
        assert!(docx_texts.contains(&verdict));
        assert!(plan.contains_text(&verdict));
    }
}

#[test]
fn test_notes_section_omitted_in_both_outputs() {
    let mut r = report(4, ReportType::Cable, 0.0);
    r.notes = None;
    r.recommendations = Some("  ".to_string());

    let docx_texts = document_text(&DocxRenderer::new().render(&r).unwrap()).unwrap();
    assert!(!docx_texts.iter().any(|t| t == "NOTES & RECOMMENDATIONS"));

    let plan = PdfRenderer::new().layout_report(&r).unwrap();
    assert!(!plan.contains_text("NOTES & RECOMMENDATIONS"));
    assert!(plan.contains_text("SIGNATURES"));
}

#[test]
fn test_rendering_is_idempotent() {
    let r = report(12, ReportType::Switchgear, 0.2);

    let docx = DocxRenderer::new();
    assert_eq!(docx.render(&r).unwrap(), docx.render(&r).unwrap());

    let pdf = PdfRenderer::new();
    assert_eq!(pdf.layout_report(&r).unwrap(), pdf.layout_report(&r).unwrap());
    assert!(pdf.render(&r).unwrap().starts_with(b"%PDF"));
}

#[test]
fn test_variant_mismatch_fails_in_both_renderers() {
    let mut r = report(3, ReportType::Grounding, 0.0);
    r.test_data = report(3, ReportType::ProtectionRelay, 0.0).test_data;

    let renderers: [Box<dyn ReportRenderer>; 2] = [Box::new(PdfRenderer::new()), Box::new(DocxRenderer::new())];
    for renderer in renderers {
        let err = renderer.render(&r).unwrap_err();
        assert_eq!(err.error_code(), "CONTRACT_VIOLATION", "{}", renderer.format());
    }
}

#[test]
fn test_long_report_paginates_with_footer() {
    let mut r = report(6, ReportType::Cable, 0.0);
    r.notes = Some("Observation. ".repeat(400));

    let plan = PdfRenderer::new().layout_report(&r).unwrap();
    let total = plan.page_count();
    assert!(total >= 2);
    let last = format!("Page {} of {}", total, total);
    assert!(plan.pages[total - 1].texts().any(|t| t == last));
}
