//! 导出服务端到端测试：生成 → 渲染 → 写入导出目录

use std::io::{Cursor, Read};

use chrono::{TimeZone, Utc};
use tc_report_lib::utils::config::{AppConfig, ConfigManager};
use tc_report_lib::{
    DocumentFormat, GeneratorOptions, IReportExportService, ReportExportService, ReportType,
    SyntheticReportGenerator,
};
use tempfile::tempdir;

fn options(report_type: ReportType) -> GeneratorOptions {
    GeneratorOptions::at(Utc.with_ymd_and_hms(2024, 10, 15, 9, 0, 0).unwrap()).with_report_type(report_type)
}

#[tokio::test]
async fn test_export_all_formats_to_directory() {
    let dir = tempdir().unwrap();
    let service = ReportExportService::new(dir.path().join("exports"));
    let report = SyntheticReportGenerator::from_seed(2024)
        .generate(&options(ReportType::ProtectionRelay))
        .unwrap()
        .report;

    let exported = service.export_all(&report).await.unwrap();
    let formats: Vec<DocumentFormat> = exported.iter().map(|e| e.format).collect();
    assert_eq!(formats, vec![DocumentFormat::Pdf, DocumentFormat::Docx]);

    let pdf = std::fs::read(&exported[0].file_path).unwrap();
    assert!(pdf.starts_with(b"%PDF"));
    assert_eq!(exported[0].file_size, pdf.len() as u64);

    let docx = std::fs::read(&exported[1].file_path).unwrap();
    let mut archive = zip::ZipArchive::new(Cursor::new(docx)).unwrap();
    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .unwrap()
        .read_to_string(&mut xml)
        .unwrap();
    assert!(xml.contains("PROTECTION RELAY TEST DATA"));

    // 没有残留的临时文件
    let leftovers = std::fs::read_dir(dir.path().join("exports"))
        .unwrap()
        .filter_map(Result::ok)
        .filter(|e| e.file_name().to_string_lossy().ends_with(".part"))
        .count();
    assert_eq!(leftovers, 0);
}

#[tokio::test]
async fn test_invalid_report_exports_nothing() {
    let dir = tempdir().unwrap();
    let export_dir = dir.path().join("exports");
    let service = ReportExportService::new(export_dir.clone());

    let mut generator = SyntheticReportGenerator::from_seed(17);
    let mut report = generator.generate(&options(ReportType::Cable)).unwrap().report;
    report.test_data = generator.generate(&options(ReportType::Transformer)).unwrap().report.test_data;

    let err = service.export_all(&report).await.unwrap_err();
    assert!(err.is_contract_violation());
    assert!(!export_dir.exists());
}

#[tokio::test]
async fn test_export_using_saved_configuration() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("config").join("tc_report.json");

    let mut manager = ConfigManager::new(config_path.clone());
    manager.get_config_mut().export_config.export_dir = dir.path().join("docx-only");
    manager.get_config_mut().render_config.formats = vec![DocumentFormat::Docx];
    manager.save_to_file().await.unwrap();

    let mut loaded = ConfigManager::new(config_path);
    loaded.load_from_file().await.unwrap();
    loaded.validate_config().unwrap();
    let config: &AppConfig = loaded.get_config();

    let service = ReportExportService::from_config(config);
    let batch = SyntheticReportGenerator::from_seed(3)
        .generate_batch(3, &options(ReportType::Grounding))
        .unwrap();
    for item in &batch {
        let exported = service.export_all(&item.report).await.unwrap();
        assert_eq!(exported.len(), 1);
        assert_eq!(exported[0].format, DocumentFormat::Docx);
        assert!(exported[0].file_path.starts_with(dir.path().join("docx-only")));
    }
}
