use super::*;
use crate::domain::services::synthetic_report_generator::{GeneratorOptions, SyntheticReportGenerator};
use chrono::{TimeZone, Utc};
use std::collections::HashSet;

fn generated(report_type: ReportType) -> Report {
    let options = GeneratorOptions::at(Utc.with_ymd_and_hms(2024, 10, 15, 9, 0, 0).unwrap())
        .with_report_type(report_type);
    SyntheticReportGenerator::from_seed(99).generate(&options).unwrap().report
}

#[test]
fn test_report_json_shape() {
    let report = generated(ReportType::Cable);
    let value = serde_json::to_value(&report).unwrap();

    assert_eq!(value["reportType"], "CABLE");
    assert_eq!(value["testData"]["category"], "CABLE");
    assert!(value["header"]["reportNumber"].is_string());
    assert!(value["testData"]["testResults"].is_array());

    let back: Report = serde_json::from_value(value).unwrap();
    assert_eq!(back, report);
}

#[test]
fn test_every_category_round_trips_with_its_tag() {
    for report_type in ReportType::ALL {
        let report = generated(report_type);
        let json = serde_json::to_string(&report.test_data).unwrap();
        assert!(json.contains(&format!("\"category\":\"{}\"", report_type)));
        let back: TestData = serde_json::from_str(&json).unwrap();
        assert_eq!(back.report_type(), report_type);
        assert!(!back.test_results().is_empty());
    }
}

#[test]
fn test_mismatched_variant_is_detected() {
    let mut report = generated(ReportType::Transformer);
    assert!(report.is_variant_consistent());

    report.test_data = generated(ReportType::Grounding).test_data;
    assert!(!report.is_variant_consistent());

    // 反序列化不拦截不一致，交给校验器
    let json = serde_json::to_string(&report).unwrap();
    let back: Report = serde_json::from_str(&json).unwrap();
    assert_eq!(back.report_type, ReportType::Transformer);
    assert_eq!(back.test_data.report_type(), ReportType::Grounding);
}

#[test]
fn test_report_type_text_forms() {
    for report_type in ReportType::ALL {
        assert_eq!(report_type.to_string().parse::<ReportType>().unwrap(), report_type);
        assert!(report_type.section_title().ends_with("TEST DATA"));
    }
    let prefixes: HashSet<&str> = ReportType::ALL.iter().map(|t| t.number_prefix()).collect();
    assert_eq!(prefixes.len(), ReportType::ALL.len());
    assert!("relay".parse::<ReportType>().is_err());
}

#[test]
fn test_voltage_level_aliases() {
    assert_eq!("33".parse::<VoltageLevel>().unwrap(), VoltageLevel::Kv33);
    assert_eq!("13.8 kV".parse::<VoltageLevel>().unwrap(), VoltageLevel::Kv13_8);
    assert_eq!(VoltageLevel::Kv13_8.volts(), 13_800);
    assert_eq!(VoltageLevel::Kv33.to_string(), "33 kV");
    assert_eq!(serde_json::to_string(&VoltageLevel::Kv13_8).unwrap(), "\"KV_13_8\"");
}

#[test]
fn test_status_and_verdict_text() {
    assert_eq!("PENDING_REVIEW".parse::<ReportStatus>().unwrap(), ReportStatus::PendingReview);
    assert_eq!(ReportStatus::default(), ReportStatus::Draft);
    assert_eq!(TestVerdict::from_pass(false).to_string(), "FAIL");
    assert_eq!(serde_json::to_string(&TestVerdict::Pass).unwrap(), "\"PASS\"");
}

#[test]
fn test_blank_notes_are_absent() {
    let mut report = generated(ReportType::Switchgear);
    report.notes = Some("   \n".to_string());
    report.recommendations = None;
    assert_eq!(report.notes_text(), None);
    assert_eq!(report.recommendations_text(), None);

    report.notes = Some("  Breaker serviced  ".to_string());
    assert_eq!(report.notes_text(), Some("Breaker serviced"));
}
