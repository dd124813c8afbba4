//! 报告生命周期
//!
//! 纯函数形式的修订与状态转换，调用方（持久化协作方）负责保存结果：
//! - 内容修改 => `next_revision`，修订号 +1
//! - 状态转换 => `transition`，只允许 DRAFT → PENDING_REVIEW → APPROVED | REJECTED，REJECTED → DRAFT
//! - 批准人只在进入 APPROVED 时写入

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::services::report_validator::ReportValidator;
use crate::models::{Report, ReportFormData, ReportStatus, ReportType};
use crate::utils::error::{AppError, AppResult};

/// 生成下一个修订版本
pub fn next_revision(report: &Report, now: DateTime<Utc>) -> Report {
    let mut next = report.clone();
    next.header.revision_number = report.header.revision_number.saturating_add(1);
    next.updated_at = now;
    next
}

/// 用表单内容编辑报告，生成下一个修订版本
///
/// 报告ID、状态、创建时间、批准人保持不变
pub fn apply_form_edit(report: &Report, form: &ReportFormData, now: DateTime<Utc>) -> AppResult<Report> {
    let edited = ReportValidator::build_report_with_id(form, report.id.clone(), now)?;

    let mut next = next_revision(report, now);
    next.report_type = edited.report_type;
    next.header = edited.header;
    next.header.revision_number = report.header.revision_number.saturating_add(1);
    next.header.report_date = report.header.report_date;
    next.header.approved_by = report.header.approved_by.clone();
    next.equipment = edited.equipment;
    next.environmental = edited.environmental;
    next.test_data = edited.test_data;
    next.notes = edited.notes;
    next.recommendations = edited.recommendations;
    Ok(next)
}

/// 状态转换
///
/// `actor` 为执行人；进入 APPROVED 时必须提供，并写入 `approved_by`
pub fn transition(
    report: &Report,
    to: ReportStatus,
    actor: Option<&str>,
    now: DateTime<Utc>,
) -> AppResult<Report> {
    if !report.status.can_transition_to(to) {
        return Err(AppError::state_transition_error(
            report.status.to_string(),
            to.to_string(),
            format!("报告 {} 不允许该状态转换", report.report_number()),
        ));
    }

    let mut next = report.clone();
    next.status = to;
    next.updated_at = now;

    if to == ReportStatus::Approved {
        let approver = actor
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .ok_or_else(|| {
                AppError::state_transition_error(
                    report.status.to_string(),
                    to.to_string(),
                    "批准报告必须提供批准人",
                )
            })?;
        next.header.approved_by = Some(approver.to_string());
    }

    crate::log_user_operation!(
        "报告 {} 状态转换: {} -> {}",
        report.report_number(),
        report.status,
        to
    );
    Ok(next)
}

/// 报告统计
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportStatistics {
    pub total: usize,
    pub draft: usize,
    pub pending_review: usize,
    pub approved: usize,
    pub rejected: usize,
    pub by_type: BTreeMap<ReportType, usize>,
}

impl ReportStatistics {
    pub fn from_reports<'a, I>(reports: I) -> Self
    where
        I: IntoIterator<Item = &'a Report>,
    {
        let mut stats = Self::default();
        for report in reports {
            stats.total += 1;
            match report.status {
                ReportStatus::Draft => stats.draft += 1,
                ReportStatus::PendingReview => stats.pending_review += 1,
                ReportStatus::Approved => stats.approved += 1,
                ReportStatus::Rejected => stats.rejected += 1,
            }
            *stats.by_type.entry(report.report_type).or_insert(0) += 1;
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::services::synthetic_report_generator::{GeneratorOptions, SyntheticReportGenerator};
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 10, 15, 8, 0, 0).unwrap()
    }

    fn draft(report_type: ReportType) -> Report {
        let options = GeneratorOptions::at(t0()).with_report_type(report_type);
        SyntheticReportGenerator::from_seed(1).generate(&options).unwrap().report
    }

    #[test]
    fn test_next_revision_is_pure() {
        let report = draft(ReportType::Cable);
        let later = t0() + Duration::hours(2);
        let next = next_revision(&report, later);
        assert_eq!(next.header.revision_number, report.header.revision_number + 1);
        assert_eq!(next.updated_at, later);
        assert_eq!(report.header.revision_number, 0);
        assert_eq!(next.id, report.id);
        assert_eq!(next.created_at, report.created_at);
    }

    #[test]
    fn test_full_approval_path() {
        let report = draft(ReportType::Transformer);
        let pending = transition(&report, ReportStatus::PendingReview, Some("Khalid Al-Harbi"), t0()).unwrap();
        assert!(pending.header.approved_by.is_none());
        let approved = transition(&pending, ReportStatus::Approved, Some("Omar Al-Shahrani"), t0()).unwrap();
        assert_eq!(approved.status, ReportStatus::Approved);
        assert_eq!(approved.header.approved_by.as_deref(), Some("Omar Al-Shahrani"));
    }

    #[test]
    fn test_approval_requires_actor() {
        let report = draft(ReportType::Transformer);
        let pending = transition(&report, ReportStatus::PendingReview, None, t0()).unwrap();
        let err = transition(&pending, ReportStatus::Approved, Some("  "), t0()).unwrap_err();
        assert_eq!(err.error_code(), "STATE_TRANSITION_ERROR");
    }

    #[test]
    fn test_rejected_returns_to_draft() {
        let report = draft(ReportType::Grounding);
        let pending = transition(&report, ReportStatus::PendingReview, None, t0()).unwrap();
        let rejected = transition(&pending, ReportStatus::Rejected, None, t0()).unwrap();
        let back = transition(&rejected, ReportStatus::Draft, None, t0()).unwrap();
        assert_eq!(back.status, ReportStatus::Draft);
        assert!(back.header.approved_by.is_none());
    }

    #[test]
    fn test_illegal_transitions() {
        let report = draft(ReportType::Switchgear);
        assert!(transition(&report, ReportStatus::Approved, Some("x"), t0()).is_err());
        assert!(transition(&report, ReportStatus::Rejected, None, t0()).is_err());
        assert!(transition(&report, ReportStatus::Draft, None, t0()).is_err());

        let pending = transition(&report, ReportStatus::PendingReview, None, t0()).unwrap();
        let approved = transition(&pending, ReportStatus::Approved, Some("x"), t0()).unwrap();
        assert!(transition(&approved, ReportStatus::Draft, None, t0()).is_err());
    }

    #[test]
    fn test_apply_form_edit_bumps_revision() {
        let report = draft(ReportType::Cable);
        let form = ReportFormData {
            report_number: report.header.report_number.clone(),
            report_type: report.report_type,
            project_name: "Renewable Integration Project".to_string(),
            project_number: None,
            substation_name: report.header.substation_name.clone(),
            voltage_level: report.header.voltage_level,
            location: None,
            test_date: report.header.test_date,
            equipment_tag: report.equipment.equipment_tag.clone(),
            equipment_type: report.equipment.equipment_type.clone(),
            manufacturer: None,
            model: None,
            serial_number: None,
            tested_by: report.header.tested_by.clone(),
            reviewed_by: None,
            ambient_temp: None,
            humidity: None,
            test_data: report.test_data.clone(),
            notes: Some("Re-tested after termination rework.".to_string()),
            recommendations: None,
        };
        let later = t0() + Duration::days(1);
        let edited = apply_form_edit(&report, &form, later).unwrap();
        assert_eq!(edited.header.revision_number, 1);
        assert_eq!(edited.header.project_name, "Renewable Integration Project");
        assert_eq!(edited.id, report.id);
        assert_eq!(edited.created_at, report.created_at);
        assert_eq!(edited.updated_at, later);
        assert_eq!(edited.header.report_date, report.header.report_date);
    }

    #[test]
    fn test_statistics() {
        let a = draft(ReportType::Cable);
        let b = transition(&draft(ReportType::Cable), ReportStatus::PendingReview, None, t0()).unwrap();
        let c = draft(ReportType::Grounding);
        let stats = ReportStatistics::from_reports([&a, &b, &c]);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.draft, 2);
        assert_eq!(stats.pending_review, 1);
        assert_eq!(stats.by_type.get(&ReportType::Cable), Some(&2));
        assert_eq!(stats.by_type.get(&ReportType::Grounding), Some(&1));
        assert_eq!(stats.by_type.get(&ReportType::Transformer), None);
    }
}
