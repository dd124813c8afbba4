use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{DeviationBasis, ReportStatus, ReportType, TestVerdict, VoltageLevel};
use super::test_data::TestData;

/// 生成默认UUID字符串的辅助函数
pub fn default_id() -> String {
    Uuid::new_v4().to_string()
}

/// 报告头信息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportHeader {
    /// 报告编号（人工分配，唯一）
    pub report_number: String,
    pub project_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_number: Option<String>,
    pub substation_name: String,
    pub voltage_level: VoltageLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub test_date: NaiveDate,
    pub report_date: NaiveDate,
    /// 测试人
    pub tested_by: String,
    /// 审核人（进入审核流程前可为空）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewed_by: Option<String>,
    /// 批准人，仅在进入 APPROVED 时写入
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_by: Option<String>,
    /// 修订号，每次内容编辑递增
    #[serde(default)]
    pub revision_number: u32,
}

/// 被测设备信息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentInfo {
    pub equipment_tag: String,
    pub equipment_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
}

/// 测试时环境条件
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentalConditions {
    /// 环境温度（°C）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ambient_temp: Option<f64>,
    /// 相对湿度（%）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub humidity: Option<f64>,
}

/// 单项测试结果
///
/// 不变量：`result == PASS` 当且仅当 `|deviation| <= tolerance`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResultEntry {
    pub test_name: String,
    pub setting_value: f64,
    pub measured_value: f64,
    pub unit: String,
    /// 容差（%）
    pub tolerance: f64,
    /// 偏差，基准见 `deviation_basis`
    pub deviation: f64,
    #[serde(default)]
    pub deviation_basis: DeviationBasis,
    pub result: TestVerdict,
}

/// 结果汇总
///
/// 任意一项 FAIL 即整体 FAIL，不做加权平均
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResultsSummary {
    pub total_tests: usize,
    pub passed: usize,
    pub failed: usize,
    /// 通过率（%），无测试项时为 0
    pub pass_rate: f64,
    pub overall_result: TestVerdict,
}

/// T&C 报告
///
/// 交给渲染器之后不可变；任何内容修改都生成下一个修订版本
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    #[serde(default = "default_id")]
    pub id: String,
    pub report_type: ReportType,
    #[serde(default)]
    pub status: ReportStatus,
    pub header: ReportHeader,
    pub equipment: EquipmentInfo,
    #[serde(default)]
    pub environmental: EnvironmentalConditions,
    pub test_data: TestData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendations: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl Report {
    /// 报告编号
    pub fn report_number(&self) -> &str {
        &self.header.report_number
    }

    /// 变体标签是否与声明的报告分类一致
    pub fn is_variant_consistent(&self) -> bool {
        self.test_data.report_type() == self.report_type
    }

    /// 备注（去除空白后为空视为没有）
    pub fn notes_text(&self) -> Option<&str> {
        non_blank(self.notes.as_deref())
    }

    /// 建议（去除空白后为空视为没有）
    pub fn recommendations_text(&self) -> Option<&str> {
        non_blank(self.recommendations.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

/// 表单提交的扁平数据，由校验器构造成 `Report`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportFormData {
    pub report_number: String,
    pub report_type: ReportType,
    pub project_name: String,
    #[serde(default)]
    pub project_number: Option<String>,
    pub substation_name: String,
    pub voltage_level: VoltageLevel,
    #[serde(default)]
    pub location: Option<String>,
    pub test_date: NaiveDate,
    pub equipment_tag: String,
    pub equipment_type: String,
    #[serde(default)]
    pub manufacturer: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub serial_number: Option<String>,
    pub tested_by: String,
    #[serde(default)]
    pub reviewed_by: Option<String>,
    #[serde(default)]
    pub ambient_temp: Option<f64>,
    #[serde(default)]
    pub humidity: Option<f64>,
    pub test_data: TestData,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub recommendations: Option<String>,
}
