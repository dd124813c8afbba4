//! 报告校验器
//!
//! 负责把表单数据构造成 `Report`，并在交给渲染器之前检查契约：
//! - 必填的报告头字段非空
//! - 湿度在 0..=100，所有数值有限
//! - 结果记录的容差在 0..=100，判定结果与偏差一致
//! - 测试数据变体与声明的报告分类一致（不一致属于契约违规）

use chrono::{DateTime, Utc};
use log::debug;

use crate::domain::services::result_evaluator::is_entry_consistent;
use crate::models::{
    default_id, EnvironmentalConditions, EquipmentInfo, Report, ReportFormData, ReportHeader,
    ReportStatus, ReportType, TestData, TestResultEntry,
};
use crate::utils::error::{AppError, AppResult};

/// 报告校验器
pub struct ReportValidator;

impl ReportValidator {
    /// 由表单数据构造草稿报告（修订号 0）
    pub fn build_report(form: &ReportFormData, now: DateTime<Utc>) -> AppResult<Report> {
        Self::build_report_with_id(form, default_id(), now)
    }

    /// 由表单数据构造草稿报告，并指定报告ID
    pub fn build_report_with_id(
        form: &ReportFormData,
        id: String,
        now: DateTime<Utc>,
    ) -> AppResult<Report> {
        Self::validate_form(form)?;

        let report = Report {
            id,
            report_type: form.report_type,
            status: ReportStatus::Draft,
            header: ReportHeader {
                report_number: form.report_number.trim().to_string(),
                project_name: form.project_name.trim().to_string(),
                project_number: non_blank(&form.project_number),
                substation_name: form.substation_name.trim().to_string(),
                voltage_level: form.voltage_level,
                location: non_blank(&form.location),
                test_date: form.test_date,
                report_date: now.date_naive(),
                tested_by: form.tested_by.trim().to_string(),
                reviewed_by: non_blank(&form.reviewed_by),
                approved_by: None,
                revision_number: 0,
            },
            equipment: EquipmentInfo {
                equipment_tag: form.equipment_tag.trim().to_string(),
                equipment_type: form.equipment_type.trim().to_string(),
                manufacturer: non_blank(&form.manufacturer),
                model: non_blank(&form.model),
                serial_number: non_blank(&form.serial_number),
            },
            environmental: EnvironmentalConditions {
                ambient_temp: form.ambient_temp,
                humidity: form.humidity,
            },
            test_data: form.test_data.clone(),
            notes: non_blank(&form.notes),
            recommendations: non_blank(&form.recommendations),
            created_at: now,
            updated_at: now,
            user_id: None,
        };

        debug!("表单构造报告成功: {} ({})", report.header.report_number, report.report_type);
        Ok(report)
    }

    /// 校验表单数据
    pub fn validate_form(form: &ReportFormData) -> AppResult<()> {
        require_non_empty("reportNumber", &form.report_number)?;
        require_non_empty("projectName", &form.project_name)?;
        require_non_empty("substationName", &form.substation_name)?;
        require_non_empty("equipmentTag", &form.equipment_tag)?;
        require_non_empty("equipmentType", &form.equipment_type)?;
        require_non_empty("testedBy", &form.tested_by)?;
        validate_environment(form.ambient_temp, form.humidity)?;
        Self::ensure_variant_matches(form.report_type, &form.test_data)?;
        validate_test_data(&form.test_data)
    }

    /// 校验完整报告，渲染前调用
    pub fn validate_report(report: &Report) -> AppResult<()> {
        let header = &report.header;
        require_non_empty("reportNumber", &header.report_number)?;
        require_non_empty("projectName", &header.project_name)?;
        require_non_empty("substationName", &header.substation_name)?;
        require_non_empty("testedBy", &header.tested_by)?;
        require_non_empty("equipmentTag", &report.equipment.equipment_tag)?;
        require_non_empty("equipmentType", &report.equipment.equipment_type)?;
        validate_environment(report.environmental.ambient_temp, report.environmental.humidity)?;
        Self::ensure_variant_matches(report.report_type, &report.test_data)?;
        validate_test_data(&report.test_data)
    }

    /// 测试数据变体必须与报告分类一致
    pub fn ensure_variant_matches(report_type: ReportType, test_data: &TestData) -> AppResult<()> {
        let actual = test_data.report_type();
        if actual != report_type {
            crate::log_contract_violation!("报告分类与测试数据不一致: 声明 {}, 实际 {}", report_type, actual);
            return Err(AppError::contract_violation(
                "testData/reportType",
                format!("声明的报告分类为 {}，但测试数据为 {}", report_type, actual),
            ));
        }
        Ok(())
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn require_non_empty(field: &str, value: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::contract_violation(
            format!("header.{}", field),
            format!("必填字段 {} 为空", field),
        ));
    }
    Ok(())
}

fn require_finite(field: &str, value: f64) -> AppResult<()> {
    if !value.is_finite() {
        return Err(AppError::validation_error(format!("{} 不是有限数值: {}", field, value)));
    }
    Ok(())
}

/// 测试数据中的文本字段（铭牌、变比等）不能为空
fn require_text(field: &str, value: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::validation_error(format!("测试数据字段 {} 不能为空", field)));
    }
    Ok(())
}

fn validate_environment(ambient_temp: Option<f64>, humidity: Option<f64>) -> AppResult<()> {
    if let Some(temp) = ambient_temp {
        require_finite("ambientTemp", temp)?;
    }
    if let Some(h) = humidity {
        require_finite("humidity", h)?;
        if !(0.0..=100.0).contains(&h) {
            return Err(AppError::validation_error(format!("湿度必须在0到100之间: {}", h)));
        }
    }
    Ok(())
}

fn validate_entry(index: usize, entry: &TestResultEntry) -> AppResult<()> {
    if entry.test_name.trim().is_empty() {
        return Err(AppError::validation_error(format!("第{}条测试结果缺少测试名称", index + 1)));
    }
    require_finite("settingValue", entry.setting_value)?;
    require_finite("measuredValue", entry.measured_value)?;
    require_finite("tolerance", entry.tolerance)?;
    require_finite("deviation", entry.deviation)?;
    if !(0.0..=100.0).contains(&entry.tolerance) {
        return Err(AppError::validation_error(format!(
            "{} 的容差必须在0到100之间: {}",
            entry.test_name, entry.tolerance
        )));
    }
    if !is_entry_consistent(entry) {
        return Err(AppError::validation_error(format!(
            "{} 的判定结果 {} 与偏差 {} / 容差 {} 不一致",
            entry.test_name, entry.result, entry.deviation, entry.tolerance
        )));
    }
    Ok(())
}

/// 校验测试数据中的数值
fn validate_test_data(test_data: &TestData) -> AppResult<()> {
    for (index, entry) in test_data.test_results().iter().enumerate() {
        validate_entry(index, entry)?;
    }

    let mut values: Vec<(&str, f64)> = Vec::new();
    match test_data {
        TestData::ProtectionRelay(d) => {
            require_text("manufacturer", &d.manufacturer)?;
            require_text("model", &d.model)?;
            require_text("ctRatio", &d.ct_ratio)?;
            if let Some(oc) = &d.overcurrent {
                for element in [&oc.phase, &oc.earth] {
                    values.push(("pickup", element.pickup));
                    values.push(("timeDial", element.time_dial));
                    values.push(("tripTime", element.trip_time));
                }
                if let Some(inst) = &oc.instantaneous {
                    values.push(("instantaneous.pickup", inst.pickup));
                    values.push(("instantaneous.operatingTime", inst.operating_time));
                }
            }
            if let Some(diff) = &d.differential {
                values.push(("operatePoint", diff.operate_point));
                values.push(("restraintSlope", diff.restraint_slope));
                values.push(("highSetPoint", diff.high_set_point));
            }
        }
        TestData::Transformer(d) => {
            values.push(("mva", d.rating.mva));
            values.push(("primaryKV", d.rating.primary_kv));
            values.push(("secondaryKV", d.rating.secondary_kv));
            for v in d.winding_resistance.hv_phases.values() {
                values.push(("hvPhases", v));
            }
            for v in d.winding_resistance.lv_phases.values() {
                values.push(("lvPhases", v));
            }
            values.push(("windingTemperature", d.winding_resistance.temperature));
            values.push(("nominalRatio", d.turns_ratio.nominal_ratio));
            for p in &d.turns_ratio.phases {
                values.push(("measuredRatio", p.measured_ratio));
                values.push(("ratioDeviation", p.deviation));
            }
            let ir = &d.insulation_resistance;
            values.push(("hvToLv", ir.hv_to_lv));
            values.push(("hvToEarth", ir.hv_to_earth));
            values.push(("lvToEarth", ir.lv_to_earth));
            values.push(("polarizationIndex", ir.polarization_index));
            if let Some(oil) = &d.oil_tests {
                values.push(("breakdownVoltage", oil.breakdown_voltage));
                values.push(("moistureContent", oil.moisture_content));
                values.push(("acidityNumber", oil.acidity_number));
            }
        }
        TestData::Switchgear(d) => {
            require_text("manufacturer", &d.manufacturer)?;
            require_text("model", &d.model)?;
            values.push(("ratedVoltage", d.rating.rated_voltage));
            values.push(("ratedCurrent", d.rating.rated_current));
            values.push(("breakingCapacity", d.rating.breaking_capacity));
            for v in d.timing.close_time.values() {
                values.push(("closeTime", v));
            }
            for v in d.timing.open_time.values() {
                values.push(("openTime", v));
            }
            values.push(("simultaneity", d.timing.simultaneity));
            let cr = &d.contact_resistance;
            values.extend([
                ("contactResistance", cr.phase_a),
                ("contactResistance", cr.phase_b),
                ("contactResistance", cr.phase_c),
                ("acceptableLimit", cr.acceptable_limit),
                ("phaseToPhase", d.insulation_resistance.phase_to_phase),
                ("phaseToEarth", d.insulation_resistance.phase_to_earth),
                ("springChargingTime", d.motor_operation.spring_charging_time),
                ("motorCurrent", d.motor_operation.motor_current),
            ]);
            if let Some(gas) = &d.sf6_gas {
                values.push(("sf6Pressure", gas.pressure));
                values.push(("sf6Moisture", gas.moisture_content));
                values.push(("sf6Purity", gas.purity));
                if !(0.0..=100.0).contains(&gas.purity) {
                    return Err(AppError::validation_error(format!(
                        "SF6 纯度必须在0到100之间: {}",
                        gas.purity
                    )));
                }
            }
        }
        TestData::Cable(d) => {
            require_text("cableType", &d.cable_type)?;
            values.push(("length", d.length));
            values.push(("crossSection", d.cross_section));
            let ir = &d.insulation_resistance;
            values.push(("core1ToEarth", ir.core1_to_earth));
            for v in [ir.core2_to_earth, ir.core3_to_earth, ir.core_to_core].into_iter().flatten() {
                values.push(("coreInsulation", v));
            }
            values.push(("temperature", ir.temperature));
            values.push(("correctedValue", ir.corrected_value));
            values.push(("core1", d.continuity.core1));
            for v in [d.continuity.core2, d.continuity.core3].into_iter().flatten() {
                values.push(("continuity", v));
            }
            if let Some(hp) = &d.hi_pot {
                values.push(("hiPot.testVoltage", hp.test_voltage));
                values.push(("hiPot.duration", hp.duration));
                values.push(("hiPot.leakageCurrent", hp.leakage_current));
            }
        }
        TestData::Grounding(d) => {
            let er = &d.earth_resistance;
            values.push(("mainEarth", er.main_earth));
            for v in [er.neutral_earth, er.equipment_earth, er.soil_resistivity].into_iter().flatten() {
                values.push(("earthResistance", v));
            }
            for m in &d.continuity.measurements {
                if m.from_point.trim().is_empty() || m.to_point.trim().is_empty() {
                    return Err(AppError::validation_error("导通测量点位不能为空"));
                }
                values.push(("continuity.resistance", m.resistance));
            }
        }
    }

    for (field, value) in values {
        require_finite(field, value)?;
    }
    Ok(())
}
