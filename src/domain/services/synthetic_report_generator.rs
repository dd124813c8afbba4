//! 合成报告生成器
//!
//! 用注入的随机源生成完整的 T&C 报告：报告头、设备信息、环境条件来自有限的候选集，
//! 测试数据交给对应分类的计算器，最后汇总结果。
//!
//! 相同种子 + 相同参考时间 => 完全相同的报告（包括报告ID）。

use chrono::{DateTime, Duration, NaiveDate, Utc};
use log::debug;
use rand::distributions::Alphanumeric;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::domain::services::calculators::{generate_test_data, pick, SamplingProfile};
use crate::domain::services::report_validator::ReportValidator;
use crate::domain::services::result_evaluator::summarize;
use crate::models::{Report, ReportFormData, ReportType, TestResultsSummary, VoltageLevel};
use crate::utils::error::AppResult;

const SAUDI_LOCATIONS: &[&str] = &[
    "Riyadh", "Jeddah", "Dammam", "Mecca", "Medina", "Dhahran", "Jubail", "Yanbu", "Tabuk", "Abha",
];

const SUBSTATION_NAMES: &[&str] = &[
    "Main Substation",
    "North Distribution SS",
    "South Distribution SS",
    "Industrial Zone SS",
    "Commercial Area SS",
    "Residential Complex SS",
    "Airport SS",
    "Hospital SS",
    "University SS",
    "Port Authority SS",
];

const ENGINEER_NAMES: &[&str] = &[
    "Ahmed Al-Rashid",
    "Mohammed Al-Zahrani",
    "Khalid Al-Harbi",
    "Abdullah Al-Ghamdi",
    "Omar Al-Shahrani",
    "Faisal Al-Qahtani",
    "Saeed Al-Otaibi",
    "Hassan Al-Maliki",
    "Youssef Al-Shehri",
    "Ibrahim Al-Dosari",
];

const PROJECT_NAMES: &[&str] = &[
    "SEC Grid Expansion Project",
    "Industrial Park Development",
    "NEOM Infrastructure Phase 1",
    "Riyadh Metro Power Supply",
    "Aramco Facility Upgrade",
    "SABIC Plant Expansion",
    "Saudi Ports Development",
    "Healthcare Facilities Power",
    "Education Sector Electrification",
    "Renewable Integration Project",
];

const EQUIPMENT_MANUFACTURERS: &[&str] = &["ABB", "Siemens", "GE", "Schneider Electric"];

const VOLTAGE_LEVELS: [VoltageLevel; 2] = [VoltageLevel::Kv33, VoltageLevel::Kv13_8];

const STANDARD_NOTES: &str =
    "All tests performed as per IEC/IEEE standards. Equipment found in satisfactory condition.";

const STANDARD_RECOMMENDATIONS: &str =
    "Schedule follow-up inspection in 6 months. Monitor insulation resistance trend.";

/// 测试日期最多早于参考日期的天数
const MAX_TEST_AGE_DAYS: i64 = 30;

fn equipment_types(report_type: ReportType) -> &'static [&'static str] {
    match report_type {
        ReportType::ProtectionRelay => &[
            "Overcurrent Relay",
            "Differential Relay",
            "Distance Relay",
            "Motor Protection Relay",
            "Feeder Protection Relay",
        ],
        ReportType::Transformer => &[
            "Power Transformer",
            "Distribution Transformer",
            "Auto Transformer",
            "Instrument Transformer",
        ],
        ReportType::Switchgear => &[
            "Vacuum Circuit Breaker",
            "SF6 Circuit Breaker",
            "Load Break Switch",
            "Disconnector",
        ],
        ReportType::Cable => &["MV Power Cable", "LV Power Cable", "Control Cable", "Instrumentation Cable"],
        ReportType::Grounding => &[
            "Earth Grid System",
            "Substation Grounding",
            "Equipment Grounding",
            "Lightning Protection",
        ],
    }
}

/// 生成参数
#[derive(Debug, Clone)]
pub struct GeneratorOptions {
    /// 不指定时随机选择
    pub report_type: Option<ReportType>,
    /// 不指定时随机选择
    pub voltage_level: Option<VoltageLevel>,
    pub profile: SamplingProfile,
    /// 参考时间：报告日期、创建时间都取自它，测试日期在它之前 30 天内
    pub reference_time: DateTime<Utc>,
}

impl GeneratorOptions {
    pub fn at(reference_time: DateTime<Utc>) -> Self {
        Self {
            report_type: None,
            voltage_level: None,
            profile: SamplingProfile::nominal(),
            reference_time,
        }
    }

    pub fn with_report_type(mut self, report_type: ReportType) -> Self {
        self.report_type = Some(report_type);
        self
    }

    pub fn with_voltage_level(mut self, voltage_level: VoltageLevel) -> Self {
        self.voltage_level = Some(voltage_level);
        self
    }

    pub fn with_profile(mut self, profile: SamplingProfile) -> Self {
        self.profile = profile;
        self
    }
}

/// 生成结果：报告及其结果汇总
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedReport {
    pub report: Report,
    pub summary: TestResultsSummary,
}

/// 报告编号：`PREFIX-YYYYMM-NNN`
pub fn generate_report_number<R: Rng + ?Sized>(
    report_type: ReportType,
    date: NaiveDate,
    rng: &mut R,
) -> String {
    format!(
        "{}-{}-{:03}",
        report_type.number_prefix(),
        date.format("%Y%m"),
        rng.gen_range(0..1000)
    )
}

fn alphanumeric<R: Rng + ?Sized>(rng: &mut R, len: usize) -> String {
    (0..len)
        .map(|_| rng.sample(Alphanumeric) as char)
        .collect::<String>()
        .to_uppercase()
}

/// 生成表单数据
pub fn generate_form_data<R: Rng + ?Sized>(
    rng: &mut R,
    options: &GeneratorOptions,
) -> AppResult<ReportFormData> {
    let report_type = options.report_type.unwrap_or_else(|| *pick(rng, &ReportType::ALL));
    let voltage_level = options.voltage_level.unwrap_or_else(|| *pick(rng, &VOLTAGE_LEVELS));
    let reference_date = options.reference_time.date_naive();

    let report_number = generate_report_number(report_type, reference_date, rng);
    let test_date = reference_date - Duration::days(rng.gen_range(0..=MAX_TEST_AGE_DAYS));

    Ok(ReportFormData {
        report_number,
        report_type,
        project_name: pick(rng, PROJECT_NAMES).to_string(),
        project_number: Some(format!("PRJ-{}", rng.gen_range(1000..=9999))),
        substation_name: pick(rng, SUBSTATION_NAMES).to_string(),
        voltage_level,
        location: Some(pick(rng, SAUDI_LOCATIONS).to_string()),
        test_date,
        equipment_tag: format!("{}-{}", report_type.number_prefix(), rng.gen_range(100..=999)),
        equipment_type: pick(rng, equipment_types(report_type)).to_string(),
        manufacturer: Some(pick(rng, EQUIPMENT_MANUFACTURERS).to_string()),
        model: Some(format!("Model-{}", alphanumeric(rng, 6))),
        serial_number: Some(alphanumeric(rng, 12)),
        tested_by: pick(rng, ENGINEER_NAMES).to_string(),
        reviewed_by: if rng.gen_bool(0.7) {
            Some(pick(rng, ENGINEER_NAMES).to_string())
        } else {
            None
        },
        ambient_temp: Some(rng.gen_range(20..=45) as f64),
        humidity: Some(rng.gen_range(30..=80) as f64),
        test_data: generate_test_data(report_type, voltage_level, rng, &options.profile)?,
        notes: rng.gen_bool(0.5).then(|| STANDARD_NOTES.to_string()),
        recommendations: rng.gen_bool(0.3).then(|| STANDARD_RECOMMENDATIONS.to_string()),
    })
}

/// 生成完整报告
pub fn generate_report<R: Rng + ?Sized>(
    rng: &mut R,
    options: &GeneratorOptions,
) -> AppResult<GeneratedReport> {
    let form = generate_form_data(rng, options)?;
    let id = uuid::Builder::from_random_bytes(rng.gen()).into_uuid().to_string();
    let report = ReportValidator::build_report_with_id(&form, id, options.reference_time)?;
    let summary = summarize(report.test_data.test_results());

    debug!(
        "生成合成报告: {} 分类={} 测试项={} 通过率={:.1}%",
        report.header.report_number, report.report_type, summary.total_tests, summary.pass_rate
    );

    Ok(GeneratedReport { report, summary })
}

/// 持有种子随机源的生成器
pub struct SyntheticReportGenerator {
    seed: u64,
    rng: StdRng,
}

impl SyntheticReportGenerator {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            seed,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn generate(&mut self, options: &GeneratorOptions) -> AppResult<GeneratedReport> {
        generate_report(&mut self.rng, options)
    }

    /// 连续生成多份报告
    pub fn generate_batch(
        &mut self,
        count: usize,
        options: &GeneratorOptions,
    ) -> AppResult<Vec<GeneratedReport>> {
        (0..count).map(|_| self.generate(options)).collect()
    }
}
