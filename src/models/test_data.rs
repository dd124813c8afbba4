//! 五类设备的测试数据
//!
//! `TestData` 是封闭的和类型：每个报告恰好携带一个变体，渲染器与校验器
//! 对它做穷尽匹配。JSON 中以 `category` 字段作为变体标签。

use serde::{Deserialize, Serialize};

use super::enums::{
    BreakerType, EarthTestMethod, GroundingSystem, IecCurve, Phase, RelayType, ReportType,
    TestVerdict, TransformerType,
};
use super::structs::TestResultEntry;

/// 测试数据（五选一）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "category", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TestData {
    ProtectionRelay(ProtectionRelayTestData),
    Transformer(TransformerTestData),
    Switchgear(SwitchgearTestData),
    Cable(CableTestData),
    Grounding(GroundingTestData),
}

impl TestData {
    /// 变体对应的报告分类
    pub fn report_type(&self) -> ReportType {
        match self {
            TestData::ProtectionRelay(_) => ReportType::ProtectionRelay,
            TestData::Transformer(_) => ReportType::Transformer,
            TestData::Switchgear(_) => ReportType::Switchgear,
            TestData::Cable(_) => ReportType::Cable,
            TestData::Grounding(_) => ReportType::Grounding,
        }
    }

    /// 通用结果表
    pub fn test_results(&self) -> &[TestResultEntry] {
        match self {
            TestData::ProtectionRelay(d) => &d.test_results,
            TestData::Transformer(d) => &d.test_results,
            TestData::Switchgear(d) => &d.test_results,
            TestData::Cable(d) => &d.test_results,
            TestData::Grounding(d) => &d.test_results,
        }
    }
}

// ==================== 保护继电器 ====================

/// 反时限过流元件整定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OvercurrentElement {
    /// 启动电流（A，一次值）
    pub pickup: f64,
    pub time_dial: f64,
    pub curve: IecCurve,
    /// 3 倍整定电流下的动作时间（s）
    pub trip_time: f64,
}

/// 速断元件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstantaneousElement {
    pub pickup: f64,
    /// 动作时间（ms）
    pub operating_time: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OvercurrentSettings {
    pub phase: OvercurrentElement,
    pub earth: OvercurrentElement,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instantaneous: Option<InstantaneousElement>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DifferentialSettings {
    /// 动作值（%In）
    pub operate_point: f64,
    /// 制动斜率（%）
    pub restraint_slope: f64,
    /// 差动速断（%In）
    pub high_set_point: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtectionRelayTestData {
    pub relay_type: RelayType,
    pub manufacturer: String,
    pub model: String,
    pub ct_ratio: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pt_ratio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overcurrent: Option<OvercurrentSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub differential: Option<DifferentialSettings>,
    pub test_results: Vec<TestResultEntry>,
}

// ==================== 变压器 ====================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformerRating {
    pub mva: f64,
    #[serde(rename = "primaryKV")]
    pub primary_kv: f64,
    #[serde(rename = "secondaryKV")]
    pub secondary_kv: f64,
    pub frequency: u32,
    pub cooling_type: String,
}

/// 线间绕组电阻（mOhm）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhasePairResistance {
    #[serde(rename = "RY")]
    pub ry: f64,
    #[serde(rename = "YB")]
    pub yb: f64,
    #[serde(rename = "BR")]
    pub br: f64,
}

impl PhasePairResistance {
    pub fn values(&self) -> [f64; 3] {
        [self.ry, self.yb, self.br]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindingResistance {
    pub hv_phases: PhasePairResistance,
    pub lv_phases: PhasePairResistance,
    /// 测量时绕组温度（°C）
    pub temperature: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseRatio {
    pub phase: Phase,
    pub measured_ratio: f64,
    /// 相对额定变比的偏差（%）
    pub deviation: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnsRatio {
    pub nominal_ratio: f64,
    pub tap_position: i32,
    pub phases: Vec<PhaseRatio>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformerInsulation {
    /// MOhm
    pub hv_to_lv: f64,
    pub hv_to_earth: f64,
    pub lv_to_earth: f64,
    /// V DC
    pub test_voltage: u32,
    pub polarization_index: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OilTests {
    /// kV
    pub breakdown_voltage: f64,
    /// ppm
    pub moisture_content: f64,
    /// mg KOH/g
    pub acidity_number: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformerTestData {
    pub transformer_type: TransformerType,
    pub rating: TransformerRating,
    pub winding_resistance: WindingResistance,
    pub turns_ratio: TurnsRatio,
    pub insulation_resistance: TransformerInsulation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oil_tests: Option<OilTests>,
    pub test_results: Vec<TestResultEntry>,
}

// ==================== 开关柜 ====================

/// 三相数值（A/B/C）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreePhaseValues {
    pub phase_a: f64,
    pub phase_b: f64,
    pub phase_c: f64,
}

impl ThreePhaseValues {
    pub fn values(&self) -> [f64; 3] {
        [self.phase_a, self.phase_b, self.phase_c]
    }

    /// 三相之间的最大差值
    pub fn max_spread(&self) -> f64 {
        let v = self.values();
        let max = v.iter().cloned().fold(f64::MIN, f64::max);
        let min = v.iter().cloned().fold(f64::MAX, f64::min);
        max - min
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwitchgearRating {
    /// kV
    pub rated_voltage: f64,
    /// A
    pub rated_current: f64,
    /// kA
    pub breaking_capacity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakerTiming {
    /// ms
    pub close_time: ThreePhaseValues,
    pub open_time: ThreePhaseValues,
    /// 合闸同期性（ms）
    pub simultaneity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactResistance {
    /// μOhm
    pub phase_a: f64,
    pub phase_b: f64,
    pub phase_c: f64,
    pub acceptable_limit: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwitchgearInsulation {
    /// MOhm
    pub phase_to_phase: f64,
    pub phase_to_earth: f64,
    pub test_voltage: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sf6Gas {
    /// bar
    pub pressure: f64,
    /// ppmv
    pub moisture_content: f64,
    /// %
    pub purity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MotorOperation {
    /// s
    pub spring_charging_time: f64,
    /// A
    pub motor_current: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwitchgearTestData {
    pub breaker_type: BreakerType,
    pub manufacturer: String,
    pub model: String,
    pub rating: SwitchgearRating,
    pub timing: BreakerTiming,
    pub contact_resistance: ContactResistance,
    pub insulation_resistance: SwitchgearInsulation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sf6_gas: Option<Sf6Gas>,
    pub motor_operation: MotorOperation,
    pub test_results: Vec<TestResultEntry>,
}

// ==================== 电缆 ====================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CableInsulation {
    /// MOhm
    pub core1_to_earth: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub core2_to_earth: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub core3_to_earth: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub core_to_core: Option<f64>,
    pub test_voltage: u32,
    /// 测试温度（°C）
    pub temperature: f64,
    /// 折算到 20°C 的绝缘电阻（MOhm）
    pub corrected_value: f64,
}

/// 导体直流电阻（Ohm）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CableContinuity {
    pub core1: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub core2: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub core3: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HiPotTest {
    /// kV DC
    pub test_voltage: f64,
    /// min
    pub duration: f64,
    /// μA
    pub leakage_current: f64,
    pub result: TestVerdict,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CableTestData {
    pub cable_type: String,
    /// m
    pub length: f64,
    /// mm²
    pub cross_section: f64,
    pub cores: u32,
    pub insulation_resistance: CableInsulation,
    pub continuity: CableContinuity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hi_pot: Option<HiPotTest>,
    pub test_results: Vec<TestResultEntry>,
}

// ==================== 接地 ====================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EarthResistance {
    /// Ohm
    pub main_earth: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub neutral_earth: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equipment_earth: Option<f64>,
    pub test_method: EarthTestMethod,
    /// Ohm-m
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub soil_resistivity: Option<f64>,
}

/// 点对点导通测量
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContinuityMeasurement {
    pub from_point: String,
    pub to_point: String,
    /// mOhm
    pub resistance: f64,
    pub result: TestVerdict,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroundingContinuity {
    pub measurements: Vec<ContinuityMeasurement>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroundingTestData {
    pub grounding_system: GroundingSystem,
    pub earth_resistance: EarthResistance,
    pub continuity: GroundingContinuity,
    pub test_results: Vec<TestResultEntry>,
}
