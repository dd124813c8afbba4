/// 领域计算器模块
///
/// 业务说明：
/// 每类设备一个计算器，把少量设备参数加上注入的随机源变成完整的测试数据。
/// 所有结果记录都经过 `result_evaluator` 判定，保证偏差与判定结果自洽。
///
/// 随机源以 `&mut R where R: Rng + ?Sized` 注入，调用方用固定种子即可复现。

/// 保护继电器计算器（IEC 60255-151 反时限曲线）
pub mod protection_relay;

/// 变压器计算器（绕组电阻、变比、绝缘）
pub mod transformer;

/// 开关柜计算器（分合闸时间、接触电阻）
pub mod switchgear;

/// 电缆计算器（导体电阻、绝缘温度折算）
pub mod cable;

/// 接地系统计算器（接地电阻、导通测量）
pub mod grounding;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::domain::services::result_evaluator::{build_entry, round_to, Precision};
use crate::models::{ReportType, TestData, TestResultEntry, VoltageLevel};
use crate::utils::error::{AppError, AppResult};

pub use cable::{
    continuity_resistance, correct_insulation_resistance, insulation_temperature_factor,
    CableTestParams,
};
pub use grounding::GroundingTestParams;
pub use protection_relay::{iec_trip_time, RelayTestParams};
pub use switchgear::SwitchgearTestParams;
pub use transformer::{winding_base_resistance, TransformerTestParams};

/// 采样配置
///
/// `fault_rate` 为每个读数被注入超差的概率，默认 0 时所有读数落在容差带内
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SamplingProfile {
    pub fault_rate: f64,
}

impl Default for SamplingProfile {
    fn default() -> Self {
        Self { fault_rate: 0.0 }
    }
}

impl SamplingProfile {
    /// 不注入故障
    pub fn nominal() -> Self {
        Self::default()
    }

    /// 指定故障注入概率，必须在 0..=1 之间
    pub fn with_fault_rate(fault_rate: f64) -> AppResult<Self> {
        if !fault_rate.is_finite() || !(0.0..=1.0).contains(&fault_rate) {
            return Err(AppError::validation_error(format!(
                "故障注入概率必须在0到1之间: {}",
                fault_rate
            )));
        }
        Ok(Self { fault_rate })
    }

    /// 本次读数是否注入故障
    pub fn inject_fault<R: Rng + ?Sized>(&self, rng: &mut R) -> bool {
        // NaN 比较为 false，直接视为不注入
        if !(self.fault_rate > 0.0) {
            return false;
        }
        rng.gen_bool(self.fault_rate.min(1.0))
    }
}

/// 结果记录的采样规格
#[derive(Debug, Clone)]
pub(crate) struct EntrySpec {
    pub name: String,
    pub unit: &'static str,
    pub setting_range: (f64, f64),
    pub setting_decimals: u32,
    pub measured_decimals: u32,
    /// 容差（%）
    pub tolerance: f64,
    /// 正常读数的漂移范围（±%），小于容差
    pub nominal_band: f64,
    pub precision: Precision,
}

impl EntrySpec {
    pub fn new(name: impl Into<String>, unit: &'static str, setting_range: (f64, f64)) -> Self {
        Self {
            name: name.into(),
            unit,
            setting_range,
            setting_decimals: 2,
            measured_decimals: 3,
            tolerance: 5.0,
            nominal_band: 4.5,
            precision: Precision::Percentage,
        }
    }

    pub fn decimals(mut self, setting: u32, measured: u32) -> Self {
        self.setting_decimals = setting;
        self.measured_decimals = measured;
        self
    }

    pub fn tolerance(mut self, tolerance: f64, nominal_band: f64) -> Self {
        self.tolerance = tolerance;
        self.nominal_band = nominal_band;
        self
    }

    pub fn precision(mut self, precision: Precision) -> Self {
        self.precision = precision;
        self
    }
}

/// 在闭区间内取值并按小数位舍入
pub(crate) fn float_in<R: Rng + ?Sized>(rng: &mut R, min: f64, max: f64, decimals: u32) -> f64 {
    let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
    round_to(rng.gen_range(lo..=hi), decimals)
}

/// 从固定候选列表中取一项
pub(crate) fn pick<'a, T, R: Rng + ?Sized>(rng: &mut R, items: &'a [T]) -> &'a T {
    &items[rng.gen_range(0..items.len())]
}

/// 漂移百分比：正常读数落在 ±nominal_band，注入故障时落在容差的 1.2~2 倍
pub(crate) fn sample_drift<R: Rng + ?Sized>(
    rng: &mut R,
    profile: &SamplingProfile,
    tolerance: f64,
    nominal_band: f64,
) -> f64 {
    if profile.inject_fault(rng) {
        let magnitude = rng.gen_range(tolerance * 1.2..=tolerance * 2.0);
        if rng.gen_bool(0.5) { magnitude } else { -magnitude }
    } else {
        rng.gen_range(-nominal_band..=nominal_band)
    }
}

/// 按规格采样一条结果记录
///
/// 测量值由设定值和漂移得出，偏差再由判定器根据实际测量值计算
pub(crate) fn sample_entry<R: Rng + ?Sized>(
    rng: &mut R,
    spec: &EntrySpec,
    profile: &SamplingProfile,
) -> TestResultEntry {
    let setting = float_in(rng, spec.setting_range.0, spec.setting_range.1, spec.setting_decimals);
    let drift = sample_drift(rng, profile, spec.tolerance, spec.nominal_band);
    let measured = round_to(setting * (1.0 + drift / 100.0), spec.measured_decimals);
    build_entry(spec.name.clone(), spec.unit, setting, measured, spec.tolerance, spec.precision)
}

/// 用默认参数为指定分类生成测试数据
pub fn generate_test_data<R: Rng + ?Sized>(
    report_type: ReportType,
    voltage_level: VoltageLevel,
    rng: &mut R,
    profile: &SamplingProfile,
) -> AppResult<TestData> {
    let data = match report_type {
        ReportType::ProtectionRelay => TestData::ProtectionRelay(protection_relay::calculate(
            &RelayTestParams::default(),
            rng,
            profile,
        )?),
        ReportType::Transformer => TestData::Transformer(transformer::calculate(
            &TransformerTestParams::for_voltage(voltage_level),
            rng,
            profile,
        )?),
        ReportType::Switchgear => TestData::Switchgear(switchgear::calculate(
            &SwitchgearTestParams::for_voltage(voltage_level),
            rng,
            profile,
        )?),
        ReportType::Cable => TestData::Cable(cable::calculate(
            &CableTestParams::for_voltage(voltage_level),
            rng,
            profile,
        )?),
        ReportType::Grounding => TestData::Grounding(grounding::calculate(
            &GroundingTestParams::default(),
            rng,
            profile,
        )?),
    };
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::services::result_evaluator::is_entry_consistent;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_fault_rate_bounds() {
        assert!(SamplingProfile::with_fault_rate(0.0).is_ok());
        assert!(SamplingProfile::with_fault_rate(1.0).is_ok());
        assert!(SamplingProfile::with_fault_rate(1.5).is_err());
        assert!(SamplingProfile::with_fault_rate(-0.1).is_err());
        assert!(SamplingProfile::with_fault_rate(f64::NAN).is_err());
    }

    #[test]
    fn test_nominal_profile_never_injects() {
        let mut rng = StdRng::seed_from_u64(7);
        let profile = SamplingProfile::nominal();
        assert!((0..1000).all(|_| !profile.inject_fault(&mut rng)));
    }

    #[test]
    fn test_sampled_entry_is_consistent() {
        let mut rng = StdRng::seed_from_u64(42);
        let spec = EntrySpec::new("51P Phase IDMT", "A", (0.5, 5.0)).decimals(3, 3);
        for _ in 0..200 {
            let entry = sample_entry(&mut rng, &spec, &SamplingProfile::nominal());
            assert!(is_entry_consistent(&entry));
            assert!(entry.result.is_pass(), "正常读数应全部通过: {:?}", entry);
            let implied = entry.setting_value * (1.0 + entry.deviation / 100.0);
            assert!((implied - entry.measured_value).abs() < 0.001);
        }
    }

    #[test]
    fn test_full_fault_rate_fails_every_entry() {
        let mut rng = StdRng::seed_from_u64(3);
        let spec = EntrySpec::new("Close Time Phase A", "ms", (45.0, 65.0))
            .decimals(1, 2)
            .tolerance(5.0, 3.0)
            .precision(Precision::Timing);
        let profile = SamplingProfile::with_fault_rate(1.0).unwrap();
        for _ in 0..100 {
            let entry = sample_entry(&mut rng, &spec, &profile);
            assert!(!entry.result.is_pass());
            assert!(is_entry_consistent(&entry));
        }
    }

    #[test]
    fn test_dispatch_produces_requested_variant() {
        let mut rng = StdRng::seed_from_u64(11);
        for report_type in ReportType::ALL {
            let data = generate_test_data(
                report_type,
                VoltageLevel::Kv13_8,
                &mut rng,
                &SamplingProfile::nominal(),
            )
            .unwrap();
            assert_eq!(data.report_type(), report_type);
            assert!(!data.test_results().is_empty());
        }
    }
}
