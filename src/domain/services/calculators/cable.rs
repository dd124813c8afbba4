//! 电缆计算器
//!
//! - 导体直流电阻：`R = L × 0.0175 / A`（Ohm，铜导体）
//! - 绝缘电阻温度折算：`factor = 1.5^((T - 20) / 10)`，折算值 = 实测值 / factor

use rand::Rng;

use super::{pick, sample_entry, EntrySpec, SamplingProfile};
use crate::domain::services::result_evaluator::{round_to, Precision};
use crate::models::{
    CableContinuity, CableInsulation, CableTestData, HiPotTest, TestResultEntry, TestVerdict,
    VoltageLevel,
};
use crate::utils::error::{AppError, AppResult};

/// 铜电阻率（Ohm·mm²/m）
pub const COPPER_RESISTIVITY: f64 = 0.0175;

/// 绝缘电阻折算的参考温度（°C）
pub const REFERENCE_TEMPERATURE: f64 = 20.0;

/// 导体电阻读数抖动（±5%）
const CONTINUITY_JITTER: f64 = 0.05;

/// 绝缘电阻下限（MOhm）
const MIN_INSULATION_RESISTANCE: f64 = 500.0;

const CABLE_TYPES: &[&str] = &[
    "XLPE 3x240mm2 Cu",
    "XLPE 3x185mm2 Cu",
    "XLPE 3x150mm2 Cu",
    "XLPE 3x120mm2 Cu",
    "XLPE 3x95mm2 Cu",
    "XLPE 3x70mm2 Cu",
    "XLPE 1x400mm2 Cu",
    "XLPE 1x300mm2 Cu",
    "PVC 4x16mm2 Cu",
    "PVC 4x10mm2 Cu",
];

const CROSS_SECTIONS: &[f64] = &[70.0, 95.0, 120.0, 150.0, 185.0, 240.0, 300.0, 400.0];

/// 电缆计算参数
#[derive(Debug, Clone, Default)]
pub struct CableTestParams {
    pub voltage_level: VoltageLevel,
    pub cable_type: Option<String>,
    /// m
    pub length: Option<f64>,
    /// mm²
    pub cross_section: Option<f64>,
}

impl CableTestParams {
    pub fn for_voltage(voltage_level: VoltageLevel) -> Self {
        Self {
            voltage_level,
            ..Default::default()
        }
    }
}

/// 导体直流电阻（Ohm）
pub fn continuity_resistance(length_m: f64, cross_section_mm2: f64) -> AppResult<f64> {
    if !length_m.is_finite() || length_m <= 0.0 {
        return Err(AppError::validation_error(format!("电缆长度必须为正数: {}", length_m)));
    }
    if !cross_section_mm2.is_finite() || cross_section_mm2 <= 0.0 {
        return Err(AppError::validation_error(format!(
            "导体截面积必须为正数: {}",
            cross_section_mm2
        )));
    }
    Ok(length_m * COPPER_RESISTIVITY / cross_section_mm2)
}

/// 绝缘电阻温度系数
pub fn insulation_temperature_factor(temperature_c: f64) -> f64 {
    1.5_f64.powf((temperature_c - REFERENCE_TEMPERATURE) / 10.0)
}

/// 绝缘电阻折算到 20°C
pub fn correct_insulation_resistance(raw_mohm: f64, temperature_c: f64) -> f64 {
    raw_mohm / insulation_temperature_factor(temperature_c)
}

/// 由电缆型号推断芯数：`1x` 单芯，`4x` 四芯，其余按三芯
pub fn cores_from_type(cable_type: &str) -> u32 {
    if cable_type.contains("1x") {
        1
    } else if cable_type.contains("4x") {
        4
    } else {
        3
    }
}

fn generate_results<R: Rng + ?Sized>(
    cores: u32,
    rng: &mut R,
    profile: &SamplingProfile,
) -> Vec<TestResultEntry> {
    // 四芯电缆只记录三个相芯
    let measured_cores = cores.min(3);
    let ir = (1..=measured_cores).map(|core| {
        EntrySpec::new(format!("IR Core {} to Earth", core), "MOhm", (500.0, 2000.0)).decimals(0, 1)
    });
    let continuity = (1..=measured_cores).map(|core| {
        EntrySpec::new(format!("Continuity Core {}", core), "Ohm", (0.1, 2.0))
            .decimals(3, 4)
            .precision(Precision::Resistance)
    });

    ir.chain(continuity)
        .collect::<Vec<_>>()
        .into_iter()
        .map(|spec| sample_entry(rng, &spec.tolerance(10.0, 5.0), profile))
        .collect()
}

/// 生成电缆测试数据
pub fn calculate<R: Rng + ?Sized>(
    params: &CableTestParams,
    rng: &mut R,
    profile: &SamplingProfile,
) -> AppResult<CableTestData> {
    let cable_type = match &params.cable_type {
        Some(t) => t.clone(),
        None => pick(rng, CABLE_TYPES).to_string(),
    };
    let cross_section = params.cross_section.unwrap_or_else(|| *pick(rng, CROSS_SECTIONS));
    let cores = cores_from_type(&cable_type);
    let length = match params.length {
        Some(length) => length,
        None => rng.gen_range(50..=2000) as f64,
    };

    let base_resistance = continuity_resistance(length, cross_section)?;

    let temperature = rng.gen_range(20..=40) as f64;
    // 绝缘电阻与截面成正比、与长度成反比
    let base_ir = (5000.0 * cross_section / length).round();
    let ir_low = (base_ir * 0.8).max(MIN_INSULATION_RESISTANCE);
    let ir_high = (base_ir * 1.2).max(ir_low);
    let mut core_ir = || rng.gen_range(ir_low..=ir_high).round();

    let core1_to_earth = core_ir();
    let core2_to_earth = if cores >= 2 { Some(core_ir()) } else { None };
    let core3_to_earth = if cores >= 3 { Some(core_ir()) } else { None };
    let core_to_core = if cores >= 2 { Some(core_ir()) } else { None };

    let insulation_resistance = CableInsulation {
        core1_to_earth,
        core2_to_earth,
        core3_to_earth,
        core_to_core,
        test_voltage: params.voltage_level.insulation_test_voltage(),
        temperature,
        corrected_value: correct_insulation_resistance(core1_to_earth, temperature).round(),
    };

    let mut core_continuity = || {
        round_to(
            base_resistance * rng.gen_range(1.0 - CONTINUITY_JITTER..=1.0 + CONTINUITY_JITTER),
            4,
        )
    };
    let continuity = CableContinuity {
        core1: core_continuity(),
        core2: if cores >= 2 { Some(core_continuity()) } else { None },
        core3: if cores >= 3 { Some(core_continuity()) } else { None },
    };

    let hi_pot = if rng.gen_bool(0.6) {
        Some(HiPotTest {
            test_voltage: match params.voltage_level {
                VoltageLevel::Kv33 => 75.0,
                VoltageLevel::Kv13_8 => 35.0,
            },
            duration: 15.0,
            leakage_current: rng.gen_range(5..=50) as f64,
            result: TestVerdict::from_pass(!profile.inject_fault(rng)),
        })
    } else {
        None
    };

    Ok(CableTestData {
        cable_type,
        length,
        cross_section,
        cores,
        insulation_resistance,
        continuity,
        hi_pot,
        test_results: generate_results(cores, rng, profile),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_continuity_formula() {
        let r = continuity_resistance(500.0, 240.0).unwrap();
        assert!((r - 0.036458).abs() < 1e-6);
        assert!(continuity_resistance(500.0, 0.0).is_err());
        assert!(continuity_resistance(-1.0, 240.0).is_err());
    }

    #[test]
    fn test_temperature_correction() {
        assert_eq!(insulation_temperature_factor(20.0), 1.0);
        assert!((insulation_temperature_factor(30.0) - 1.5).abs() < 1e-12);
        assert!((correct_insulation_resistance(1500.0, 30.0) - 1000.0).abs() < 1e-9);
        // 低于参考温度时折算值变大
        assert!((correct_insulation_resistance(1000.0, 10.0) - 1500.0).abs() < 1e-9);
    }

    #[test]
    fn test_cores_from_type() {
        assert_eq!(cores_from_type("XLPE 1x400mm2 Cu"), 1);
        assert_eq!(cores_from_type("PVC 4x16mm2 Cu"), 4);
        assert_eq!(cores_from_type("XLPE 3x240mm2 Cu"), 3);
    }

    #[test]
    fn test_500m_240mm2_scenario() {
        let mut rng = StdRng::seed_from_u64(500);
        let params = CableTestParams {
            cable_type: Some("XLPE 3x240mm2 Cu".to_string()),
            length: Some(500.0),
            cross_section: Some(240.0),
            ..CableTestParams::for_voltage(VoltageLevel::Kv33)
        };
        let expected = 500.0 * 0.0175 / 240.0;
        for _ in 0..50 {
            let data = calculate(&params, &mut rng, &SamplingProfile::nominal()).unwrap();
            let cores = [
                Some(data.continuity.core1),
                data.continuity.core2,
                data.continuity.core3,
            ];
            for r in cores.into_iter().flatten() {
                assert!((r / expected - 1.0).abs() <= 0.0515, "continuity {}", r);
            }
            assert_eq!(data.cores, 3);
            assert_eq!(data.test_results.len(), 6);
            for entry in &data.test_results {
                assert_eq!(entry.result.is_pass(), entry.deviation.abs() <= entry.tolerance);
            }
        }
    }

    #[test]
    fn test_single_core_has_no_secondary_readings() {
        let mut rng = StdRng::seed_from_u64(1);
        let params = CableTestParams {
            cable_type: Some("XLPE 1x300mm2 Cu".to_string()),
            ..Default::default()
        };
        let data = calculate(&params, &mut rng, &SamplingProfile::nominal()).unwrap();
        assert_eq!(data.cores, 1);
        assert!(data.continuity.core2.is_none());
        assert!(data.insulation_resistance.core_to_core.is_none());
        let names: Vec<_> = data.test_results.iter().map(|r| r.test_name.as_str()).collect();
        assert_eq!(names, vec!["IR Core 1 to Earth", "Continuity Core 1"]);
    }

    #[test]
    fn test_corrected_value_uses_temperature() {
        let mut rng = StdRng::seed_from_u64(21);
        let data = calculate(&CableTestParams::default(), &mut rng, &SamplingProfile::nominal()).unwrap();
        let ir = &data.insulation_resistance;
        let expected = correct_insulation_resistance(ir.core1_to_earth, ir.temperature).round();
        assert_eq!(ir.corrected_value, expected);
        assert!(ir.corrected_value <= ir.core1_to_earth);
    }
}
