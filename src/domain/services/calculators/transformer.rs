//! 变压器计算器
//!
//! 绕组电阻基准与容量成反比：高压侧 `10 / MVA` mOhm，低压侧取高压侧的 0.1 倍，
//! 每个线间读数独立在 ±2% 内抖动。

use rand::Rng;

use super::{float_in, pick, sample_entry, EntrySpec, SamplingProfile};
use crate::domain::services::result_evaluator::{evaluate, round_to, Precision};
use crate::models::{
    OilTests, Phase, PhasePairResistance, PhaseRatio, TestResultEntry, TransformerInsulation,
    TransformerRating, TransformerTestData, TransformerType, TurnsRatio, VoltageLevel, WindingResistance,
};
use crate::utils::error::{AppError, AppResult};

/// 线间电阻抖动幅度（±2%）
pub const WINDING_JITTER: f64 = 0.02;

/// 低压侧相对高压侧的电阻比例
pub const LV_RESISTANCE_RATIO: f64 = 0.1;

/// 沙特电网频率
const GRID_FREQUENCY: u32 = 60;

const MVA_RATINGS: &[f64] = &[2.5, 5.0, 10.0, 16.0, 20.0, 25.0, 31.5, 40.0, 50.0, 63.0, 80.0, 100.0];
const SECONDARY_KV: &[f64] = &[0.4, 0.69, 6.6, 11.0];
const COOLING_TYPES: &[&str] = &["ONAN", "ONAF", "OFAF", "ODAF"];

/// 变压器计算参数
#[derive(Debug, Clone, Default)]
pub struct TransformerTestParams {
    pub voltage_level: VoltageLevel,
    pub mva: Option<f64>,
    pub secondary_kv: Option<f64>,
    pub cooling_type: Option<String>,
}

impl TransformerTestParams {
    pub fn for_voltage(voltage_level: VoltageLevel) -> Self {
        Self {
            voltage_level,
            ..Default::default()
        }
    }
}

/// 高压绕组电阻基准（mOhm）
pub fn winding_base_resistance(mva: f64) -> AppResult<f64> {
    if !mva.is_finite() || mva <= 0.0 {
        return Err(AppError::validation_error(format!("变压器容量必须为正数: {}", mva)));
    }
    Ok(10.0 / mva)
}

/// 三个线间读数独立抖动
fn jitter_phase_pairs<R: Rng + ?Sized>(base: f64, rng: &mut R) -> PhasePairResistance {
    let mut jitter = || round_to(base * rng.gen_range(1.0 - WINDING_JITTER..=1.0 + WINDING_JITTER), 4);
    PhasePairResistance {
        ry: jitter(),
        yb: jitter(),
        br: jitter(),
    }
}

fn generate_results<R: Rng + ?Sized>(rng: &mut R, profile: &SamplingProfile) -> Vec<TestResultEntry> {
    let specs = [
        EntrySpec::new("Winding Resistance HV", "mOhm", (0.5, 5.0)).precision(Precision::Resistance),
        EntrySpec::new("Winding Resistance LV", "mOhm", (0.1, 1.0)).precision(Precision::Resistance),
        EntrySpec::new("Turns Ratio", "ratio", (0.98, 1.02)),
        EntrySpec::new("IR HV-LV", "MOhm", (1000.0, 5000.0)),
        EntrySpec::new("IR HV-Earth", "MOhm", (1000.0, 5000.0)),
        EntrySpec::new("Polarization Index", "", (2.0, 4.0)),
    ];

    specs
        .into_iter()
        .map(|spec| {
            let spec = spec.decimals(2, 4).tolerance(2.0, 1.5);
            sample_entry(rng, &spec, profile)
        })
        .collect()
}

/// 生成变压器测试数据
pub fn calculate<R: Rng + ?Sized>(
    params: &TransformerTestParams,
    rng: &mut R,
    profile: &SamplingProfile,
) -> AppResult<TransformerTestData> {
    let primary_kv = params.voltage_level.kilovolts();
    let secondary_kv = params.secondary_kv.unwrap_or_else(|| *pick(rng, SECONDARY_KV));
    if !secondary_kv.is_finite() || secondary_kv <= 0.0 {
        return Err(AppError::validation_error(format!("二次侧电压必须为正数: {}", secondary_kv)));
    }
    let mva = params.mva.unwrap_or_else(|| *pick(rng, MVA_RATINGS));

    let base_hv = winding_base_resistance(mva)?;
    let base_lv = base_hv * LV_RESISTANCE_RATIO;

    let cooling_type = match &params.cooling_type {
        Some(cooling) => cooling.clone(),
        None => pick(rng, COOLING_TYPES).to_string(),
    };

    let hv_phases = jitter_phase_pairs(base_hv, rng);
    let lv_phases = jitter_phase_pairs(base_lv, rng);
    let temperature = rng.gen_range(20..=35) as f64;

    let nominal_ratio = round_to(primary_kv / secondary_kv, 3);
    let tap_position = rng.gen_range(-2..=2);
    let phases = [Phase::R, Phase::Y, Phase::B]
        .into_iter()
        .map(|phase| {
            let drift = float_in(rng, -0.4, 0.4, 2);
            let measured_ratio = round_to(nominal_ratio * (1.0 + drift / 100.0), 3);
            PhaseRatio {
                phase,
                measured_ratio,
                deviation: evaluate(nominal_ratio, measured_ratio, 0.005).deviation,
            }
        })
        .collect();

    let insulation_resistance = TransformerInsulation {
        hv_to_lv: rng.gen_range(2000..=8000) as f64,
        hv_to_earth: rng.gen_range(2000..=8000) as f64,
        lv_to_earth: rng.gen_range(1500..=6000) as f64,
        test_voltage: params.voltage_level.insulation_test_voltage(),
        polarization_index: float_in(rng, 2.0, 4.0, 2),
    };

    let oil_tests = if rng.gen_bool(0.7) {
        Some(OilTests {
            breakdown_voltage: rng.gen_range(50..=80) as f64,
            moisture_content: rng.gen_range(5..=20) as f64,
            acidity_number: float_in(rng, 0.01, 0.1, 3),
        })
    } else {
        None
    };

    Ok(TransformerTestData {
        transformer_type: if mva >= 10.0 { TransformerType::Power } else { TransformerType::Distribution },
        rating: TransformerRating {
            mva,
            primary_kv,
            secondary_kv,
            frequency: GRID_FREQUENCY,
            cooling_type,
        },
        winding_resistance: WindingResistance {
            hv_phases,
            lv_phases,
            temperature,
        },
        turns_ratio: TurnsRatio {
            nominal_ratio,
            tap_position,
            phases,
        },
        insulation_resistance,
        oil_tests,
        test_results: generate_results(rng, profile),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_base_resistance_inverse_to_rating() {
        assert_eq!(winding_base_resistance(10.0).unwrap(), 1.0);
        assert_eq!(winding_base_resistance(2.5).unwrap(), 4.0);
        assert!(winding_base_resistance(0.0).is_err());
        assert!(winding_base_resistance(-5.0).is_err());
    }

    #[test]
    fn test_winding_jitter_within_two_percent() {
        let mut rng = StdRng::seed_from_u64(99);
        let params = TransformerTestParams {
            mva: Some(10.0),
            ..TransformerTestParams::for_voltage(VoltageLevel::Kv33)
        };
        for _ in 0..50 {
            let data = calculate(&params, &mut rng, &SamplingProfile::nominal()).unwrap();
            for v in data.winding_resistance.hv_phases.values() {
                assert!((v / 1.0 - 1.0).abs() <= 0.0201, "HV {}", v);
            }
            for v in data.winding_resistance.lv_phases.values() {
                assert!((v / 0.1 - 1.0).abs() <= 0.0206, "LV {}", v);
            }
        }
    }

    #[test]
    fn test_rating_follows_voltage_level() {
        let mut rng = StdRng::seed_from_u64(5);
        let params = TransformerTestParams {
            mva: Some(5.0),
            secondary_kv: Some(0.4),
            ..TransformerTestParams::for_voltage(VoltageLevel::Kv13_8)
        };
        let data = calculate(&params, &mut rng, &SamplingProfile::nominal()).unwrap();
        assert_eq!(data.rating.primary_kv, 13.8);
        assert_eq!(data.rating.frequency, 60);
        assert_eq!(data.turns_ratio.nominal_ratio, 34.5);
        assert_eq!(data.insulation_resistance.test_voltage, 2500);
        assert_eq!(data.transformer_type, TransformerType::Distribution);
        assert_eq!(data.turns_ratio.phases.len(), 3);
        for phase in &data.turns_ratio.phases {
            assert!(phase.deviation.abs() <= 0.5);
        }
        assert_eq!(data.test_results.len(), 6);
        assert!(data.test_results.iter().all(|r| r.result.is_pass()));
    }

    #[test]
    fn test_invalid_secondary_voltage_rejected() {
        let mut rng = StdRng::seed_from_u64(5);
        let params = TransformerTestParams {
            secondary_kv: Some(0.0),
            ..Default::default()
        };
        assert!(calculate(&params, &mut rng, &SamplingProfile::nominal()).is_err());
    }
}
