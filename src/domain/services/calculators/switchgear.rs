//! 开关柜计算器

use rand::Rng;

use super::{float_in, pick, sample_entry, EntrySpec, SamplingProfile};
use crate::domain::services::result_evaluator::{round_to, Precision};
use crate::models::{
    BreakerTiming, BreakerType, ContactResistance, MotorOperation, Sf6Gas, SwitchgearInsulation,
    SwitchgearRating, SwitchgearTestData, TestResultEntry, ThreePhaseValues, VoltageLevel,
};
use crate::utils::error::AppResult;

/// 合闸时间基准（ms）
const CLOSE_TIME_BASE: f64 = 55.0;
/// 分闸时间基准（ms）
const OPEN_TIME_BASE: f64 = 35.0;
/// 分合闸时间各相抖动（±ms）
const TIMING_VARIATION: f64 = 5.0;
/// 主回路接触电阻上限（μOhm）
const CONTACT_RESISTANCE_LIMIT: f64 = 100.0;

const CB_MANUFACTURERS: &[&str] = &["ABB", "Siemens", "Schneider Electric", "GE", "Hyundai", "Mitsubishi"];
const RATED_CURRENTS: &[f64] = &[630.0, 1250.0, 2000.0, 2500.0, 3150.0];
const BREAKING_CAPACITIES: &[f64] = &[25.0, 31.5, 40.0, 50.0];
const BREAKER_TYPES: [BreakerType; 2] = [BreakerType::Vacuum, BreakerType::Sf6];

fn breaker_models(manufacturer: &str, breaker_type: BreakerType) -> &'static [&'static str] {
    match (manufacturer, breaker_type) {
        ("ABB", BreakerType::Vacuum) => &["VD4", "VM1"],
        ("ABB", BreakerType::Sf6) => &["HD4", "ELK-14"],
        ("Siemens", BreakerType::Vacuum) => &["3AH", "3AE"],
        ("Siemens", BreakerType::Sf6) => &["8DA", "8DB"],
        ("Schneider Electric", BreakerType::Vacuum) => &["Evolis", "HVX"],
        ("Schneider Electric", BreakerType::Sf6) => &["FBX", "FG2"],
        ("GE", BreakerType::Vacuum) => &["VB1", "VB2"],
        ("GE", BreakerType::Sf6) => &["FK", "FKG"],
        ("Hyundai", BreakerType::Vacuum) => &["HVF", "HGF"],
        ("Hyundai", BreakerType::Sf6) => &["HGF-SD", "HGF-ND"],
        ("Mitsubishi", BreakerType::Vacuum) => &["VCB", "VSV"],
        ("Mitsubishi", BreakerType::Sf6) => &["SFG", "GCB"],
        _ => &["Generic CB"],
    }
}

/// 开关柜计算参数
#[derive(Debug, Clone, Default)]
pub struct SwitchgearTestParams {
    pub voltage_level: VoltageLevel,
    pub breaker_type: Option<BreakerType>,
    pub manufacturer: Option<String>,
    pub rated_current: Option<f64>,
}

impl SwitchgearTestParams {
    pub fn for_voltage(voltage_level: VoltageLevel) -> Self {
        Self {
            voltage_level,
            ..Default::default()
        }
    }
}

/// 开关柜额定电压（kV）
pub fn rated_voltage(voltage_level: VoltageLevel) -> f64 {
    match voltage_level {
        VoltageLevel::Kv33 => 36.0,
        VoltageLevel::Kv13_8 => 15.0,
    }
}

fn timing_phases<R: Rng + ?Sized>(base: f64, rng: &mut R) -> ThreePhaseValues {
    let mut phase = || round_to(base + rng.gen_range(-TIMING_VARIATION..=TIMING_VARIATION), 1);
    ThreePhaseValues {
        phase_a: phase(),
        phase_b: phase(),
        phase_c: phase(),
    }
}

fn generate_results<R: Rng + ?Sized>(rng: &mut R, profile: &SamplingProfile) -> Vec<TestResultEntry> {
    let mut specs = Vec::with_capacity(9);
    for phase in ["A", "B", "C"] {
        specs.push(
            EntrySpec::new(format!("Close Time Phase {}", phase), "ms", (45.0, 65.0))
                .precision(Precision::Timing),
        );
    }
    for phase in ["A", "B", "C"] {
        specs.push(
            EntrySpec::new(format!("Open Time Phase {}", phase), "ms", (25.0, 45.0))
                .precision(Precision::Timing),
        );
    }
    for phase in ["A", "B", "C"] {
        specs.push(
            EntrySpec::new(format!("Contact Resistance {}", phase), "uOhm", (30.0, 80.0))
                .precision(Precision::Resistance),
        );
    }

    specs
        .into_iter()
        .map(|spec| sample_entry(rng, &spec.decimals(1, 2).tolerance(5.0, 3.0), profile))
        .collect()
}

/// 生成开关柜测试数据
pub fn calculate<R: Rng + ?Sized>(
    params: &SwitchgearTestParams,
    rng: &mut R,
    profile: &SamplingProfile,
) -> AppResult<SwitchgearTestData> {
    let breaker_type = params.breaker_type.unwrap_or_else(|| *pick(rng, &BREAKER_TYPES));
    let manufacturer = match &params.manufacturer {
        Some(m) => m.clone(),
        None => pick(rng, CB_MANUFACTURERS).to_string(),
    };
    let model = pick(rng, breaker_models(&manufacturer, breaker_type)).to_string();

    let rating = SwitchgearRating {
        rated_voltage: rated_voltage(params.voltage_level),
        rated_current: params.rated_current.unwrap_or_else(|| *pick(rng, RATED_CURRENTS)),
        breaking_capacity: *pick(rng, BREAKING_CAPACITIES),
    };

    let close_time = timing_phases(CLOSE_TIME_BASE, rng);
    let open_time = timing_phases(OPEN_TIME_BASE, rng);
    let simultaneity = round_to(close_time.max_spread(), 1);

    let contact_resistance = ContactResistance {
        phase_a: rng.gen_range(35..=75) as f64,
        phase_b: rng.gen_range(35..=75) as f64,
        phase_c: rng.gen_range(35..=75) as f64,
        acceptable_limit: CONTACT_RESISTANCE_LIMIT,
    };

    let insulation_resistance = SwitchgearInsulation {
        phase_to_phase: rng.gen_range(5000..=15000) as f64,
        phase_to_earth: rng.gen_range(5000..=15000) as f64,
        test_voltage: params.voltage_level.insulation_test_voltage(),
    };

    let sf6_gas = match breaker_type {
        BreakerType::Sf6 => Some(Sf6Gas {
            pressure: float_in(rng, 5.5, 6.5, 2),
            moisture_content: rng.gen_range(50..=200) as f64,
            purity: float_in(rng, 98.0, 99.9, 1),
        }),
        BreakerType::Vacuum => None,
    };

    let motor_operation = MotorOperation {
        spring_charging_time: float_in(rng, 8.0, 15.0, 1),
        motor_current: float_in(rng, 2.0, 5.0, 1),
    };

    Ok(SwitchgearTestData {
        breaker_type,
        manufacturer,
        model,
        rating,
        timing: BreakerTiming {
            close_time,
            open_time,
            simultaneity,
        },
        contact_resistance,
        insulation_resistance,
        sf6_gas,
        motor_operation,
        test_results: generate_results(rng, profile),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_sf6_breaker_carries_gas_readings() {
        let mut rng = StdRng::seed_from_u64(8);
        let params = SwitchgearTestParams {
            breaker_type: Some(BreakerType::Sf6),
            manufacturer: Some("Siemens".to_string()),
            ..SwitchgearTestParams::for_voltage(VoltageLevel::Kv33)
        };
        let data = calculate(&params, &mut rng, &SamplingProfile::nominal()).unwrap();
        assert!(data.sf6_gas.is_some());
        assert!(["8DA", "8DB"].contains(&data.model.as_str()));
        assert_eq!(data.rating.rated_voltage, 36.0);
        assert_eq!(data.insulation_resistance.test_voltage, 5000);
    }

    #[test]
    fn test_vacuum_breaker_has_no_gas() {
        let mut rng = StdRng::seed_from_u64(9);
        let params = SwitchgearTestParams {
            breaker_type: Some(BreakerType::Vacuum),
            ..SwitchgearTestParams::for_voltage(VoltageLevel::Kv13_8)
        };
        let data = calculate(&params, &mut rng, &SamplingProfile::nominal()).unwrap();
        assert!(data.sf6_gas.is_none());
        assert_eq!(data.rating.rated_voltage, 15.0);
    }

    #[test]
    fn test_timing_and_simultaneity() {
        let mut rng = StdRng::seed_from_u64(10);
        for _ in 0..30 {
            let data = calculate(&SwitchgearTestParams::default(), &mut rng, &SamplingProfile::nominal()).unwrap();
            for v in data.timing.close_time.values() {
                assert!((50.0..=60.0).contains(&v));
            }
            for v in data.timing.open_time.values() {
                assert!((30.0..=40.0).contains(&v));
            }
            assert!((data.timing.simultaneity - data.timing.close_time.max_spread()).abs() < 0.051);
            assert!(data.contact_resistance.phase_a < data.contact_resistance.acceptable_limit);
            assert_eq!(data.test_results.len(), 9);
            assert_eq!(data.test_results[0].unit, "ms");
            assert_eq!(data.test_results[8].unit, "uOhm");
        }
    }
}
