//! 接地系统计算器

use rand::seq::SliceRandom;
use rand::Rng;

use super::{float_in, pick, sample_entry, EntrySpec, SamplingProfile};
use crate::domain::services::result_evaluator::Precision;
use crate::models::{
    ContinuityMeasurement, EarthResistance, EarthTestMethod, GroundingContinuity, GroundingSystem,
    GroundingTestData, TestResultEntry, TestVerdict,
};
use crate::utils::error::{AppError, AppResult};

/// 等电位联结导通限值（mOhm）
pub const BONDING_LIMIT_MOHM: f64 = 100.0;
/// 一般接地导通限值（mOhm）
pub const CONTINUITY_LIMIT_MOHM: f64 = 1000.0;

const GROUNDING_SYSTEMS: [GroundingSystem; 4] =
    [GroundingSystem::TnS, GroundingSystem::TnCS, GroundingSystem::Tt, GroundingSystem::It];

const TEST_METHODS: [EarthTestMethod; 3] =
    [EarthTestMethod::FallOfPotential, EarthTestMethod::ClampOn, EarthTestMethod::Stakeless];

/// 导通测量点位（起点，终点）
const MEASUREMENT_POINTS: &[(&str, &str)] = &[
    ("Main Earth Bar", "Transformer Neutral"),
    ("Main Earth Bar", "Switchgear Frame"),
    ("Main Earth Bar", "Cable Tray"),
    ("Main Earth Bar", "Building Steel"),
    ("Transformer Neutral", "Earth Electrode 1"),
    ("Transformer Neutral", "Earth Electrode 2"),
    ("Switchgear Frame", "Local Earth Bar"),
    ("Motor Frame", "Local Earth Bar"),
    ("Panel Frame", "Earth Bar"),
    ("Equipment Bonding", "Main Earth"),
];

/// 接地计算参数
#[derive(Debug, Clone, Default)]
pub struct GroundingTestParams {
    pub grounding_system: Option<GroundingSystem>,
    pub test_method: Option<EarthTestMethod>,
    /// 导通测量点数，5..=10
    pub measurement_count: Option<usize>,
}

/// 导通测量限值：等电位联结点更严格
pub fn continuity_limit(from_point: &str) -> f64 {
    if from_point.contains("Bonding") {
        BONDING_LIMIT_MOHM
    } else {
        CONTINUITY_LIMIT_MOHM
    }
}

fn generate_results<R: Rng + ?Sized>(rng: &mut R, profile: &SamplingProfile) -> Vec<TestResultEntry> {
    // 接地电阻容差 20%，联结导通容差 10%
    let specs = [
        EntrySpec::new("Main Earth Resistance", "Ohm", (0.5, 5.0)),
        EntrySpec::new("Neutral Earth Resistance", "Ohm", (0.5, 5.0)),
        EntrySpec::new("Equipment Earth Resistance", "Ohm", (0.5, 10.0)),
        EntrySpec::new("Bonding Continuity", "mOhm", (1.0, 50.0))
            .decimals(1, 3)
            .tolerance(10.0, 9.0),
        EntrySpec::new("Grid Mesh Resistance", "Ohm", (1.0, 10.0)),
    ];

    specs
        .into_iter()
        .map(|spec| {
            let spec = if spec.unit == "Ohm" {
                spec.decimals(2, 3).tolerance(20.0, 10.0)
            } else {
                spec
            };
            sample_entry(rng, &spec.precision(Precision::Resistance), profile)
        })
        .collect()
}

fn measure_point<R: Rng + ?Sized>(
    from_point: &str,
    to_point: &str,
    rng: &mut R,
    profile: &SamplingProfile,
) -> ContinuityMeasurement {
    let limit = continuity_limit(from_point);
    let resistance = if profile.inject_fault(rng) {
        float_in(rng, limit * 1.1, limit * 1.5, 1)
    } else {
        float_in(rng, 0.5, 50.0, 1)
    };
    ContinuityMeasurement {
        from_point: from_point.to_string(),
        to_point: to_point.to_string(),
        resistance,
        result: TestVerdict::from_pass(resistance <= limit),
    }
}

/// 生成接地系统测试数据
pub fn calculate<R: Rng + ?Sized>(
    params: &GroundingTestParams,
    rng: &mut R,
    profile: &SamplingProfile,
) -> AppResult<GroundingTestData> {
    let grounding_system = params
        .grounding_system
        .unwrap_or_else(|| *pick(rng, &GROUNDING_SYSTEMS));
    let test_method = params.test_method.unwrap_or_else(|| *pick(rng, &TEST_METHODS));

    let count = match params.measurement_count {
        Some(n) if (1..=MEASUREMENT_POINTS.len()).contains(&n) => n,
        Some(n) => {
            return Err(AppError::validation_error(format!(
                "导通测量点数必须在1到{}之间: {}",
                MEASUREMENT_POINTS.len(),
                n
            )))
        }
        None => rng.gen_range(5..=10),
    };

    let earth_resistance = EarthResistance {
        main_earth: float_in(rng, 0.5, 5.0, 2),
        neutral_earth: if rng.gen_bool(0.7) { Some(float_in(rng, 0.5, 5.0, 2)) } else { None },
        equipment_earth: if rng.gen_bool(0.7) { Some(float_in(rng, 1.0, 10.0, 2)) } else { None },
        test_method,
        soil_resistivity: match test_method {
            EarthTestMethod::FallOfPotential => Some(rng.gen_range(50..=500) as f64),
            _ => None,
        },
    };

    let points: Vec<(&str, &str)> = MEASUREMENT_POINTS.choose_multiple(rng, count).cloned().collect();
    let measurements = points
        .into_iter()
        .map(|(from, to)| measure_point(from, to, rng, profile))
        .collect();

    Ok(GroundingTestData {
        grounding_system,
        earth_resistance,
        continuity: GroundingContinuity { measurements },
        test_results: generate_results(rng, profile),
    })
}
