//! 保护继电器计算器
//!
//! 反时限动作时间按 IEC 60255-151：`t = TD × k / (M^α - 1)`，结果保留 2 位小数

use rand::Rng;

use super::{float_in, pick, sample_entry, EntrySpec, SamplingProfile};
use crate::domain::services::result_evaluator::round_to;
use crate::models::{
    DifferentialSettings, IecCurve, InstantaneousElement, OvercurrentElement, OvercurrentSettings,
    ProtectionRelayTestData, RelayType, TestResultEntry,
};
use crate::utils::error::{AppError, AppResult};

/// 整定值表中动作时间对应的故障电流倍数
pub const TRIP_TIME_MULTIPLE: f64 = 3.0;

/// 继电器厂家与常见型号
const RELAY_CATALOG: &[(&str, &[&str])] = &[
    ("ABB", &["REF615", "REF620", "REL670", "RET670"]),
    ("Siemens", &["7SJ85", "7SJ82", "7UT85", "7SD87"]),
    ("SEL", &["SEL-751", "SEL-751A", "SEL-787", "SEL-311L"]),
    ("GE", &["F650", "T60", "L90", "D60"]),
    ("Schneider Electric", &["MiCOM P14x", "MiCOM P54x", "MiCOM P44x"]),
    ("Areva/Alstom", &["P14x", "P54x", "P44x", "P64x"]),
];

const CT_RATIOS: &[&str] = &[
    "100/5", "200/5", "400/5", "600/5", "800/5", "1000/5", "1200/5", "1600/5", "2000/5",
];

const PT_RATIOS: &[&str] = &["33000/110", "13800/110", "11000/110"];

const GENERIC_MODELS: &[&str] = &["Generic Model"];

const RELAY_TYPES: [RelayType; 3] = [RelayType::Overcurrent, RelayType::Differential, RelayType::Distance];

/// 继电器计算参数，未指定的字段由随机源补齐
#[derive(Debug, Clone, Default)]
pub struct RelayTestParams {
    pub relay_type: Option<RelayType>,
    pub manufacturer: Option<String>,
    pub ct_ratio: Option<String>,
    pub curve: Option<IecCurve>,
}

/// IEC 反时限动作时间（s）
///
/// 故障电流倍数必须大于 1，时间整定必须为正
pub fn iec_trip_time(time_dial: f64, multiple: f64, curve: IecCurve) -> AppResult<f64> {
    if !time_dial.is_finite() || time_dial <= 0.0 {
        return Err(AppError::validation_error(format!("时间整定值无效: {}", time_dial)));
    }
    if !multiple.is_finite() || multiple <= 1.0 {
        return Err(AppError::validation_error(format!(
            "故障电流倍数必须大于1: {}",
            multiple
        )));
    }
    let (k, alpha) = curve.constants();
    let time = time_dial * k / (multiple.powf(alpha) - 1.0);
    Ok(round_to(time, 2))
}

/// CT 变比的一次侧电流，例如 `"400/5"` 得到 400
fn ct_primary(ct_ratio: &str) -> AppResult<f64> {
    ct_ratio
        .split('/')
        .next()
        .and_then(|p| p.trim().parse::<f64>().ok())
        .filter(|p| p.is_finite() && *p > 0.0)
        .ok_or_else(|| AppError::validation_error(format!("CT变比格式无效: {}", ct_ratio)))
}

fn relay_functions(relay_type: RelayType) -> &'static [&'static str] {
    match relay_type {
        RelayType::Overcurrent => &[
            "50P Phase O/C",
            "51P Phase IDMT",
            "50N Earth O/C",
            "51N Earth IDMT",
            "50G Ground Inst",
        ],
        RelayType::Differential => &["87T Differential", "87G Generator Diff", "REF Restricted Earth"],
        RelayType::Distance => &["21 Zone 1", "21 Zone 2", "21 Zone 3", "67 Dir O/C", "67N Dir Earth"],
    }
}

fn generate_results<R: Rng + ?Sized>(
    relay_type: RelayType,
    rng: &mut R,
    profile: &SamplingProfile,
) -> Vec<TestResultEntry> {
    relay_functions(relay_type)
        .iter()
        .map(|func| {
            let unit = if func.contains("Zone") { "ohm" } else { "A" };
            let spec = EntrySpec::new(*func, unit, (0.5, 5.0))
                .decimals(3, 3)
                .tolerance(5.0, 4.5);
            sample_entry(rng, &spec, profile)
        })
        .collect()
}

fn overcurrent_element(pickup: f64, time_dial: f64, curve: IecCurve) -> AppResult<OvercurrentElement> {
    Ok(OvercurrentElement {
        pickup,
        time_dial,
        curve,
        trip_time: iec_trip_time(time_dial, TRIP_TIME_MULTIPLE, curve)?,
    })
}

/// 生成保护继电器测试数据
pub fn calculate<R: Rng + ?Sized>(
    params: &RelayTestParams,
    rng: &mut R,
    profile: &SamplingProfile,
) -> AppResult<ProtectionRelayTestData> {
    let relay_type = params.relay_type.unwrap_or_else(|| *pick(rng, &RELAY_TYPES));

    let (manufacturer, models) = match &params.manufacturer {
        Some(name) => {
            let models = RELAY_CATALOG
                .iter()
                .find(|(m, _)| *m == name.as_str())
                .map(|(_, models)| *models)
                .unwrap_or(GENERIC_MODELS);
            (name.clone(), models)
        }
        None => {
            let (name, models) = pick(rng, RELAY_CATALOG);
            (name.to_string(), *models)
        }
    };
    let model = pick(rng, models).to_string();

    let ct_ratio = match &params.ct_ratio {
        Some(ratio) => ratio.clone(),
        None => pick(rng, CT_RATIOS).to_string(),
    };
    let nominal_current = ct_primary(&ct_ratio)?;

    let base_pickup = float_in(rng, 0.5, 1.5, 2);
    let time_dial = float_in(rng, 0.1, 0.8, 2);
    let curve = params.curve.unwrap_or_else(|| *pick(rng, &IecCurve::ALL));

    let mut data = ProtectionRelayTestData {
        relay_type,
        manufacturer,
        model,
        ct_ratio,
        pt_ratio: None,
        overcurrent: None,
        differential: None,
        test_results: Vec::new(),
    };

    match relay_type {
        RelayType::Overcurrent => {
            let earth_dial = round_to(time_dial * 0.8, 3);
            data.overcurrent = Some(OvercurrentSettings {
                phase: overcurrent_element((base_pickup * nominal_current).round(), time_dial, curve)?,
                earth: overcurrent_element(
                    (base_pickup * nominal_current * 0.2).round(),
                    earth_dial,
                    curve,
                )?,
                instantaneous: Some(InstantaneousElement {
                    pickup: (base_pickup * nominal_current * 10.0).round(),
                    operating_time: rng.gen_range(30..=80) as f64,
                }),
            });
        }
        RelayType::Differential => {
            data.differential = Some(DifferentialSettings {
                operate_point: float_in(rng, 15.0, 30.0, 1),
                restraint_slope: float_in(rng, 25.0, 50.0, 1),
                high_set_point: float_in(rng, 100.0, 200.0, 0),
            });
        }
        RelayType::Distance => {
            data.pt_ratio = Some(pick(rng, PT_RATIOS).to_string());
        }
    }

    data.test_results = generate_results(relay_type, rng, profile);
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_standard_inverse_trip_time() {
        // 0.1 × 0.14 / (3^0.02 - 1) = 0.6302
        let t = iec_trip_time(0.1, 3.0, IecCurve::StandardInverse).unwrap();
        assert_eq!(t, 0.63);
        // TD=1 时为标准的 6.30 s
        assert_eq!(iec_trip_time(1.0, 3.0, IecCurve::StandardInverse).unwrap(), 6.3);
    }

    #[test]
    fn test_other_curves() {
        assert_eq!(iec_trip_time(0.5, 3.0, IecCurve::VeryInverse).unwrap(), 3.38);
        assert_eq!(iec_trip_time(0.5, 3.0, IecCurve::ExtremelyInverse).unwrap(), 5.0);
        assert_eq!(iec_trip_time(0.1, 3.0, IecCurve::LongTimeInverse).unwrap(), 6.0);
    }

    #[test]
    fn test_trip_time_rejects_invalid_multiple() {
        assert!(iec_trip_time(0.1, 1.0, IecCurve::StandardInverse).is_err());
        assert!(iec_trip_time(0.1, 0.5, IecCurve::VeryInverse).is_err());
        assert!(iec_trip_time(0.0, 3.0, IecCurve::VeryInverse).is_err());
        assert!(iec_trip_time(f64::NAN, 3.0, IecCurve::VeryInverse).is_err());
    }

    #[test]
    fn test_ct_primary_parsing() {
        assert_eq!(ct_primary("400/5").unwrap(), 400.0);
        assert!(ct_primary("abc").is_err());
        assert!(ct_primary("0/5").is_err());
    }

    #[test]
    fn test_overcurrent_settings_follow_curve() {
        let mut rng = StdRng::seed_from_u64(1);
        let params = RelayTestParams {
            relay_type: Some(RelayType::Overcurrent),
            ct_ratio: Some("400/5".to_string()),
            curve: Some(IecCurve::StandardInverse),
            ..Default::default()
        };
        let data = calculate(&params, &mut rng, &SamplingProfile::nominal()).unwrap();
        let oc = data.overcurrent.expect("过流继电器必须有过流整定");
        assert_eq!(
            oc.phase.trip_time,
            iec_trip_time(oc.phase.time_dial, TRIP_TIME_MULTIPLE, IecCurve::StandardInverse).unwrap()
        );
        assert!(oc.phase.pickup >= 200.0 && oc.phase.pickup <= 600.0);
        assert!(oc.earth.pickup < oc.phase.pickup);
        assert!(data.differential.is_none());
        assert_eq!(data.test_results.len(), 5);
    }

    #[test]
    fn test_distance_relay_has_pt_ratio_and_ohm_units() {
        let mut rng = StdRng::seed_from_u64(2);
        let params = RelayTestParams {
            relay_type: Some(RelayType::Distance),
            ..Default::default()
        };
        let data = calculate(&params, &mut rng, &SamplingProfile::nominal()).unwrap();
        assert!(data.pt_ratio.is_some());
        assert!(data.overcurrent.is_none());
        assert_eq!(data.test_results[0].unit, "ohm");
        assert_eq!(data.test_results[3].unit, "A");
    }

    #[test]
    fn test_invalid_ct_ratio_is_rejected() {
        let mut rng = StdRng::seed_from_u64(3);
        let params = RelayTestParams {
            ct_ratio: Some("n/a".to_string()),
            ..Default::default()
        };
        assert!(calculate(&params, &mut rng, &SamplingProfile::nominal()).is_err());
    }
}
