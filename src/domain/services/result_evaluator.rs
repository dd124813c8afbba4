//! 测试结果判定器
//!
//! 根据设定值、测量值与容差计算偏差并给出 PASS/FAIL。
//! 纯函数，对任意有限输入都有定义：
//! - 设定值非 0：偏差 = (测量值 - 设定值) / 设定值 × 100，按精度等级四舍五入
//! - 设定值为 0：百分比无定义，退化为绝对差值，容差按测量单位解释
//! - 非有限输入：判定为 FAIL，偏差记为 0，绝不把 NaN/Infinity 带进文档

use crate::models::{DeviationBasis, TestResultEntry, TestResultsSummary, TestVerdict};

/// 偏差的舍入精度等级
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precision {
    /// 电阻类（mOhm 等），3 位小数
    Resistance,
    /// 时间类（ms），1 位小数
    Timing,
    /// 百分比类，2 位小数
    Percentage,
    /// 自定义小数位
    Decimals(u32),
}

impl Precision {
    pub fn decimals(&self) -> u32 {
        match self {
            Precision::Resistance => 3,
            Precision::Timing => 1,
            Precision::Percentage => 2,
            Precision::Decimals(d) => *d,
        }
    }
}

/// 单次判定结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    pub deviation: f64,
    pub basis: DeviationBasis,
    pub result: TestVerdict,
}

/// 四舍五入到指定小数位，并把 -0.0 规整为 0.0
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    let rounded = (value * factor).round() / factor;
    if rounded == 0.0 { 0.0 } else { rounded }
}

/// 按百分比精度判定
///
/// `tolerance_fraction` 为小数形式的容差，0.05 表示 ±5%
pub fn evaluate(setting_value: f64, measured_value: f64, tolerance_fraction: f64) -> Evaluation {
    evaluate_with_precision(setting_value, measured_value, tolerance_fraction, Precision::Percentage)
}

/// 按指定精度判定
pub fn evaluate_with_precision(
    setting_value: f64,
    measured_value: f64,
    tolerance_fraction: f64,
    precision: Precision,
) -> Evaluation {
    if !setting_value.is_finite() || !measured_value.is_finite() || !tolerance_fraction.is_finite() {
        return non_finite(DeviationBasis::Percent);
    }

    let tolerance_percent = tolerance_percent(tolerance_fraction);
    let decimals = precision.decimals();

    let (deviation, basis) = if setting_value == 0.0 {
        (round_to(measured_value - setting_value, decimals), DeviationBasis::Absolute)
    } else {
        let raw = (measured_value - setting_value) / setting_value * 100.0;
        (round_to(raw, decimals), DeviationBasis::Percent)
    };

    // 极端量级下比值可能溢出
    if !deviation.is_finite() {
        return non_finite(basis);
    }

    Evaluation {
        deviation,
        basis,
        result: TestVerdict::from_pass(deviation.abs() <= tolerance_percent),
    }
}

fn non_finite(basis: DeviationBasis) -> Evaluation {
    Evaluation {
        deviation: 0.0,
        basis,
        result: TestVerdict::Fail,
    }
}

/// 容差小数转百分比，去掉 0.07*100 这类浮点噪声
fn tolerance_percent(tolerance_fraction: f64) -> f64 {
    round_to(tolerance_fraction.abs() * 100.0, 6)
}

/// 判定并生成一条结果记录
///
/// `tolerance_percent` 以百分比给出（例如 5.0），与结果表中的 `Tol %` 列一致
pub fn build_entry(
    test_name: impl Into<String>,
    unit: impl Into<String>,
    setting_value: f64,
    measured_value: f64,
    tolerance_percent: f64,
    precision: Precision,
) -> TestResultEntry {
    let evaluation =
        evaluate_with_precision(setting_value, measured_value, tolerance_percent / 100.0, precision);
    TestResultEntry {
        test_name: test_name.into(),
        setting_value,
        measured_value,
        unit: unit.into(),
        tolerance: tolerance_percent,
        deviation: evaluation.deviation,
        deviation_basis: evaluation.basis,
        result: evaluation.result,
    }
}

/// 存储偏差与重算偏差允许的差值：最粗的精度等级（1 位小数）的半个单位
const DEVIATION_ROUNDING: f64 = 0.05 + 1e-9;

/// 结果记录内部是否自洽
///
/// 偏差必须与设定值、测量值重算的结果一致（允许舍入误差），
/// 判定结果必须与偏差、容差一致
pub fn is_entry_consistent(entry: &TestResultEntry) -> bool {
    if !entry.deviation.is_finite() || !entry.tolerance.is_finite() {
        return false;
    }
    let recomputed = evaluate_with_precision(
        entry.setting_value,
        entry.measured_value,
        entry.tolerance / 100.0,
        Precision::Decimals(9),
    );
    if (recomputed.deviation - entry.deviation).abs() > DEVIATION_ROUNDING {
        return false;
    }
    let expected = TestVerdict::from_pass(entry.deviation.abs() <= round_to(entry.tolerance.abs(), 6));
    expected == entry.result
}

/// 汇总结果表
///
/// 任意一项 FAIL 即整体 FAIL；空表的通过率为 0
pub fn summarize(results: &[TestResultEntry]) -> TestResultsSummary {
    let total_tests = results.len();
    let passed = results.iter().filter(|r| r.result.is_pass()).count();
    let failed = total_tests - passed;
    let pass_rate = if total_tests > 0 {
        (passed as f64 / total_tests as f64) * 100.0
    } else {
        0.0
    };

    TestResultsSummary {
        total_tests,
        passed,
        failed,
        pass_rate,
        overall_result: TestVerdict::from_pass(failed == 0),
    }
}
