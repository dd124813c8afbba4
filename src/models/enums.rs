//! # 模型枚举类型模块
//!
//! ## 业务作用
//! 本模块定义了 T&C 报告中使用的各种枚举类型，包括：
//! - **报告分类**: 五类设备测试报告
//! - **报告状态**: DRAFT → PENDING_REVIEW → APPROVED | REJECTED
//! - **电压等级**: 33 kV / 13.8 kV 两级
//! - **判定结果**: PASS / FAIL
//! - **设备相关枚举**: IEC 曲线、继电器类型、断路器类型、接地系统等
//!
//! ## 设计原则
//! - **类型安全**: 使用强类型枚举避免魔法字符串
//! - **序列化支持**: 序列化形态与持久化层的 JSON 保持一致
//! - **字符串转换**: 提供 Display / FromStr 双向转换

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// 报告分类（设备类别）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportType {
    /// 保护继电器
    ProtectionRelay,
    /// 变压器
    Transformer,
    /// 开关柜/断路器
    Switchgear,
    /// 电缆
    Cable,
    /// 接地系统
    Grounding,
}

impl ReportType {
    /// 全部报告分类，顺序固定
    pub const ALL: [ReportType; 5] = [
        ReportType::ProtectionRelay,
        ReportType::Transformer,
        ReportType::Switchgear,
        ReportType::Cable,
        ReportType::Grounding,
    ];

    /// 页眉中显示的报告类型名称
    pub fn label(&self) -> &'static str {
        match self {
            ReportType::ProtectionRelay => "Protection Relay Test",
            ReportType::Transformer => "Transformer Test",
            ReportType::Switchgear => "Switchgear Test",
            ReportType::Cable => "Cable Test",
            ReportType::Grounding => "Grounding Test",
        }
    }

    /// 测试数据章节标题，例如 `CABLE TEST DATA`
    pub fn section_title(&self) -> &'static str {
        match self {
            ReportType::ProtectionRelay => "PROTECTION RELAY TEST DATA",
            ReportType::Transformer => "TRANSFORMER TEST DATA",
            ReportType::Switchgear => "SWITCHGEAR TEST DATA",
            ReportType::Cable => "CABLE TEST DATA",
            ReportType::Grounding => "GROUNDING TEST DATA",
        }
    }

    /// 报告编号前缀
    pub fn number_prefix(&self) -> &'static str {
        match self {
            ReportType::ProtectionRelay => "PR",
            ReportType::Transformer => "TR",
            ReportType::Switchgear => "SW",
            ReportType::Cable => "CB",
            ReportType::Grounding => "GR",
        }
    }
}

impl Display for ReportType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ReportType::ProtectionRelay => "PROTECTION_RELAY",
            ReportType::Transformer => "TRANSFORMER",
            ReportType::Switchgear => "SWITCHGEAR",
            ReportType::Cable => "CABLE",
            ReportType::Grounding => "GROUNDING",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for ReportType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PROTECTION_RELAY" => Ok(ReportType::ProtectionRelay),
            "TRANSFORMER" => Ok(ReportType::Transformer),
            "SWITCHGEAR" => Ok(ReportType::Switchgear),
            "CABLE" => Ok(ReportType::Cable),
            "GROUNDING" => Ok(ReportType::Grounding),
            _ => Err(format!("Invalid ReportType: {}", s)),
        }
    }
}

/// 报告生命周期状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportStatus {
    /// 草稿
    Draft,
    /// 待审核
    PendingReview,
    /// 已批准
    Approved,
    /// 已驳回
    Rejected,
}

impl Default for ReportStatus {
    fn default() -> Self {
        Self::Draft
    }
}

impl ReportStatus {
    /// 界面显示名称
    pub fn label(&self) -> &'static str {
        match self {
            ReportStatus::Draft => "Draft",
            ReportStatus::PendingReview => "Pending Review",
            ReportStatus::Approved => "Approved",
            ReportStatus::Rejected => "Rejected",
        }
    }

    /// 生命周期是否允许从当前状态进入 `next`
    ///
    /// 只有 REJECTED 可以回到 DRAFT，其余转换都是单向的
    pub fn can_transition_to(&self, next: ReportStatus) -> bool {
        matches!(
            (self, next),
            (ReportStatus::Draft, ReportStatus::PendingReview)
                | (ReportStatus::PendingReview, ReportStatus::Approved)
                | (ReportStatus::PendingReview, ReportStatus::Rejected)
                | (ReportStatus::Rejected, ReportStatus::Draft)
        )
    }
}

impl Display for ReportStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ReportStatus::Draft => "DRAFT",
            ReportStatus::PendingReview => "PENDING_REVIEW",
            ReportStatus::Approved => "APPROVED",
            ReportStatus::Rejected => "REJECTED",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for ReportStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DRAFT" => Ok(ReportStatus::Draft),
            "PENDING_REVIEW" => Ok(ReportStatus::PendingReview),
            "APPROVED" => Ok(ReportStatus::Approved),
            "REJECTED" => Ok(ReportStatus::Rejected),
            _ => Err(format!("Invalid ReportStatus: {}", s)),
        }
    }
}

/// 变电站电压等级
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VoltageLevel {
    /// 33 kV
    #[serde(rename = "KV_33")]
    Kv33,
    /// 13.8 kV
    #[serde(rename = "KV_13_8")]
    Kv13_8,
}

impl Default for VoltageLevel {
    fn default() -> Self {
        Self::Kv33
    }
}

impl VoltageLevel {
    /// 显示名称
    pub fn label(&self) -> &'static str {
        match self {
            VoltageLevel::Kv33 => "33 kV",
            VoltageLevel::Kv13_8 => "13.8 kV",
        }
    }

    /// 额定电压（V）
    pub fn volts(&self) -> u32 {
        match self {
            VoltageLevel::Kv33 => 33_000,
            VoltageLevel::Kv13_8 => 13_800,
        }
    }

    /// 额定电压（kV）
    pub fn kilovolts(&self) -> f64 {
        self.volts() as f64 / 1000.0
    }

    /// 绝缘电阻测试直流电压（V）
    pub fn insulation_test_voltage(&self) -> u32 {
        match self {
            VoltageLevel::Kv33 => 5000,
            VoltageLevel::Kv13_8 => 2500,
        }
    }
}

impl Display for VoltageLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for VoltageLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "KV_33" | "33" | "33kV" | "33 kV" => Ok(VoltageLevel::Kv33),
            "KV_13_8" | "13.8" | "13.8kV" | "13.8 kV" => Ok(VoltageLevel::Kv13_8),
            _ => Err(format!("Invalid VoltageLevel: {}", s)),
        }
    }
}

/// 单项测试判定
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TestVerdict {
    Pass,
    Fail,
}

impl TestVerdict {
    pub fn from_pass(passed: bool) -> Self {
        if passed { TestVerdict::Pass } else { TestVerdict::Fail }
    }

    pub fn is_pass(&self) -> bool {
        matches!(self, TestVerdict::Pass)
    }
}

impl Display for TestVerdict {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TestVerdict::Pass => write!(f, "PASS"),
            TestVerdict::Fail => write!(f, "FAIL"),
        }
    }
}

/// 偏差的计算基准
///
/// 设定值为 0 时百分比偏差无定义，此时退化为绝对差值
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeviationBasis {
    /// 相对设定值的百分比
    Percent,
    /// 测量值与设定值的绝对差（单位同测量值）
    Absolute,
}

impl Default for DeviationBasis {
    fn default() -> Self {
        Self::Percent
    }
}

/// IEC 60255-151 反时限曲线
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IecCurve {
    #[serde(rename = "Standard Inverse")]
    StandardInverse,
    #[serde(rename = "Very Inverse")]
    VeryInverse,
    #[serde(rename = "Extremely Inverse")]
    ExtremelyInverse,
    #[serde(rename = "Long Time Inverse")]
    LongTimeInverse,
}

impl IecCurve {
    pub const ALL: [IecCurve; 4] = [
        IecCurve::StandardInverse,
        IecCurve::VeryInverse,
        IecCurve::ExtremelyInverse,
        IecCurve::LongTimeInverse,
    ];

    /// 曲线常数 `(k, alpha)`
    pub fn constants(&self) -> (f64, f64) {
        match self {
            IecCurve::StandardInverse => (0.14, 0.02),
            IecCurve::VeryInverse => (13.5, 1.0),
            IecCurve::ExtremelyInverse => (80.0, 2.0),
            IecCurve::LongTimeInverse => (120.0, 1.0),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            IecCurve::StandardInverse => "Standard Inverse",
            IecCurve::VeryInverse => "Very Inverse",
            IecCurve::ExtremelyInverse => "Extremely Inverse",
            IecCurve::LongTimeInverse => "Long Time Inverse",
        }
    }
}

impl Display for IecCurve {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// 继电器类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelayType {
    Overcurrent,
    Differential,
    Distance,
}

impl Display for RelayType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RelayType::Overcurrent => "OVERCURRENT",
            RelayType::Differential => "DIFFERENTIAL",
            RelayType::Distance => "DISTANCE",
        };
        write!(f, "{}", s)
    }
}

/// 变压器类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransformerType {
    Power,
    Distribution,
}

impl Display for TransformerType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TransformerType::Power => write!(f, "POWER"),
            TransformerType::Distribution => write!(f, "DISTRIBUTION"),
        }
    }
}

/// 断路器灭弧介质
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BreakerType {
    #[serde(rename = "VACUUM")]
    Vacuum,
    #[serde(rename = "SF6")]
    Sf6,
}

impl BreakerType {
    pub fn label(&self) -> &'static str {
        match self {
            BreakerType::Vacuum => "Vacuum Circuit Breaker",
            BreakerType::Sf6 => "SF6 Circuit Breaker",
        }
    }
}

impl Display for BreakerType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            BreakerType::Vacuum => write!(f, "VACUUM"),
            BreakerType::Sf6 => write!(f, "SF6"),
        }
    }
}

/// 低压接地系统形式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroundingSystem {
    #[serde(rename = "TN-S")]
    TnS,
    #[serde(rename = "TN-C-S")]
    TnCS,
    #[serde(rename = "TT")]
    Tt,
    #[serde(rename = "IT")]
    It,
}

impl Display for GroundingSystem {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            GroundingSystem::TnS => "TN-S",
            GroundingSystem::TnCS => "TN-C-S",
            GroundingSystem::Tt => "TT",
            GroundingSystem::It => "IT",
        };
        write!(f, "{}", s)
    }
}

/// 接地电阻测量方法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EarthTestMethod {
    FallOfPotential,
    ClampOn,
    Stakeless,
}

impl Display for EarthTestMethod {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            EarthTestMethod::FallOfPotential => "FALL_OF_POTENTIAL",
            EarthTestMethod::ClampOn => "CLAMP_ON",
            EarthTestMethod::Stakeless => "STAKELESS",
        };
        write!(f, "{}", s)
    }
}

/// 变压器相别（R/Y/B）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    R,
    Y,
    B,
}

impl Display for Phase {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::R => write!(f, "R"),
            Phase::Y => write!(f, "Y"),
            Phase::B => write!(f, "B"),
        }
    }
}
