/// 领域服务模块
///
/// 业务说明：
/// 本模块是报告引擎的核心，全部是同步、无副作用的纯计算：
/// 判定测试结果、按设备类别计算测试数据、生成合成报告、校验报告契约、推进报告生命周期。
/// 不读写文件、网络或数据库。
///
/// 模块组织原则：
/// - 每个服务一个独立模块文件
/// - 随机源一律由调用方注入

/// 测试结果判定器
///
/// 业务说明：根据设定值、测量值和容差计算偏差并判定 PASS/FAIL
/// 支持：精度等级、零设定值的绝对差值回退、结果汇总
pub mod result_evaluator;

/// 领域计算器
///
/// 业务说明：五类设备各一个计算器，生成带结构化子测量的测试数据
/// 支持：IEC 反时限曲线、导体电阻、绝缘温度折算、绕组电阻基准
pub mod calculators;

/// 合成报告生成器
///
/// 业务说明：基于种子随机源生成完整报告，用于演示和测试
pub mod synthetic_report_generator;

/// 报告校验器
///
/// 业务说明：表单到报告的构造步骤，以及渲染前的契约检查
pub mod report_validator;

/// 报告生命周期
///
/// 业务说明：修订号递增、状态转换、报告统计
pub mod report_lifecycle;

pub use calculators::SamplingProfile;
pub use report_lifecycle::{apply_form_edit, next_revision, transition, ReportStatistics};
pub use report_validator::ReportValidator;
pub use result_evaluator::{evaluate, evaluate_with_precision, summarize, Evaluation, Precision};
pub use synthetic_report_generator::{
    generate_report, GeneratedReport, GeneratorOptions, SyntheticReportGenerator,
};
