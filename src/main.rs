// tc-report 命令行入口：按种子生成合成 T&C 报告并导出 PDF / DOCX

use std::path::PathBuf;

use anyhow::Context;
use chrono::Utc;
use clap::Parser;

use tc_report_lib::logging::init_logging;
use tc_report_lib::utils::config::ConfigManager;
use tc_report_lib::utils::time_utils::format_site;
use tc_report_lib::{
    DocumentFormat, GeneratorOptions, IReportExportService, ReportExportService, ReportType,
    SyntheticReportGenerator, VoltageLevel,
};

/// 生成合成 T&C 报告并导出
#[derive(Parser, Debug)]
#[command(name = "tc-report", version, about = "Generate synthetic T&C reports and render them to PDF/DOCX")]
struct Cli {
    /// 随机种子；同一种子生成相同的报告
    #[arg(long)]
    seed: Option<u64>,

    /// 生成数量
    #[arg(short = 'n', long)]
    count: Option<usize>,

    /// 报告分类：protection-relay | transformer | switchgear | cable | grounding
    #[arg(long = "type", value_parser = parse_report_type)]
    report_type: Option<ReportType>,

    /// 电压等级：33 | 13.8
    #[arg(long)]
    voltage: Option<VoltageLevel>,

    /// 每条测试结果越限的概率 (0..=1)
    #[arg(long)]
    fault_rate: Option<f64>,

    /// 导出目录
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// 输出格式，逗号分隔：pdf,docx
    #[arg(long, value_delimiter = ',')]
    formats: Vec<DocumentFormat>,

    /// 同时写出报告 JSON
    #[arg(long)]
    json: bool,

    /// 配置文件路径
    #[arg(long, default_value = "config/tc_report.json")]
    config: PathBuf,
}

fn parse_report_type(value: &str) -> Result<ReportType, String> {
    value.trim().to_uppercase().replace('-', "_").parse()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut manager = ConfigManager::new(cli.config.clone());
    manager
        .load_from_file()
        .await
        .with_context(|| format!("加载配置失败: {}", cli.config.display()))?;
    manager.override_from_env();

    {
        let config = manager.get_config_mut();
        if let Some(seed) = cli.seed {
            config.generator_config.seed = Some(seed);
        }
        if let Some(count) = cli.count {
            config.generator_config.batch_size = count;
        }
        if let Some(report_type) = cli.report_type {
            config.generator_config.report_type = Some(report_type);
        }
        if let Some(voltage) = cli.voltage {
            config.generator_config.voltage_level = Some(voltage);
        }
        if let Some(rate) = cli.fault_rate {
            config.generator_config.fault_rate = rate;
        }
        if let Some(output) = &cli.output {
            config.export_config.export_dir = output.clone();
        }
        if !cli.formats.is_empty() {
            config.render_config.formats = cli.formats.clone();
        }
    }
    manager.validate_config()?;
    let config = manager.get_config().clone();

    init_logging(config.logging_config.to_logger_config()?)?;

    let now = Utc::now();
    let seed = config
        .generator_config
        .seed
        .unwrap_or_else(|| now.timestamp_millis().unsigned_abs());
    log::info!(
        "生成 {} 份报告, 种子={}, 现场时间 {}",
        config.generator_config.batch_size,
        seed,
        format_site(now, "%Y-%m-%d %H:%M")
    );

    let mut options = GeneratorOptions::at(now).with_profile(config.generator_config.sampling_profile()?);
    if let Some(report_type) = config.generator_config.report_type {
        options = options.with_report_type(report_type);
    }
    if let Some(voltage) = config.generator_config.voltage_level {
        options = options.with_voltage_level(voltage);
    }

    let mut generator = SyntheticReportGenerator::from_seed(seed);
    let generated = generator.generate_batch(config.generator_config.batch_size, &options)?;

    let service = ReportExportService::from_config(&config);
    for item in &generated {
        let report = &item.report;
        tc_report_lib::log_user_operation!(
            "生成报告 {} ({}), 结果 {}/{} 通过",
            report.report_number(),
            report.report_type,
            item.summary.passed,
            item.summary.total_tests
        );

        let exported = service.export_all(report).await?;
        if cli.json {
            let path = service
                .export_dir()
                .join(format!("{}.json", report.report_number()));
            let json = serde_json::to_string_pretty(report)?;
            tokio::fs::write(&path, json)
                .await
                .with_context(|| format!("写入报告JSON失败: {}", path.display()))?;
        }

        println!(
            "{}  {:<22} {:>3}/{:<3} {:>6.1}%  {}",
            report.report_number(),
            report.report_type.label(),
            item.summary.passed,
            item.summary.total_tests,
            item.summary.pass_rate,
            item.summary.overall_result
        );
        for file in exported {
            println!("    {} -> {} ({} bytes)", file.format, file.file_path.display(), file.file_size);
        }
    }

    Ok(())
}
