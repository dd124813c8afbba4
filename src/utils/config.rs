use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::domain::services::SamplingProfile;
use crate::infrastructure::render::DocumentFormat;
use crate::logging::{LogFormat, LogLevel, LogTarget, LoggerConfig};
use crate::models::{ReportType, VoltageLevel};
use crate::utils::error::{AppError, AppResult};

/// 应用程序主配置结构
/// 包含报告引擎运行所需的所有配置信息
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// 应用程序基本设置
    pub app_settings: AppSettings,
    /// 渲染配置
    #[serde(default)]
    pub render_config: RenderConfig,
    /// 合成报告生成配置
    #[serde(default)]
    pub generator_config: GeneratorConfig,
    /// 日志配置
    #[serde(default)]
    pub logging_config: LoggingConfig,
    /// 导出配置
    #[serde(default)]
    pub export_config: ExportConfig,
}

/// 应用程序基本设置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppSettings {
    /// 应用程序名称
    pub app_name: String,
    /// 应用程序版本
    pub app_version: String,
    /// 运行环境 (development, testing, production)
    pub environment: String,
    /// 是否启用调试模式
    pub debug_mode: bool,
}

/// 渲染配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderConfig {
    /// 默认输出格式
    pub formats: Vec<DocumentFormat>,
    /// 同一报告的多个格式是否并行渲染
    pub render_concurrently: bool,
}

/// 合成报告生成配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// 随机种子；为空时使用当前时间
    pub seed: Option<u64>,
    /// 每条测试结果注入越限的概率 (0..=1)
    pub fault_rate: f64,
    /// 固定报告分类；为空时随机
    pub report_type: Option<ReportType>,
    /// 固定电压等级；为空时随机
    pub voltage_level: Option<VoltageLevel>,
    /// 每批生成的报告数量
    pub batch_size: usize,
}

/// 日志配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// 日志级别 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 日志文件路径
    pub log_file_path: Option<PathBuf>,
    /// 是否启用控制台输出
    pub console_output: bool,
    /// 是否启用文件输出
    pub file_output: bool,
    /// 文件日志是否使用 JSON 行格式
    pub json_format: bool,
}

/// 导出配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportConfig {
    /// 导出目录
    pub export_dir: PathBuf,
    /// 同名文件是否覆盖
    pub overwrite_existing: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            app_name: "tc-report-engine".to_string(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            environment: "development".to_string(),
            debug_mode: false,
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            formats: DocumentFormat::ALL.to_vec(),
            render_concurrently: true,
        }
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            seed: None,
            fault_rate: 0.0,
            report_type: None,
            voltage_level: None,
            batch_size: 5,
        }
    }
}

impl GeneratorConfig {
    /// 生成用的采样配置
    pub fn sampling_profile(&self) -> AppResult<SamplingProfile> {
        SamplingProfile::with_fault_rate(self.fault_rate)
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_file_path: Some(PathBuf::from("logs/tc-report.log")),
            console_output: true,
            file_output: false,
            json_format: false,
        }
    }
}

impl LoggingConfig {
    /// 转换为日志器配置
    pub fn to_logger_config(&self) -> AppResult<LoggerConfig> {
        let level: LogLevel = self
            .log_level
            .parse()
            .map_err(|e: String| AppError::configuration_error(e))?;

        let mut targets = Vec::new();
        if self.console_output {
            targets.push(LogTarget::Console);
        }
        if self.file_output {
            let path = self
                .log_file_path
                .clone()
                .ok_or_else(|| AppError::configuration_error("启用文件日志时必须配置日志文件路径"))?;
            targets.push(LogTarget::File { path });
        }

        Ok(LoggerConfig {
            level,
            targets,
            format: if self.json_format { LogFormat::Json } else { LogFormat::Plain },
        })
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            export_dir: PathBuf::from("exports"),
            overwrite_existing: true,
        }
    }
}

/// 配置管理器
/// 负责加载、保存和管理应用程序配置
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config: AppConfig,
    config_file_path: PathBuf,
}

impl ConfigManager {
    /// 创建新的配置管理器
    pub fn new(config_file_path: PathBuf) -> Self {
        Self {
            config: AppConfig::default(),
            config_file_path,
        }
    }

    /// 从文件加载配置
    pub async fn load_from_file(&mut self) -> AppResult<()> {
        if !self.config_file_path.exists() {
            // 如果配置文件不存在，创建默认配置文件
            self.save_to_file().await?;
            return Ok(());
        }

        let content = tokio::fs::read_to_string(&self.config_file_path)
            .await
            .map_err(|e| AppError::io_error(format!("读取配置文件失败: {}", e), e.kind().to_string()))?;

        self.config = serde_json::from_str(&content)
            .map_err(|e| AppError::configuration_error(format!("解析配置文件失败: {}", e)))?;

        Ok(())
    }

    /// 将配置保存到文件
    pub async fn save_to_file(&self) -> AppResult<()> {
        // 确保目录存在
        if let Some(parent) = self.config_file_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::io_error(format!("创建配置目录失败: {}", e), e.kind().to_string()))?;
        }

        let content = serde_json::to_string_pretty(&self.config)
            .map_err(|e| AppError::json_error(format!("序列化配置失败: {}", e)))?;

        tokio::fs::write(&self.config_file_path, content)
            .await
            .map_err(|e| AppError::io_error(format!("写入配置文件失败: {}", e), e.kind().to_string()))?;

        Ok(())
    }

    /// 从环境变量覆盖配置
    pub fn override_from_env(&mut self) {
        self.override_from_vars(|key| std::env::var(key).ok());
    }

    /// 从任意键值来源覆盖配置，无法解析的值忽略并记录警告
    pub fn override_from_vars<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        // 应用程序设置
        if let Some(env) = lookup("APP_ENVIRONMENT") {
            self.config.app_settings.environment = env;
        }
        if let Some(debug) = lookup("DEBUG_MODE") {
            self.config.app_settings.debug_mode = debug.to_lowercase() == "true";
        }
        if let Some(log_level) = lookup("LOG_LEVEL") {
            self.config.logging_config.log_level = log_level.to_lowercase();
        }

        // 生成配置
        if let Some(seed) = lookup("TC_SEED") {
            match seed.trim().parse::<u64>() {
                Ok(seed) => self.config.generator_config.seed = Some(seed),
                Err(_) => crate::log_config_warning!("忽略无效的 TC_SEED: {}", seed),
            }
        }
        if let Some(rate) = lookup("TC_FAULT_RATE") {
            match rate.trim().parse::<f64>() {
                Ok(rate) => self.config.generator_config.fault_rate = rate,
                Err(_) => crate::log_config_warning!("忽略无效的 TC_FAULT_RATE: {}", rate),
            }
        }

        // 导出目录
        if let Some(dir) = lookup("TC_EXPORT_DIR") {
            self.config.export_config.export_dir = PathBuf::from(dir);
        }
    }

    /// 获取配置的只读引用
    pub fn get_config(&self) -> &AppConfig {
        &self.config
    }

    /// 获取配置的可变引用
    pub fn get_config_mut(&mut self) -> &mut AppConfig {
        &mut self.config
    }

    /// 验证配置的有效性
    pub fn validate_config(&self) -> AppResult<()> {
        // 验证环境配置
        let valid_environments = ["development", "testing", "production"];
        if !valid_environments.contains(&self.config.app_settings.environment.as_str()) {
            return Err(AppError::configuration_error(format!(
                "无效的环境配置: {}，有效值: {:?}",
                self.config.app_settings.environment, valid_environments
            )));
        }

        // 验证日志级别
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&self.config.logging_config.log_level.as_str()) {
            return Err(AppError::configuration_error(format!(
                "无效的日志级别: {}，有效值: {:?}",
                self.config.logging_config.log_level, valid_log_levels
            )));
        }

        // 验证生成配置
        let generator = &self.config.generator_config;
        if !(0.0..=1.0).contains(&generator.fault_rate) {
            return Err(AppError::configuration_error(format!(
                "故障注入概率必须在0到1之间: {}",
                generator.fault_rate
            )));
        }
        if generator.batch_size == 0 {
            return Err(AppError::configuration_error("每批生成数量不能为0"));
        }

        // 验证渲染与导出
        if self.config.render_config.formats.is_empty() {
            return Err(AppError::configuration_error("至少需要配置一种输出格式"));
        }
        if self.config.export_config.export_dir.as_os_str().is_empty() {
            return Err(AppError::configuration_error("导出目录不能为空"));
        }

        Ok(())
    }

    /// 重置为默认配置
    pub fn reset_to_default(&mut self) {
        self.config = AppConfig::default();
    }
}

/// 全局配置管理器实例
use std::sync::Mutex;
use std::sync::OnceLock;

static GLOBAL_CONFIG: OnceLock<Mutex<ConfigManager>> = OnceLock::new();

/// 初始化全局配置管理器
pub async fn init_global_config(config_path: Option<PathBuf>) -> AppResult<()> {
    let config_path = config_path.unwrap_or_else(|| PathBuf::from("config/tc_report.json"));
    let mut config_manager = ConfigManager::new(config_path);

    // 从文件加载配置
    config_manager.load_from_file().await?;

    // 从环境变量覆盖配置
    config_manager.override_from_env();

    // 验证配置
    config_manager.validate_config()?;

    // 设置全局配置
    GLOBAL_CONFIG
        .set(Mutex::new(config_manager))
        .map_err(|_| AppError::configuration_error("全局配置已经初始化"))?;

    Ok(())
}

/// 获取全局配置的只读访问
pub fn get_global_config() -> AppResult<AppConfig> {
    let config_manager = GLOBAL_CONFIG
        .get()
        .ok_or_else(|| AppError::configuration_error("全局配置未初始化"))?
        .lock()
        .map_err(|_| AppError::concurrency_error("获取全局配置锁失败"))?;

    Ok(config_manager.get_config().clone())
}

/// 更新全局配置
pub async fn update_global_config<F>(updater: F) -> AppResult<()>
where
    F: FnOnce(&mut AppConfig),
{
    let config_manager = GLOBAL_CONFIG
        .get()
        .ok_or_else(|| AppError::configuration_error("全局配置未初始化"))?;

    // 锁只在同步段内持有，保存文件前释放
    let snapshot = {
        let mut manager = config_manager
            .lock()
            .map_err(|_| AppError::concurrency_error("获取全局配置锁失败"))?;

        let mut candidate = manager.clone();
        updater(candidate.get_config_mut());
        candidate.validate_config()?;
        *manager = candidate.clone();
        candidate
    };

    snapshot.save_to_file().await
}
