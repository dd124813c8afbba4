use crate::infrastructure::render::DocumentFormat;
use crate::logging::{LogFormat, LogLevel, LogTarget};
use crate::models::ReportType;
use crate::utils::config::{AppConfig, ConfigManager};
use crate::utils::error::{AppError, AppResult};
use std::collections::HashMap;
use std::path::PathBuf;
use tempfile::tempdir;

fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

/// 测试AppError的创建和错误代码
#[test]
fn test_app_error_creation() {
    let error = AppError::generic("测试错误");
    assert_eq!(error.error_code(), "GENERIC");
    assert!(error.to_string().contains("测试错误"));

    let contract = AppError::contract_violation("testData/reportType", "CABLE 报告携带了 GROUNDING 数据");
    assert_eq!(contract.error_code(), "CONTRACT_VIOLATION");
    assert!(contract.is_contract_violation());
    assert!(contract.to_string().contains("testData/reportType"));

    let io_error = AppError::io_error("文件读取失败", "Unknown");
    assert_eq!(io_error.error_code(), "IO_ERROR");
    assert!(!io_error.is_contract_violation());
}

/// 测试错误转换 (From trait)
#[test]
fn test_error_conversion() {
    let string_error: AppError = String::from("字符串错误").into();
    assert_eq!(string_error.error_code(), "GENERIC");

    let str_error: AppError = "字符串错误".into();
    assert_eq!(str_error.error_code(), "GENERIC");

    let json_error: Result<serde_json::Value, serde_json::Error> = serde_json::from_str("{invalid json}");
    match json_error {
        Err(e) => {
            let app_error: AppError = e.into();
            assert_eq!(app_error.error_code(), "JSON_ERROR");
        }
        Ok(_) => panic!("应该产生JSON错误"),
    }

    let io: AppError = std::io::Error::new(std::io::ErrorKind::NotFound, "missing").into();
    assert_eq!(io.error_code(), "IO_ERROR");
}

/// 测试渲染相关错误
#[test]
fn test_render_errors() {
    assert_eq!(AppError::pdf_error("字体加载失败").error_code(), "PDF_ERROR");
    assert_eq!(AppError::docx_error("打包失败").error_code(), "DOCX_ERROR");
    let error = AppError::state_transition_error("DRAFT", "APPROVED", "必须先提交审核");
    assert_eq!(error.error_code(), "STATE_TRANSITION_ERROR");
    assert!(error.to_string().contains("从 DRAFT 到 APPROVED"));
}

/// 测试应用配置的默认值
#[test]
fn test_app_config_defaults() {
    let config = AppConfig::default();

    assert_eq!(config.app_settings.app_name, "tc-report-engine");
    assert_eq!(config.app_settings.environment, "development");
    assert_eq!(config.render_config.formats, vec![DocumentFormat::Pdf, DocumentFormat::Docx]);
    assert_eq!(config.generator_config.fault_rate, 0.0);
    assert_eq!(config.generator_config.seed, None);
    assert_eq!(config.export_config.export_dir, PathBuf::from("exports"));
    assert_eq!(config.logging_config.log_level, "info");
    assert!(config.logging_config.console_output);
    assert!(!config.logging_config.file_output);
}

/// 测试配置序列化和反序列化
#[test]
fn test_config_serialization() {
    let mut config = AppConfig::default();
    config.generator_config.report_type = Some(ReportType::Cable);

    let json = serde_json::to_string_pretty(&config).unwrap();
    assert!(json.contains("tc-report-engine"));
    assert!(json.contains("\"CABLE\""));
    assert!(json.contains("\"docx\""));

    let deserialized: AppConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(deserialized, config);
}

/// 缺少的配置段使用默认值
#[test]
fn test_partial_config_file() {
    let json = r#"{
        "app_settings": {
            "app_name": "tc-report-engine",
            "app_version": "0.1.0",
            "environment": "testing",
            "debug_mode": true
        }
    }"#;
    let config: AppConfig = serde_json::from_str(json).unwrap();
    assert_eq!(config.app_settings.environment, "testing");
    assert_eq!(config.generator_config.batch_size, 5);
}

/// 测试配置管理器基本功能
#[tokio::test]
async fn test_config_manager_basic_operations() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config").join("tc_report.json");

    let mut manager = ConfigManager::new(config_path.clone());
    manager.get_config_mut().generator_config.seed = Some(42);
    manager.get_config_mut().export_config.export_dir = PathBuf::from("out/reports");

    manager.save_to_file().await.unwrap();
    assert!(config_path.exists());

    let mut new_manager = ConfigManager::new(config_path);
    new_manager.load_from_file().await.unwrap();

    assert_eq!(new_manager.get_config().generator_config.seed, Some(42));
    assert_eq!(new_manager.get_config().export_config.export_dir, PathBuf::from("out/reports"));
}

/// 配置文件不存在时写出默认配置
#[tokio::test]
async fn test_missing_config_file_is_created() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("tc_report.json");
    let mut manager = ConfigManager::new(config_path.clone());
    manager.load_from_file().await.unwrap();
    assert!(config_path.exists());
    assert_eq!(manager.get_config(), &AppConfig::default());
}

/// 测试配置验证
#[test]
fn test_config_validation() {
    let manager = ConfigManager::new(PathBuf::from("test_config.json"));
    assert!(manager.validate_config().is_ok());

    let mut manager = ConfigManager::new(PathBuf::from("test.json"));
    manager.get_config_mut().app_settings.environment = "invalid_env".to_string();
    assert!(manager.validate_config().is_err());

    manager.reset_to_default();
    manager.get_config_mut().generator_config.fault_rate = 1.5;
    assert!(manager.validate_config().is_err());

    manager.reset_to_default();
    manager.get_config_mut().render_config.formats.clear();
    assert!(manager.validate_config().is_err());

    manager.reset_to_default();
    manager.get_config_mut().logging_config.log_level = "verbose".to_string();
    let err = manager.validate_config().unwrap_err();
    assert_eq!(err.error_code(), "CONFIGURATION_ERROR");
}

/// 测试环境变量覆盖
#[test]
fn test_env_override() {
    let mut manager = ConfigManager::new(PathBuf::from("test.json"));
    manager.override_from_vars(vars(&[
        ("APP_ENVIRONMENT", "production"),
        ("LOG_LEVEL", "ERROR"),
        ("TC_SEED", "20241015"),
        ("TC_FAULT_RATE", "0.25"),
        ("TC_EXPORT_DIR", "/tmp/tc"),
    ]));

    let config = manager.get_config();
    assert_eq!(config.app_settings.environment, "production");
    assert_eq!(config.logging_config.log_level, "error");
    assert_eq!(config.generator_config.seed, Some(20241015));
    assert_eq!(config.generator_config.fault_rate, 0.25);
    assert_eq!(config.export_config.export_dir, PathBuf::from("/tmp/tc"));
    assert!(manager.validate_config().is_ok());
}

/// 无法解析的覆盖值被忽略
#[test]
fn test_env_override_ignores_garbage() {
    let mut manager = ConfigManager::new(PathBuf::from("test.json"));
    manager.override_from_vars(vars(&[("TC_SEED", "abc"), ("TC_FAULT_RATE", "lots")]));
    assert_eq!(manager.get_config().generator_config.seed, None);
    assert_eq!(manager.get_config().generator_config.fault_rate, 0.0);
}

/// 日志配置转换
#[test]
fn test_logging_config_conversion() {
    let mut config = AppConfig::default().logging_config;
    config.file_output = true;
    config.json_format = true;
    config.log_level = "debug".to_string();

    let logger = config.to_logger_config().unwrap();
    assert!(matches!(logger.level, LogLevel::Debug));
    assert_eq!(logger.targets.len(), 2);
    assert!(matches!(logger.targets[1], LogTarget::File { .. }));
    assert!(matches!(logger.format, LogFormat::Json));

    config.log_file_path = None;
    assert!(config.to_logger_config().is_err());
}

/// 生成配置转采样配置
#[test]
fn test_generator_profile() {
    let mut config = AppConfig::default().generator_config;
    config.fault_rate = 0.1;
    assert_eq!(config.sampling_profile().unwrap().fault_rate, 0.1);
    config.fault_rate = -0.1;
    assert!(config.sampling_profile().is_err());
}

/// 测试AppResult类型别名
#[test]
fn test_app_result() {
    let success: AppResult<String> = Ok("成功".to_string());
    assert!(success.is_ok());

    let error: AppResult<String> = Err(AppError::generic("测试错误"));
    match error {
        Err(e) => assert_eq!(e.error_code(), "GENERIC"),
        Ok(_) => panic!("应该是错误"),
    }
}
