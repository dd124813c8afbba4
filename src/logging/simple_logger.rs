/// 简化版Logger实现
/// 控制台与单个日志文件同步输出，文件可选 JSON 行格式

use super::*;
use crate::utils::error::{AppError, AppResult};
use chrono::Local;
use log::{Log, Metadata, Record};
use std::fs::OpenOptions;
use std::io::{BufWriter, Write as IoWrite};
use std::sync::{Arc, Mutex};

/// 简化版Logger - 实现log::Log trait
pub struct SimpleLogger {
    config: LoggerConfig,
    file_writer: Arc<Mutex<Option<BufWriter<std::fs::File>>>>,
}

impl SimpleLogger {
    pub fn new(config: LoggerConfig) -> Self {
        Self {
            config,
            file_writer: Arc::new(Mutex::new(None)),
        }
    }

    /// 打开日志文件（如有）并注册为全局logger
    pub fn init(&self) -> AppResult<()> {
        self.open_file()?;

        let logger = SimpleLogger {
            config: self.config.clone(),
            file_writer: self.file_writer.clone(),
        };

        log::set_boxed_logger(Box::new(logger))
            .map_err(|e| AppError::configuration_error(format!("注册日志器失败: {}", e)))?;
        log::set_max_level(self.config.level.into());

        Ok(())
    }

    /// 只处理第一个文件目标
    fn open_file(&self) -> AppResult<()> {
        let Some(path) = self.config.file_path() else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;

        let mut writer_guard = self
            .file_writer
            .lock()
            .map_err(|_| AppError::concurrency_error("文件写入器锁定失败"))?;
        *writer_guard = Some(BufWriter::new(file));
        Ok(())
    }

    fn write_to_console(&self, record: &Record) {
        let message = format!(
            "[{}] [{}] {}",
            Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
            record.level(),
            record.args()
        );

        match record.level() {
            log::Level::Error => {
                eprintln!("\x1b[31m{}\x1b[0m", message);
                let _ = std::io::stderr().flush();
            }
            log::Level::Warn => {
                eprintln!("\x1b[33m{}\x1b[0m", message);
                let _ = std::io::stderr().flush();
            }
            _ => {
                println!("{}", message);
                let _ = std::io::stdout().flush();
            }
        }
    }

    fn write_to_file(&self, record: &Record) {
        let line = format_file_line(self.config.format, record);
        if let Ok(mut writer_guard) = self.file_writer.lock() {
            if let Some(writer) = writer_guard.as_mut() {
                if let Err(e) = writer.write_all(line.as_bytes()) {
                    eprintln!("写入日志文件失败: {}", e);
                } else {
                    let _ = writer.flush();
                }
            }
        }
    }
}

/// 文件日志的一行（含换行）
pub fn format_file_line(format: LogFormat, record: &Record) -> String {
    match format {
        LogFormat::Plain => format!(
            "[{}] [{}] [{}] - {}\n",
            Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
            record.level(),
            record.target(),
            record.args()
        ),
        LogFormat::Json => match serde_json::to_string(&StructuredLog::from_record(record)) {
            Ok(json) => format!("{}\n", json),
            Err(_) => format!("{}\n", record.args()),
        },
    }
}

impl Log for SimpleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        for target in &self.config.targets {
            match target {
                LogTarget::Console => self.write_to_console(record),
                LogTarget::File { .. } => self.write_to_file(record),
            }
        }
    }

    fn flush(&self) {
        let _ = std::io::stdout().flush();
        let _ = std::io::stderr().flush();

        if let Ok(mut writer_guard) = self.file_writer.lock() {
            if let Some(writer) = writer_guard.as_mut() {
                let _ = writer.flush();
            }
        }
    }
}

/// 按配置初始化全局日志
///
/// 有文件目标时使用 `SimpleLogger`，否则交给 env_logger（`RUST_LOG` 优先于配置的级别）。
pub fn init_logging(config: LoggerConfig) -> AppResult<()> {
    if config.file_path().is_some() {
        return SimpleLogger::new(config).init();
    }

    env_logger::Builder::new()
        .filter_level(config.level.into())
        .parse_default_env()
        .try_init()
        .map_err(|e| AppError::configuration_error(format!("初始化日志失败: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_plain_line_format() {
        let record = Record::builder()
            .args(format_args!("[配置警告] 忽略无效的 TC_SEED"))
            .level(log::Level::Warn)
            .target("tc_report_lib::utils")
            .build();
        let line = format_file_line(LogFormat::Plain, &record);
        assert!(line.contains("[WARN] [tc_report_lib::utils] - [配置警告]"));
        assert!(line.ends_with('\n'));
    }

    #[test]
    fn test_json_line_format() {
        let record = Record::builder()
            .args(format_args!("[渲染失败] 格式=DOCX"))
            .level(log::Level::Error)
            .target("tc_report_lib::infrastructure")
            .build();
        let line = format_file_line(LogFormat::Json, &record);
        let parsed: StructuredLog = serde_json::from_str(line.trim_end()).unwrap();
        assert_eq!(parsed.level, "ERROR");
        assert_eq!(parsed.category, Some(CoreLogCategory::RenderFailure));
    }

    #[test]
    fn test_file_writer_appends() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("logs").join("tc-report.log");
        let logger = SimpleLogger::new(LoggerConfig {
            level: LogLevel::Debug,
            targets: vec![LogTarget::File { path: path.clone() }],
            format: LogFormat::Plain,
        });
        logger.open_file().unwrap();

        let record = Record::builder()
            .args(format_args!("[用户操作] 生成报告"))
            .level(log::Level::Info)
            .target("test")
            .build();
        logger.write_to_file(&record);
        logger.flush();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("[用户操作] 生成报告"));
    }
}
