/// 报告导出服务
///
/// 负责调用 PDF / DOCX 渲染器并把结果写入导出目录。
/// 渲染在阻塞线程池中执行，全部格式渲染成功后才写文件。

use crate::infrastructure::render::{renderer_for, DocumentFormat, ReportRenderer};
use crate::models::Report;
use crate::utils::config::AppConfig;
use crate::utils::error::{AppError, AppResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task::JoinHandle;
use uuid::Uuid;

/// 一次导出的结果
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedReport {
    pub export_id: String,
    pub report_number: String,
    pub format: DocumentFormat,
    pub file_path: PathBuf,
    pub file_size: u64,
    pub generated_at: DateTime<Utc>,
}

/// 报告导出服务接口
#[async_trait]
pub trait IReportExportService: Send + Sync {
    /// 导出PDF
    async fn export_pdf(&self, report: &Report) -> AppResult<ExportedReport>;

    /// 导出Word文档
    async fn export_docx(&self, report: &Report) -> AppResult<ExportedReport>;

    /// 导出全部已配置的格式；任一格式渲染失败时不写任何文件
    async fn export_all(&self, report: &Report) -> AppResult<Vec<ExportedReport>>;
}

/// 报告导出服务实现
pub struct ReportExportService {
    renderers: Vec<Arc<dyn ReportRenderer>>,
    export_dir: PathBuf,
    overwrite_existing: bool,
    render_concurrently: bool,
}

impl ReportExportService {
    /// 使用默认的 PDF 和 DOCX 渲染器
    pub fn new(export_dir: PathBuf) -> Self {
        let renderers: Vec<Arc<dyn ReportRenderer>> = DocumentFormat::ALL
            .into_iter()
            .map(|format| Arc::from(renderer_for(format)))
            .collect();
        Self::with_renderers(renderers, export_dir)
    }

    /// 使用指定的渲染器（同一格式只取第一个）
    pub fn with_renderers(renderers: Vec<Arc<dyn ReportRenderer>>, export_dir: PathBuf) -> Self {
        Self {
            renderers,
            export_dir,
            overwrite_existing: true,
            render_concurrently: true,
        }
    }

    /// 按应用配置创建
    pub fn from_config(config: &AppConfig) -> Self {
        let renderers: Vec<Arc<dyn ReportRenderer>> = config
            .render_config
            .formats
            .iter()
            .map(|format| Arc::from(renderer_for(*format)))
            .collect();
        let mut service = Self::with_renderers(renderers, config.export_config.export_dir.clone());
        service.overwrite_existing = config.export_config.overwrite_existing;
        service.render_concurrently = config.render_config.render_concurrently;
        service
    }

    pub fn export_dir(&self) -> &Path {
        &self.export_dir
    }

    pub fn formats(&self) -> Vec<DocumentFormat> {
        self.renderers.iter().map(|r| r.format()).collect()
    }

    fn renderer(&self, format: DocumentFormat) -> AppResult<Arc<dyn ReportRenderer>> {
        self.renderers
            .iter()
            .find(|r| r.format() == format)
            .cloned()
            .ok_or_else(|| AppError::not_found_error("ReportRenderer", format!("未配置 {} 渲染器", format)))
    }

    fn spawn_render(renderer: Arc<dyn ReportRenderer>, report: Arc<Report>) -> JoinHandle<AppResult<Vec<u8>>> {
        tokio::task::spawn_blocking(move || renderer.render(&report))
    }

    async fn join_render(handle: JoinHandle<AppResult<Vec<u8>>>) -> AppResult<Vec<u8>> {
        handle
            .await
            .map_err(|e| AppError::concurrency_error(format!("渲染任务异常结束: {}", e)))?
    }

    /// 渲染指定格式，返回 (格式, 字节)
    async fn render_formats(
        &self,
        report: &Report,
        formats: &[DocumentFormat],
    ) -> AppResult<Vec<(DocumentFormat, Vec<u8>)>> {
        let report = Arc::new(report.clone());
        let mut rendered = Vec::with_capacity(formats.len());

        if self.render_concurrently {
            let mut handles = Vec::with_capacity(formats.len());
            for format in formats {
                let renderer = self.renderer(*format)?;
                handles.push((*format, Self::spawn_render(renderer, report.clone())));
            }
            for (format, handle) in handles {
                rendered.push((format, Self::join_render(handle).await?));
            }
        } else {
            for format in formats {
                let renderer = self.renderer(*format)?;
                let bytes = Self::join_render(Self::spawn_render(renderer, report.clone())).await?;
                rendered.push((*format, bytes));
            }
        }
        Ok(rendered)
    }

    fn io_error(action: &str, e: std::io::Error) -> AppError {
        AppError::io_error(format!("{}: {}", action, e), e.kind().to_string())
    }

    /// 写入全部渲染结果
    ///
    /// 先检查所有目标路径，再写 `.part` 临时文件，最后逐个改名。
    /// 任何一步失败都会删除本次写出的文件，不留下部分输出。
    async fn write_files(
        &self,
        report: &Report,
        rendered: Vec<(DocumentFormat, Vec<u8>)>,
    ) -> AppResult<Vec<ExportedReport>> {
        let targets: Vec<(DocumentFormat, PathBuf, PathBuf, Vec<u8>)> = rendered
            .into_iter()
            .map(|(format, bytes)| {
                let file_path = self.export_dir.join(format.file_name(report.report_number()));
                let partial_path = file_path.with_extension(format!("{}.part", format.extension()));
                (format, file_path, partial_path, bytes)
            })
            .collect();

        if !self.overwrite_existing {
            for (_, file_path, _, _) in &targets {
                let exists = tokio::fs::try_exists(file_path)
                    .await
                    .map_err(|e| Self::io_error("检查导出文件失败", e))?;
                if exists {
                    return Err(AppError::validation_error(format!(
                        "导出文件已存在: {}",
                        file_path.display()
                    )));
                }
            }
        }

        tokio::fs::create_dir_all(&self.export_dir)
            .await
            .map_err(|e| Self::io_error("创建导出目录失败", e))?;

        let mut staged: Vec<&Path> = Vec::with_capacity(targets.len());
        for (_, _, partial_path, bytes) in &targets {
            if let Err(e) = tokio::fs::write(partial_path, bytes).await {
                staged.push(partial_path);
                Self::remove_all(&staged).await;
                return Err(Self::io_error("写入导出文件失败", e));
            }
            staged.push(partial_path);
        }

        let mut committed: Vec<&Path> = Vec::with_capacity(targets.len());
        for (i, (_, file_path, partial_path, _)) in targets.iter().enumerate() {
            if let Err(e) = tokio::fs::rename(partial_path, file_path).await {
                Self::remove_all(&committed).await;
                Self::remove_all(&staged[i..]).await;
                return Err(Self::io_error("重命名导出文件失败", e));
            }
            committed.push(file_path);
        }

        let generated_at = Utc::now();
        Ok(targets
            .into_iter()
            .map(|(format, file_path, _, bytes)| {
                crate::log_user_operation!(
                    "导出报告 {} 格式={} 路径={}",
                    report.report_number(),
                    format,
                    file_path.display()
                );
                ExportedReport {
                    export_id: Uuid::new_v4().to_string(),
                    report_number: report.report_number().to_string(),
                    format,
                    file_path,
                    file_size: bytes.len() as u64,
                    generated_at,
                }
            })
            .collect())
    }

    /// 清理本次写出的文件，忽略不存在的路径
    async fn remove_all(paths: &[&Path]) {
        for path in paths {
            if let Err(e) = tokio::fs::remove_file(path).await {
                if e.kind() != std::io::ErrorKind::NotFound {
                    log::warn!("清理导出文件失败 {}: {}", path.display(), e);
                }
            }
        }
    }

    /// 导出指定格式
    pub async fn export(&self, report: &Report, format: DocumentFormat) -> AppResult<ExportedReport> {
        let rendered = self.render_formats(report, &[format]).await?;
        self.write_files(report, rendered)
            .await?
            .pop()
            .ok_or_else(|| AppError::report_generation_error("渲染结果为空"))
    }
}

#[async_trait]
impl IReportExportService for ReportExportService {
    async fn export_pdf(&self, report: &Report) -> AppResult<ExportedReport> {
        self.export(report, DocumentFormat::Pdf).await
    }

    async fn export_docx(&self, report: &Report) -> AppResult<ExportedReport> {
        self.export(report, DocumentFormat::Docx).await
    }

    async fn export_all(&self, report: &Report) -> AppResult<Vec<ExportedReport>> {
        let formats = self.formats();
        let rendered = self.render_formats(report, &formats).await?;
        self.write_files(report, rendered).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::render::MockReportRenderer;
    use crate::domain::services::synthetic_report_generator::{GeneratorOptions, SyntheticReportGenerator};
    use crate::models::ReportType;
    use chrono::TimeZone;
    use tempfile::tempdir;

    fn report() -> Report {
        let options = GeneratorOptions::at(Utc.with_ymd_and_hms(2024, 10, 15, 9, 0, 0).unwrap())
            .with_report_type(ReportType::Switchgear);
        SyntheticReportGenerator::from_seed(5).generate(&options).unwrap().report
    }

    fn mock_renderer(format: DocumentFormat, output: AppResult<Vec<u8>>) -> Arc<dyn ReportRenderer> {
        let mut renderer = MockReportRenderer::new();
        renderer.expect_format().return_const(format);
        let mut output = Some(output);
        renderer
            .expect_render()
            .returning(move |_| output.take().unwrap_or_else(|| Err(AppError::generic("重复渲染"))));
        Arc::new(renderer)
    }

    #[tokio::test]
    async fn test_export_all_writes_every_format() {
        let dir = tempdir().unwrap();
        let service = ReportExportService::with_renderers(
            vec![
                mock_renderer(DocumentFormat::Pdf, Ok(b"%PDF-1.3 fake".to_vec())),
                mock_renderer(DocumentFormat::Docx, Ok(b"PK fake".to_vec())),
            ],
            dir.path().join("exports"),
        );

        let r = report();
        let exported = service.export_all(&r).await.unwrap();
        assert_eq!(exported.len(), 2);
        for item in &exported {
            assert_eq!(item.report_number, r.report_number());
            assert!(item.file_path.exists());
            assert_eq!(
                item.file_path.file_name().unwrap().to_string_lossy(),
                item.format.file_name(r.report_number())
            );
        }
        assert_eq!(exported[0].file_size, 13);
    }

    #[tokio::test]
    async fn test_failed_render_writes_nothing() {
        let dir = tempdir().unwrap();
        let export_dir = dir.path().join("exports");
        let service = ReportExportService::with_renderers(
            vec![
                mock_renderer(DocumentFormat::Pdf, Ok(b"%PDF".to_vec())),
                mock_renderer(DocumentFormat::Docx, Err(AppError::docx_error("打包失败"))),
            ],
            export_dir.clone(),
        );

        let err = service.export_all(&report()).await.unwrap_err();
        assert_eq!(err.error_code(), "DOCX_ERROR");
        assert!(!export_dir.exists());
    }

    #[tokio::test]
    async fn test_missing_renderer_is_not_found() {
        let dir = tempdir().unwrap();
        let service = ReportExportService::with_renderers(
            vec![mock_renderer(DocumentFormat::Pdf, Ok(Vec::new()))],
            dir.path().to_path_buf(),
        );
        let err = service.export_docx(&report()).await.unwrap_err();
        assert_eq!(err.error_code(), "NOT_FOUND_ERROR");
    }

    #[tokio::test]
    async fn test_existing_file_kept_when_overwrite_disabled() {
        let dir = tempdir().unwrap();
        let mut config = AppConfig::default();
        config.export_config.export_dir = dir.path().to_path_buf();
        config.export_config.overwrite_existing = false;
        config.render_config.formats = vec![DocumentFormat::Docx];

        let r = report();
        let existing = dir.path().join(DocumentFormat::Docx.file_name(r.report_number()));
        std::fs::write(&existing, b"old").unwrap();

        let service = ReportExportService::from_config(&config);
        assert_eq!(service.formats(), vec![DocumentFormat::Docx]);
        assert!(service.export_docx(&r).await.is_err());
        assert_eq!(std::fs::read(&existing).unwrap(), b"old");
    }

    #[tokio::test]
    async fn test_existing_target_blocks_every_format() {
        let dir = tempdir().unwrap();
        let mut config = AppConfig::default();
        config.export_config.export_dir = dir.path().to_path_buf();
        config.export_config.overwrite_existing = false;

        let r = report();
        let existing = dir.path().join(DocumentFormat::Docx.file_name(r.report_number()));
        std::fs::write(&existing, b"old").unwrap();

        let service = ReportExportService::from_config(&config);
        let err = service.export_all(&r).await.unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");

        // PDF 也不能写出
        let pdf = dir.path().join(DocumentFormat::Pdf.file_name(r.report_number()));
        assert!(!pdf.exists());
        assert_eq!(std::fs::read(&existing).unwrap(), b"old");
        let names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names.len(), 1, "{:?}", names);
    }

    #[tokio::test]
    async fn test_failed_commit_removes_written_files() {
        let dir = tempdir().unwrap();
        let r = report();
        // DOCX 目标是一个非空目录，改名必然失败
        let blocker = dir.path().join(DocumentFormat::Docx.file_name(r.report_number()));
        std::fs::create_dir_all(blocker.join("inner")).unwrap();

        let service = ReportExportService::with_renderers(
            vec![
                mock_renderer(DocumentFormat::Pdf, Ok(b"%PDF".to_vec())),
                mock_renderer(DocumentFormat::Docx, Ok(b"PK".to_vec())),
            ],
            dir.path().to_path_buf(),
        );
        let err = service.export_all(&r).await.unwrap_err();
        assert_eq!(err.error_code(), "IO_ERROR");

        let names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec![DocumentFormat::Docx.file_name(r.report_number())]);
    }

    #[tokio::test]
    async fn test_sequential_rendering_with_real_renderers() {
        let dir = tempdir().unwrap();
        let mut config = AppConfig::default();
        config.export_config.export_dir = dir.path().to_path_buf();
        config.render_config.render_concurrently = false;

        let service = ReportExportService::from_config(&config);
        let exported = service.export_pdf(&report()).await.unwrap();
        let bytes = std::fs::read(&exported.file_path).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert_eq!(exported.file_size, bytes.len() as u64);
    }
}
