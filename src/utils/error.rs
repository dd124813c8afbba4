use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 应用程序统一错误类型
/// 用于封装报告引擎中可能出现的各种错误，提供统一的错误处理机制
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum AppError {
    /// 通用错误，包含错误消息
    #[error("通用错误: {message}")]
    Generic { message: String },

    /// 输入/输出错误
    #[error("IO错误: {message} (Kind: {kind})")]
    IoError { message: String, kind: String },

    /// 契约违反错误
    ///
    /// **业务含义**: 调用方交给核心的数据违反了类型契约，属于编程错误而不是用户输入错误
    /// **典型场景**:
    /// - 报告的 reportType 与 testData 的变体标签不一致
    /// - 缺少必填的报告头字段
    ///
    /// **处理策略**: 一律直接失败，不做任何默认值填充，也不输出半成品文档
    #[error("契约违反: {contract} - {message}")]
    ContractViolation { contract: String, message: String },

    /// 配置相关错误
    #[error("配置错误: {message}")]
    ConfigurationError { message: String },

    /// 验证错误（数据验证失败）
    #[error("验证错误: {message}")]
    ValidationError { message: String },

    /// 并发/异步操作错误
    #[error("并发错误: {message}")]
    ConcurrencyError { message: String },

    /// 资源未找到错误
    #[error("资源未找到: {resource_type} - {message}")]
    NotFoundError {
        resource_type: String,
        message: String,
    },

    /// 状态转换错误
    #[error("状态转换错误: 从 {from_state} 到 {to_state} - {message}")]
    StateTransitionError {
        from_state: String,
        to_state: String,
        message: String,
    },

    /// JSON序列化/反序列化错误
    #[error("JSON序列化/反序列化错误: {message}")]
    JsonError { message: String },

    /// PDF生成错误
    #[error("PDF生成错误: {message}")]
    PdfError { message: String },

    /// DOCX生成错误
    #[error("DOCX生成错误: {message}")]
    DocxError { message: String },

    /// 模板渲染错误
    #[error("模板错误: {message}")]
    TemplateError { message: String },

    /// 报告生成错误
    #[error("报告生成错误: {message}")]
    ReportGenerationError { message: String },
}

impl AppError {
    /// 创建通用错误
    pub fn generic(message: impl Into<String>) -> Self {
        Self::Generic {
            message: message.into(),
        }
    }

    /// 创建IO错误
    pub fn io_error(message: impl Into<String>, kind_str: impl Into<String>) -> Self {
        Self::IoError {
            message: message.into(),
            kind: kind_str.into(),
        }
    }

    /// 创建契约违反错误
    ///
    /// **参数**:
    /// - `contract`: 被违反的契约名称，例如 "TestDataVariant"
    /// - `message`: 具体的违反情况
    ///
    /// **使用示例**:
    /// ```rust
    /// use tc_report_lib::AppError;
    /// let err = AppError::contract_violation("TestDataVariant", "CABLE 报告携带了 GROUNDING 数据");
    /// assert_eq!(err.error_code(), "CONTRACT_VIOLATION");
    /// ```
    pub fn contract_violation(contract: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ContractViolation {
            contract: contract.into(),
            message: message.into(),
        }
    }

    /// 创建配置错误
    pub fn configuration_error(message: impl Into<String>) -> Self {
        Self::ConfigurationError {
            message: message.into(),
        }
    }

    /// 创建验证错误
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
        }
    }

    /// 创建并发错误
    pub fn concurrency_error(message: impl Into<String>) -> Self {
        Self::ConcurrencyError {
            message: message.into(),
        }
    }

    /// 创建资源未找到错误
    pub fn not_found_error(resource_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self::NotFoundError {
            resource_type: resource_type.into(),
            message: message.into(),
        }
    }

    /// 创建状态转换错误
    pub fn state_transition_error(
        from_state: impl Into<String>,
        to_state: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::StateTransitionError {
            from_state: from_state.into(),
            to_state: to_state.into(),
            message: message.into(),
        }
    }

    /// 创建JSON序列化错误
    pub fn json_error(message: impl Into<String>) -> Self {
        Self::JsonError {
            message: message.into(),
        }
    }

    /// 创建PDF生成错误
    pub fn pdf_error(message: impl Into<String>) -> Self {
        Self::PdfError {
            message: message.into(),
        }
    }

    /// 创建DOCX生成错误
    pub fn docx_error(message: impl Into<String>) -> Self {
        Self::DocxError {
            message: message.into(),
        }
    }

    /// 创建模板错误
    pub fn template_error(message: impl Into<String>) -> Self {
        Self::TemplateError {
            message: message.into(),
        }
    }

    /// 创建报告生成错误
    pub fn report_generation_error(message: impl Into<String>) -> Self {
        Self::ReportGenerationError {
            message: message.into(),
        }
    }

    /// 获取错误的简短描述
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Generic { .. } => "GENERIC",
            AppError::IoError { .. } => "IO_ERROR",
            AppError::ContractViolation { .. } => "CONTRACT_VIOLATION",
            AppError::ConfigurationError { .. } => "CONFIGURATION_ERROR",
            AppError::ValidationError { .. } => "VALIDATION_ERROR",
            AppError::ConcurrencyError { .. } => "CONCURRENCY_ERROR",
            AppError::NotFoundError { .. } => "NOT_FOUND_ERROR",
            AppError::StateTransitionError { .. } => "STATE_TRANSITION_ERROR",
            AppError::JsonError { .. } => "JSON_ERROR",
            AppError::PdfError { .. } => "PDF_ERROR",
            AppError::DocxError { .. } => "DOCX_ERROR",
            AppError::TemplateError { .. } => "TEMPLATE_ERROR",
            AppError::ReportGenerationError { .. } => "REPORT_GENERATION_ERROR",
        }
    }

    /// 是否属于契约违反（调用方的编程错误）
    pub fn is_contract_violation(&self) -> bool {
        matches!(self, AppError::ContractViolation { .. })
    }
}

/// 标准 I/O 错误到 AppError 的转换
impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::IoError { message: err.to_string(), kind: format!("{:?}", err.kind()) }
    }
}

/// serde_json 错误到 AppError 的转换
impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::JsonError { message: err.to_string() }
    }
}

/// 字符串错误到 AppError 的转换（通用错误）
impl From<String> for AppError {
    fn from(err_msg: String) -> Self {
        Self::Generic { message: err_msg }
    }
}

/// &str 错误到 AppError 的转换（通用错误）
impl From<&str> for AppError {
    fn from(err_msg: &str) -> Self {
        Self::Generic { message: err_msg.to_string() }
    }
}

/// zip 错误到 AppError 的转换
///
/// DOCX 容器写入失败一律归为 DOCX 生成错误
impl From<zip::result::ZipError> for AppError {
    fn from(err: zip::result::ZipError) -> Self {
        AppError::DocxError { message: format!("zip error: {}", err) }
    }
}

/// tera 模板错误到 AppError 的转换
impl From<tera::Error> for AppError {
    fn from(err: tera::Error) -> Self {
        // tera 把根因放在 source 链里
        let mut message = err.to_string();
        let mut source = std::error::Error::source(&err);
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        AppError::TemplateError { message }
    }
}

/// 应用程序结果类型别名
/// 简化错误处理的类型定义
pub type AppResult<T> = Result<T, AppError>;
