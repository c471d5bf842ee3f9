use thiserror::Error;

#[derive(Error, Debug)]
pub enum BotError {
    #[error("HTTP request failed: {0}")]
    FetchError(#[from] reqwest::Error),

    #[error("{source_name} responded with HTTP {status}")]
    HttpStatusError { source_name: String, status: u16 },

    #[error("Failed to parse {source_name}: {message}")]
    ParseError {
        source_name: String,
        message: String,
    },

    #[error("Emission schedule for {month} has not been published yet")]
    NotYetPublished { month: String },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// 網路或上游 HTTP 狀態錯誤
    Fetch,
    /// 上游格式改變
    Parse,
    /// 本期資料尚未公佈
    NotYetPublished,
    Config,
    System,
}

impl BotError {
    pub fn parse(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        BotError::ParseError {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            BotError::FetchError(_) | BotError::HttpStatusError { .. } => ErrorCategory::Fetch,
            BotError::ParseError { .. }
            | BotError::CsvError(_)
            | BotError::SerializationError(_) => ErrorCategory::Parse,
            BotError::NotYetPublished { .. } => ErrorCategory::NotYetPublished,
            BotError::ConfigValidationError { .. }
            | BotError::InvalidConfigValueError { .. }
            | BotError::MissingConfigError { .. } => ErrorCategory::Config,
            BotError::IoError(_) => ErrorCategory::System,
        }
    }

    /// 授權失敗 (401/403)
    pub fn is_unauthorized(&self) -> bool {
        match self {
            BotError::HttpStatusError { status, .. } => *status == 401 || *status == 403,
            BotError::FetchError(e) => e
                .status()
                .map(|s| s.as_u16() == 401 || s.as_u16() == 403)
                .unwrap_or(false),
            _ => false,
        }
    }

    /// 給操作人員看的訊息 (CLI / 啟動時)
    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Config => format!("Configuration problem: {}", self),
            ErrorCategory::Fetch => format!("Could not reach upstream source: {}", self),
            ErrorCategory::Parse => format!("Upstream data could not be read: {}", self),
            ErrorCategory::NotYetPublished => self.to_string(),
            ErrorCategory::System => format!("System error: {}", self),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        if self.is_unauthorized() {
            return "Check the indexer API key in the [burns] section";
        }
        match self.category() {
            ErrorCategory::Config => "Check the configuration file and referenced environment variables",
            ErrorCategory::Fetch => "Check network connectivity and the configured URLs, then retry",
            ErrorCategory::Parse => "The upstream page or sheet layout may have changed; review the parser markers",
            ErrorCategory::NotYetPublished => "Wait for the schedule to be published and retry later",
            ErrorCategory::System => "Check file permissions and available resources",
        }
    }
}

pub type Result<T> = std::result::Result<T, BotError>;
