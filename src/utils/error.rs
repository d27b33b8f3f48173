use thiserror::Error;

#[derive(Error, Debug)]
pub enum ForecastError {
    #[error("Failed to load dataset from {location}: {message}")]
    DataLoadError { location: String, message: String },

    #[error("Invalid mortality rate {rate}: must be within [0, 1]")]
    InvalidRateError { rate: f64 },

    #[error("Insufficient data: need at least {required} point(s), got {actual}")]
    InsufficientDataError { required: usize, actual: usize },

    #[error("Observation on day {index} is not a finite number: {value}")]
    InvalidObservationError { index: usize, value: f64 },

    #[error("Forecast has no mortality-adjusted series")]
    MissingAdjustmentError,

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// 資料來源無法讀取或格式錯誤
    Data,
    /// 單次請求的計算失敗
    Request,
    Network,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl ForecastError {
    pub fn data_load(location: impl Into<String>, message: impl Into<String>) -> Self {
        ForecastError::DataLoadError {
            location: location.into(),
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            ForecastError::DataLoadError { .. }
            | ForecastError::ProcessingError { .. }
            | ForecastError::CsvError(_) => ErrorCategory::Data,
            ForecastError::InvalidRateError { .. }
            | ForecastError::InsufficientDataError { .. }
            | ForecastError::InvalidObservationError { .. }
            | ForecastError::MissingAdjustmentError => ErrorCategory::Request,
            ForecastError::HttpError(_) => ErrorCategory::Network,
            ForecastError::ConfigError { .. }
            | ForecastError::ConfigValidationError { .. }
            | ForecastError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            ForecastError::IoError(_) | ForecastError::SerializationError(_) => {
                ErrorCategory::System
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            // 資料載入失敗時無法提供任何服務
            ErrorCategory::Data | ErrorCategory::Network => ErrorSeverity::Critical,
            ErrorCategory::Request => ErrorSeverity::Medium,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// Process exit status for the CLI binaries.
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Medium => 2,   // 單次請求失敗
            ErrorSeverity::High => 1,     // 配置錯誤
            ErrorSeverity::Critical => 3, // 資料無法載入
        }
    }

    /// Request-scoped errors abort one pipeline run and leave shared state untouched.
    pub fn is_request_scoped(&self) -> bool {
        self.category() == ErrorCategory::Request
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            ForecastError::DataLoadError { location, .. } => format!(
                "Check that '{}' is reachable and is a CSSE time-series CSV",
                location
            ),
            ForecastError::InvalidRateError { .. } => {
                "Check the deaths dataset or set default_mortality between 0 and 1".to_string()
            }
            ForecastError::InsufficientDataError { .. } => {
                "Select a region with at least one observed day".to_string()
            }
            ForecastError::InvalidObservationError { .. } => {
                "Remove NaN or infinite counts from the input series".to_string()
            }
            ForecastError::MissingAdjustmentError => {
                "Apply the mortality adjustment before summarizing".to_string()
            }
            ForecastError::HttpError(_) => {
                "Check network connectivity and the source URL".to_string()
            }
            ForecastError::ProcessingError { .. } | ForecastError::CsvError(_) => {
                "Verify the CSV header and row layout".to_string()
            }
            ForecastError::IoError(_) => "Check file paths and permissions".to_string(),
            ForecastError::SerializationError(_) => "Report this as a bug".to_string(),
            ForecastError::ConfigError { .. }
            | ForecastError::ConfigValidationError { .. }
            | ForecastError::InvalidConfigValueError { .. } => {
                "Fix the configuration value and run again".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            ForecastError::DataLoadError { location, .. } => {
                format!("Could not load case data from {}", location)
            }
            ForecastError::InvalidRateError { rate } => {
                format!("Mortality rate {:.4} is out of range", rate)
            }
            ForecastError::InsufficientDataError { .. } => {
                "Not enough data to build a forecast".to_string()
            }
            ForecastError::MissingAdjustmentError => {
                "Active case estimate is not available".to_string()
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ForecastError>;
