use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum RasterError {
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("Upstream returned HTTP {status}: {body}")]
    UpstreamError { status: u16, body: String },

    #[error("Failed to fetch {context}: {source}")]
    FetchFailure {
        context: String,
        #[source]
        source: BoxError,
    },

    #[error("No files found for country code: {country_code}")]
    NoFilesFound { country_code: String },

    #[error("No 'pth' field found in file metadata")]
    MissingPathField,

    #[error("Failed to download raster file. HTTP status: {status}")]
    DownloadFailure { status: u16 },

    #[error("Failed to read raster image: {message}")]
    UnreadableFormat { message: String },

    #[error("Failed to write PNG image: {message}")]
    EncodeFailure { message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid configuration value for '{field}' ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// 輸入錯誤，尚未進行任何 I/O
    Input,
    /// 上游服務或網路
    Upstream,
    /// 上游有回應但沒有可用資料
    NoData,
    /// 影像解碼/編碼
    Codec,
    Configuration,
    System,
}

impl RasterError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    pub fn fetch_failure(
        context: impl Into<String>,
        source: impl Into<BoxError>,
    ) -> Self {
        Self::FetchFailure {
            context: context.into(),
            source: source.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidArgument { .. } => ErrorCategory::Input,
            Self::UpstreamError { .. }
            | Self::FetchFailure { .. }
            | Self::DownloadFailure { .. } => ErrorCategory::Upstream,
            Self::NoFilesFound { .. } | Self::MissingPathField => ErrorCategory::NoData,
            Self::UnreadableFormat { .. } | Self::EncodeFailure { .. } => ErrorCategory::Codec,
            Self::ConfigError { .. } | Self::InvalidConfigValueError { .. } => {
                ErrorCategory::Configuration
            }
            Self::IoError(_) => ErrorCategory::System,
        }
    }

    /// CLI 結束碼
    pub fn exit_code(&self) -> i32 {
        match self.category() {
            ErrorCategory::Input | ErrorCategory::Configuration => 1,
            ErrorCategory::Upstream => 2,
            ErrorCategory::NoData => 3,
            ErrorCategory::Codec => 4,
            ErrorCategory::System => 5,
        }
    }
}

pub type Result<T> = std::result::Result<T, RasterError>;
