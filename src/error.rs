use thiserror::Error;

pub type Result<T> = std::result::Result<T, ScrapingError>;

#[derive(Error, Debug)]
pub enum ScrapingError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Browser error: {0}")]
    BrowserError(String),

    #[error("Structure mismatch on {page}: {detail}")]
    StructureMismatch { page: String, detail: String },

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Render error: {0}")]
    RenderError(String),
}

/// What the caller of a per-item step should do with a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryStrategy {
    SkipItem,
    AbortRun,
}

impl ScrapingError {
    pub fn mismatch(page: impl Into<String>, detail: impl Into<String>) -> Self {
        ScrapingError::StructureMismatch {
            page: page.into(),
            detail: detail.into(),
        }
    }

    pub fn recovery_strategy(&self) -> RecoveryStrategy {
        match self {
            ScrapingError::StructureMismatch { .. } => RecoveryStrategy::SkipItem,
            ScrapingError::NetworkError(_)
            | ScrapingError::BrowserError(_)
            | ScrapingError::ParseError(_)
            | ScrapingError::StorageError(_)
            | ScrapingError::ConfigError(_)
            | ScrapingError::RenderError(_) => RecoveryStrategy::AbortRun,
        }
    }
}

// Conversion implementations for common error types
impl From<std::io::Error> for ScrapingError {
    fn from(err: std::io::Error) -> Self {
        ScrapingError::StorageError(err.to_string())
    }
}

impl From<serde_json::Error> for ScrapingError {
    fn from(err: serde_json::Error) -> Self {
        ScrapingError::ParseError(err.to_string())
    }
}

impl From<toml::de::Error> for ScrapingError {
    fn from(err: toml::de::Error) -> Self {
        ScrapingError::ConfigError(err.to_string())
    }
}

impl From<reqwest::Error> for ScrapingError {
    fn from(err: reqwest::Error) -> Self {
        ScrapingError::NetworkError(err.to_string())
    }
}

impl From<chromiumoxide::error::CdpError> for ScrapingError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        ScrapingError::BrowserError(err.to_string())
    }
}

impl From<url::ParseError> for ScrapingError {
    fn from(err: url::ParseError) -> Self {
        ScrapingError::ParseError(err.to_string())
    }
}

impl From<askama::Error> for ScrapingError {
    fn from(err: askama::Error) -> Self {
        ScrapingError::RenderError(err.to_string())
    }
}
