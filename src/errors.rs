use std::fmt;

#[derive(Debug)]
pub enum AppError {
    /// Missing or invalid run configuration (region list, collection type, variables)
    ConfigError(String),
    /// Login failed or the portal returned no usable session cookies
    AuthError(String),
    /// Network request failed
    NetworkError(String),
    /// Failed to read an archive or other structured content
    ParseError(String),
    /// IO operation failed
    IoError(String),
    /// Invalid input format
    InvalidInput(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::ConfigError(msg) => write!(f, "Configuration error: {msg}"),
            AppError::AuthError(msg) => write!(f, "Authentication error: {msg}"),
            AppError::NetworkError(msg) => write!(f, "Network error: {msg}"),
            AppError::ParseError(msg) => write!(f, "Parse error: {msg}"),
            AppError::IoError(msg) => write!(f, "IO error: {msg}"),
            AppError::InvalidInput(msg) => write!(f, "Invalid input: {msg}"),
        }
    }
}

impl std::error::Error for AppError {}

// Conversion implementations for common errors
impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::NetworkError(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::IoError(err.to_string())
    }
}

impl From<url::ParseError> for AppError {
    fn from(err: url::ParseError) -> Self {
        AppError::InvalidInput(format!("invalid URL: {err}"))
    }
}

impl From<zip::result::ZipError> for AppError {
    fn from(err: zip::result::ZipError) -> Self {
        AppError::ParseError(err.to_string())
    }
}

impl From<chrono::ParseError> for AppError {
    fn from(err: chrono::ParseError) -> Self {
        AppError::InvalidInput(format!("invalid date: {err}"))
    }
}

// Custom type alias for Results in this application
pub type AppResult<T> = Result<T, AppError>;
