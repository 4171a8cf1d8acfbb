use thiserror::Error;

pub type Result<T> = std::result::Result<T, ShareError>;

#[derive(Error, Debug)]
pub enum ShareError {
    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Registry full: {0} records")]
    RegistryFull(usize),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Request too large: {0} bytes")]
    RequestTooLarge(usize),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<std::io::Error> for ShareError {
    fn from(err: std::io::Error) -> Self {
        ShareError::IoError(err.to_string())
    }
}
