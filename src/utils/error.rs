//! Error handling for bilidl

use thiserror::Error;

/// Main error type for bilidl
#[derive(Debug, Error)]
pub enum BiliDlError {
    #[error("not a recognized bilibili link: {0}")]
    InvalidUrl(String),

    #[error("failed to extract video info: {0}")]
    ExtractionError(String),

    #[error("bilibili API returned code {code}: {message}")]
    ApiError { code: i64, message: String },

    #[error("download failed: {0}")]
    DownloadError(String),

    #[error("network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}
