//! bilidl library

pub mod app;
pub mod downloader;
pub mod extractor;
pub mod utils;

// Re-export main types for easier use
pub use downloader::{DownloadConfig, DownloadEngine, MuxOutcome};
pub use extractor::{ApiEndpoints, PageClient, PageKind, RetryPolicy, VideoInfo};
pub use utils::BiliDlError;
