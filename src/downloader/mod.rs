//! Download engine module

pub mod engine;
pub mod muxer;
pub mod progress;

// Re-export for convenience
pub use engine::{DownloadConfig, DownloadEngine};
pub use muxer::MuxOutcome;
