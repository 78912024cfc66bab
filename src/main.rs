//! bilidl - Watermark-free bilibili video downloader
//!
//! Resolves a video, season or episode page into its best stream pair and
//! downloads it, muxing the tracks when ffmpeg is available.

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser)]
#[command(name = "bilidl", version, about = "Watermark-free bilibili video downloader")]
struct Args {
    /// Video, season or episode page URL
    url: String,

    /// Directory downloads are written into (defaults to the current directory)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Retry attempts for network fetches and downloads
    #[arg(short, long, default_value_t = 3)]
    retry: usize,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize logging
    tracing_subscriber::fmt::init();

    if let Err(e) = bilidl::app::run(&args.url, args.output_dir, args.retry).await {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}
