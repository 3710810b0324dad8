//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

use tubedl_core::QualityPreset;

fn parse_quality(value: &str) -> Result<QualityPreset, String> {
    value.parse()
}

/// Download remote videos and keep a history of what was fetched.
///
/// Tubedl submits one download request, shows its progress, and records the
/// completed download in a durable history log.
#[derive(Parser, Debug)]
#[command(name = "tubedl")]
#[command(author, version, about)]
pub struct Args {
    /// Video URL to download
    pub url: Option<String>,

    /// Destination directory (defaults to the Videos folder in your home directory)
    #[arg(short = 'o', long)]
    pub output_dir: Option<PathBuf>,

    /// Quality preset: best, 720p, 480p, or audio
    #[arg(short = 'Q', long, default_value = "best", value_parser = parse_quality)]
    pub quality: QualityPreset,

    /// Show recent download history and exit
    #[arg(long)]
    pub history: bool,

    /// Maximum history rows to display
    #[arg(long, default_value_t = 10)]
    pub history_limit: usize,

    /// History file location (defaults to the platform data directory)
    #[arg(long)]
    pub history_file: Option<PathBuf>,

    /// Reveal the downloaded file in the file manager when done
    #[arg(long)]
    pub reveal: bool,

    /// Path to the yt-dlp binary
    #[arg(long, default_value = "yt-dlp")]
    pub ytdlp_bin: PathBuf,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,
}
