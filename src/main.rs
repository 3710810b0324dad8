//! CLI entry point for the tubedl tool.

use std::sync::Arc;

use anyhow::{Result, bail};
use clap::Parser;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use tokio::sync::{Mutex, watch};
use tracing::{debug, info, warn};
use tubedl_core::{
    DownloadController, DownloadPhase, DownloadRequest, DownloadStatus, HistoryStore,
    PathResolver, SimulatedProgressSource, YtDlpExecutor, default_history_path,
};

mod cli;

use cli::Args;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Determine log level based on verbose/quiet flags
    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (warn)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "warn",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    debug!(?args, "CLI arguments parsed");

    let history_path = args
        .history_file
        .clone()
        .unwrap_or_else(default_history_path);
    let history = Arc::new(Mutex::new(HistoryStore::load(&history_path)));

    if args.history {
        print_history(&history, args.history_limit).await;
        return Ok(());
    }

    let Some(url) = args.url.clone() else {
        bail!(
            "Provide a video URL, or use --history to list recent downloads.\n  \
             Example: tubedl 'https://youtube.com/watch?v=...'"
        );
    };

    let controller = DownloadController::new(
        Arc::new(YtDlpExecutor::with_binary(&args.ytdlp_bin)),
        Arc::new(SimulatedProgressSource::default()),
        PathResolver::new(),
        Arc::clone(&history),
    );

    let mut request = DownloadRequest::new(url, args.quality);
    if let Some(dir) = args.output_dir.clone() {
        request = request.with_destination(dir);
    }

    let render = spawn_progress_bar(controller.subscribe(), args.quiet);

    match controller.start(request).await {
        Ok(()) => {
            let _ = render.await;
        }
        Err(err) if err.is_rejection() => {
            // Rejected before any transition; nothing terminal will reach
            // the render task.
            render.abort();
            return Err(err.into());
        }
        Err(err) => {
            let _ = render.await;
            return Err(err.into());
        }
    }

    let newest = { history.lock().await.list(Some(1)).first().cloned() };
    if let Some(entry) = newest {
        info!(file = %entry.resolved_file_path, "Recorded in history");
        println!("Saved (best guess): {}", entry.resolved_file_path);
        if args.reveal
            && let Err(err) = controller.reveal(&entry).await
        {
            warn!(%err, "Could not open the download location");
        }
    }

    Ok(())
}

/// Renders the observed status stream as a progress bar until a terminal
/// state arrives.
fn spawn_progress_bar(
    mut rx: watch::Receiver<DownloadStatus>,
    quiet: bool,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let bar = ProgressBar::new(100);
        if quiet {
            bar.set_draw_target(ProgressDrawTarget::hidden());
        }
        bar.set_style(
            ProgressStyle::with_template("{bar:40} {pos:>3}% {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );

        loop {
            if rx.changed().await.is_err() {
                break;
            }
            let status = rx.borrow_and_update().clone();
            match status.phase {
                DownloadPhase::Running => {
                    bar.set_position(u64::from(status.progress_percent));
                    let message = match (&status.speed_estimate, &status.eta_estimate) {
                        (Some(speed), Some(eta)) => {
                            format!("{} ({speed}, ETA {eta})", status.message)
                        }
                        _ => status.message.clone(),
                    };
                    bar.set_message(message);
                }
                DownloadPhase::Succeeded => {
                    bar.set_position(100);
                    bar.finish_with_message(status.message.clone());
                    break;
                }
                DownloadPhase::Failed => {
                    bar.abandon_with_message(format!("Error: {}", status.message));
                    break;
                }
                DownloadPhase::Idle => {}
            }
        }
    })
}

async fn print_history(history: &Arc<Mutex<HistoryStore>>, limit: usize) {
    let history = history.lock().await;
    if history.is_empty() {
        println!("No downloads yet");
        return;
    }
    let stats = history.stats();
    println!(
        "Recent downloads ({} video, {} audio):",
        stats.videos, stats.audio
    );
    for entry in history.list(Some(limit)) {
        println!(
            "  {} [{:>5}] {}  ->  {}",
            entry.completed_at,
            entry.quality.label(),
            entry.label,
            entry.resolved_file_path
        );
    }
}
