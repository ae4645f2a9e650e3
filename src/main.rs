use anyhow::Result;
use clap::{Parser, Subcommand};
use junkgen::*;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;

use junkgen::disk_repo::FreeSpaceProbe;
use junkgen::models::{RunRequest, RunState, SizeUnit};

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

#[derive(Parser)]
#[command(name = "junkgen", version)]
#[command(about = "Junk file generator: write random-byte files to use up disk space")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate junk files (ctrl-c cancels at the next chunk)
    Generate {
        /// Keep writing files until the volume is full
        #[arg(long)]
        fill: bool,
        /// Write a fixed number of files even if the config enables fill mode
        #[arg(long, conflicts_with = "fill")]
        no_fill: bool,
        /// Size of each file, in --unit
        #[arg(short, long)]
        size: Option<u64>,
        #[arg(short, long, value_enum)]
        unit: Option<SizeUnit>,
        /// Number of files (implies fixed-count mode)
        #[arg(short = 'n', long, conflicts_with = "fill")]
        count: Option<u64>,
        /// Output folder (default: documents folder)
        #[arg(short, long)]
        dir: Option<PathBuf>,
        /// Write granularity in bytes
        #[arg(long)]
        chunk_size: Option<u64>,
        /// Print progress snapshots as JSON lines
        #[arg(long)]
        json: bool,
    },

    /// Show free space on the volume holding the output folder
    Free {
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },

    /// Open the output folder in the file browser
    Open {
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let app_config = config::AppConfig::load()?;
    tracing::debug!(
        name = version::NAME,
        version = version::VERSION,
        "{}",
        version::APPLICATION_NAME
    );

    match cli.command {
        Commands::Free { dir } => {
            let dir = app_config.output_dir(dir);
            let probe = disk_repo::VolumeProbe::new();
            println!("{}", report::free_space_line(probe.free_bytes(&dir)));
            Ok(ExitCode::SUCCESS)
        }

        Commands::Open { dir } => {
            folders::open_folder(&app_config.output_dir(dir))?;
            Ok(ExitCode::SUCCESS)
        }

        Commands::Generate {
            fill,
            no_fill,
            size,
            unit,
            count,
            dir,
            chunk_size,
            json,
        } => {
            let request = app_config.run_request(config::RunOverrides {
                fill: match (fill, no_fill) {
                    (true, _) => Some(true),
                    (_, true) => Some(false),
                    _ => None,
                },
                size,
                unit,
                count,
                dir,
            })?;

            let mut engine_config = app_config.engine_config();
            if let Some(bytes) = chunk_size {
                engine_config.chunk_size_bytes = bytes;
            }
            let engine = Arc::new(engine::GenerationEngine::new(
                Arc::new(disk_repo::VolumeProbe::new()),
                engine_config,
            ));
            let render_interval = Duration::from_millis(app_config.progress.render_interval_ms);
            run_generation(engine, request, render_interval, json).await
        }
    }
}

async fn run_generation(
    engine: Arc<engine::GenerationEngine>,
    request: RunRequest,
    render_interval: Duration,
    json: bool,
) -> Result<ExitCode> {
    let mut rx = engine.subscribe();
    let handle = engine.start(request)?;

    let cancel_engine = engine.clone();
    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Received ctrl-c; cancelling after the current chunk");
            cancel_engine.cancel();
        }
    });

    let mut stdout = std::io::stdout();
    let mut last_render: Option<Instant> = None;
    loop {
        match rx.recv().await {
            Ok(snapshot) => {
                let terminal = snapshot.state.is_terminal();
                let due = last_render.is_none_or(|t| t.elapsed() >= render_interval);
                if terminal || due {
                    if json {
                        writeln!(stdout, "{}", serde_json::to_string(&snapshot)?)?;
                    } else if terminal {
                        writeln!(stdout, "\r{}", report::status_line(&snapshot))?;
                    } else {
                        write!(stdout, "\r{}", report::status_line(&snapshot))?;
                    }
                    stdout.flush()?;
                    last_render = Some(Instant::now());
                }
                if terminal {
                    break;
                }
            }
            // Only the newest snapshot matters; skipped ones are superseded.
            Err(RecvError::Lagged(_)) => continue,
            Err(RecvError::Closed) => break,
        }
    }

    let state = match handle.join().await {
        Ok(last) => last.state,
        Err(e) => {
            tracing::error!(error = %e, operation = "generate", "worker did not finish cleanly");
            RunState::Failed
        }
    };
    ctrl_c.abort();
    Ok(match state {
        RunState::Failed => ExitCode::FAILURE,
        _ => ExitCode::SUCCESS,
    })
}
