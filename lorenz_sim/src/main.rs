//! Lorenz Playback CLI
//!
//! Integrates the Lorenz system once, then plays the x/y projection back in
//! fixed-size windows on a timer.

use clap::{Parser, ValueEnum};
use lorenz_core::{LorenzConfig, Trajectory};
use lorenz_env::{PlaybackContext, TokioContext};
use lorenz_sim::{startup, FrameSink, NullSink, PlaybackRunner, PlaybackSummary, RerunLogger, SimContext};
use lorenz_sim::{SimExport, SimResult};
use std::num::NonZeroUsize;
use std::sync::Arc;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Clock {
    /// Wall-clock ticks (tokio timers)
    Realtime,
    /// Virtual time, runs instantly
    Virtual,
}

/// Lorenz attractor playback
#[derive(Parser, Debug, Clone)]
#[command(name = "lorenz-sim")]
#[command(about = "Integrate the Lorenz system and play it back in windows", long_about = None)]
struct Args {
    /// JSON config file (flags below override it)
    #[arg(short, long)]
    config: Option<String>,

    /// Prandtl number
    #[arg(long)]
    sigma: Option<f64>,

    /// Rayleigh number
    #[arg(long)]
    rho: Option<f64>,

    /// Geometric factor
    #[arg(long)]
    beta: Option<f64>,

    /// Number of sample times over the span
    #[arg(short, long)]
    samples: Option<usize>,

    /// Points emitted per tick
    #[arg(short, long)]
    window: Option<NonZeroUsize>,

    /// Ticks before playback stops
    #[arg(short = 't', long)]
    max_ticks: Option<u64>,

    /// Tick period in milliseconds
    #[arg(short, long)]
    interval_ms: Option<u64>,

    /// Points kept in the displayed trace
    #[arg(long)]
    max_points: Option<usize>,

    /// Clock driving the ticks
    #[arg(long, value_enum, default_value = "realtime")]
    clock: Clock,

    /// Export playback to a JSON file
    #[arg(long)]
    export: Option<String>,

    /// Show the terminal chart (requires the `dashboard` feature)
    #[arg(long)]
    dashboard: bool,

    /// Stream to a Rerun viewer (requires the `visualization` feature)
    #[arg(long)]
    visualize: bool,

    /// JSON summary on stdout
    #[arg(long)]
    json: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    /// Defaults, then the config file, then flags.
    fn load_config(&self) -> SimResult<LorenzConfig> {
        let mut config = match &self.config {
            Some(path) => {
                info!("Loading config from {}", path);
                LorenzConfig::from_file(path)?
            }
            None => LorenzConfig::default(),
        };

        if let Some(sigma) = self.sigma {
            config.system.sigma = sigma;
        }
        if let Some(rho) = self.rho {
            config.system.rho = rho;
        }
        if let Some(beta) = self.beta {
            config.system.beta = beta;
        }
        if let Some(samples) = self.samples {
            config.samples = samples;
        }
        if let Some(window) = self.window {
            config.playback.window = window;
        }
        if let Some(max_ticks) = self.max_ticks {
            config.playback.max_ticks = max_ticks;
        }
        if let Some(interval_ms) = self.interval_ms {
            config.playback.interval_ms = interval_ms;
        }
        if let Some(max_points) = self.max_points {
            config.playback.max_points = max_points;
        }

        Ok(config)
    }
}

/// Runs playback on its own runtime, feeding exporter, visualizer and `extra`.
fn play(
    trajectory: Arc<Trajectory>,
    config: &LorenzConfig,
    args: &Args,
    extra: Box<dyn FrameSink + Send>,
) -> SimResult<PlaybackSummary> {
    let runtime = tokio::runtime::Builder::new_current_thread().enable_time().build()?;

    let ctx: Arc<dyn PlaybackContext> = match args.clock {
        Clock::Realtime => TokioContext::shared(),
        Clock::Virtual => SimContext::shared(),
    };

    let visualizer = if args.visualize {
        let logger = RerunLogger::new("lorenz_playback");
        logger.log_trajectory(&trajectory);
        logger
    } else {
        RerunLogger::disabled()
    };
    let export = args.export.as_ref().map(|_| SimExport::new(config.clone()));

    let mut sinks = (export, (visualizer, extra));
    let runner = PlaybackRunner::new(trajectory, config.playback.clone());
    let summary = runtime.block_on(runner.run(ctx.as_ref(), &mut sinks))?;

    if let (Some(export), Some(path)) = (&sinks.0, &args.export) {
        export.write_to_file(path)?;
        info!("Exported {} frames to {}", export.frames.len(), path);
    }

    Ok(summary)
}

#[cfg(feature = "dashboard")]
fn play_with_dashboard(
    trajectory: Arc<Trajectory>,
    config: &LorenzConfig,
    args: &Args,
) -> SimResult<PlaybackSummary> {
    use lorenz_core::dashboard::TraceDashboard;

    let (tx, rx) = crossbeam::channel::unbounded();
    let mut dashboard = TraceDashboard::new(rx, &config.playback).with_extent(&trajectory);

    let handle = {
        let config = config.clone();
        let args = args.clone();
        std::thread::spawn(move || play(trajectory, &config, &args, Box::new(tx)))
    };

    let shown = dashboard.run();
    drop(dashboard);

    // Playback keeps its tick budget even if the chart was closed early.
    finish_playback(shown, handle)
}

/// Joins the playback thread, then reports a chart failure if there was one.
#[cfg(any(feature = "dashboard", test))]
fn finish_playback(
    shown: std::io::Result<()>,
    handle: std::thread::JoinHandle<SimResult<PlaybackSummary>>,
) -> SimResult<PlaybackSummary> {
    let played = handle.join().map_err(|_| lorenz_sim::SimError::PlaybackPanicked)?;
    shown?;
    played
}

#[cfg(not(feature = "dashboard"))]
fn play_with_dashboard(
    trajectory: Arc<Trajectory>,
    config: &LorenzConfig,
    args: &Args,
) -> SimResult<PlaybackSummary> {
    tracing::warn!("Dashboard not available (compile with --features dashboard), running headless");
    play(trajectory, config, args, Box::new(NullSink))
}

fn run(args: &Args) -> SimResult<PlaybackSummary> {
    let config = args.load_config()?;
    let trajectory = startup(&config)?;

    if args.dashboard {
        play_with_dashboard(trajectory, &config, args)
    } else {
        play(trajectory, &config, args, Box::new(NullSink))
    }
}

fn main() {
    let args = Args::parse();

    // Initialize logging; the terminal belongs to the chart when it is shown
    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let builder = FmtSubscriber::builder().with_max_level(level);
    let installed = if args.dashboard && cfg!(feature = "dashboard") {
        tracing::subscriber::set_global_default(builder.with_writer(std::io::sink).finish())
    } else {
        tracing::subscriber::set_global_default(builder.finish())
    };
    if let Err(e) = installed {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }

    if !args.json {
        info!("Lorenz Playback v{}", env!("CARGO_PKG_VERSION"));
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    }

    let summary = match run(&args) {
        Ok(summary) => summary,
        Err(e) => {
            error!("✗ {}", e);
            if args.json {
                println!("{}", serde_json::json!({ "error": e.to_string() }));
            }
            std::process::exit(1);
        }
    };

    if args.json {
        match serde_json::to_string_pretty(&summary) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                error!("Failed to serialize summary: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
        info!(
            "✓ {} ticks, final cursor {}, {} full cycles, {} short windows, {:.1} ms",
            summary.ticks, summary.final_cursor, summary.cycles, summary.short_windows, summary.elapsed_ms
        );
    }
}
