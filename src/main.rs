//! Lightbox gestures CLI
//!
//! Replays recorded input traces through the gesture pipeline, or drives it live from
//! newline-delimited JSON sensor events on stdin.

use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use std::path::Path;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lightbox_gestures::config::{ConfigWatcher, GestureConfig};
use lightbox_gestures::controller::NavigationEvent;
use lightbox_gestures::gesture::{GestureEvent, InputSource};
use lightbox_gestures::replay::{replay, Pipeline, ReplayReport, Trace};
use lightbox_gestures::sensors::SensorEvent;
use lightbox_gestures::timers::TokioScheduler;

/// Lightbox gestures - swipe and pull recognition for slide navigation
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "gestures.yaml")]
    config: String,

    /// Log level (error, warn, info, debug, trace)
    #[arg(short, long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,

    /// Replay a recorded trace (YAML or JSON) instead of reading stdin
    #[arg(short, long)]
    trace: Option<String>,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    /// Virtual time to let pending timers run after the last trace step
    #[arg(long, default_value = "1000")]
    settle_ms: u64,

    /// Re-run on configuration changes
    #[arg(short, long)]
    watch: bool,

    /// Validate the configuration file and exit
    #[arg(long)]
    check_config: bool,

    /// Print the configuration JSON schema and exit
    #[arg(long)]
    print_schema: bool,
}

// Recognizer timers and input handling share one thread, so they never interleave
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();

    init_logging(&args.log_level, args.log_json)?;

    if args.print_schema {
        let schema = serde_json::to_string_pretty(&GestureConfig::json_schema())
            .context("Failed to serialize config schema")?;
        println!("{}", schema);
        return Ok(());
    }

    info!("Configuration file: {}", args.config);

    if args.check_config {
        return check_config(&args.config).await;
    }

    match &args.trace {
        Some(trace_path) => run_trace(&args, trace_path).await,
        None => run_live(&args).await,
    }
}

async fn check_config(path: &str) -> Result<()> {
    match GestureConfig::load(path).await {
        Ok(config) => {
            println!("{} {}", "✓".green().bold(), path);
            println!(
                "  container width {}px, animation {}ms, {} slide(s){}",
                config.container_width.to_string().green(),
                config.swipe_animation_duration_ms.to_string().green(),
                config.carousel.slides.to_string().green(),
                if config.carousel.finite { ", finite" } else { "" }
            );
            Ok(())
        }
        Err(e) => {
            println!("{} {}", "✗".red().bold(), path);
            Err(e)
        }
    }
}

/// Load the config file, or fall back to defaults when there is none
async fn load_config(path: &str) -> Result<GestureConfig> {
    if Path::new(path).exists() {
        GestureConfig::load(path).await
    } else {
        warn!("Config file {} not found, using defaults", path);
        Ok(GestureConfig::default())
    }
}

async fn run_trace(args: &Args, trace_path: &str) -> Result<()> {
    let trace = Trace::load(trace_path).await?;
    info!("Loaded trace {} ({} steps)", trace_path, trace.steps.len());

    if !args.watch {
        let config = load_config(&args.config).await?;
        let report = replay(&config, &trace, args.settle_ms)?;
        return print_report(&report, args.json);
    }

    let (mut config_watcher, config) = ConfigWatcher::new(args.config.clone()).await?;
    let report = replay(&config, &trace, args.settle_ms)?;
    print_report(&report, args.json)?;

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            Some(new_config) = config_watcher.next_config() => {
                info!("Configuration file changed, replaying...");
                match replay(&new_config, &trace, args.settle_ms) {
                    Ok(report) => print_report(&report, args.json)?,
                    Err(e) => warn!("Replay failed with new config: {}", e),
                }
            }
            _ = &mut shutdown => break,
        }
    }

    Ok(())
}

async fn run_live(args: &Args) -> Result<()> {
    let mut config_watcher = if args.watch {
        let (watcher, config) = ConfigWatcher::new(args.config.clone()).await?;
        Some((watcher, (*config).clone()))
    } else {
        None
    };
    let config = match &config_watcher {
        Some((_, config)) => config.clone(),
        None => load_config(&args.config).await?,
    };

    let scheduler = Arc::new(TokioScheduler::new());
    let mut pipeline = live_pipeline(&config, &scheduler, args.json)?;
    info!("Reading sensor events from stdin (one JSON object per line)");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                match line.context("Failed to read stdin")? {
                    Some(line) => handle_line(&pipeline, &line),
                    None => {
                        info!("Input closed");
                        break;
                    }
                }
            }
            Some(new_config) = next_config(&mut config_watcher) => {
                info!("Configuration file changed, rebuilding pipeline...");
                match live_pipeline(&new_config, &scheduler, args.json) {
                    Ok(rebuilt) => pipeline = rebuilt,
                    Err(e) => warn!("Failed to apply config (keeping old pipeline): {}", e),
                }
            }
            _ = &mut shutdown => break,
        }
    }

    info!(index = pipeline.controller().index(), "Stopped");
    Ok(())
}

async fn next_config(watcher: &mut Option<(ConfigWatcher, GestureConfig)>) -> Option<GestureConfig> {
    match watcher {
        Some((watcher, _)) => watcher.next_config().await,
        None => std::future::pending().await,
    }
}

fn live_pipeline(
    config: &GestureConfig,
    scheduler: &Arc<TokioScheduler>,
    json: bool,
) -> Result<Pipeline> {
    let pipeline = Pipeline::new(
        config,
        scheduler.clone(),
        scheduler.clone(),
        Some(Arc::new(move |event: NavigationEvent| {
            print_navigation(&event, json)
        })),
    )?;
    Ok(pipeline)
}

fn handle_line(pipeline: &Pipeline, line: &str) {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return;
    }

    match serde_json::from_str::<SensorEvent>(line) {
        Ok(event) => {
            debug!(?event, "Sensor event");
            pipeline.dispatch(&event);
        }
        Err(e) => warn!("Ignoring malformed sensor event: {}", e),
    }
}

fn print_navigation(event: &NavigationEvent, json: bool) {
    if json {
        match serde_json::to_string(event) {
            Ok(line) => println!("{}", line),
            Err(e) => error!("Failed to serialize navigation event: {}", e),
        }
        return;
    }

    match event {
        NavigationEvent::Navigated { index } => {
            println!("{} slide {}", "→".green().bold(), index.to_string().bold())
        }
        NavigationEvent::Close => println!("{} close", "✗".yellow().bold()),
    }
}

fn print_report(report: &ReplayReport, json: bool) -> Result<()> {
    if json {
        let out = serde_json::to_string_pretty(report).context("Failed to serialize report")?;
        println!("{}", out);
        return Ok(());
    }

    println!("\n{}", "=== Gesture Lifecycle ===".bold().cyan());
    if report.records.is_empty() {
        println!("  {}", "(no gestures recognized)".dimmed());
    }
    for record in &report.records {
        let source = match record.source {
            InputSource::Pointer => "pointer".blue(),
            InputSource::Wheel => "wheel".magenta(),
        };
        println!(
            "  {:>7}  {:<8} {}",
            format!("{}ms", record.at_ms).dimmed(),
            source,
            describe(&record.event)
        );
    }

    println!("\n{}", "=== Navigation ===".bold().cyan());
    if report.navigation.is_empty() {
        println!("  {}", "(none)".dimmed());
    }
    for event in &report.navigation {
        print!("  ");
        print_navigation(event, false);
    }

    println!(
        "\n  Final slide: {}  state: {:?}  ended at {}ms",
        report.final_index.to_string().green().bold(),
        report.final_state,
        report.ended_at_ms
    );
    Ok(())
}

fn describe(event: &GestureEvent) -> ColoredString {
    match *event {
        GestureEvent::SwipeStart => "swipe start".bold(),
        GestureEvent::SwipeProgress { offset } => format!("swipe progress {:+.1}", offset).normal(),
        GestureEvent::SwipeFinish {
            offset,
            duration_ms,
        } => format!("swipe finish {:+.1} in {}ms", offset, duration_ms).green(),
        GestureEvent::SwipeCancel { offset } => format!("swipe cancel {:+.1}", offset).yellow(),
        GestureEvent::PullStart => "pull start".bold(),
        GestureEvent::PullProgress { offset } => format!("pull progress {:+.1}", offset).normal(),
        GestureEvent::PullFinish {
            offset,
            duration_ms,
        } => format!("pull finish {:+.1} in {}ms", offset, duration_ms).green(),
        GestureEvent::PullCancel { offset } => format!("pull cancel {:+.1}", offset).yellow(),
    }
}

fn init_logging(level: &str, json: bool) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    // Logs go to stderr so stdout stays machine-readable
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .try_init()?;
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_thread_names(false)
                    .with_writer(std::io::stderr),
            )
            .try_init()?;
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to install CTRL+C signal handler: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
