//! Gesture Stream CLI Application
//!
//! Command-line host for the gesture-pipeline library. It plays the role a
//! sensor application would: loads the gesture catalog and grouping
//! settings, builds the engine, registers listeners, and feeds frame
//! streams (recorded or synthetic), printing the resulting events.

use anyhow::{bail, Result};
use clap::Parser;
use gesture_pipeline::{EventHub, GestureCatalog, GestureEngine, PipelineConfig, Severity};
use serde_json::json;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

mod config;
mod replay;

/// Gesture Stream - Replay gesture score streams and print pipeline events
#[derive(Parser, Debug)]
#[command(name = "gesture-cli")]
#[command(about = "Replay gesture recognition streams through the pipeline", long_about = None)]
#[command(version)]
struct Args {
    /// Path to the gesture catalog manifest (JSON)
    #[arg(short = 'g', long, value_name = "FILE")]
    catalog: Option<PathBuf>,

    /// Path to the settings file (settings.toml) with links/ignores/window
    #[arg(short, long, value_name = "FILE")]
    settings: Option<PathBuf>,

    /// Path to a recorded frame stream (JSON) to replay
    #[arg(short, long, value_name = "FILE")]
    replay: Option<PathBuf>,

    /// Generate and replay a synthetic stream of this many frames per body
    #[arg(long, value_name = "COUNT")]
    synthesize: Option<usize>,

    /// Number of bodies for the synthetic stream
    #[arg(long, value_name = "COUNT", default_value_t = 2)]
    bodies: usize,

    /// Number of body slots in the engine arena
    #[arg(long, value_name = "COUNT", default_value_t = gesture_pipeline::DEFAULT_BODY_SLOTS)]
    slots: usize,

    /// Print events as JSON lines instead of plain text
    #[arg(long)]
    json: bool,

    /// Write an example settings file and exit
    #[arg(long, value_name = "FILE")]
    write_example_settings: Option<PathBuf>,

    /// Verbosity level (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,
}

/// Event totals across one run
#[derive(Default)]
struct EventCounters {
    discrete: AtomicUsize,
    continuous: AtomicUsize,
    sets: AtomicUsize,
    errors: AtomicUsize,
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(args.verbose, args.quiet);

    log::info!("Gesture Stream CLI v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Using pipeline library v{}", gesture_pipeline::VERSION);

    if let Some(path) = &args.write_example_settings {
        config::write_example_settings(path)?;
        println!("✓ Example settings written to {:?}", path);
        return Ok(());
    }

    replay_mode(&args)
}

/// Replay mode - build the engine and feed it a frame stream
fn replay_mode(args: &Args) -> Result<()> {
    println!("═══════════════════════════════════════════════");
    println!("  Gesture Stream - Replay Mode");
    println!("═══════════════════════════════════════════════\n");

    // Listeners first: collaborator load failures must reach them
    let events = Arc::new(EventHub::new());
    let counters = Arc::new(EventCounters::default());
    register_listeners(&events, &counters, args.json, args.quiet);

    // Load the gesture catalog
    let Some(catalog_path) = &args.catalog else {
        println!("Gesture Stream - No catalog specified");
        println!("\nQuick Start:");
        println!("  gesture-cli --catalog gestures.json --synthesize 100");
        println!("  gesture-cli --catalog gestures.json --settings settings.toml --replay session.json");
        println!("\nFirst run:");
        println!("  gesture-cli --write-example-settings settings.toml");
        println!("\nUse --help for more options");
        return Ok(());
    };

    print!("Loading catalog: {:?} ... ", catalog_path);
    io::stdout().flush()?;
    let catalog = match GestureCatalog::from_json_file(catalog_path) {
        Ok(catalog) => {
            println!("✓");
            catalog
        }
        Err(e) => {
            println!("✗");
            events.raise_message(Severity::Error, format!("Couldn't load gesture catalog: {}", e));
            return Err(e.into());
        }
    };

    // Load settings (optional; defaults apply without a file)
    let config = match &args.settings {
        Some(path) => {
            print!("Loading settings: {:?} ... ", path);
            io::stdout().flush()?;
            match config::load_settings(path).and_then(|s| s.to_pipeline_config()) {
                Ok(config) => {
                    println!("✓");
                    config
                }
                Err(e) => {
                    println!("✗");
                    events.raise_message(
                        Severity::Error,
                        format!("Couldn't load settings file: {:#}", e),
                    );
                    return Err(e);
                }
            }
        }
        None => PipelineConfig::new(),
    };

    let stats = catalog.stats();
    println!("\n📊 Gesture Catalog:");
    println!("  Discrete:   {}", stats.num_discrete);
    println!("  Continuous: {}", stats.num_continuous);
    println!("  Links:      {}", config.links().len());
    println!("  Window:     {} frames", config.window_size());

    let engine = GestureEngine::with_event_hub(catalog, config, args.slots, events)?;

    // Pick the frame stream
    let recording = match (&args.replay, args.synthesize) {
        (Some(path), _) => {
            println!("\n📄 Replaying recording: {:?}", path);
            replay::load_recording(path)?
        }
        (None, Some(frames)) => {
            println!("\n📄 Replaying synthetic stream: {} bodies × {} frames", args.bodies, frames);
            replay::synthesize(engine.catalog(), args.bodies, frames)
        }
        (None, None) => {
            bail!("Nothing to replay: pass --replay <file> or --synthesize <frames>")
        }
    };
    println!("───────────────────────────────────────────────\n");

    let stats = replay::run(&engine, &recording)?;

    println!("\n───────────────────────────────────────────────");
    println!("✓ Replay finished: {} bodies, {} frames", stats.bodies, stats.frames);
    println!("  Gesture results:  {}", counters.discrete.load(Ordering::Relaxed));
    println!("  Progress results: {}", counters.continuous.load(Ordering::Relaxed));
    println!("  Result sets:      {}", counters.sets.load(Ordering::Relaxed));
    println!("  Error messages:   {}", counters.errors.load(Ordering::Relaxed));

    Ok(())
}

/// Subscribe the output listeners on every event category
fn register_listeners(
    events: &Arc<EventHub>,
    counters: &Arc<EventCounters>,
    as_json: bool,
    quiet: bool,
) {
    let seen = counters.clone();
    events.on_discrete_result(move |e| {
        seen.discrete.fetch_add(1, Ordering::Relaxed);
        if quiet {
            return;
        }
        if as_json {
            println!("{}", json!({ "event": "gesture_result", "data": e }));
        } else {
            println!("[gesture]  body={} {} {:.2}", e.tracking_id, e.name, e.score);
        }
    });

    let seen = counters.clone();
    events.on_continuous_result(move |e| {
        seen.continuous.fetch_add(1, Ordering::Relaxed);
        if quiet {
            return;
        }
        if as_json {
            println!("{}", json!({ "event": "progress_result", "data": e }));
        } else {
            println!("[progress] body={} {} {:.2}", e.tracking_id, e.name, e.score);
        }
    });

    let seen = counters.clone();
    events.on_result_set(move |e| {
        seen.sets.fetch_add(1, Ordering::Relaxed);
        if quiet {
            return;
        }
        if as_json {
            println!("{}", json!({ "event": "result_set", "data": e }));
        } else {
            println!(
                "[set]      body={} confidence={:?} progress={:?}",
                e.tracking_id,
                e.confidence.names(),
                e.progress.names()
            );
        }
    });

    events.on_tracking_changed(move |e| {
        if quiet {
            return;
        }
        if as_json {
            println!("{}", json!({ "event": "tracking_changed", "data": e }));
        } else {
            println!("[tracking] ids={:?}", e.tracking_ids);
        }
    });

    let seen = counters.clone();
    events.on_message(move |e| {
        if e.severity == Severity::Error {
            seen.errors.fetch_add(1, Ordering::Relaxed);
        }
        if as_json {
            println!("{}", json!({ "event": "message", "data": e }));
        } else {
            println!("[message]  ({}) {}", e.severity.code(), e.text);
        }
    });
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;
    use std::io::Write;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}
