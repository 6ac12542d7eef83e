//! Drowsiness Monitor - Main Entry Point

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use dms::{DrowsinessStateEstimator, Monitor};
use dms_cli::{
    apply_overrides, channel, init_logging, load_config, produce, ConsoleSink, OutputFormat,
    Preset,
};
use tokio::io::BufReader;
use tracing::{info, Level};

/// Replay a detection trace through the drowsiness estimator.
#[derive(Parser)]
#[command(name = "drowsiness-monitor", version)]
struct Cli {
    /// JSON-lines detection trace ("-" for stdin).
    trace: PathBuf,

    /// Config file (TOML, JSON or YAML).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Threshold preset; replaces the threshold from the config file.
    #[arg(long, value_enum)]
    preset: Option<Preset>,

    /// Eye-closure threshold in milliseconds; overrides everything else.
    #[arg(long)]
    threshold_ms: Option<u64>,

    /// Print one JSON object per sample.
    #[arg(long)]
    json: bool,

    /// Colour status text.
    #[arg(long)]
    color: bool,

    /// Stop at the first drowsy sample.
    #[arg(long)]
    stop_on_drowsy: bool,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long, default_value = "info")]
    log_level: Level,

    /// Emit logs as JSON.
    #[arg(long)]
    log_json: bool,

    /// Samples buffered between trace reader and monitor.
    #[arg(long, default_value = "64")]
    channel_capacity: usize,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level, cli.log_json)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("building tokio runtime")?;
    let result = runtime.block_on(run(cli));

    // an interactive stdin read cannot be cancelled; don't wait on it
    runtime.shutdown_timeout(Duration::from_millis(100));
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    info!("=== Drowsiness Monitor v{} ===", env!("CARGO_PKG_VERSION"));

    let mut config = load_config(cli.config.as_deref()).context("loading configuration")?;
    apply_overrides(&mut config, cli.preset, cli.threshold_ms)?;
    let estimator = DrowsinessStateEstimator::new(&config)?;
    info!("Using config: {:?}", config);

    let (tx, mut source) = channel(cli.channel_capacity);
    let min_confidence = config.min_confidence;

    let producer = if cli.trace.as_os_str() == "-" {
        tokio::spawn(produce(BufReader::new(tokio::io::stdin()), tx, min_confidence))
    } else {
        let file = tokio::fs::File::open(&cli.trace)
            .await
            .with_context(|| format!("opening trace {}", cli.trace.display()))?;
        tokio::spawn(produce(BufReader::new(file), tx, min_confidence))
    };

    let format = if cli.json { OutputFormat::Json } else { OutputFormat::Text };
    let color = cli.color;
    let stop_on_drowsy = cli.stop_on_drowsy;

    let consumer = tokio::task::spawn_blocking(move || -> anyhow::Result<_> {
        let mut monitor = Monitor::new(estimator);
        let mut sink = ConsoleSink::new(std::io::stdout(), format)
            .with_color(color)
            .stop_on_drowsy(stop_on_drowsy);

        let stats = monitor.run(&mut source, &mut sink)?;
        sink.finish(&stats)?;
        Ok(stats)
    });

    let stats = consumer.await.context("monitor task failed")??;
    let sent = producer.await.context("trace reader task failed")??;

    info!(
        "Replayed {} samples ({} evaluated, {} drowsy episodes)",
        sent, stats.samples, stats.drowsy_episodes
    );

    Ok(())
}
