use anyhow::Context;
use clap::Parser;
use generator::series::build_series_from_config;
use gui_bridge::bridge::{bind_address, GuiBridge};
use gui_bridge::model::BridgeModel;
use lietouscore::analysis::{PredictionResponse, PredictionSeries};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::runtime::Builder as TokioBuilder;
use tokio::signal;
use workflow::config::ReplayConfig;
use workflow::runner::Runner;

mod generator;
mod gui_bridge;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Replay driver and analysis-service fixture for Lie To Us")]
struct Args {
    /// Replay a playback session offline and emit a summary
    #[arg(long, default_value_t = false)]
    offline: bool,
    /// Load a replay config from YAML
    #[arg(long)]
    workflow: Option<PathBuf>,
    /// Replay a recorded `/prediction-data` JSON body instead of a synthetic series
    #[arg(long)]
    series: Option<PathBuf>,
    #[arg(long, default_value_t = 120)]
    chunks: usize,
    #[arg(long, default_value_t = 30.0)]
    fps: f64,
    #[arg(long, default_value_t = 7)]
    seed: u64,
    /// Keep the fixture service alive for the visualizer
    #[arg(long, default_value_t = false)]
    serve: bool,
    #[arg(long, default_value_t = 8000)]
    port: u16,
    /// PDF returned by `/report`
    #[arg(long)]
    report: Option<PathBuf>,
    #[arg(long, default_value = "Videos")]
    upload_dir: PathBuf,
}

fn load_recorded_series(path: &Path) -> anyhow::Result<(PredictionSeries, Option<f64>)> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("reading recorded series {}", path.display()))?;
    let response: PredictionResponse = serde_json::from_str(&contents)
        .with_context(|| format!("parsing recorded series {}", path.display()))?;
    response
        .into_series()
        .with_context(|| format!("validating recorded series {}", path.display()))
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let replay_config = if let Some(path) = args.workflow {
        ReplayConfig::load(path)?
    } else {
        ReplayConfig::from_args(args.chunks, args.fps, args.seed)
    };

    let (series, reported_fps) = match &args.series {
        Some(path) => load_recorded_series(path)?,
        None => (
            build_series_from_config(&replay_config.generator)?,
            Some(replay_config.generator.fps),
        ),
    };
    let fps = reported_fps.unwrap_or(replay_config.sync.default_fps);

    let runner = Runner::new(replay_config);
    log::info!(
        "replaying {} chunks with the {:?} locator",
        series.len(),
        runner.config().sync.locator
    );
    let gui_bridge = GuiBridge::new(
        BridgeModel::new(series.clone(), fps, args.upload_dir.clone()).with_report(args.report),
    );

    if args.offline {
        let result = runner.execute(&series, reported_fps)?;
        let summary = &result.summary;

        println!(
            "Offline replay -> chunks {}, duration {:.1}s, frames {}, deceptive {:.1}%, violations {}",
            summary.chunks,
            result.duration,
            result.frames.len(),
            summary.deceptive_percent,
            result.violations.len()
        );
        for violation in &result.violations {
            println!("  window violation: {violation}");
        }

        gui_bridge.publish(series.clone(), fps)?;
        gui_bridge.publish_status("Offline replay results ready.");

        let report = format!(
            "chunks={} duration={:.3} frames={} time_updates={} commands={} fallbacks={} mean_score={:.4} violations={}\n",
            summary.chunks,
            result.duration,
            result.frames.len(),
            result.metrics.time_updates,
            result.metrics.commands,
            result.metrics.fallbacks,
            summary.mean_score,
            result.violations.len()
        );
        let report_path = PathBuf::from("tools/data/offline_replay.log");
        if let Some(parent) = report_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(report_path)?;
        file.write_all(report.as_bytes())?;
    }
    if args.serve {
        gui_bridge.serve(bind_address(args.port))?;
        gui_bridge.publish_status("Fixture service running (Ctrl+C to stop)...");
        let runtime = TokioBuilder::new_current_thread()
            .enable_all()
            .build()
            .context("creating runtime for signal handling")?;
        runtime.block_on(async {
            signal::ctrl_c().await.context("awaiting Ctrl+C to exit")?;
            Ok::<(), anyhow::Error>(())
        })?;
    }

    Ok(())
}
