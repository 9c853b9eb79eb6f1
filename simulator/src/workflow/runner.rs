use crate::generator::template::playback_ticks;
use crate::workflow::config::{ReplayConfig, ScriptStep};
use anyhow::Context;
use lietouscore::analysis::{PredictionSeries, Verdict};
use lietouscore::math::SeriesSummary;
use lietouscore::sync::{SyncEngine, SyncEvent, ViewportWindow};
use lietouscore::telemetry::MetricsSnapshot;
use serde::Serialize;

/// Engine output captured after one replayed event.
#[derive(Debug, Clone, Serialize)]
pub struct FrameRecord {
    pub event: String,
    pub current_time: f64,
    pub active_index: Option<usize>,
    pub active_verdict: Option<Verdict>,
    pub window: ViewportWindow,
}

pub struct ReplayResult {
    pub duration: f64,
    pub frames: Vec<FrameRecord>,
    pub summary: SeriesSummary,
    pub metrics: MetricsSnapshot,
    /// Frames whose window broke the content bounds.
    pub violations: Vec<String>,
}

#[derive(Clone)]
pub struct Runner {
    config: ReplayConfig,
}

impl Runner {
    pub fn new(config: ReplayConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ReplayConfig {
        &self.config
    }

    pub fn execute(
        &self,
        series: &PredictionSeries,
        reported_fps: Option<f64>,
    ) -> anyhow::Result<ReplayResult> {
        let duration = series.max_end_time();
        let mut engine = SyncEngine::new(self.config.sync.clone(), series.clone())
            .context("building sync engine")?;

        engine.handle(SyncEvent::DurationLoaded(duration));
        if let Some(fps) = reported_fps {
            engine.handle(SyncEvent::FpsUpdated(fps));
        }

        let mut frames = Vec::new();
        let mut violations = Vec::new();
        for step in self.config.script_or_default() {
            for (label, event) in expand_step(&step) {
                engine.handle(event);
                let frame = capture(&engine, label);
                if let Some(problem) = check_window(&frame, duration) {
                    violations.push(problem);
                }
                frames.push(frame);
            }
        }

        Ok(ReplayResult {
            duration,
            frames,
            summary: SeriesSummary::from_points(series),
            metrics: engine.metrics(),
            violations,
        })
    }
}

fn expand_step(step: &ScriptStep) -> Vec<(String, SyncEvent)> {
    match step {
        ScriptStep::Play { from, to, tick } => playback_ticks(*from, *to, *tick)
            .into_iter()
            .map(|time| (format!("tick {time:.2}"), SyncEvent::TimeUpdated(time)))
            .collect(),
        ScriptStep::Seek { to } => vec![(format!("seek {to:.2}"), SyncEvent::TimeUpdated(*to))],
        ScriptStep::Command { command } => {
            vec![(format!("{command:?}"), SyncEvent::Command(*command))]
        }
        ScriptStep::Fps { fps } => vec![(format!("fps {fps}"), SyncEvent::FpsUpdated(*fps))],
    }
}

fn capture(engine: &SyncEngine, event: String) -> FrameRecord {
    let frame = engine.frame();
    FrameRecord {
        event,
        current_time: frame.current_time,
        active_index: frame.active_index,
        active_verdict: engine.active_point().map(|point| point.binary_prediction),
        window: frame.window,
    }
}

fn check_window(frame: &FrameRecord, duration: f64) -> Option<String> {
    let window = frame.window;
    if duration <= 0.0 {
        return None;
    }
    if window.min < 0.0 || window.min >= window.max || window.max > duration + 1e-9 {
        Some(format!(
            "{}: window {:.3}..{:.3} outside 0..{:.3}",
            frame.event, window.min, window.max, duration
        ))
    } else {
        None
    }
}
