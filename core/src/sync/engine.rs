use crate::analysis::{PredictionPoint, PredictionSeries};
use crate::prelude::{is_positive, ChunkLocator, SyncConfig, SyncResult};
use crate::sync::style::{style_series, MarkerStyle};
use crate::sync::timing::ChunkTiming;
use crate::sync::viewport::{self, ViewportCommand, ViewportWindow};
use crate::telemetry::{LogManager, MetricsRecorder, MetricsSnapshot};
use serde::Serialize;

/// Playback position as last reported by the video surface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PlaybackState {
    pub current_time: f64,
    pub video_duration: f64,
}

/// Inputs the engine reacts to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SyncEvent {
    TimeUpdated(f64),
    DurationLoaded(f64),
    FpsUpdated(f64),
    Command(ViewportCommand),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SyncState {
    pub playback: PlaybackState,
    pub window: ViewportWindow,
    pub timing: ChunkTiming,
}

impl SyncState {
    pub fn new(config: &SyncConfig) -> Self {
        Self {
            playback: PlaybackState::default(),
            window: ViewportWindow::initial(config.viewport_width),
            timing: ChunkTiming::from_config(config),
        }
    }
}

/// Applies one explicit command to the window; unusable inputs keep it as-is.
pub fn reduce_viewport(
    playback: &PlaybackState,
    window: ViewportWindow,
    command: ViewportCommand,
    config: &SyncConfig,
) -> ViewportWindow {
    let duration = playback.video_duration;
    let next = match command {
        ViewportCommand::ZoomIn => viewport::zoom_in(window, duration, config),
        ViewportCommand::ZoomOut => viewport::zoom_out(window, duration, config),
        ViewportCommand::ResetZoom => viewport::reset_zoom(duration, config.viewport_width),
        ViewportCommand::JumpToCurrent => {
            viewport::jump_to_current(playback.current_time, duration, config.viewport_width)
        }
    };
    next.unwrap_or(window)
}

/// Pure transition function for the whole sync state.
pub fn reduce(state: &SyncState, event: SyncEvent, config: &SyncConfig) -> SyncState {
    let mut next = *state;
    match event {
        SyncEvent::TimeUpdated(time) => {
            if !time.is_finite() {
                return next;
            }
            next.playback.current_time = time;
            // time zero is the player mounting; keep whatever window is shown
            if time != 0.0 && next.playback.video_duration > 0.0 {
                if let Some(window) = viewport::derive_viewport(
                    time,
                    next.playback.video_duration,
                    config.viewport_width,
                ) {
                    next.window = window;
                }
            }
        }
        SyncEvent::DurationLoaded(duration) => {
            if !is_positive(duration) {
                return next;
            }
            next.playback.video_duration = duration;
            if let Some(window) = viewport::reset_zoom(duration, config.viewport_width) {
                next.window = window;
            }
        }
        SyncEvent::FpsUpdated(fps) => {
            next.timing = next.timing.with_fps(fps);
        }
        SyncEvent::Command(command) => {
            next.window = reduce_viewport(&next.playback, next.window, command, config);
        }
    }
    next
}

/// Everything the chart needs to draw one update.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartFrame {
    pub window: ViewportWindow,
    pub current_time: f64,
    pub active_index: Option<usize>,
    pub seconds_per_chunk: f64,
    pub markers: Vec<MarkerStyle>,
}

/// Keeps one prediction series in step with playback and the chart viewport.
pub struct SyncEngine {
    config: SyncConfig,
    series: PredictionSeries,
    state: SyncState,
    logger: LogManager,
    metrics: MetricsRecorder,
}

impl SyncEngine {
    pub fn new(config: SyncConfig, series: PredictionSeries) -> SyncResult<Self> {
        config.validate()?;
        let state = SyncState::new(&config);
        let logger = LogManager::new("sync");
        logger.record(&format!(
            "engine ready: {} chunks, viewport {}s, {:?} lookup",
            series.len(),
            config.viewport_width,
            config.locator
        ));
        Ok(Self {
            config,
            series,
            state,
            logger,
            metrics: MetricsRecorder::new(),
        })
    }

    pub fn handle(&mut self, event: SyncEvent) -> &SyncState {
        let next = reduce(&self.state, event, &self.config);
        match event {
            SyncEvent::TimeUpdated(time) => {
                self.metrics.record_time_update();
                if self.active_index_at(next.playback.current_time).is_none() {
                    self.metrics.record_fallback();
                }
                self.logger.detail(&format!(
                    "t={:.3}s window {:.2}..{:.2}",
                    time, next.window.min, next.window.max
                ));
            }
            SyncEvent::Command(command) => {
                self.metrics.record_command();
                if next.window == self.state.window {
                    self.metrics.record_fallback();
                }
                self.logger.record(&format!(
                    "{:?} -> window {:.2}..{:.2}",
                    command, next.window.min, next.window.max
                ));
            }
            SyncEvent::DurationLoaded(duration) => {
                if next.playback.video_duration != duration {
                    self.logger
                        .anomaly(&format!("ignored unusable duration {duration}"));
                } else {
                    self.logger.record(&format!("duration {duration:.2}s"));
                }
            }
            SyncEvent::FpsUpdated(fps) => {
                if next.timing.fps != fps {
                    self.logger.anomaly(&format!("ignored unusable fps {fps}"));
                } else {
                    self.logger.record(&format!(
                        "fps {fps} -> {:.3}s per chunk",
                        next.timing.seconds_per_chunk()
                    ));
                }
            }
        }
        self.state = next;
        &self.state
    }

    pub fn state(&self) -> &SyncState {
        &self.state
    }

    pub fn series(&self) -> &PredictionSeries {
        &self.series
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn window(&self) -> ViewportWindow {
        self.state.window
    }

    pub fn seconds_per_chunk(&self) -> f64 {
        self.state.timing.seconds_per_chunk()
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active_index_at(self.state.playback.current_time)
    }

    pub fn active_point(&self) -> Option<&PredictionPoint> {
        self.active_index().and_then(|index| self.series.get(index))
    }

    pub fn frame(&self) -> ChartFrame {
        let current_time = self.state.playback.current_time;
        let active_index = self.active_index();
        let seconds_per_chunk = self.seconds_per_chunk();
        ChartFrame {
            window: self.state.window,
            current_time,
            active_index,
            seconds_per_chunk,
            markers: style_series(&self.series, active_index, current_time, seconds_per_chunk),
        }
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    fn active_index_at(&self, time: f64) -> Option<usize> {
        self.config.locator.locate(&self.series, time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Verdict;
    use crate::prelude::LocatorKind;

    fn series(starts: &[f64]) -> PredictionSeries {
        let points = starts
            .iter()
            .enumerate()
            .map(|(index, &start)| {
                let verdict = if index % 2 == 0 {
                    Verdict::Truthful
                } else {
                    Verdict::Deceptive
                };
                PredictionPoint::new(start, start + 1.0, 0.5, 0.3, verdict)
            })
            .collect();
        PredictionSeries::new(points).unwrap()
    }

    fn engine(starts: &[f64]) -> SyncEngine {
        SyncEngine::new(SyncConfig::default(), series(starts)).unwrap()
    }

    #[test]
    fn time_update_pans_window_and_restyles() {
        let mut engine = engine(&[0.0, 1.0, 2.0, 3.0]);
        engine.handle(SyncEvent::DurationLoaded(4.0));
        engine.handle(SyncEvent::TimeUpdated(1.5));

        let frame = engine.frame();
        assert_eq!(frame.active_index, Some(1));
        assert_eq!(frame.seconds_per_chunk, 1.0);
        assert_eq!(frame.window, ViewportWindow::new(0.0, 4.0));
        let radii: Vec<f32> = frame.markers.iter().map(|m| m.radius).collect();
        assert_eq!(radii, vec![2.0, 8.0, 5.0, 2.0]);
    }

    #[test]
    fn time_zero_keeps_explicit_window() {
        let config = SyncConfig::default();
        let mut state = SyncState::new(&config);
        state = reduce(&state, SyncEvent::DurationLoaded(60.0), &config);
        state = reduce(&state, SyncEvent::TimeUpdated(30.0), &config);
        state = reduce(
            &state,
            SyncEvent::Command(ViewportCommand::ZoomIn),
            &config,
        );
        let zoomed = state.window;
        state = reduce(&state, SyncEvent::TimeUpdated(0.0), &config);
        assert_eq!(state.window, zoomed);
        assert_eq!(state.playback.current_time, 0.0);
    }

    #[test]
    fn duration_load_resets_window() {
        let config = SyncConfig::default();
        let state = reduce(&SyncState::new(&config), SyncEvent::DurationLoaded(9.0), &config);
        assert_eq!(state.window, ViewportWindow::new(0.0, 9.0));
        assert_eq!(state.playback.video_duration, 9.0);
    }

    #[test]
    fn nan_time_is_ignored() {
        let config = SyncConfig::default();
        let mut state = reduce(&SyncState::new(&config), SyncEvent::DurationLoaded(60.0), &config);
        state = reduce(&state, SyncEvent::TimeUpdated(20.0), &config);
        let next = reduce(&state, SyncEvent::TimeUpdated(f64::NAN), &config);
        assert_eq!(next, state);
    }

    #[test]
    fn negative_duration_is_ignored() {
        let config = SyncConfig::default();
        let state = SyncState::new(&config);
        assert_eq!(reduce(&state, SyncEvent::DurationLoaded(-3.0), &config), state);
    }

    #[test]
    fn commands_before_duration_leave_window() {
        let config = SyncConfig::default();
        let state = SyncState::new(&config);
        for command in [
            ViewportCommand::ZoomIn,
            ViewportCommand::ZoomOut,
            ViewportCommand::ResetZoom,
            ViewportCommand::JumpToCurrent,
        ] {
            let next = reduce_viewport(&state.playback, state.window, command, &config);
            assert_eq!(next, ViewportWindow::initial(15.0));
        }
    }

    #[test]
    fn reset_twice_matches_reset_once() {
        let config = SyncConfig::default();
        let playback = PlaybackState {
            current_time: 40.0,
            video_duration: 90.0,
        };
        let window = ViewportWindow::new(33.0, 47.0);
        let once = reduce_viewport(&playback, window, ViewportCommand::ResetZoom, &config);
        let twice = reduce_viewport(&playback, once, ViewportCommand::ResetZoom, &config);
        assert_eq!(once, twice);
        assert_eq!(once, ViewportWindow::new(0.0, 15.0));
    }

    #[test]
    fn jump_to_current_recenters_after_zoom() {
        let mut engine = engine(&[0.0, 1.0, 2.0]);
        engine.handle(SyncEvent::DurationLoaded(100.0));
        engine.handle(SyncEvent::TimeUpdated(50.0));
        engine.handle(SyncEvent::Command(ViewportCommand::ResetZoom));
        assert_eq!(engine.window(), ViewportWindow::new(0.0, 15.0));
        engine.handle(SyncEvent::Command(ViewportCommand::JumpToCurrent));
        assert_eq!(engine.window(), ViewportWindow::new(42.5, 57.5));
    }

    #[test]
    fn fps_update_rescales_nearby_radius() {
        let mut engine = engine(&[0.0, 1.0, 2.0, 3.0]);
        engine.handle(SyncEvent::DurationLoaded(4.0));
        engine.handle(SyncEvent::FpsUpdated(15.0));
        engine.handle(SyncEvent::TimeUpdated(1.5));
        assert_eq!(engine.seconds_per_chunk(), 2.0);
        let radii: Vec<f32> = engine.frame().markers.iter().map(|m| m.radius).collect();
        assert_eq!(radii, vec![5.0, 8.0, 5.0, 5.0]);
    }

    #[test]
    fn empty_series_has_no_active_chunk() {
        let mut engine = SyncEngine::new(SyncConfig::default(), PredictionSeries::default()).unwrap();
        engine.handle(SyncEvent::DurationLoaded(10.0));
        engine.handle(SyncEvent::TimeUpdated(3.0));
        let frame = engine.frame();
        assert_eq!(frame.active_index, None);
        assert!(frame.markers.is_empty());
        assert!(engine.active_point().is_none());
        assert_eq!(engine.metrics().fallbacks, 1);
    }

    #[test]
    fn binary_locator_tracks_same_chunks() {
        let config = SyncConfig {
            locator: LocatorKind::Binary,
            ..Default::default()
        };
        let mut engine = SyncEngine::new(config, series(&[0.0, 1.0, 2.0, 3.0])).unwrap();
        engine.handle(SyncEvent::DurationLoaded(4.0));
        engine.handle(SyncEvent::TimeUpdated(2.25));
        assert_eq!(engine.active_index(), Some(2));
        assert_eq!(
            engine.active_point().map(|point| point.binary_prediction),
            Some(Verdict::Truthful)
        );
    }

    #[test]
    fn metrics_count_events() {
        let mut engine = engine(&[0.0, 1.0]);
        engine.handle(SyncEvent::DurationLoaded(2.0));
        engine.handle(SyncEvent::TimeUpdated(0.5));
        engine.handle(SyncEvent::TimeUpdated(1.5));
        engine.handle(SyncEvent::Command(ViewportCommand::ZoomIn));
        let metrics = engine.metrics();
        assert_eq!(metrics.time_updates, 2);
        assert_eq!(metrics.commands, 1);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = SyncConfig {
            zoom_factor: 1.0,
            ..Default::default()
        };
        assert!(SyncEngine::new(config, PredictionSeries::default()).is_err());
    }
}
