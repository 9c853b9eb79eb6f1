use crate::prelude::{is_positive, SyncConfig};
use serde::{Deserialize, Serialize};

/// Visible slice of the chart's time axis, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportWindow {
    pub min: f64,
    pub max: f64,
}

impl ViewportWindow {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Window shown before the video duration is known.
    pub fn initial(width: f64) -> Self {
        Self::new(0.0, width)
    }

    pub fn width(&self) -> f64 {
        self.max - self.min
    }

    pub fn center(&self) -> f64 {
        (self.min + self.max) / 2.0
    }

    pub fn contains(&self, time: f64) -> bool {
        time >= self.min && time <= self.max
    }

    /// Window of `width` around `center`, slid back inside `[0, duration]`.
    fn centered(center: f64, width: f64, duration: f64) -> Self {
        let width = width.min(duration);
        let center = if center.is_finite() {
            center
        } else {
            width / 2.0
        };
        let min = (center - width / 2.0).clamp(0.0, duration - width);
        let max = (min + width).min(duration);
        Self::new(min, max)
    }
}

/// Explicit zoom and pan requests from the chart controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewportCommand {
    ZoomIn,
    ZoomOut,
    ResetZoom,
    JumpToCurrent,
}

/// Centers a `width`-second window on the playhead, clamped to the content.
///
/// Returns `None` when the duration or time is unusable; callers keep their
/// previous window in that case.
pub fn derive_viewport(current_time: f64, video_duration: f64, width: f64) -> Option<ViewportWindow> {
    if !is_positive(video_duration) || !is_positive(width) {
        return None;
    }
    if !current_time.is_finite() || current_time < 0.0 {
        return None;
    }
    let mut min = (current_time - width / 2.0).max(0.0);
    let mut max = min + width;
    if max > video_duration {
        max = video_duration;
        min = (max - width).max(0.0);
    }
    Some(ViewportWindow::new(min, max))
}

pub fn zoom_in(
    window: ViewportWindow,
    video_duration: f64,
    config: &SyncConfig,
) -> Option<ViewportWindow> {
    if !is_positive(video_duration) {
        return None;
    }
    let width = window.width().max(config.min_zoom_width);
    let target = (width / config.zoom_factor).max(config.min_zoom_width);
    Some(ViewportWindow::centered(window.center(), target, video_duration))
}

pub fn zoom_out(
    window: ViewportWindow,
    video_duration: f64,
    config: &SyncConfig,
) -> Option<ViewportWindow> {
    if !is_positive(video_duration) {
        return None;
    }
    let target = (window.width() * config.zoom_factor).min(video_duration);
    Some(ViewportWindow::centered(window.center(), target, video_duration))
}

pub fn reset_zoom(video_duration: f64, width: f64) -> Option<ViewportWindow> {
    if !is_positive(video_duration) || !is_positive(width) {
        return None;
    }
    Some(ViewportWindow::new(0.0, width.min(video_duration)))
}

/// Same rule as auto-pan, applied immediately and also at time zero.
pub fn jump_to_current(current_time: f64, video_duration: f64, width: f64) -> Option<ViewportWindow> {
    derive_viewport(current_time, video_duration, width)
}
