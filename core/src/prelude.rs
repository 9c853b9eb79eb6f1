use crate::analysis::PredictionPoint;
use serde::{Deserialize, Serialize};

/// Frames analysed per chunk by the backend model.
pub const FRAMES_PER_CHUNK: u32 = 30;
/// Frame rate assumed until the upload or prediction response reports one.
pub const DEFAULT_FPS: f64 = 30.0;
/// Seconds of the time axis visible at once.
pub const VIEWPORT_WIDTH: f64 = 15.0;
/// Narrowest window the zoom controls may produce.
pub const MIN_ZOOM_WIDTH: f64 = 2.0;
pub const ZOOM_FACTOR: f64 = 1.5;
/// Scores above this are classified deceptive.
pub const DECEPTION_THRESHOLD: f64 = 0.5;

/// Shared configuration for the playback-sync engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub frames_per_chunk: u32,
    pub default_fps: f64,
    pub viewport_width: f64,
    pub min_zoom_width: f64,
    pub zoom_factor: f64,
    pub locator: LocatorKind,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            frames_per_chunk: FRAMES_PER_CHUNK,
            default_fps: DEFAULT_FPS,
            viewport_width: VIEWPORT_WIDTH,
            min_zoom_width: MIN_ZOOM_WIDTH,
            zoom_factor: ZOOM_FACTOR,
            locator: LocatorKind::Linear,
        }
    }
}

impl SyncConfig {
    pub fn validate(&self) -> SyncResult<()> {
        if self.frames_per_chunk == 0 {
            return Err(SyncError::InvalidConfig(
                "frames_per_chunk must be positive".into(),
            ));
        }
        if !is_positive(self.default_fps) {
            return Err(SyncError::InvalidConfig(format!(
                "default_fps must be positive, got {}",
                self.default_fps
            )));
        }
        if !is_positive(self.min_zoom_width) {
            return Err(SyncError::InvalidConfig(format!(
                "min_zoom_width must be positive, got {}",
                self.min_zoom_width
            )));
        }
        if !self.viewport_width.is_finite() || self.viewport_width < self.min_zoom_width {
            return Err(SyncError::InvalidConfig(format!(
                "viewport_width {} is narrower than min_zoom_width {}",
                self.viewport_width, self.min_zoom_width
            )));
        }
        if !self.zoom_factor.is_finite() || self.zoom_factor <= 1.0 {
            return Err(SyncError::InvalidConfig(format!(
                "zoom_factor must exceed 1, got {}",
                self.zoom_factor
            )));
        }
        Ok(())
    }
}

pub(crate) fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

/// Chunk lookup strategy selectable from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocatorKind {
    #[default]
    Linear,
    Binary,
}

/// Common error type for building engine inputs.
#[derive(thiserror::Error, Debug)]
pub enum SyncError {
    #[error("series not sorted: chunk {index} starts at {start} before {previous}")]
    UnsortedSeries {
        index: usize,
        start: f64,
        previous: f64,
    },
    #[error("invalid prediction point {index}: {reason}")]
    InvalidPoint { index: usize, reason: String },
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("analysis service error: {0}")]
    Service(String),
    #[error("session code is empty")]
    EmptySessionCode,
}

pub type SyncResult<T> = Result<T, SyncError>;

/// Maps a playback position onto the chunk that contains it.
///
/// Implementations must agree on sorted input: `Some(i)` when
/// `points[i].chunk_start_time <= t < points[i + 1].chunk_start_time` (or `i`
/// is last and `t` is past its start), `Some(0)` when nothing matches, and
/// `None` for an empty slice or a NaN time.
pub trait ChunkLocator {
    fn locate(&self, points: &[PredictionPoint], current_time: f64) -> Option<usize>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = SyncConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.frames_per_chunk, 30);
        assert_eq!(config.viewport_width, 15.0);
    }

    #[test]
    fn viewport_narrower_than_min_zoom_is_rejected() {
        let config = SyncConfig {
            viewport_width: 1.0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(SyncError::InvalidConfig(_))
        ));
    }

    #[test]
    fn zero_frames_per_chunk_is_rejected() {
        let config = SyncConfig {
            frames_per_chunk: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn config_deserializes_with_defaults() {
        let config: SyncConfig =
            serde_json::from_str(r#"{"viewport_width": 20.0, "locator": "binary"}"#).unwrap();
        assert_eq!(config.viewport_width, 20.0);
        assert_eq!(config.locator, LocatorKind::Binary);
        assert_eq!(config.frames_per_chunk, FRAMES_PER_CHUNK);
    }
}
