use crate::prelude::{is_positive, SyncConfig};
use serde::Serialize;

/// Frame-rate bookkeeping for converting chunks to seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChunkTiming {
    pub fps: f64,
    pub frames_per_chunk: u32,
}

impl ChunkTiming {
    pub fn new(fps: f64, frames_per_chunk: u32) -> Self {
        Self {
            fps,
            frames_per_chunk,
        }
    }

    pub fn from_config(config: &SyncConfig) -> Self {
        Self::new(config.default_fps, config.frames_per_chunk)
    }

    pub fn seconds_per_chunk(&self) -> f64 {
        f64::from(self.frames_per_chunk) / self.fps
    }

    /// Replaces the frame rate; non-finite or non-positive values are ignored.
    pub fn with_fps(self, fps: f64) -> Self {
        if is_positive(fps) {
            Self { fps, ..self }
        } else {
            self
        }
    }
}
