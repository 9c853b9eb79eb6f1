use crate::prelude::{SyncError, SyncResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Discrete classification of a chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Truthful,
    Deceptive,
}

impl Verdict {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Verdict::Truthful),
            1 => Some(Verdict::Deceptive),
            _ => None,
        }
    }

    pub fn code(self) -> i64 {
        match self {
            Verdict::Truthful => 0,
            Verdict::Deceptive => 1,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Verdict::Truthful => "Truthful",
            Verdict::Deceptive => "Deceptive",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One fixed-size analysis chunk as held by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionPoint {
    pub chunk_start_time: f64,
    pub chunk_end_time: f64,
    pub deception_score: f64,
    pub confidence: f64,
    pub binary_prediction: Verdict,
    /// X-axis coordinate used for alignment with playback; equals `chunk_start_time`.
    pub video_time: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk_start_frame: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk_end_frame: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_seconds: Option<f64>,
}

impl PredictionPoint {
    pub fn new(
        chunk_start_time: f64,
        chunk_end_time: f64,
        deception_score: f64,
        confidence: f64,
        binary_prediction: Verdict,
    ) -> Self {
        Self {
            chunk_start_time,
            chunk_end_time,
            deception_score,
            confidence,
            binary_prediction,
            video_time: chunk_start_time,
            chunk_start_frame: None,
            chunk_end_frame: None,
            frame: None,
            time_seconds: None,
        }
    }

    pub fn is_deceptive(&self) -> bool {
        self.binary_prediction == Verdict::Deceptive
    }

    pub fn duration(&self) -> f64 {
        self.chunk_end_time - self.chunk_start_time
    }

    /// Tooltip title, with the chunk number counted from one.
    pub fn title(&self, index: usize) -> String {
        format!("Time: {:.1}s (Chunk {})", self.video_time, index + 1)
    }

    /// Tooltip body lines.
    pub fn describe(&self) -> Vec<String> {
        vec![
            format!("Deception Score: {:.4}", self.deception_score),
            format!("Prediction: {}", self.binary_prediction),
            format!("Confidence: {:.2}%", self.confidence * 100.0),
        ]
    }

    pub(crate) fn check(&self, index: usize) -> SyncResult<()> {
        let invalid = |reason: String| SyncError::InvalidPoint { index, reason };
        if !self.chunk_start_time.is_finite() || !self.chunk_end_time.is_finite() {
            return Err(invalid("chunk times must be finite".into()));
        }
        if self.chunk_start_time >= self.chunk_end_time {
            return Err(invalid(format!(
                "chunk starts at {} but ends at {}",
                self.chunk_start_time, self.chunk_end_time
            )));
        }
        if !(0.0..=1.0).contains(&self.deception_score) {
            return Err(invalid(format!(
                "deception score {} outside [0, 1]",
                self.deception_score
            )));
        }
        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(invalid(format!(
                "confidence {} outside [0, 1]",
                self.confidence
            )));
        }
        Ok(())
    }
}

/// Row of the prediction table exactly as the analysis service emits it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRecord {
    #[serde(rename = "Chunk_Start_Frame", default, skip_serializing_if = "Option::is_none")]
    pub chunk_start_frame: Option<i64>,
    #[serde(rename = "Chunk_End_Frame", default, skip_serializing_if = "Option::is_none")]
    pub chunk_end_frame: Option<i64>,
    #[serde(rename = "Chunk_Start_Time")]
    pub chunk_start_time: f64,
    #[serde(rename = "Chunk_End_Time")]
    pub chunk_end_time: f64,
    #[serde(rename = "Frame", default, skip_serializing_if = "Option::is_none")]
    pub frame: Option<i64>,
    #[serde(rename = "Time_Seconds", default, skip_serializing_if = "Option::is_none")]
    pub time_seconds: Option<f64>,
    #[serde(rename = "Deception_Score")]
    pub deception_score: f64,
    #[serde(rename = "Binary_Prediction")]
    pub binary_prediction: i64,
    #[serde(rename = "Confidence")]
    pub confidence: f64,
}

impl PredictionRecord {
    pub fn into_point(self, index: usize) -> SyncResult<PredictionPoint> {
        let verdict =
            Verdict::from_code(self.binary_prediction).ok_or_else(|| SyncError::InvalidPoint {
                index,
                reason: format!("binary prediction {} is not 0 or 1", self.binary_prediction),
            })?;
        let point = PredictionPoint {
            chunk_start_frame: self.chunk_start_frame,
            chunk_end_frame: self.chunk_end_frame,
            frame: self.frame,
            time_seconds: self.time_seconds,
            ..PredictionPoint::new(
                self.chunk_start_time,
                self.chunk_end_time,
                self.deception_score,
                self.confidence,
                verdict,
            )
        };
        point.check(index)?;
        Ok(point)
    }
}

impl From<&PredictionPoint> for PredictionRecord {
    fn from(point: &PredictionPoint) -> Self {
        Self {
            chunk_start_frame: point.chunk_start_frame,
            chunk_end_frame: point.chunk_end_frame,
            chunk_start_time: point.chunk_start_time,
            chunk_end_time: point.chunk_end_time,
            frame: point.frame,
            time_seconds: point.time_seconds,
            deception_score: point.deception_score,
            binary_prediction: point.binary_prediction.code(),
            confidence: point.confidence,
        }
    }
}
