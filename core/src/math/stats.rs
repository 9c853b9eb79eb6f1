use crate::analysis::PredictionPoint;
use crate::prelude::DECEPTION_THRESHOLD;
use serde::Serialize;

/// Aggregate view of a prediction series, as printed in the analysis summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SeriesSummary {
    pub chunks: usize,
    pub truthful_percent: f64,
    pub deceptive_percent: f64,
    /// Share of chunks whose score exceeds the threshold.
    pub above_threshold_percent: f64,
    pub mean_score: f64,
    pub mean_confidence: f64,
}

impl SeriesSummary {
    pub fn from_points(points: &[PredictionPoint]) -> Self {
        Self::with_threshold(points, DECEPTION_THRESHOLD)
    }

    pub fn with_threshold(points: &[PredictionPoint], threshold: f64) -> Self {
        if points.is_empty() {
            return Self::default();
        }
        let count = points.len() as f64;
        let deceptive = points.iter().filter(|point| point.is_deceptive()).count() as f64;
        let above = points
            .iter()
            .filter(|point| point.deception_score > threshold)
            .count() as f64;
        let score_sum: f64 = points.iter().map(|point| point.deception_score).sum();
        let confidence_sum: f64 = points.iter().map(|point| point.confidence).sum();

        Self {
            chunks: points.len(),
            truthful_percent: (count - deceptive) / count * 100.0,
            deceptive_percent: deceptive / count * 100.0,
            above_threshold_percent: above / count * 100.0,
            mean_score: score_sum / count,
            mean_confidence: confidence_sum / count,
        }
    }
}
