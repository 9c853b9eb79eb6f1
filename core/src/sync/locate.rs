use crate::analysis::PredictionPoint;
use crate::prelude::{ChunkLocator, LocatorKind};

/// Walks the series front to back; fine for the few hundred chunks a video yields.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearScan;

impl ChunkLocator for LinearScan {
    fn locate(&self, points: &[PredictionPoint], current_time: f64) -> Option<usize> {
        if points.is_empty() || current_time.is_nan() {
            return None;
        }
        let found = points.iter().enumerate().position(|(index, point)| {
            match points.get(index + 1) {
                Some(next) => {
                    current_time >= point.chunk_start_time && current_time < next.chunk_start_time
                }
                None => current_time >= point.chunk_start_time,
            }
        });
        Some(found.unwrap_or(0))
    }
}

/// Bisects the start times; requires the series to be sorted.
#[derive(Debug, Clone, Copy, Default)]
pub struct BinarySearch;

impl ChunkLocator for BinarySearch {
    fn locate(&self, points: &[PredictionPoint], current_time: f64) -> Option<usize> {
        if points.is_empty() || current_time.is_nan() {
            return None;
        }
        let started = points.partition_point(|point| point.chunk_start_time <= current_time);
        Some(started.saturating_sub(1))
    }
}

impl ChunkLocator for LocatorKind {
    fn locate(&self, points: &[PredictionPoint], current_time: f64) -> Option<usize> {
        match self {
            LocatorKind::Linear => LinearScan.locate(points, current_time),
            LocatorKind::Binary => BinarySearch.locate(points, current_time),
        }
    }
}

/// Index of the chunk containing `current_time`, using the linear scan.
pub fn find_active_chunk(points: &[PredictionPoint], current_time: f64) -> Option<usize> {
    LinearScan.locate(points, current_time)
}
