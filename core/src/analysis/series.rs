use crate::analysis::point::{PredictionPoint, PredictionRecord};
use crate::prelude::{SyncError, SyncResult};
use std::ops::Deref;

/// Immutable, start-time ordered sequence of prediction chunks for one video.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PredictionSeries {
    points: Vec<PredictionPoint>,
}

impl PredictionSeries {
    pub fn new(points: Vec<PredictionPoint>) -> SyncResult<Self> {
        for (index, point) in points.iter().enumerate() {
            point.check(index)?;
        }
        for (index, pair) in points.windows(2).enumerate() {
            if pair[1].chunk_start_time < pair[0].chunk_start_time {
                return Err(SyncError::UnsortedSeries {
                    index: index + 1,
                    start: pair[1].chunk_start_time,
                    previous: pair[0].chunk_start_time,
                });
            }
        }
        Ok(Self { points })
    }

    pub fn from_records(records: Vec<PredictionRecord>) -> SyncResult<Self> {
        let points = records
            .into_iter()
            .enumerate()
            .map(|(index, record)| record.into_point(index))
            .collect::<SyncResult<Vec<_>>>()?;
        Self::new(points)
    }

    pub fn points(&self) -> &[PredictionPoint] {
        &self.points
    }

    /// Largest chunk end time, or 0 for an empty series.
    pub fn max_end_time(&self) -> f64 {
        self.points
            .iter()
            .map(|point| point.chunk_end_time)
            .fold(0.0, f64::max)
    }

    pub fn to_records(&self) -> Vec<PredictionRecord> {
        self.points.iter().map(PredictionRecord::from).collect()
    }
}

impl Deref for PredictionSeries {
    type Target = [PredictionPoint];

    fn deref(&self) -> &Self::Target {
        &self.points
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Verdict;

    fn point(start: f64) -> PredictionPoint {
        PredictionPoint::new(start, start + 1.0, 0.4, 0.2, Verdict::Truthful)
    }

    #[test]
    fn sorted_points_build_a_series() {
        let series = PredictionSeries::new(vec![point(0.0), point(1.0), point(1.0)]).unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series.max_end_time(), 2.0);
    }

    #[test]
    fn unsorted_points_are_rejected() {
        let err = PredictionSeries::new(vec![point(0.0), point(2.0), point(1.0)]).unwrap_err();
        assert!(matches!(err, SyncError::UnsortedSeries { index: 2, .. }));
    }

    #[test]
    fn empty_series_has_zero_extent() {
        let series = PredictionSeries::default();
        assert!(series.is_empty());
        assert_eq!(series.max_end_time(), 0.0);
    }

    #[test]
    fn records_round_trip_through_series() {
        let series = PredictionSeries::new(vec![point(0.0), point(1.0)]).unwrap();
        let rebuilt = PredictionSeries::from_records(series.to_records()).unwrap();
        assert_eq!(rebuilt, series);
    }
}
