use crate::analysis::PredictionPoint;
use serde::Serialize;

pub const ACTIVE_RADIUS: f32 = 8.0;
pub const NEARBY_RADIUS: f32 = 5.0;
pub const IDLE_RADIUS: f32 = 2.0;
pub const ACTIVE_BORDER_WIDTH: f32 = 2.0;

/// Marker fill, keyed by the chunk verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MarkerFill {
    Truthful,
    Deceptive,
}

impl MarkerFill {
    /// Straight RGBA components in `0.0..=1.0`.
    pub fn rgba(self) -> [f32; 4] {
        match self {
            MarkerFill::Truthful => [0.0, 1.0, 0.0, 0.8],
            MarkerFill::Deceptive => [1.0, 0.0, 0.0, 0.8],
        }
    }
}

/// Render attributes of one chart point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MarkerStyle {
    pub radius: f32,
    pub fill: MarkerFill,
    /// Black outline drawn only around the active chunk.
    pub border: bool,
}

impl MarkerStyle {
    pub fn border_width(&self) -> f32 {
        if self.border {
            ACTIVE_BORDER_WIDTH
        } else {
            0.0
        }
    }
}

pub fn style_point(
    point: &PredictionPoint,
    index: usize,
    active: Option<usize>,
    current_time: f64,
    seconds_per_chunk: f64,
) -> MarkerStyle {
    let is_active = active == Some(index);
    let radius = if is_active {
        ACTIVE_RADIUS
    } else if (point.video_time - current_time).abs() < seconds_per_chunk {
        NEARBY_RADIUS
    } else {
        IDLE_RADIUS
    };
    let fill = if point.is_deceptive() {
        MarkerFill::Deceptive
    } else {
        MarkerFill::Truthful
    };
    MarkerStyle {
        radius,
        fill,
        border: is_active,
    }
}

pub fn style_series(
    points: &[PredictionPoint],
    active: Option<usize>,
    current_time: f64,
    seconds_per_chunk: f64,
) -> Vec<MarkerStyle> {
    points
        .iter()
        .enumerate()
        .map(|(index, point)| style_point(point, index, active, current_time, seconds_per_chunk))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Verdict;
    use crate::sync::locate::find_active_chunk;

    fn four_chunks() -> Vec<PredictionPoint> {
        vec![
            PredictionPoint::new(0.0, 1.0, 0.2, 0.6, Verdict::Truthful),
            PredictionPoint::new(1.0, 2.0, 0.7, 0.4, Verdict::Deceptive),
            PredictionPoint::new(2.0, 3.0, 0.4, 0.2, Verdict::Truthful),
            PredictionPoint::new(3.0, 4.0, 0.9, 0.8, Verdict::Deceptive),
        ]
    }

    #[test]
    fn radii_follow_distance_from_playhead() {
        let points = four_chunks();
        let active = find_active_chunk(&points, 1.5);
        assert_eq!(active, Some(1));
        let radii: Vec<f32> = style_series(&points, active, 1.5, 1.0)
            .iter()
            .map(|style| style.radius)
            .collect();
        // chunk 0 starts 1.5s before the playhead, more than one chunk away
        assert_eq!(radii, vec![2.0, 8.0, 5.0, 2.0]);
    }

    #[test]
    fn active_point_is_largest_even_when_far_away() {
        let points = four_chunks();
        let style = style_point(&points[0], 0, Some(0), 500.0, 1.0);
        assert_eq!(style.radius, ACTIVE_RADIUS);
        assert!(style.border);
    }

    #[test]
    fn fill_tracks_verdict_not_activity() {
        let points = four_chunks();
        let styles = style_series(&points, Some(1), 1.5, 1.0);
        assert_eq!(styles[0].fill, MarkerFill::Truthful);
        assert_eq!(styles[1].fill, MarkerFill::Deceptive);
        assert_eq!(styles[3].fill, MarkerFill::Deceptive);
    }

    #[test]
    fn only_active_point_has_border() {
        let points = four_chunks();
        let styles = style_series(&points, Some(2), 2.5, 1.0);
        let bordered: Vec<usize> = styles
            .iter()
            .enumerate()
            .filter(|(_, style)| style.border)
            .map(|(index, _)| index)
            .collect();
        assert_eq!(bordered, vec![2]);
        assert_eq!(styles[0].border_width(), 0.0);
        assert_eq!(styles[2].border_width(), ACTIVE_BORDER_WIDTH);
    }

    #[test]
    fn empty_series_renders_nothing() {
        assert!(style_series(&[], None, 3.0, 1.0).is_empty());
    }
}
