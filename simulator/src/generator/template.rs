/// Playback positions a video surface reports while playing from `from` to `to`.
///
/// Mirrors the `timeupdate` cadence: one position every `step` seconds, with
/// the end position always included.
pub fn playback_ticks(from: f64, to: f64, step: f64) -> Vec<f64> {
    if !(from.is_finite() && to.is_finite()) || to < from || step <= 0.0 {
        return Vec::new();
    }
    let count = ((to - from) / step).floor() as usize;
    let mut ticks: Vec<f64> = (0..=count).map(|i| from + i as f64 * step).collect();
    if ticks.last().map_or(true, |&last| last < to) {
        ticks.push(to);
    }
    ticks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticks_cover_range_inclusive() {
        assert_eq!(playback_ticks(0.0, 1.0, 0.25), vec![0.0, 0.25, 0.5, 0.75, 1.0]);
        assert_eq!(playback_ticks(2.0, 2.6, 0.25), vec![2.0, 2.25, 2.5, 2.6]);
    }

    #[test]
    fn reversed_or_degenerate_ranges_are_empty() {
        assert!(playback_ticks(3.0, 1.0, 0.25).is_empty());
        assert!(playback_ticks(0.0, 1.0, 0.0).is_empty());
    }
}
