use std::time::Duration;

/// Cadence of time updates while playing.
pub const TICK_INTERVAL: Duration = Duration::from_millis(250);

/// Stand-in for the video element: a position on a known timeline.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PlaybackClock {
    position: f64,
    duration: f64,
    playing: bool,
}

impl PlaybackClock {
    pub fn new(duration: f64) -> Self {
        Self {
            position: 0.0,
            duration: if duration.is_finite() { duration.max(0.0) } else { 0.0 },
            playing: false,
        }
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Starts from the beginning again once the end has been reached.
    pub fn toggle(&mut self) {
        if self.playing {
            self.playing = false;
        } else if self.duration > 0.0 {
            if self.position >= self.duration {
                self.position = 0.0;
            }
            self.playing = true;
        }
    }

    pub fn seek(&mut self, time: f64) -> f64 {
        if time.is_finite() {
            self.position = time.clamp(0.0, self.duration);
        }
        self.position
    }

    /// Moves the position forward; `None` while paused.
    pub fn advance(&mut self, elapsed: Duration) -> Option<f64> {
        if !self.playing {
            return None;
        }
        self.position = (self.position + elapsed.as_secs_f64()).min(self.duration);
        if self.position >= self.duration {
            self.playing = false;
        }
        Some(self.position)
    }
}

/// `m:ss` label for the transport.
pub fn format_clock(seconds: f64) -> String {
    let total = seconds.max(0.0).floor() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paused_clock_does_not_move() {
        let mut clock = PlaybackClock::new(10.0);
        assert_eq!(clock.advance(TICK_INTERVAL), None);
        assert_eq!(clock.position(), 0.0);
    }

    #[test]
    fn playing_clock_ticks_and_stops_at_end() {
        let mut clock = PlaybackClock::new(0.6);
        clock.toggle();
        assert_eq!(clock.advance(TICK_INTERVAL), Some(0.25));
        assert_eq!(clock.advance(TICK_INTERVAL), Some(0.5));
        assert_eq!(clock.advance(TICK_INTERVAL), Some(0.6));
        assert!(!clock.is_playing());

        clock.toggle();
        assert!(clock.is_playing());
        assert_eq!(clock.position(), 0.0);
    }

    #[test]
    fn seek_clamps_to_timeline() {
        let mut clock = PlaybackClock::new(30.0);
        assert_eq!(clock.seek(42.0), 30.0);
        assert_eq!(clock.seek(-3.0), 0.0);
        assert_eq!(clock.seek(f64::NAN), 0.0);
        assert_eq!(clock.seek(12.5), 12.5);
    }

    #[test]
    fn empty_timeline_never_plays() {
        let mut clock = PlaybackClock::new(0.0);
        clock.toggle();
        assert!(!clock.is_playing());
    }

    #[test]
    fn clock_label_uses_minutes() {
        assert_eq!(format_clock(0.0), "0:00");
        assert_eq!(format_clock(75.9), "1:15");
    }
}
