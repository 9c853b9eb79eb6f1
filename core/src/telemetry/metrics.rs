use serde::Serialize;
use std::sync::Mutex;

pub struct MetricsRecorder {
    inner: Mutex<MetricsSnapshot>,
}

/// Event counters for one engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub time_updates: usize,
    pub commands: usize,
    /// Events resolved through a fallback: no active chunk or window left as-is.
    pub fallbacks: usize,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(MetricsSnapshot::default()),
        }
    }

    pub fn record_time_update(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.time_updates += 1;
        }
    }

    pub fn record_command(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.commands += 1;
        }
    }

    pub fn record_fallback(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.fallbacks += 1;
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        self.inner
            .lock()
            .map(|metrics| *metrics)
            .unwrap_or_default()
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate() {
        let metrics = MetricsRecorder::new();
        metrics.record_time_update();
        metrics.record_time_update();
        metrics.record_command();
        metrics.record_fallback();
        assert_eq!(
            metrics.snapshot(),
            MetricsSnapshot {
                time_updates: 2,
                commands: 1,
                fallbacks: 1,
            }
        );
    }
}
