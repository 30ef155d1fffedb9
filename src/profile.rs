use std::time::Duration;

/// Receiver for per-stage wall times of one pipeline run.
///
/// The engine publishes `(stage, elapsed)` pairs after each stage; the
/// same pairs also go out through `log::debug!`. Implementations must be
/// cheap, they run on the hot path between stages.
pub trait TimingSink: Send + Sync {
    fn record(&self, stage: &str, elapsed: Duration);
}

/// Sink that keeps every event behind a mutex, mainly for tests and
/// ad-hoc profiling.
#[derive(Debug, Default)]
pub struct CollectingSink {
    events: std::sync::Mutex<Vec<(String, Duration)>>,
}

impl CollectingSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the recorded events in arrival order.
    #[must_use]
    pub fn events(&self) -> Vec<(String, Duration)> {
        match self.events.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl TimingSink for CollectingSink {
    fn record(&self, stage: &str, elapsed: Duration) {
        if let Ok(mut guard) = self.events.lock() {
            guard.push((stage.to_string(), elapsed));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collecting_sink_preserves_order() {
        let sink = CollectingSink::new();
        sink.record("first", Duration::from_millis(5));
        sink.record("second", Duration::from_millis(7));

        let events = sink.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].0, "first");
        assert_eq!(events[1].0, "second");
        assert_eq!(events[1].1, Duration::from_millis(7));
    }
}
