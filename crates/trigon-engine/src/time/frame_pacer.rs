use std::time::{Duration, Instant};

/// Wait between presented frames unless configured otherwise.
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(10);

/// Frame timing snapshot.
#[derive(Debug, Copy, Clone)]
pub struct FrameTime {
    /// Seconds since the previous presented frame (0 for the first frame).
    pub dt: f32,

    /// Monotonic timestamp of this frame.
    pub now: Instant,

    /// Monotonic frame counter, starting at 0.
    pub frame_index: u64,
}

/// Caps the frame rate by enforcing a fixed wait after each presented frame.
///
/// The first frame is due immediately. After `mark_presented(t)` the next
/// frame is due at `t + interval`.
#[derive(Debug, Clone)]
pub struct FramePacer {
    interval: Duration,
    last_presented: Option<Instant>,
    next_due: Option<Instant>,
    frame_index: u64,
}

impl FramePacer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_presented: None,
            next_due: None,
            frame_index: 0,
        }
    }

    /// Whether a frame should be drawn at `now`.
    pub fn is_due(&self, now: Instant) -> bool {
        self.next_due.is_none_or(|due| now >= due)
    }

    /// Instant the next frame becomes due; `None` means "now".
    pub fn next_deadline(&self) -> Option<Instant> {
        self.next_due
    }

    /// Timing snapshot for a frame about to be drawn at `now`.
    pub fn frame_time(&self, now: Instant) -> FrameTime {
        let dt = self
            .last_presented
            .map(|last| now.saturating_duration_since(last).as_secs_f32())
            .unwrap_or(0.0);

        FrameTime {
            dt,
            now,
            frame_index: self.frame_index,
        }
    }

    /// Records a presented frame and schedules the next one.
    pub fn mark_presented(&mut self, now: Instant) {
        self.last_presented = Some(now);
        self.next_due = Some(now + self.interval);
        self.frame_index = self.frame_index.wrapping_add(1);
    }
}

impl Default for FramePacer {
    fn default() -> Self {
        Self::new(DEFAULT_FRAME_INTERVAL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    #[test]
    fn first_frame_is_due_immediately() {
        let pacer = FramePacer::default();
        assert!(pacer.is_due(Instant::now()));
        assert!(pacer.next_deadline().is_none());
    }

    #[test]
    fn not_due_before_interval_elapses() {
        let mut pacer = FramePacer::new(10 * MS);
        let t0 = Instant::now();
        pacer.mark_presented(t0);

        assert!(!pacer.is_due(t0));
        assert!(!pacer.is_due(t0 + 9 * MS));
        assert!(pacer.is_due(t0 + 10 * MS));
        assert_eq!(pacer.next_deadline(), Some(t0 + 10 * MS));
    }

    #[test]
    fn frame_time_reports_delta_and_index() {
        let mut pacer = FramePacer::new(10 * MS);
        let t0 = Instant::now();

        let first = pacer.frame_time(t0);
        assert_eq!(first.frame_index, 0);
        assert_eq!(first.dt, 0.0);

        pacer.mark_presented(t0);
        let second = pacer.frame_time(t0 + 16 * MS);
        assert_eq!(second.frame_index, 1);
        assert!((second.dt - 0.016).abs() < 1e-6);
    }

    #[test]
    fn zero_interval_is_always_due_after_present() {
        let mut pacer = FramePacer::new(Duration::ZERO);
        let t0 = Instant::now();
        pacer.mark_presented(t0);
        assert!(pacer.is_due(t0));
    }
}
