//! Pacer implementations.
//!
//! [`ThreadPacer`] is the production pacer: it sleeps the calling thread,
//! which is always the gesture worker thread.  [`RecordingPacer`] returns
//! immediately and remembers every requested wait, so tests can assert on
//! the timing of a gesture without actually waiting for it.

use std::sync::Mutex;
use std::time::Duration;

use crate::application::synthesize_gesture::Pacer;

/// Sleeps the current OS thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadPacer;

impl Pacer for ThreadPacer {
    fn pause(&self, duration: Duration) {
        if !duration.is_zero() {
            std::thread::sleep(duration);
        }
    }
}

/// Records waits instead of performing them.
#[derive(Debug, Default)]
pub struct RecordingPacer {
    /// Every duration passed to `pause`, in call order.
    pub pauses: Mutex<Vec<Duration>>,
}

impl RecordingPacer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sum of all recorded waits; the wall-clock length the gesture would take.
    pub fn total(&self) -> Duration {
        self.pauses.lock().unwrap().iter().sum()
    }
}

impl Pacer for RecordingPacer {
    fn pause(&self, duration: Duration) {
        self.pauses.lock().unwrap().push(duration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn test_thread_pacer_waits_at_least_requested() {
        let started = Instant::now();
        ThreadPacer.pause(Duration::from_millis(15));
        assert!(started.elapsed() >= Duration::from_millis(15));
    }

    #[test]
    fn test_thread_pacer_zero_returns_immediately() {
        let started = Instant::now();
        ThreadPacer.pause(Duration::ZERO);
        assert!(started.elapsed() < Duration::from_millis(50));
    }

    #[test]
    fn test_recording_pacer_keeps_order_and_total() {
        let pacer = RecordingPacer::new();
        pacer.pause(Duration::from_millis(50));
        pacer.pause(Duration::from_millis(100));

        assert_eq!(
            *pacer.pauses.lock().unwrap(),
            vec![Duration::from_millis(50), Duration::from_millis(100)]
        );
        assert_eq!(pacer.total(), Duration::from_millis(150));
    }
}
