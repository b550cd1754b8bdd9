//! GestureSynthesizer: expands gesture requests into paced input events.
//!
//! This use case sits at the application layer and delegates to two trait
//! objects:
//!
//! - an [`EventSink`] that delivers contact and key reports to the
//!   injection transport, and
//! - a [`Pacer`] that performs the real-time waits between reports.
//!
//! The concrete implementations live in the infrastructure layer.
//!
//! # Pacing model
//!
//! Every gesture is a blocking sequence of "emit, wait, emit" steps.  The
//! caller's thread is occupied for the whole gesture (a 600 ms swipe takes
//! 600 ms), because the receiving device expects reports spaced in wall-clock
//! time, not a burst.  Run the synthesizer on a dedicated worker; see
//! `infrastructure::worker`.
//!
//! # Pairing invariant
//!
//! Every `pressed = true` report is followed by exactly one matching
//! `pressed = false` report.  Sink failures are logged and skipped rather
//! than propagated, so a flaky transport can never leave a finger "stuck"
//! on the surface from the synthesizer's point of view.

use std::f32::consts::PI;
use std::sync::Arc;
use std::time::Duration;

use hidremote_core::{
    ConnectionHandle, ConsumerKey, DeviceCoordinate, GestureRequest, NormalizedPoint, PointBatch,
};
use thiserror::Error;
use tracing::{debug, warn};

/// Fewest intermediate move reports a swipe will ever use.
pub const MIN_SWIPE_STEPS: u32 = 5;

/// A swipe is never shorter than this many touch intervals.
const MIN_SWIPE_INTERVALS: u32 = 4;

/// Arc height as a fraction of the straight-line path length.
const ARC_RATIO: f32 = 0.25;

/// Arc height floor so short swipes still bend visibly.
const MIN_ARC_OFFSET: f32 = 0.02;

/// Below this length the path direction is considered undefined.
const PERP_EPSILON: f32 = 0.0001;

/// Offset direction used when start and end coincide.
const FALLBACK_PERP: (f32, f32) = (0.0, 0.1);

// ── Errors ────────────────────────────────────────────────────────────────────

/// Error reported by an [`EventSink`] for a single report.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("transport not ready")]
    NotReady,
}

/// Error type for gesture synthesis.
///
/// All geometry and timing computations are total; the only way a gesture
/// can fail is being asked to run without a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GestureError {
    #[error("no active transport session")]
    NotConnected,
}

// ── Collaborator traits ───────────────────────────────────────────────────────

/// Delivers input reports to the injection transport.
///
/// Implementations are expected to return promptly; the synthesizer imposes
/// no timeout of its own.
#[cfg_attr(test, mockall::automock)]
pub trait EventSink: Send + Sync {
    /// Reports one instant of the touch contact at an absolute position.
    fn send_contact(
        &self,
        connection: ConnectionHandle,
        pressed: bool,
        x: DeviceCoordinate,
        y: DeviceCoordinate,
    ) -> Result<(), SinkError>;

    /// Reports a consumer-control button going down or up.
    fn send_key(
        &self,
        connection: ConnectionHandle,
        key: ConsumerKey,
        pressed: bool,
    ) -> Result<(), SinkError>;
}

/// Performs the waits between reports.
pub trait Pacer: Send + Sync {
    /// Blocks the calling thread for `duration`.
    fn pause(&self, duration: Duration);
}

// ── Timing ────────────────────────────────────────────────────────────────────

/// All the fixed intervals a gesture uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GestureTiming {
    /// Spacing between swipe move reports.
    pub touch_interval: Duration,
    /// How long a tap holds the contact down.
    pub tap_hold: Duration,
    /// Shortest hold a long press will use, whatever was requested.
    pub long_press_min: Duration,
    /// Swipe duration used when the request asks for zero.
    pub swipe_default_duration: Duration,
    /// How long a button stays pressed.
    pub key_hold: Duration,
    /// Gap between consecutive taps of a multi-tap.
    pub multi_tap_pause: Duration,
    /// Gap between consecutive presses of a multi-long-press.
    pub multi_long_press_pause: Duration,
}

impl Default for GestureTiming {
    fn default() -> Self {
        Self {
            touch_interval: Duration::from_millis(16),
            tap_hold: Duration::from_millis(50),
            long_press_min: Duration::from_millis(20),
            swipe_default_duration: Duration::from_millis(600),
            key_hold: Duration::from_millis(80),
            multi_tap_pause: Duration::from_millis(100),
            multi_long_press_pause: Duration::from_millis(150),
        }
    }
}

/// Resolved duration and step count for one swipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwipePlan {
    pub duration: Duration,
    pub steps: u32,
}

impl GestureTiming {
    /// Applies the swipe defaults and floors to a requested duration.
    ///
    /// Zero selects `swipe_default_duration`; anything shorter than four
    /// touch intervals is raised to four; the step count is the duration in
    /// whole intervals, never fewer than [`MIN_SWIPE_STEPS`].
    pub fn swipe_plan(&self, requested: Duration) -> SwipePlan {
        let mut duration = if requested.is_zero() {
            self.swipe_default_duration
        } else {
            requested
        };
        let floor = self.touch_interval * MIN_SWIPE_INTERVALS;
        if duration < floor {
            duration = floor;
        }

        let interval_ms = self.touch_interval.as_millis().max(1);
        let whole_intervals = u32::try_from(duration.as_millis() / interval_ms).unwrap_or(u32::MAX);
        SwipePlan {
            duration,
            steps: whole_intervals.max(MIN_SWIPE_STEPS),
        }
    }

    /// Hold time for a long press, raised to `long_press_min` if needed.
    pub fn long_press_hold(&self, requested: Duration) -> Duration {
        requested.max(self.long_press_min)
    }
}

// ── Swipe path ────────────────────────────────────────────────────────────────

/// The intermediate positions of a swipe, one per step.
///
/// Position `i` of `steps` follows an ease-in-out curve along the straight
/// line from start to end, pushed sideways by a sine-shaped arc so the drag
/// bows slightly like a real thumb stroke.  The final position lands on
/// (or within float error of) the end point; the synthesizer still sends
/// the release at the literal end point.
#[derive(Debug, Clone)]
pub struct SwipePath {
    start: NormalizedPoint,
    dx: f32,
    dy: f32,
    perp: (f32, f32),
    arc_offset: f32,
    steps: u32,
    next: u32,
}

impl SwipePath {
    pub fn new(start: NormalizedPoint, end: NormalizedPoint, steps: u32) -> Self {
        let dx = end.x - start.x;
        let dy = end.y - start.y;
        let path_len = (dx * dx + dy * dy).sqrt();

        let (px, py) = (-dy, dx);
        let perp_len = (px * px + py * py).sqrt();
        let perp = if perp_len > PERP_EPSILON {
            (px / perp_len, py / perp_len)
        } else {
            FALLBACK_PERP
        };

        Self {
            start,
            dx,
            dy,
            perp,
            arc_offset: (path_len * ARC_RATIO).max(MIN_ARC_OFFSET),
            steps,
            next: 0,
        }
    }

    fn point_at(&self, i: u32) -> NormalizedPoint {
        let t = i as f32 / self.steps as f32;
        let eased = 0.5 - 0.5 * (t * PI).cos();
        let arc = (eased * PI).sin() * self.arc_offset;
        NormalizedPoint::new(
            self.start.x + self.dx * eased + self.perp.0 * arc,
            self.start.y + self.dy * eased + self.perp.1 * arc,
        )
    }
}

impl Iterator for SwipePath {
    type Item = NormalizedPoint;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.steps {
            return None;
        }
        self.next += 1;
        Some(self.point_at(self.next))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = (self.steps - self.next) as usize;
        (left, Some(left))
    }
}

impl ExactSizeIterator for SwipePath {}

// ── Use case ──────────────────────────────────────────────────────────────────

/// The Synthesize Gesture use case.
///
/// Every public operation checks the connection handle first and emits
/// nothing if it is the "no session" sentinel.
pub struct GestureSynthesizer {
    sink: Arc<dyn EventSink>,
    pacer: Arc<dyn Pacer>,
    timing: GestureTiming,
}

impl GestureSynthesizer {
    /// Creates a synthesizer that reports to `sink` and waits through `pacer`.
    pub fn new(sink: Arc<dyn EventSink>, pacer: Arc<dyn Pacer>, timing: GestureTiming) -> Self {
        Self { sink, pacer, timing }
    }

    /// Plays any gesture request to completion.
    ///
    /// # Errors
    ///
    /// Returns [`GestureError::NotConnected`] before emitting anything if
    /// `connection` is [`ConnectionHandle::NONE`].
    pub fn perform(
        &self,
        connection: ConnectionHandle,
        request: GestureRequest,
    ) -> Result<(), GestureError> {
        match request {
            GestureRequest::Tap { point } => self.tap(connection, point),
            GestureRequest::LongPress { point, duration } => {
                self.long_press(connection, point, duration)
            }
            GestureRequest::Swipe {
                start,
                end,
                duration,
            } => self.swipe(connection, start, end, duration),
            GestureRequest::MultiTap { points } => self.multi_tap(connection, &points),
            GestureRequest::MultiLongPress { points, duration } => {
                self.multi_long_press(connection, &points, duration)
            }
            GestureRequest::KeyPress { key } => self.key_press(connection, key),
        }
    }

    /// Touch down at `point`, hold for the tap time, lift at `point`.
    ///
    /// # Errors
    ///
    /// Returns [`GestureError::NotConnected`] if there is no session.
    pub fn tap(&self, connection: ConnectionHandle, point: NormalizedPoint) -> Result<(), GestureError> {
        ensure_connected(connection)?;
        debug!(%connection, x = point.x, y = point.y, "tap");
        self.press_and_hold(connection, point, self.timing.tap_hold);
        Ok(())
    }

    /// Like [`tap`](Self::tap) but held for `duration` (at least the
    /// configured minimum).
    ///
    /// # Errors
    ///
    /// Returns [`GestureError::NotConnected`] if there is no session.
    pub fn long_press(
        &self,
        connection: ConnectionHandle,
        point: NormalizedPoint,
        duration: Duration,
    ) -> Result<(), GestureError> {
        ensure_connected(connection)?;
        let hold = self.timing.long_press_hold(duration);
        debug!(%connection, x = point.x, y = point.y, hold_ms = hold.as_millis() as u64, "long press");
        self.press_and_hold(connection, point, hold);
        Ok(())
    }

    /// Drags from `start` to `end` over roughly `duration`.
    ///
    /// Emits one down report at `start`, one pressed move report per step
    /// (each preceded by a touch interval wait), then the release at the
    /// literal `end` point: `steps + 2` contact reports in total.
    ///
    /// # Errors
    ///
    /// Returns [`GestureError::NotConnected`] if there is no session.
    pub fn swipe(
        &self,
        connection: ConnectionHandle,
        start: NormalizedPoint,
        end: NormalizedPoint,
        duration: Duration,
    ) -> Result<(), GestureError> {
        ensure_connected(connection)?;
        let plan = self.timing.swipe_plan(duration);
        debug!(
            %connection,
            duration_ms = plan.duration.as_millis() as u64,
            steps = plan.steps,
            "swipe"
        );

        self.contact(connection, true, start);
        for point in SwipePath::new(start, end, plan.steps) {
            self.pacer.pause(self.timing.touch_interval);
            self.contact(connection, true, point);
        }
        self.contact(connection, false, end);
        Ok(())
    }

    /// Taps each point of `points` in order, never overlapping.
    ///
    /// # Errors
    ///
    /// Returns [`GestureError::NotConnected`] if there is no session.
    pub fn multi_tap(&self, connection: ConnectionHandle, points: &PointBatch) -> Result<(), GestureError> {
        ensure_connected(connection)?;
        debug!(%connection, count = points.len(), "multi tap");
        self.each_point(points, self.timing.multi_tap_pause, |point| {
            self.press_and_hold(connection, point, self.timing.tap_hold);
        });
        Ok(())
    }

    /// Long-presses each point of `points` in order, all for `duration`.
    ///
    /// # Errors
    ///
    /// Returns [`GestureError::NotConnected`] if there is no session.
    pub fn multi_long_press(
        &self,
        connection: ConnectionHandle,
        points: &PointBatch,
        duration: Duration,
    ) -> Result<(), GestureError> {
        ensure_connected(connection)?;
        let hold = self.timing.long_press_hold(duration);
        debug!(%connection, count = points.len(), hold_ms = hold.as_millis() as u64, "multi long press");
        self.each_point(points, self.timing.multi_long_press_pause, |point| {
            self.press_and_hold(connection, point, hold);
        });
        Ok(())
    }

    /// Presses and releases a consumer button.
    ///
    /// # Errors
    ///
    /// Returns [`GestureError::NotConnected`] if there is no session.
    pub fn key_press(&self, connection: ConnectionHandle, key: ConsumerKey) -> Result<(), GestureError> {
        ensure_connected(connection)?;
        debug!(%connection, %key, usage = key.usage(), "key press");
        self.key(connection, key, true);
        self.pacer.pause(self.timing.key_hold);
        self.key(connection, key, false);
        Ok(())
    }

    // ── Helpers ───────────────────────────────────────────────────────────────

    fn each_point(&self, points: &PointBatch, gap: Duration, mut play: impl FnMut(NormalizedPoint)) {
        for (index, point) in points.iter().enumerate() {
            if index > 0 {
                self.pacer.pause(gap);
            }
            play(*point);
        }
    }

    fn press_and_hold(&self, connection: ConnectionHandle, point: NormalizedPoint, hold: Duration) {
        self.contact(connection, true, point);
        self.pacer.pause(hold);
        self.contact(connection, false, point);
    }

    fn contact(&self, connection: ConnectionHandle, pressed: bool, point: NormalizedPoint) {
        let (x, y) = point.to_device();
        if let Err(e) = self.sink.send_contact(connection, pressed, x, y) {
            warn!(%connection, pressed, x = x.value(), y = y.value(), "contact report dropped: {e}");
        }
    }

    fn key(&self, connection: ConnectionHandle, key: ConsumerKey, pressed: bool) {
        if let Err(e) = self.sink.send_key(connection, key, pressed) {
            warn!(%connection, %key, pressed, "key report dropped: {e}");
        }
    }
}

fn ensure_connected(connection: ConnectionHandle) -> Result<(), GestureError> {
    if connection.is_connected() {
        Ok(())
    } else {
        Err(GestureError::NotConnected)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
