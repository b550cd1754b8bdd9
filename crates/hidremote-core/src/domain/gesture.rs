//! Gesture requests and the events they expand into.
//!
//! A [`GestureRequest`] is built once per command by the dispatcher from
//! already-scanned numeric fields, handed by value to the synthesizer, and
//! consumed there.  Nothing in this module is retained between commands.

use std::time::Duration;

use super::coordinates::{DeviceCoordinate, NormalizedPoint};
use crate::keymap::consumer::ConsumerKey;

/// Maximum number of points a multi-point gesture will play.
///
/// Points beyond this are dropped silently by [`PointBatch::push`].
pub const MAX_POINTS: usize = 5;

// ── ConnectionHandle ─────────────────────────────────────────────────────────

/// Opaque identifier of the transport session events are delivered to.
///
/// [`ConnectionHandle::NONE`] is the sentinel for "no session"; every gesture
/// and key operation checks for it before emitting anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionHandle(u16);

impl ConnectionHandle {
    /// Sentinel meaning no transport session is active.
    pub const NONE: ConnectionHandle = ConnectionHandle(u16::MAX);

    /// Wraps a raw transport connection id.
    ///
    /// Passing `u16::MAX` yields [`ConnectionHandle::NONE`].
    pub const fn from_raw(raw: u16) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u16 {
        self.0
    }

    /// `true` unless this is the sentinel.
    pub fn is_connected(self) -> bool {
        self != Self::NONE
    }
}

impl Default for ConnectionHandle {
    fn default() -> Self {
        Self::NONE
    }
}

impl std::fmt::Display for ConnectionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_connected() {
            write!(f, "conn#{}", self.0)
        } else {
            f.write_str("conn#none")
        }
    }
}

// ── ContactEvent ─────────────────────────────────────────────────────────────

/// One instant of a touch contact's state, as handed to the event sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContactEvent {
    pub connection: ConnectionHandle,
    /// `true` while the finger is on the surface, `false` for the lift-off.
    pub pressed: bool,
    pub x: DeviceCoordinate,
    pub y: DeviceCoordinate,
}

// ── PointBatch ───────────────────────────────────────────────────────────────

/// An ordered list of at most [`MAX_POINTS`] normalized points.
///
/// Storage is inline; building a batch never allocates.
#[derive(Debug, Clone, Copy, Default)]
pub struct PointBatch {
    points: [NormalizedPoint; MAX_POINTS],
    len: usize,
}

impl PointBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `point`, returning `false` (and discarding it) when full.
    pub fn push(&mut self, point: NormalizedPoint) -> bool {
        if self.len == MAX_POINTS {
            return false;
        }
        self.points[self.len] = point;
        self.len += 1;
        true
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len == MAX_POINTS
    }

    pub fn as_slice(&self) -> &[NormalizedPoint] {
        &self.points[..self.len]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, NormalizedPoint> {
        self.as_slice().iter()
    }
}

impl PartialEq for PointBatch {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl FromIterator<NormalizedPoint> for PointBatch {
    /// Collects the first [`MAX_POINTS`] points; the rest are ignored.
    fn from_iter<I: IntoIterator<Item = NormalizedPoint>>(iter: I) -> Self {
        let mut batch = PointBatch::new();
        for point in iter.into_iter().take(MAX_POINTS) {
            batch.push(point);
        }
        batch
    }
}

impl<'a> IntoIterator for &'a PointBatch {
    type Item = &'a NormalizedPoint;
    type IntoIter = std::slice::Iter<'a, NormalizedPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// ── GestureRequest ───────────────────────────────────────────────────────────

/// A fully validated command, ready to be played by the synthesizer.
///
/// Durations are the *requested* values; floors and defaults (minimum press
/// time, default swipe duration) are applied at synthesis time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureRequest {
    /// Touch down, short fixed hold, lift.
    Tap { point: NormalizedPoint },
    /// Touch down, hold for `duration`, lift.
    LongPress {
        point: NormalizedPoint,
        duration: Duration,
    },
    /// Drag from `start` to `end`; a zero `duration` selects the default.
    Swipe {
        start: NormalizedPoint,
        end: NormalizedPoint,
        duration: Duration,
    },
    /// One tap per point, in order.
    MultiTap { points: PointBatch },
    /// One long press per point, in order, each held for `duration`.
    MultiLongPress {
        points: PointBatch,
        duration: Duration,
    },
    /// Press and release a named consumer button.
    KeyPress { key: ConsumerKey },
}

impl GestureRequest {
    /// Short lowercase name used in log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            GestureRequest::Tap { .. } => "tap",
            GestureRequest::LongPress { .. } => "long_press",
            GestureRequest::Swipe { .. } => "swipe",
            GestureRequest::MultiTap { .. } => "multi_tap",
            GestureRequest::MultiLongPress { .. } => "multi_long_press",
            GestureRequest::KeyPress { .. } => "key_press",
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
