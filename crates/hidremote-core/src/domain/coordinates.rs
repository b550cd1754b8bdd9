//! Normalized and absolute coordinate spaces.
//!
//! Commands describe positions as fractions of the target surface
//! ([`NormalizedPoint`]).  The digitizer reports that the host receives use a
//! fixed absolute range, `COORD_MIN..=COORD_MAX`, independent of the real
//! screen resolution ([`DeviceCoordinate`]).  The host OS scales that range
//! onto whatever display it has.
//!
//! # Leniency
//!
//! Mapping never fails.  Values below 0 or above 1 are saturated to the
//! nearest edge, and `NaN` maps to the origin.  A best-effort remote input
//! tool is more useful when a slightly-off command lands on the screen edge
//! than when it is refused.

/// Smallest absolute coordinate a contact report can carry.
pub const COORD_MIN: u16 = 0;

/// Largest absolute coordinate a contact report can carry (15-bit logical maximum).
pub const COORD_MAX: u16 = 32767;

/// A position on one axis of the absolute digitizer space.
///
/// The inner value is guaranteed to lie in `COORD_MIN..=COORD_MAX`; the only
/// constructors are [`map_normalized`] and [`DeviceCoordinate::clamped`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DeviceCoordinate(u16);

impl DeviceCoordinate {
    /// The origin of the axis.
    pub const MIN: DeviceCoordinate = DeviceCoordinate(COORD_MIN);

    /// The far edge of the axis.
    pub const MAX: DeviceCoordinate = DeviceCoordinate(COORD_MAX);

    /// Builds a coordinate from an arbitrary integer, clamping into range.
    pub fn clamped(raw: i32) -> Self {
        let bounded = raw.clamp(i32::from(COORD_MIN), i32::from(COORD_MAX));
        // In range for u16 after the clamp above.
        Self(bounded as u16)
    }

    /// Returns the raw axis value.
    pub fn value(self) -> u16 {
        self.0
    }
}

impl From<DeviceCoordinate> for u16 {
    fn from(coord: DeviceCoordinate) -> Self {
        coord.0
    }
}

/// Maps a unit-interval value onto the absolute axis.
///
/// Saturates `value` to `[0.0, 1.0]` (with `NaN` treated as `0.0`), scales
/// by [`COORD_MAX`], rounds half-up, then clamps the integer result again.
/// The second clamp only matters if rounding ever pushes one unit past the
/// edge.
///
/// # Examples
///
/// ```rust
/// use hidremote_core::{map_normalized, COORD_MAX};
///
/// assert_eq!(map_normalized(0.0).value(), 0);
/// assert_eq!(map_normalized(0.5).value(), 16384);
/// assert_eq!(map_normalized(7.0).value(), COORD_MAX);
/// ```
pub fn map_normalized(value: f32) -> DeviceCoordinate {
    let saturated = if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    };
    let scaled = (saturated * f32::from(COORD_MAX) + 0.5).floor();
    DeviceCoordinate::clamped(scaled as i32)
}

/// A position expressed as a fraction of the target surface.
///
/// `(0.0, 0.0)` is the top-left corner and `(1.0, 1.0)` the bottom-right.
/// Out-of-range components are allowed and are saturated when mapped.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NormalizedPoint {
    pub x: f32,
    pub y: f32,
}

impl NormalizedPoint {
    /// The middle of the surface; used when a tap arrives without a payload.
    pub const CENTER: NormalizedPoint = NormalizedPoint { x: 0.5, y: 0.5 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Maps both axes into the absolute digitizer space.
    pub fn to_device(self) -> (DeviceCoordinate, DeviceCoordinate) {
        (map_normalized(self.x), map_normalized(self.y))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
