//! # hidremote-core
//!
//! Shared library for HID-Remote containing the gesture domain types, the
//! normalized-to-absolute coordinate mapper, the consumer key table, and the
//! hand-written payload scanners.
//!
//! This crate has zero dependencies on OS APIs, sockets, threads, or timers.
//! Everything in it is a pure function or a plain data type.
//!
//! # Architecture overview (for beginners)
//!
//! HID-Remote turns small text commands ("tap at 0.25, 0.75", "swipe from
//! here to there in 400 ms") into the touch and key reports that a paired
//! host sees as a real touchscreen.  This crate is the foundation:
//!
//! - **`domain`** – The vocabulary of the system.  A [`NormalizedPoint`] is a
//!   position as a fraction of the screen; a [`DeviceCoordinate`] is the same
//!   position in the absolute digitizer space `0..=32767`; a
//!   [`GestureRequest`] is one fully validated command ready to be played.
//!
//! - **`keymap`** – The five named buttons (volume up/down, home, back,
//!   power) and their USB HID Consumer page usage IDs.
//!
//! - **`scan`** – A minimal scanner that pulls numeric fields out of
//!   JSON-like payloads without a JSON parser.  It is deliberately forgiving:
//!   extra fields and odd whitespace are fine, and it never panics.

pub mod domain;
pub mod keymap;
pub mod scan;

pub use domain::coordinates::{map_normalized, DeviceCoordinate, NormalizedPoint, COORD_MAX, COORD_MIN};
pub use domain::gesture::{ConnectionHandle, ContactEvent, GestureRequest, PointBatch, MAX_POINTS};
pub use keymap::consumer::{ConsumerKey, ParseKeyError};
pub use scan::field::{find_f32, find_number, find_u32};
pub use scan::points::extract_points;
