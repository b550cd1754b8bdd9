//! Named button tables.
//!
//! The only buttons HID-Remote presses are the handful of system buttons a
//! phone or tablet exposes (volume, home, back, power).  They live on the USB
//! HID Consumer page rather than the keyboard page.

pub mod consumer;

pub use consumer::ConsumerKey;
