//! `EventSink` implementations.
//!
//! The real injection transport (a paired HID link) is outside this crate;
//! it plugs in by implementing `EventSink`.  Two implementations ship here:
//!
//! - [`logging::LoggingEventSink`] writes every report to the log.  The
//!   binary uses it so the server can run and be exercised end to end
//!   without a device.
//! - [`mock::MockEventSink`] records reports in memory for tests.

pub mod logging;
pub mod mock;

pub use logging::LoggingEventSink;
pub use mock::{MockEventSink, SinkRecord};
