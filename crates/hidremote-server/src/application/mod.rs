//! Application layer use cases for the server.
//!
//! # What use cases does the server have?
//!
//! - **`synthesize_gesture`** – Expands a validated `GestureRequest` into a
//!   paced sequence of contact or key events.  The events go to an
//!   `EventSink` implementation injected at construction time, and the
//!   waits between them go through a `Pacer`, so tests can observe both
//!   without a device or a real clock.
//!
//! - **`dispatch_command`** – Turns a command name plus raw payload bytes
//!   into a `GestureRequest`, enforcing the "connected first, then
//!   well-formed" validation order, and submits it for synthesis.

pub mod dispatch_command;
pub mod synthesize_gesture;
