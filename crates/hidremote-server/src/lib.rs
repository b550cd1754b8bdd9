//! hidremote-server library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.
//!
//! # What does hidremote-server do? (for beginners)
//!
//! The server receives small HTTP POST commands such as
//! `POST /touch/swipe {"start_x":0.5,"start_y":0.9,"end_x":0.5,"end_y":0.1}`
//! and replays them as touch and button reports on a paired device, paced
//! in real time so the device sees something that looks like a finger.
//!
//! 1. The HTTP layer reads the request and picks a [`Command`] from the path.
//! 2. The [`CommandDispatcher`] checks that a transport session exists, scans
//!    the payload, and builds a validated `GestureRequest`.
//! 3. The [`GestureWorker`] hands the request to the [`GestureSynthesizer`]
//!    on its own thread, one gesture at a time.
//! 4. The synthesizer emits contact or key events to an [`EventSink`],
//!    sleeping between events as the gesture requires.
//!
//! [`Command`]: application::dispatch_command::Command
//! [`CommandDispatcher`]: application::dispatch_command::CommandDispatcher
//! [`GestureWorker`]: infrastructure::worker::GestureWorker
//! [`GestureSynthesizer`]: application::synthesize_gesture::GestureSynthesizer
//! [`EventSink`]: application::synthesize_gesture::EventSink

/// Application layer: gesture synthesis and command dispatch.
pub mod application;

/// Infrastructure layer: event sinks, session state, worker, HTTP, config.
pub mod infrastructure;
