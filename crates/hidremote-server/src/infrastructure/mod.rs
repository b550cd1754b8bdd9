//! Infrastructure layer for hidremote-server.
//!
//! The infrastructure layer handles all I/O and timing: sockets, threads,
//! sleeping, and files.
//!
//! # Responsibilities
//!
//! - Binding the HTTP listener and serving one Tokio task per connection
//! - Running the gesture synthesizer on its own thread (`worker`)
//! - Sleeping between reports (`pacing`)
//! - Holding the current transport session (`session`)
//! - Delivering or recording reports (`event_sink`)
//! - Loading the TOML configuration (`storage`)
//!
//! # What does NOT belong here?
//!
//! - Payload validation and gesture geometry (application layer)
//! - Coordinate mapping and field scanning (`hidremote-core`)

pub mod event_sink;
pub mod http_server;
pub mod pacing;
pub mod session;
pub mod storage;
pub mod worker;

// Re-export the primary entry points so `main.rs` can call them concisely.
pub use http_server::HttpServer;
pub use session::SessionCell;
pub use worker::GestureWorker;
