//! Domain entities for HID-Remote.
//!
//! Pure data types and total functions with no infrastructure dependencies.
//! Code in the server crate depends on these types; nothing here depends on
//! the server.

/// Normalized and absolute coordinate spaces, and the mapping between them.
pub mod coordinates;

/// Gesture requests, point batches, contact events, and the connection handle.
pub mod gesture;
