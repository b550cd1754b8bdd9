//! Hand-written scanners for command payloads.
//!
//! Command bodies look like JSON (`{"x": 0.25, "y": 0.75}`) but the system
//! only ever needs a few named numbers out of them.  Instead of a full JSON
//! parser, these scanners walk the raw bytes once, look for a quoted field
//! name, and lex the number that follows it.
//!
//! # Ground rules
//!
//! - Input is an immutable `&[u8]`; nothing is copied or allocated.
//! - Every lookup returns an `Option`.  `None` means "not usable", whatever
//!   the reason (absent field, missing colon, a string where a number should
//!   be).  Callers decide whether that is an error.
//! - Only the *first* occurrence of a field name is considered.  A payload
//!   with duplicate keys gets its first one, and a field name that first
//!   appears as a string value hides the real key behind it.
//! - No input, however malformed, can make a scanner panic.

pub mod field;
pub mod points;

pub use field::{find_f32, find_number, find_u32};
pub use points::extract_points;
