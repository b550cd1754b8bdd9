//! Thread-safe holder for the current transport session.
//!
//! The injection transport connects and disconnects on its own schedule;
//! HTTP handlers read the current handle on every command.  A single
//! `AtomicU16` is enough: the handle is a `u16` and the "no session" state is
//! the `u16::MAX` sentinel, so there is never a torn read and no lock.

use std::sync::atomic::{AtomicU16, Ordering};

use hidremote_core::ConnectionHandle;
use tracing::info;

use crate::application::dispatch_command::SessionState;

/// The current connection, readable from any thread.
#[derive(Debug)]
pub struct SessionCell {
    raw: AtomicU16,
}

impl SessionCell {
    /// Creates a cell with no active session.
    pub fn new() -> Self {
        Self::with_connection(ConnectionHandle::NONE)
    }

    pub fn with_connection(connection: ConnectionHandle) -> Self {
        Self {
            raw: AtomicU16::new(connection.raw()),
        }
    }

    pub fn current(&self) -> ConnectionHandle {
        ConnectionHandle::from_raw(self.raw.load(Ordering::Acquire))
    }

    /// Records a newly established session, replacing any previous one.
    pub fn connect(&self, connection: ConnectionHandle) {
        let previous = self.raw.swap(connection.raw(), Ordering::AcqRel);
        info!(
            %connection,
            previous = %ConnectionHandle::from_raw(previous),
            "transport session connected"
        );
    }

    /// Clears the session; subsequent commands report "not connected".
    pub fn disconnect(&self) {
        let previous = self.raw.swap(ConnectionHandle::NONE.raw(), Ordering::AcqRel);
        info!(previous = %ConnectionHandle::from_raw(previous), "transport session cleared");
    }
}

impl Default for SessionCell {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionState for SessionCell {
    fn current(&self) -> ConnectionHandle {
        SessionCell::current(self)
    }
}
