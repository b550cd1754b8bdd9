//! An event sink that only logs.

use std::sync::atomic::{AtomicU64, Ordering};

use hidremote_core::{ConnectionHandle, ConsumerKey, DeviceCoordinate};
use tracing::{debug, trace};

use crate::application::synthesize_gesture::{EventSink, SinkError};

/// Logs each report at `trace` level (key reports at `debug`) and counts them.
#[derive(Debug, Default)]
pub struct LoggingEventSink {
    contacts: AtomicU64,
    keys: AtomicU64,
}

impl LoggingEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of contact reports seen so far.
    pub fn contact_count(&self) -> u64 {
        self.contacts.load(Ordering::Relaxed)
    }

    /// Number of key reports seen so far.
    pub fn key_count(&self) -> u64 {
        self.keys.load(Ordering::Relaxed)
    }
}

impl EventSink for LoggingEventSink {
    fn send_contact(
        &self,
        connection: ConnectionHandle,
        pressed: bool,
        x: DeviceCoordinate,
        y: DeviceCoordinate,
    ) -> Result<(), SinkError> {
        self.contacts.fetch_add(1, Ordering::Relaxed);
        trace!(%connection, pressed, x = x.value(), y = y.value(), "contact report");
        Ok(())
    }

    fn send_key(
        &self,
        connection: ConnectionHandle,
        key: ConsumerKey,
        pressed: bool,
    ) -> Result<(), SinkError> {
        self.keys.fetch_add(1, Ordering::Relaxed);
        debug!(%connection, %key, usage = format_args!("{:#06x}", key.usage()), pressed, "consumer report");
        Ok(())
    }
}
