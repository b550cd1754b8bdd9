//! Recording event sink for tests.
//!
//! # Why a mock sink?
//!
//! A real sink talks to a paired device over a radio link.  That needs
//! hardware, cannot be observed from test code, and would actually touch
//! somebody's screen.  `MockEventSink` replaces it with in-memory recording:
//! each report is pushed into a `Mutex<Vec<...>>` so assertions can inspect
//! exactly what was emitted and in what order.
//!
//! # Usage in tests
//!
//! ```ignore
//! let sink = Arc::new(MockEventSink::new());
//! let synth = GestureSynthesizer::new(sink.clone(), Arc::new(RecordingPacer::new()), GestureTiming::default());
//!
//! synth.tap(ConnectionHandle::from_raw(0), NormalizedPoint::CENTER).unwrap();
//!
//! assert_eq!(sink.contacts().len(), 2);
//! assert!(sink.is_balanced());
//! ```
//!
//! # `should_fail` flag
//!
//! Set `should_fail = true` to make every call return a `SinkError` without
//! recording anything.  Use it to check that callers survive a broken
//! transport.

use std::sync::Mutex;

use hidremote_core::{ConnectionHandle, ConsumerKey, ContactEvent, DeviceCoordinate};

use crate::application::synthesize_gesture::{EventSink, SinkError};

/// One report as seen by the sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkRecord {
    Contact(ContactEvent),
    Key {
        connection: ConnectionHandle,
        key: ConsumerKey,
        pressed: bool,
    },
}

impl SinkRecord {
    fn pressed(&self) -> bool {
        match self {
            SinkRecord::Contact(event) => event.pressed,
            SinkRecord::Key { pressed, .. } => *pressed,
        }
    }
}

/// A sink that records every report instead of sending it.
#[derive(Debug, Default)]
pub struct MockEventSink {
    /// Every report in emission order, contacts and keys interleaved.
    pub records: Mutex<Vec<SinkRecord>>,
    /// When `true`, every method returns `SinkError::Transport` unrecorded.
    pub should_fail: bool,
}

impl MockEventSink {
    /// Creates a sink with no records and `should_fail = false`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a sink that rejects every report.
    pub fn failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }

    /// All recorded reports.
    pub fn records(&self) -> Vec<SinkRecord> {
        self.records.lock().unwrap().clone()
    }

    /// Only the contact reports.
    pub fn contacts(&self) -> Vec<ContactEvent> {
        self.records()
            .into_iter()
            .filter_map(|r| match r {
                SinkRecord::Contact(event) => Some(event),
                SinkRecord::Key { .. } => None,
            })
            .collect()
    }

    /// Only the key reports, as `(key, pressed)`.
    pub fn keys(&self) -> Vec<(ConsumerKey, bool)> {
        self.records()
            .into_iter()
            .filter_map(|r| match r {
                SinkRecord::Key { key, pressed, .. } => Some((key, pressed)),
                SinkRecord::Contact(_) => None,
            })
            .collect()
    }

    /// True when presses and releases strictly alternate, starting with a
    /// press and ending with a release, for contacts and keys separately.
    ///
    /// Swipe moves (pressed contacts following a pressed contact) count as
    /// part of the same press.
    pub fn is_balanced(&self) -> bool {
        let records = self.records();
        let contacts = records.iter().filter(|r| matches!(r, SinkRecord::Contact(_)));
        let keys = records.iter().filter(|r| matches!(r, SinkRecord::Key { .. }));
        balanced(contacts) && balanced(keys)
    }

    pub fn clear(&self) {
        self.records.lock().unwrap().clear();
    }
}

fn balanced<'a>(records: impl Iterator<Item = &'a SinkRecord>) -> bool {
    let mut down = false;
    for record in records {
        match (down, record.pressed()) {
            (false, false) => return false,
            (_, pressed) => down = pressed,
        }
    }
    !down
}

impl EventSink for MockEventSink {
    fn send_contact(
        &self,
        connection: ConnectionHandle,
        pressed: bool,
        x: DeviceCoordinate,
        y: DeviceCoordinate,
    ) -> Result<(), SinkError> {
        if self.should_fail {
            return Err(SinkError::Transport("mock failure".into()));
        }
        self.records.lock().unwrap().push(SinkRecord::Contact(ContactEvent {
            connection,
            pressed,
            x,
            y,
        }));
        Ok(())
    }

    fn send_key(
        &self,
        connection: ConnectionHandle,
        key: ConsumerKey,
        pressed: bool,
    ) -> Result<(), SinkError> {
        if self.should_fail {
            return Err(SinkError::Transport("mock failure".into()));
        }
        self.records.lock().unwrap().push(SinkRecord::Key {
            connection,
            key,
            pressed,
        });
        Ok(())
    }
}
