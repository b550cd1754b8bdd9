//! CommandDispatcher: turns a named command plus payload into a gesture.
//!
//! The dispatcher is the boundary between the outside world (HTTP paths and
//! request bodies) and the gesture synthesizer.  For every command it
//!
//! 1. reads the current transport session and rejects the command if there
//!    is none,
//! 2. scans the payload for the fields that command needs,
//! 3. builds a validated [`GestureRequest`], and
//! 4. queues it for synthesis and waits for the gesture to finish.
//!
//! # Validation order
//!
//! The session check always runs first, before the payload is even looked
//! at.  A malformed body sent while no device is paired therefore reports
//! "not connected", not "malformed".
//!
//! # Collaborators
//!
//! Two traits keep this module free of infrastructure types:
//!
//! - [`SessionState`] answers "which connection is active right now?"
//!   (implemented by `infrastructure::session::SessionCell`).
//! - [`GestureQueue`] accepts a gesture and hands back a receiver for its
//!   outcome (implemented by `infrastructure::worker::GestureWorker`).

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use hidremote_core::{
    extract_points, find_f32, find_u32, ConnectionHandle, ConsumerKey, GestureRequest,
    NormalizedPoint,
};
use thiserror::Error;
use tokio::sync::oneshot;
use tracing::debug;

use crate::application::synthesize_gesture::GestureError;

/// Name of the list field carrying multi-point gestures.
const POINTS_FIELD: &str = "points";

// ── Errors ────────────────────────────────────────────────────────────────────

/// Why a command was not performed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// No transport session is active.
    #[error("HID not connected")]
    NotConnected,

    /// A required field is missing or the point list is empty.
    #[error("{0}")]
    MalformedInput(&'static str),

    /// The gesture queue is full; the client may retry later.
    #[error("gesture queue full")]
    Busy,

    /// The gesture could not be run (worker gone, reply lost).
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<GestureError> for DispatchError {
    fn from(e: GestureError) -> Self {
        match e {
            GestureError::NotConnected => DispatchError::NotConnected,
        }
    }
}

// ── Command ───────────────────────────────────────────────────────────────────

/// One dispatchable command, before its payload is parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Tap,
    LongPress,
    Swipe,
    MultiTap,
    MultiLongPress,
    Key(ConsumerKey),
}

impl Command {
    /// Every touch command, in route order.
    pub const TOUCH: [Command; 5] = [
        Command::Tap,
        Command::LongPress,
        Command::Swipe,
        Command::MultiTap,
        Command::MultiLongPress,
    ];

    /// Resolves a request path such as `/touch/swipe` or `/key/home`.
    ///
    /// Returns `None` for anything that is not a known command path.  A
    /// trailing query string is not stripped here; callers pass the bare path.
    pub fn from_path(path: &str) -> Option<Self> {
        if let Some(name) = path.strip_prefix("/touch/") {
            return Self::TOUCH.into_iter().find(|c| c.name() == name);
        }
        path.strip_prefix("/key/")
            .and_then(|name| name.parse::<ConsumerKey>().ok())
            .map(Command::Key)
    }

    /// Short name as it appears in the route.
    pub fn name(self) -> &'static str {
        match self {
            Command::Tap => "tap",
            Command::LongPress => "long_press",
            Command::Swipe => "swipe",
            Command::MultiTap => "multi_tap",
            Command::MultiLongPress => "multi_long_press",
            Command::Key(key) => key.name(),
        }
    }

    /// The full route path for this command.
    pub fn path(self) -> String {
        match self {
            Command::Key(key) => format!("/key/{}", key.name()),
            touch => format!("/touch/{}", touch.name()),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

// ── Collaborator traits ───────────────────────────────────────────────────────

/// Source of the current transport session.
pub trait SessionState: Send + Sync {
    fn current(&self) -> ConnectionHandle;
}

/// Outcome of one queued gesture, delivered when synthesis ends.
pub type GestureReply = oneshot::Receiver<Result<(), GestureError>>;

/// Accepts gestures for serialized, paced playback.
pub trait GestureQueue: Send + Sync {
    /// Queues `request` for `connection`.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Internal`] if the queue no longer accepts work.
    fn enqueue(
        &self,
        connection: ConnectionHandle,
        request: GestureRequest,
    ) -> Result<GestureReply, DispatchError>;
}

// ── Payload parsing ───────────────────────────────────────────────────────────

/// Builds the gesture for `command` from its payload.
///
/// `payload` is `None` when the request carried no body.  Callers should map
/// an empty body to `None` first; [`CommandDispatcher::prepare`] does.
///
/// # Errors
///
/// Returns [`DispatchError::MalformedInput`] with the message the client
/// sees: "Missing x/y", "Missing body", "Missing fields", or "Invalid points".
pub fn parse_request(command: Command, payload: Option<&[u8]>) -> Result<GestureRequest, DispatchError> {
    match command {
        Command::Tap => {
            let point = match payload {
                None => NormalizedPoint::CENTER,
                Some(body) => read_point(body, "x", "y")
                    .ok_or(DispatchError::MalformedInput("Missing x/y"))?,
            };
            Ok(GestureRequest::Tap { point })
        }
        Command::LongPress => {
            let body = require_body(payload)?;
            let fields = read_point(body, "x", "y").zip(find_u32(body, "duration_ms"));
            let (point, ms) = fields.ok_or(DispatchError::MalformedInput("Missing fields"))?;
            Ok(GestureRequest::LongPress {
                point,
                duration: millis(ms),
            })
        }
        Command::Swipe => {
            let body = require_body(payload)?;
            let start = read_point(body, "start_x", "start_y");
            let end = read_point(body, "end_x", "end_y");
            let (start, end) = start
                .zip(end)
                .ok_or(DispatchError::MalformedInput("Missing fields"))?;
            Ok(GestureRequest::Swipe {
                start,
                end,
                duration: optional_duration(body),
            })
        }
        Command::MultiTap => {
            let body = require_body(payload)?;
            let points = extract_points(body, POINTS_FIELD);
            if points.is_empty() {
                return Err(DispatchError::MalformedInput("Invalid points"));
            }
            Ok(GestureRequest::MultiTap { points })
        }
        Command::MultiLongPress => {
            let body = require_body(payload)?;
            let points = extract_points(body, POINTS_FIELD);
            if points.is_empty() {
                return Err(DispatchError::MalformedInput("Invalid points"));
            }
            Ok(GestureRequest::MultiLongPress {
                points,
                duration: optional_duration(body),
            })
        }
        Command::Key(key) => Ok(GestureRequest::KeyPress { key }),
    }
}

fn require_body(payload: Option<&[u8]>) -> Result<&[u8], DispatchError> {
    payload.ok_or(DispatchError::MalformedInput("Missing body"))
}

fn read_point(body: &[u8], x_field: &str, y_field: &str) -> Option<NormalizedPoint> {
    let x = find_f32(body, x_field)?;
    let y = find_f32(body, y_field)?;
    Some(NormalizedPoint::new(x, y))
}

fn optional_duration(body: &[u8]) -> Duration {
    millis(find_u32(body, "duration_ms").unwrap_or(0))
}

fn millis(ms: u32) -> Duration {
    Duration::from_millis(u64::from(ms))
}

// ── Use case ──────────────────────────────────────────────────────────────────

/// The Dispatch Command use case.
pub struct CommandDispatcher {
    session: Arc<dyn SessionState>,
    queue: Arc<dyn GestureQueue>,
}

impl CommandDispatcher {
    pub fn new(session: Arc<dyn SessionState>, queue: Arc<dyn GestureQueue>) -> Self {
        Self { session, queue }
    }

    /// Returns the current session, or `NotConnected`.
    ///
    /// Front ends call this before reading a request body.
    ///
    /// # Errors
    ///
    /// [`DispatchError::NotConnected`] if there is no session.
    pub fn ensure_connected(&self) -> Result<ConnectionHandle, DispatchError> {
        let connection = self.session.current();
        if connection.is_connected() {
            Ok(connection)
        } else {
            Err(DispatchError::NotConnected)
        }
    }

    /// Checks the session and parses the payload without running anything.
    ///
    /// An empty payload is treated the same as no payload.
    ///
    /// # Errors
    ///
    /// [`DispatchError::NotConnected`] if there is no session (checked first),
    /// otherwise [`DispatchError::MalformedInput`] from [`parse_request`].
    pub fn prepare(
        &self,
        command: Command,
        payload: Option<&[u8]>,
    ) -> Result<(ConnectionHandle, GestureRequest), DispatchError> {
        let connection = self.ensure_connected()?;

        let payload = payload.filter(|body| !body.is_empty());
        let request = parse_request(command, payload)?;
        debug!(%command, %connection, kind = request.kind(), "command accepted");
        Ok((connection, request))
    }

    /// Prepares the command, queues it, and waits for the gesture to finish.
    ///
    /// # Errors
    ///
    /// Everything [`prepare`](Self::prepare) returns, plus
    /// [`DispatchError::Busy`] if the queue is full and
    /// [`DispatchError::Internal`] if the queue is closed or drops the reply.
    pub async fn dispatch(&self, command: Command, payload: Option<&[u8]>) -> Result<(), DispatchError> {
        let (connection, request) = self.prepare(command, payload)?;
        let reply = self.queue.enqueue(connection, request)?;
        let outcome = reply
            .await
            .map_err(|_| DispatchError::Internal("gesture reply dropped".to_string()))?;
        outcome.map_err(DispatchError::from)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
