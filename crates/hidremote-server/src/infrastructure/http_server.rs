//! HTTP/1.1 command endpoint: accept loop and per-request handling.
//!
//! This module is responsible for:
//!
//! 1. Binding a TCP listener on the configured address.
//! 2. Accepting connections and handing each one to its own Tokio task.
//! 3. Reading one request head plus body (`Content-Length` only; a
//!    `Transfer-Encoding` body is refused with `501`).
//! 4. Routing the path to a [`Command`] and running it through the
//!    [`CommandDispatcher`].
//! 5. Writing a single response and closing the connection.
//!
//! # Why not a web framework?
//!
//! The surface is ten fixed `POST` routes with tiny bodies.  A hand-written
//! request reader keeps the dependency stack to Tokio and makes the status
//! code rules explicit:
//!
//! | condition                                | status |
//! |------------------------------------------|--------|
//! | gesture played                           | 200    |
//! | malformed payload                        | 400    |
//! | unknown path                             | 404    |
//! | known path, method other than `POST`     | 405    |
//! | head or body took too long               | 408    |
//! | body larger than `max_body_bytes`        | 413    |
//! | body could not be read, worker failure   | 500    |
//! | `Transfer-Encoding` body                 | 501    |
//! | no transport session, gesture queue full | 503    |
//!
//! The session check runs before the body is read, so a request sent while
//! no device is paired gets `503` even if its body is broken.
//!
//! On shutdown the accept loop stops first; [`HttpServer::run`] then waits
//! for every open connection to write its response before returning.

use std::net::SocketAddr;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::{Duration, Instant};

use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinSet;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::application::dispatch_command::{Command, CommandDispatcher, DispatchError};

/// Largest request head (request line plus headers) accepted.
const MAX_HEAD_BYTES: usize = 8 * 1024;

/// How long a client may take to send its head, and separately its body.
const READ_TIMEOUT: Duration = Duration::from_secs(5);

/// Poll interval for the shutdown flag while waiting on `accept()`.
const ACCEPT_POLL: Duration = Duration::from_millis(200);

// ── Errors ────────────────────────────────────────────────────────────────────

/// Error type for the HTTP front end.
#[derive(Debug, Error)]
pub enum HttpError {
    /// The listener could not be bound.
    #[error("failed to bind HTTP listener on {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// Socket I/O failed mid-request.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The request head could not be parsed.
    #[error("malformed request: {0}")]
    BadRequest(&'static str),

    /// The body is framed with `Transfer-Encoding`, which is not decoded.
    #[error("unsupported transfer-encoding")]
    UnsupportedTransferEncoding,

    /// The request head exceeded [`MAX_HEAD_BYTES`].
    #[error("request head too large")]
    HeadTooLarge,

    /// The client closed the connection before the body was complete.
    #[error("body ended after {received} of {expected} bytes")]
    TruncatedBody { received: usize, expected: usize },

    /// The client stopped sending.
    #[error("timed out reading request")]
    Timeout,
}

impl HttpError {
    /// Response to send for this error, if the socket is still usable.
    fn response(&self) -> Option<Response> {
        match self {
            HttpError::Bind { .. } | HttpError::Io(_) => None,
            HttpError::BadRequest(_) => Some(Response::text(400, "Bad request")),
            HttpError::UnsupportedTransferEncoding => {
                Some(Response::text(501, "Transfer-Encoding not supported"))
            }
            HttpError::HeadTooLarge => Some(Response::text(431, "Request header too large")),
            HttpError::TruncatedBody { .. } => Some(Response::text(500, "Failed to read body")),
            HttpError::Timeout => Some(Response::text(408, "Request timeout")),
        }
    }
}

// ── Responses ─────────────────────────────────────────────────────────────────

/// A complete response, always sent with `Connection: close`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
    pub allow: Option<&'static str>,
}

impl Response {
    /// `200 OK` with `{"status":"ok"}`.
    pub fn ok() -> Self {
        Self {
            status: 200,
            content_type: "application/json",
            body: serde_json::json!({ "status": "ok" }).to_string(),
            allow: None,
        }
    }

    pub fn text(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type: "text/plain",
            body: body.into(),
            allow: None,
        }
    }

    fn method_not_allowed() -> Self {
        Self {
            allow: Some("POST"),
            ..Self::text(405, "Method not allowed")
        }
    }

    /// Maps a dispatcher rejection to its status and client-facing text.
    pub fn from_dispatch_error(error: &DispatchError) -> Self {
        match error {
            DispatchError::NotConnected => Self::text(503, error.to_string()),
            DispatchError::Busy => Self::text(503, "Busy"),
            DispatchError::MalformedInput(message) => Self::text(400, *message),
            DispatchError::Internal(_) => Self::text(500, "Internal error"),
        }
    }

    /// Serializes status line, headers, and body.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut head = format!(
            "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n",
            self.status,
            reason_phrase(self.status),
            self.content_type,
            self.body.len()
        );
        if let Some(allow) = self.allow {
            head.push_str("Allow: ");
            head.push_str(allow);
            head.push_str("\r\n");
        }
        head.push_str("\r\n");

        let mut bytes = head.into_bytes();
        bytes.extend_from_slice(self.body.as_bytes());
        bytes
    }
}

fn reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        404 => "Not Found",
        405 => "Method Not Allowed",
        408 => "Request Timeout",
        413 => "Payload Too Large",
        431 => "Request Header Fields Too Large",
        500 => "Internal Server Error",
        501 => "Not Implemented",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}

// ── Request head parsing ──────────────────────────────────────────────────────

/// Method, path, and declared body length of one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestHead {
    pub method: String,
    pub path: String,
    pub content_length: usize,
}

/// Offset of the blank line ending the head, if it has arrived.
pub fn find_head_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|window| window == b"\r\n\r\n")
}

/// Parses the head text (everything before the blank line).
///
/// # Errors
///
/// [`HttpError::BadRequest`] for a broken request line or a bad or repeated
/// `Content-Length`; [`HttpError::UnsupportedTransferEncoding`] when the body
/// is framed by `Transfer-Encoding` instead of a length.
pub fn parse_head(head: &str) -> Result<RequestHead, HttpError> {
    let request_line = head.lines().next().ok_or(HttpError::BadRequest("empty request"))?;
    let mut parts = request_line.split_ascii_whitespace();
    let method = parts.next().ok_or(HttpError::BadRequest("missing method"))?;
    let target = parts.next().ok_or(HttpError::BadRequest("missing target"))?;
    let _version = parts.next().ok_or(HttpError::BadRequest("missing version"))?;

    // Reading such a body as zero bytes would play the default gesture.
    if header_values(head, "transfer-encoding").next().is_some() {
        return Err(HttpError::UnsupportedTransferEncoding);
    }

    Ok(RequestHead {
        method: method.to_string(),
        path: target_path(target).to_string(),
        content_length: parse_content_length(head)?.unwrap_or(0),
    })
}

/// Trimmed values of every header named `wanted` (case-insensitive).
fn header_values<'a>(head: &'a str, wanted: &'a str) -> impl Iterator<Item = &'a str> + 'a {
    head.lines().skip(1).filter_map(move |line| {
        let (name, value) = line.split_once(':')?;
        name.trim().eq_ignore_ascii_case(wanted).then(|| value.trim())
    })
}

fn parse_content_length(head: &str) -> Result<Option<usize>, HttpError> {
    let mut content_length = None;

    for value in header_values(head, "content-length") {
        let parsed = value
            .parse::<usize>()
            .map_err(|_| HttpError::BadRequest("invalid content-length"))?;
        if content_length.is_some() {
            return Err(HttpError::BadRequest("duplicate content-length"));
        }
        content_length = Some(parsed);
    }

    Ok(content_length)
}

fn target_path(target: &str) -> &str {
    target.split('?').next().unwrap_or(target)
}

// ── Server ────────────────────────────────────────────────────────────────────

struct ServerContext {
    dispatcher: Arc<CommandDispatcher>,
    max_body_bytes: usize,
}

/// A bound, not yet running, command endpoint.
pub struct HttpServer {
    listener: TcpListener,
    context: Arc<ServerContext>,
}

impl HttpServer {
    /// Binds `addr` (for example `"0.0.0.0:8080"` or `"127.0.0.1:0"`).
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::Bind`] if the address is in use, unparsable, or
    /// not permitted.
    pub async fn bind(
        addr: &str,
        dispatcher: Arc<CommandDispatcher>,
        max_body_bytes: usize,
    ) -> Result<Self, HttpError> {
        let listener = TcpListener::bind(addr).await.map_err(|source| HttpError::Bind {
            addr: addr.to_string(),
            source,
        })?;
        Ok(Self {
            listener,
            context: Arc::new(ServerContext {
                dispatcher,
                max_body_bytes,
            }),
        })
    }

    /// The actual bound address; useful after binding port `0`.
    ///
    /// # Errors
    ///
    /// Propagates the OS error from `getsockname`.
    pub fn local_addr(&self) -> Result<SocketAddr, HttpError> {
        Ok(self.listener.local_addr()?)
    }

    /// Runs the accept loop until `running` is set to `false`, then waits for
    /// open connections to finish.
    ///
    /// Each accepted connection is served on its own Tokio task, so a client
    /// waiting on a long gesture never blocks new connections.  Gestures
    /// themselves are still serialized by the worker behind the dispatcher.
    /// The tasks live in a [`JoinSet`], so a client whose gesture is still
    /// playing at shutdown gets its response rather than a reset.
    ///
    /// # Errors
    ///
    /// Currently infallible once bound; accept errors are logged and skipped.
    pub async fn run(self, running: Arc<AtomicBool>) -> Result<(), HttpError> {
        if let Ok(addr) = self.listener.local_addr() {
            info!("command endpoint listening on {addr}");
        }

        let mut connections = JoinSet::new();

        loop {
            if !running.load(Ordering::Relaxed) {
                info!("shutdown flag set; stopping accept loop");
                break;
            }

            // Reap finished connections so the set only holds live ones.
            while connections.try_join_next().is_some() {}

            // Short timeout so the shutdown flag is rechecked even when idle.
            match timeout(ACCEPT_POLL, self.listener.accept()).await {
                Ok(Ok((stream, peer))) => {
                    debug!("connection from {peer}");
                    let context = Arc::clone(&self.context);
                    connections.spawn(async move {
                        handle_connection(stream, peer, context).await;
                    });
                }
                Ok(Err(e)) => {
                    error!("accept error: {e}");
                }
                Err(_) => {}
            }
        }

        if !connections.is_empty() {
            info!(open = connections.len(), "waiting for open connections to finish");
        }
        while let Some(joined) = connections.join_next().await {
            if let Err(e) = joined {
                error!("connection task failed: {e}");
            }
        }

        Ok(())
    }
}

// ── Per-connection handler ────────────────────────────────────────────────────

async fn handle_connection(mut stream: TcpStream, peer: SocketAddr, context: Arc<ServerContext>) {
    let request_id = Uuid::new_v4();
    let started = Instant::now();

    let response = match serve(&mut stream, &context, request_id).await {
        Ok(response) => response,
        Err(e) => {
            warn!(%request_id, %peer, "request failed: {e}");
            match e.response() {
                Some(response) => response,
                None => return,
            }
        }
    };

    info!(
        %request_id,
        %peer,
        status = response.status,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "request handled"
    );

    if let Err(e) = stream.write_all(&response.to_bytes()).await {
        debug!(%request_id, "failed to write response: {e}");
        return;
    }
    let _ = stream.shutdown().await;
}

/// Reads one request and produces its response.
async fn serve(
    stream: &mut TcpStream,
    context: &ServerContext,
    request_id: Uuid,
) -> Result<Response, HttpError> {
    let mut buf = Vec::with_capacity(1024);
    let head_len = timeout(READ_TIMEOUT, read_head(stream, &mut buf))
        .await
        .map_err(|_| HttpError::Timeout)??;
    let head_text = std::str::from_utf8(&buf[..head_len])
        .map_err(|_| HttpError::BadRequest("head is not UTF-8"))?;
    let head = parse_head(head_text)?;
    debug!(%request_id, method = %head.method, path = %head.path, length = head.content_length, "request head");

    let Some(command) = Command::from_path(&head.path) else {
        return Ok(Response::text(404, "Not found"));
    };
    if head.method != "POST" {
        return Ok(Response::method_not_allowed());
    }
    if let Err(e) = context.dispatcher.ensure_connected() {
        warn!(%request_id, %command, "rejected: {e}");
        return Ok(Response::from_dispatch_error(&e));
    }
    if head.content_length > context.max_body_bytes {
        return Ok(Response::text(413, "Payload too large"));
    }

    // Anything read past the blank line already belongs to the body.
    let mut body = buf.split_off(head_len + 4);
    timeout(READ_TIMEOUT, read_body(stream, &mut body, head.content_length))
        .await
        .map_err(|_| HttpError::Timeout)??;

    let payload = (!body.is_empty()).then_some(body.as_slice());
    match context.dispatcher.dispatch(command, payload).await {
        Ok(()) => Ok(Response::ok()),
        Err(e) => {
            warn!(%request_id, %command, "rejected: {e}");
            Ok(Response::from_dispatch_error(&e))
        }
    }
}

/// Reads until the blank line; returns the head length (excluding it).
async fn read_head(stream: &mut TcpStream, buf: &mut Vec<u8>) -> Result<usize, HttpError> {
    let mut chunk = [0u8; 1024];
    loop {
        if let Some(end) = find_head_end(buf) {
            return Ok(end);
        }
        if buf.len() >= MAX_HEAD_BYTES {
            return Err(HttpError::HeadTooLarge);
        }
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Err(HttpError::BadRequest("connection closed before end of head"));
        }
        buf.extend_from_slice(&chunk[..n]);
    }
}

/// Completes `body` to exactly `expected` bytes.
async fn read_body(stream: &mut TcpStream, body: &mut Vec<u8>, expected: usize) -> Result<(), HttpError> {
    body.truncate(expected);
    let mut chunk = [0u8; 1024];
    while body.len() < expected {
        let want = (expected - body.len()).min(chunk.len());
        let n = stream.read(&mut chunk[..want]).await?;
        if n == 0 {
            return Err(HttpError::TruncatedBody {
                received: body.len(),
                expected,
            });
        }
        body.extend_from_slice(&chunk[..n]);
    }
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
