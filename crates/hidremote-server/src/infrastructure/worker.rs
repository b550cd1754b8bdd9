//! GestureWorker: plays gestures one at a time on a dedicated thread.
//!
//! # Why a dedicated OS thread? (for beginners)
//!
//! Gesture synthesis sleeps between reports: a default swipe blocks for
//! about 600 ms.  Doing that on a Tokio worker thread would stall every
//! other task scheduled on it.  Instead, the synthesizer lives on its own
//! `std::thread`, fed by a bounded `std::sync::mpsc::sync_channel`.  Async
//! callers send a job and `.await` a `tokio::sync::oneshot` receiver for the
//! outcome, so they yield while the gesture plays.
//!
//! Because there is exactly one consumer, jobs run strictly in arrival
//! order and two gestures can never interleave their reports.
//!
//! # Backlog
//!
//! The queue holds at most `depth` waiting jobs.  When it is full,
//! [`GestureWorker::submit`] fails with [`DispatchError::Busy`] instead of
//! blocking.  A job whose caller dropped its reply receiver is skipped when
//! it reaches the front, so an abandoned touch is never played late.
//!
//! # Shutdown
//!
//! There is no mid-gesture cancellation.  [`GestureWorker::shutdown`] closes
//! the channel; the thread finishes the gestures still awaited and exits.

use std::io;
use std::sync::{mpsc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Instant;

use hidremote_core::{ConnectionHandle, GestureRequest};
use tokio::sync::oneshot;
use tracing::{debug, error, info, trace, warn};

use crate::application::dispatch_command::{DispatchError, GestureQueue, GestureReply};
use crate::application::synthesize_gesture::{GestureError, GestureSynthesizer};

const THREAD_NAME: &str = "gesture-worker";

/// Waiting jobs allowed behind the one being played.
pub const DEFAULT_QUEUE_DEPTH: usize = 8;

struct Job {
    connection: ConnectionHandle,
    request: GestureRequest,
    reply: oneshot::Sender<Result<(), GestureError>>,
}

/// Owns the synthesizer thread and the sending half of its job queue.
pub struct GestureWorker {
    jobs: Mutex<Option<mpsc::SyncSender<Job>>>,
    thread: Mutex<Option<JoinHandle<()>>>,
}

impl GestureWorker {
    /// Moves `synthesizer` onto a new worker thread with a queue of
    /// [`DEFAULT_QUEUE_DEPTH`].
    ///
    /// # Errors
    ///
    /// Returns the OS error if the thread cannot be spawned.
    pub fn spawn(synthesizer: GestureSynthesizer) -> io::Result<Self> {
        Self::with_depth(synthesizer, DEFAULT_QUEUE_DEPTH)
    }

    /// Like [`spawn`](Self::spawn), holding at most `depth` waiting jobs.
    /// A depth of zero is raised to one.
    pub fn with_depth(synthesizer: GestureSynthesizer, depth: usize) -> io::Result<Self> {
        let (tx, rx) = mpsc::sync_channel::<Job>(depth.max(1));
        let thread = thread::Builder::new()
            .name(THREAD_NAME.to_string())
            .spawn(move || run(synthesizer, rx))?;
        Ok(Self {
            jobs: Mutex::new(Some(tx)),
            thread: Mutex::new(Some(thread)),
        })
    }

    /// Queues a gesture and returns a receiver for its outcome.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Busy`] when the queue is full and
    /// [`DispatchError::Internal`] once the worker has stopped.
    pub fn submit(
        &self,
        connection: ConnectionHandle,
        request: GestureRequest,
    ) -> Result<GestureReply, DispatchError> {
        let guard = self
            .jobs
            .lock()
            .map_err(|_| DispatchError::Internal("gesture queue lock poisoned".to_string()))?;
        let jobs = guard
            .as_ref()
            .ok_or_else(|| DispatchError::Internal("gesture worker stopped".to_string()))?;
        let (reply, outcome) = oneshot::channel();
        let job = Job {
            connection,
            request,
            reply,
        };
        match jobs.try_send(job) {
            Ok(()) => Ok(outcome),
            Err(mpsc::TrySendError::Full(job)) => {
                warn!(kind = job.request.kind(), "gesture queue full, rejecting");
                Err(DispatchError::Busy)
            }
            Err(mpsc::TrySendError::Disconnected(_)) => {
                Err(DispatchError::Internal("gesture worker stopped".to_string()))
            }
        }
    }

    /// Stops accepting work and waits for queued gestures to finish.
    /// Queued gestures nobody is waiting for are skipped.
    ///
    /// Safe to call more than once; later calls return immediately.
    pub fn shutdown(&self) {
        if let Ok(mut jobs) = self.jobs.lock() {
            jobs.take();
        }
        let thread = match self.thread.lock() {
            Ok(mut thread) => thread.take(),
            Err(_) => None,
        };
        if let Some(thread) = thread {
            if thread.join().is_err() {
                error!("gesture worker thread panicked");
            }
        }
    }
}

impl GestureQueue for GestureWorker {
    fn enqueue(
        &self,
        connection: ConnectionHandle,
        request: GestureRequest,
    ) -> Result<GestureReply, DispatchError> {
        self.submit(connection, request)
    }
}

impl Drop for GestureWorker {
    fn drop(&mut self) {
        // Closing the channel is enough; the thread exits after its queue drains.
        if let Ok(jobs) = self.jobs.get_mut() {
            jobs.take();
        }
    }
}

fn run(synthesizer: GestureSynthesizer, jobs: mpsc::Receiver<Job>) {
    info!("gesture worker started");
    for job in jobs {
        let kind = job.request.kind();
        if job.reply.is_closed() {
            debug!(kind, connection = %job.connection, "skipping gesture, caller went away");
            continue;
        }
        let started = Instant::now();
        let outcome = synthesizer.perform(job.connection, job.request);
        debug!(
            kind,
            connection = %job.connection,
            elapsed_ms = started.elapsed().as_millis() as u64,
            ok = outcome.is_ok(),
            "gesture finished"
        );
        if job.reply.send(outcome).is_err() {
            trace!(kind, "gesture caller went away before completion");
        }
    }
    info!("gesture worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use hidremote_core::{ConsumerKey, NormalizedPoint};

    use crate::application::synthesize_gesture::GestureTiming;
    use crate::infrastructure::event_sink::MockEventSink;
    use crate::infrastructure::pacing::{RecordingPacer, ThreadPacer};

    const CONN: ConnectionHandle = ConnectionHandle::from_raw(0);

    fn spawn_worker() -> (GestureWorker, Arc<MockEventSink>) {
        let sink = Arc::new(MockEventSink::new());
        let synth = GestureSynthesizer::new(
            sink.clone(),
            Arc::new(RecordingPacer::new()),
            GestureTiming::default(),
        );
        (GestureWorker::spawn(synth).unwrap(), sink)
    }

    #[test]
    fn test_submit_runs_gesture_and_replies() {
        // Arrange
        let (worker, sink) = spawn_worker();

        // Act
        let reply = worker
            .submit(CONN, GestureRequest::Tap { point: NormalizedPoint::CENTER })
            .unwrap();
        let outcome = tokio_test::block_on(reply).unwrap();

        // Assert
        assert_eq!(outcome, Ok(()));
        assert_eq!(sink.contacts().len(), 2);
    }

    #[test]
    fn test_jobs_run_in_submission_order() {
        let (worker, sink) = spawn_worker();
        let keys = [ConsumerKey::VolumeUp, ConsumerKey::VolumeDown, ConsumerKey::Home];

        let replies: Vec<_> = keys
            .iter()
            .map(|&key| worker.submit(CONN, GestureRequest::KeyPress { key }).unwrap())
            .collect();
        worker.shutdown();

        for reply in replies {
            assert_eq!(tokio_test::block_on(reply).unwrap(), Ok(()));
        }
        let pressed: Vec<_> = sink.keys().into_iter().filter(|k| k.1).map(|k| k.0).collect();
        assert_eq!(pressed, keys);
    }

    #[test]
    fn test_not_connected_outcome_is_forwarded() {
        let (worker, sink) = spawn_worker();

        let reply = worker
            .submit(ConnectionHandle::NONE, GestureRequest::KeyPress { key: ConsumerKey::Back })
            .unwrap();

        assert_eq!(
            tokio_test::block_on(reply).unwrap(),
            Err(GestureError::NotConnected)
        );
        assert!(sink.records().is_empty());
    }

    #[test]
    fn test_submit_after_shutdown_is_internal_error() {
        let (worker, _sink) = spawn_worker();
        worker.shutdown();

        let result = worker.submit(CONN, GestureRequest::KeyPress { key: ConsumerKey::Power });

        assert!(matches!(result, Err(DispatchError::Internal(_))));
    }

    #[test]
    fn test_shutdown_waits_for_in_flight_gesture() {
        // Arrange: a real sleeping pacer so the gesture takes measurable time
        let sink = Arc::new(MockEventSink::new());
        let synth = GestureSynthesizer::new(sink.clone(), Arc::new(ThreadPacer), GestureTiming::default());
        let worker = GestureWorker::spawn(synth).unwrap();

        // Act
        let _reply = worker
            .submit(
                CONN,
                GestureRequest::LongPress {
                    point: NormalizedPoint::CENTER,
                    duration: Duration::from_millis(30),
                },
            )
            .unwrap();
        worker.shutdown();

        // Assert: the release was emitted before shutdown returned
        assert_eq!(sink.contacts().len(), 2);
        assert!(sink.is_balanced());
    }

    fn hold(ms: u64) -> GestureRequest {
        GestureRequest::LongPress {
            point: NormalizedPoint::CENTER,
            duration: Duration::from_millis(ms),
        }
    }

    #[test]
    fn test_abandoned_jobs_are_skipped() {
        // Arrange: keep the worker busy with a real 200 ms hold
        let sink = Arc::new(MockEventSink::new());
        let synth = GestureSynthesizer::new(sink.clone(), Arc::new(ThreadPacer), GestureTiming::default());
        let worker = GestureWorker::spawn(synth).unwrap();
        let busy = worker.submit(CONN, hold(200)).unwrap();

        // Act: queue taps behind it and give up on every one of them
        for _ in 0..3 {
            let reply = worker
                .submit(CONN, GestureRequest::Tap { point: NormalizedPoint::CENTER })
                .unwrap();
            drop(reply);
        }
        worker.shutdown();

        // Assert: only the awaited hold reached the sink
        assert_eq!(tokio_test::block_on(busy).unwrap(), Ok(()));
        assert_eq!(sink.contacts().len(), 2);
    }

    #[test]
    fn test_full_queue_rejects_with_busy() {
        // Arrange: depth 1, worker stuck on a 300 ms hold
        let sink = Arc::new(MockEventSink::new());
        let synth = GestureSynthesizer::new(sink.clone(), Arc::new(ThreadPacer), GestureTiming::default());
        let worker = GestureWorker::with_depth(synth, 1).unwrap();
        let first = worker.submit(CONN, hold(300)).unwrap();

        // Act: at most one playing and one waiting fit; the rest bounce
        let results: Vec<_> = (0..4)
            .map(|_| worker.submit(CONN, GestureRequest::KeyPress { key: ConsumerKey::Home }))
            .collect();

        // Assert
        let busy = results
            .iter()
            .filter(|r| matches!(r, Err(DispatchError::Busy)))
            .count();
        assert!(busy >= 3, "expected at least 3 rejections, got {busy}");
        drop(results);
        assert_eq!(tokio_test::block_on(first).unwrap(), Ok(()));
        worker.shutdown();
    }

    #[tokio::test]
    async fn test_worker_as_gesture_queue_from_async_context() {
        let (worker, sink) = spawn_worker();
        let queue: &dyn GestureQueue = &worker;

        let reply = queue
            .enqueue(CONN, GestureRequest::KeyPress { key: ConsumerKey::VolumeUp })
            .unwrap();

        assert_eq!(reply.await.unwrap(), Ok(()));
        assert_eq!(sink.keys().len(), 2);
    }
}
