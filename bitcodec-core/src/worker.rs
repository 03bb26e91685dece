//! Background execution of long-running operations.
//!
//! [`spawn`] runs an operation on a dedicated thread. The caller keeps an
//! [`OperationHandle`] to cancel it and to drain the progress channel; the
//! worker and the caller share nothing else.

use crate::error::{BitCodecError, Result};
use crate::progress::{CancelToken, ProgressSink};
use std::any::Any;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// How long [`OperationHandle::wait`] blocks between deadline checks.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Handle to an operation running on a worker thread.
#[derive(Debug)]
pub struct OperationHandle<T> {
    cancel: CancelToken,
    progress: Receiver<String>,
    thread: JoinHandle<T>,
}

/// Run `op` on a new thread named `name`.
///
/// `op` receives the cancel token and a progress sink whose messages arrive
/// on the handle's channel.
pub fn spawn<T, F>(name: &str, op: F) -> Result<OperationHandle<T>>
where
    T: Send + 'static,
    F: FnOnce(&CancelToken, &dyn ProgressSink) -> T + Send + 'static,
{
    let cancel = CancelToken::new();
    let worker_cancel = cancel.clone();
    let (tx, rx) = mpsc::channel::<String>();

    let thread = thread::Builder::new()
        .name(name.to_string())
        .spawn(move || {
            let sink = move |message: &str| {
                // The receiver may already be gone; progress is advisory
                let _ = tx.send(message.to_string());
            };
            op(&worker_cancel, &sink)
        })?;

    log::debug!("spawned worker thread {name}");
    Ok(OperationHandle {
        cancel,
        progress: rx,
        thread,
    })
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

impl<T> OperationHandle<T> {
    /// Ask the operation to stop at its next check point.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// A clone of the operation's cancel token.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// The progress channel.
    pub fn progress(&self) -> &Receiver<String> {
        &self.progress
    }

    /// Whether the worker thread has finished.
    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    /// Wait for the result without looking at progress.
    pub fn join(self) -> Result<T> {
        self.thread
            .join()
            .map_err(|payload| BitCodecError::WorkerPanicked {
                message: panic_message(payload),
            })
    }

    /// Forward progress messages to `on_progress` until the worker finishes,
    /// cancelling it once `time_limit` has elapsed.
    pub fn wait(
        self,
        time_limit: Option<Duration>,
        mut on_progress: impl FnMut(&str),
    ) -> Result<T> {
        let started = Instant::now();
        loop {
            match self.progress.recv_timeout(POLL_INTERVAL) {
                Ok(message) => on_progress(&message),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }
            if let Some(limit) = time_limit {
                if started.elapsed() >= limit && !self.cancel.is_cancelled() {
                    log::warn!("time limit of {:.2}s reached, cancelling", limit.as_secs_f64());
                    self.cancel();
                }
            }
        }
        self.join()
    }
}
