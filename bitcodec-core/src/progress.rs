//! Cooperative cancellation and progress reporting.
//!
//! Long-running operations poll a [`CancelToken`] once per chunk or block and
//! report through a [`ProgressSink`]. A cancelled operation returns
//! [`Outcome::Cancelled`], which is distinct from failure.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

/// Shared cancellation flag. Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create a token that has not been cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation was requested.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Receiver of human-readable progress strings.
///
/// An empty string clears whatever the sink currently displays.
pub trait ProgressSink {
    /// Replace the displayed progress text.
    fn update(&self, message: &str);

    /// Clear the displayed progress text.
    fn clear(&self) {
        self.update("");
    }
}

impl<F: Fn(&str)> ProgressSink for F {
    fn update(&self, message: &str) {
        self(message)
    }
}

/// Sink that discards every update.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn update(&self, _message: &str) {}
}

/// Result of an operation that may be cancelled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    /// The operation ran to completion.
    Completed(T),
    /// The cancel token fired before completion.
    Cancelled,
}

impl<T> Outcome<T> {
    /// The completed value, if any.
    pub fn completed(self) -> Option<T> {
        match self {
            Outcome::Completed(value) => Some(value),
            Outcome::Cancelled => None,
        }
    }

    /// Whether the operation was cancelled.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Outcome::Cancelled)
    }

    /// Transform the completed value.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Completed(value) => Outcome::Completed(f(value)),
            Outcome::Cancelled => Outcome::Cancelled,
        }
    }
}

/// Emits `"{label} {pct}%;\tTime elapsed: {secs}s"` each time the whole
/// percentage advances.
#[derive(Debug)]
pub struct ProgressTracker<'a, P: ProgressSink + ?Sized> {
    sink: &'a P,
    label: &'static str,
    total: u64,
    last_percent: Option<u64>,
    started: Instant,
}

impl<'a, P: ProgressSink + ?Sized> ProgressTracker<'a, P> {
    /// Start tracking `total` units of work.
    pub fn new(sink: &'a P, label: &'static str, total: u64) -> Self {
        Self {
            sink,
            label,
            total,
            last_percent: None,
            started: Instant::now(),
        }
    }

    /// Record that `done` units are complete.
    pub fn update(&mut self, done: u64) {
        let percent = if self.total == 0 {
            100
        } else {
            (done.min(self.total) as u128 * 100 / self.total as u128) as u64
        };
        if self.last_percent == Some(percent) {
            return;
        }
        self.last_percent = Some(percent);
        self.sink.update(&format!(
            "{} {}%;\tTime elapsed: {:.2}s",
            self.label,
            percent,
            self.started.elapsed().as_secs_f64()
        ));
    }

    /// Clear the sink, used on cancellation.
    pub fn clear(&self) {
        self.sink.clear();
    }

    /// Seconds since tracking started.
    pub fn elapsed_secs(&self) -> f64 {
        self.started.elapsed().as_secs_f64()
    }
}
