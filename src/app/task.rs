//! Non-blocking handles for long-running backend calls
//!
//! A `TaskHandle` owns at most one in-flight unit of work. The work runs on
//! its own thread and writes its result into a single-slot channel; the
//! render thread polls the slot once per frame and never blocks on it.

use std::fmt;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

/// Which backend call a handle is wrapping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    Validation,
    Launch,
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskKind::Validation => f.write_str("validation"),
            TaskKind::Launch => f.write_str("launch"),
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TaskError {
    #[error("a {kind} task is already pending")]
    AlreadyPending { kind: TaskKind },

    #[error("failed to spawn {kind} worker thread")]
    SpawnFailed { kind: TaskKind },
}

/// Result of polling a handle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskPoll<T> {
    NotReady,
    Ready(T),
    /// The worker exited without producing a value; nothing will arrive
    Failed,
}

impl<T> TaskPoll<T> {
    pub fn is_ready(&self) -> bool {
        matches!(self, TaskPoll::Ready(_))
    }
}

enum Slot<T> {
    Idle,
    Pending(Receiver<T>),
}

/// Wraps a single outstanding backend call
///
/// States: `Idle -> Pending -> Ready(value)`. The value is handed out by
/// exactly one `poll`, after which the handle is idle again. A worker that
/// dies without sending is reported once as `Failed`.
pub struct TaskHandle<T> {
    kind: TaskKind,
    slot: Slot<T>,
}

impl<T: Send + 'static> TaskHandle<T> {
    pub fn new(kind: TaskKind) -> Self {
        Self {
            kind,
            slot: Slot::Idle,
        }
    }

    pub fn kind(&self) -> TaskKind {
        self.kind
    }

    /// True while a started task has not yet been consumed by `poll`
    pub fn is_pending(&self) -> bool {
        matches!(self.slot, Slot::Pending(_))
    }

    /// Runs `work` on a worker thread
    ///
    /// Fails with `AlreadyPending` if a previous task has not been consumed.
    pub fn start<F>(&mut self, work: F) -> Result<(), TaskError>
    where
        F: FnOnce() -> T + Send + 'static,
    {
        if self.is_pending() {
            return Err(TaskError::AlreadyPending { kind: self.kind });
        }

        let (tx, rx) = mpsc::sync_channel::<T>(1);
        thread::Builder::new()
            .name(format!("{}-task", self.kind))
            .spawn(move || {
                // The receiver may be gone if the session was dropped first.
                let _ = tx.send(work());
            })
            .map_err(|_| TaskError::SpawnFailed { kind: self.kind })?;

        tracing::debug!(kind = %self.kind, "task started");
        self.slot = Slot::Pending(rx);
        Ok(())
    }

    /// Non-blocking check for the result
    ///
    /// Returns `Ready` or `Failed` exactly once per started task.
    pub fn poll(&mut self) -> TaskPoll<T> {
        let Slot::Pending(rx) = &self.slot else {
            return TaskPoll::NotReady;
        };

        match rx.try_recv() {
            Ok(value) => {
                self.slot = Slot::Idle;
                tracing::debug!(kind = %self.kind, "task result delivered");
                TaskPoll::Ready(value)
            }
            Err(TryRecvError::Empty) => TaskPoll::NotReady,
            Err(TryRecvError::Disconnected) => {
                tracing::error!(kind = %self.kind, "task worker exited without a result");
                self.slot = Slot::Idle;
                TaskPoll::Failed
            }
        }
    }
}

impl<T> fmt::Debug for TaskHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self.slot {
            Slot::Idle => "idle",
            Slot::Pending(_) => "pending",
        };
        f.debug_struct("TaskHandle")
            .field("kind", &self.kind)
            .field("state", &state)
            .finish()
    }
}
