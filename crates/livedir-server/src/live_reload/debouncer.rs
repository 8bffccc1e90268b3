//! Event debouncing for the change watcher.
//!
//! Editors usually emit several events per save (truncate, write, rename).
//! The debouncer folds them into one pending event per path, released once
//! the path has been quiet for the debounce window.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Kind of filesystem change.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum FsEventKind {
    Created,
    Modified,
    Removed,
}

/// A change that has outlived its debounce window.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct FsEvent {
    pub path: PathBuf,
    pub kind: FsEventKind,
}

struct PendingEvent {
    kind: FsEventKind,
    deadline: Instant,
}

/// Thread-safe per-path event debouncer.
pub(crate) struct EventDebouncer {
    pending: Mutex<HashMap<PathBuf, PendingEvent>>,
    window: Duration,
}

impl EventDebouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            pending: Mutex::new(HashMap::new()),
            window,
        }
    }

    /// Record an event, pushing the path's deadline back by one window.
    ///
    /// The latest kind replaces any earlier one; only the deadline decides
    /// when the path is released.
    pub fn record(&self, path: PathBuf, kind: FsEventKind) {
        let deadline = Instant::now() + self.window;
        self.lock().insert(path, PendingEvent { kind, deadline });
    }

    /// Take every event whose deadline has passed.
    pub fn drain_ready(&self) -> Vec<FsEvent> {
        let now = Instant::now();
        let mut ready = Vec::new();

        self.lock().retain(|path, event| {
            if event.deadline > now {
                return true;
            }
            ready.push(FsEvent {
                path: path.clone(),
                kind: event.kind,
            });
            false
        });

        ready
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<PathBuf, PendingEvent>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
