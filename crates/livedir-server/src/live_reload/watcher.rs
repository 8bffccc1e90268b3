//! Filesystem change watcher.
//!
//! Watches the served root recursively and broadcasts [`RELOAD_SIGNAL`]
//! through the registry once a burst of qualifying changes settles.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use super::debouncer::{EventDebouncer, FsEventKind};
use super::filter::is_ignored;
use super::registry::ConnectionRegistry;
use crate::inject::RELOAD_SIGNAL;

/// Default debounce window in milliseconds.
pub const DEFAULT_DEBOUNCE_MS: u64 = 100;

/// How often settled events are drained.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Watches the served root and triggers reloads.
pub(crate) struct ChangeWatcher {
    root: PathBuf,
    registry: Arc<ConnectionRegistry>,
    debounce: Duration,
    watcher: Option<RecommendedWatcher>,
}

impl ChangeWatcher {
    pub(crate) fn new(root: PathBuf, registry: Arc<ConnectionRegistry>, debounce_ms: u64) -> Self {
        Self {
            root,
            registry,
            debounce: Duration::from_millis(debounce_ms),
            watcher: None,
        }
    }

    /// Start watching.
    ///
    /// Spawns a task that records raw events into a debouncer and broadcasts
    /// one reload per settled batch. The task ends when the watcher is dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying watch cannot be established.
    pub(crate) fn start(&mut self) -> Result<(), notify::Error> {
        let (tx, mut rx) = mpsc::channel::<Event>(100);

        let mut watcher = notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
            match res {
                // Callback runs on the watcher's own thread.
                Ok(event) => {
                    let _ = tx.blocking_send(event);
                }
                Err(err) => tracing::warn!(error = %err, "File watcher error"),
            }
        })?;
        watcher.watch(&self.root, RecursiveMode::Recursive)?;
        self.watcher = Some(watcher);

        let root = self.root.clone();
        let registry = Arc::clone(&self.registry);
        let debouncer = EventDebouncer::new(self.debounce);

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(POLL_INTERVAL);

            loop {
                tokio::select! {
                    event = rx.recv() => {
                        let Some(event) = event else { break };
                        Self::record_event(&event, &root, &debouncer);
                    }
                    _ = interval.tick() => {
                        Self::flush(&debouncer, &registry);
                    }
                }
            }
        });

        tracing::info!(root = %self.root.display(), "Watching for changes");
        Ok(())
    }

    /// Whether the filesystem watch is active.
    pub(crate) fn is_watching(&self) -> bool {
        self.watcher.is_some()
    }

    /// Record the qualifying paths of a raw event.
    fn record_event(event: &Event, root: &Path, debouncer: &EventDebouncer) {
        let Some(kind) = Self::classify(&event.kind) else {
            return;
        };

        for path in &event.paths {
            if is_ignored(path, root) {
                continue;
            }
            debouncer.record(path.clone(), kind);
            tracing::debug!(path = %path.display(), ?kind, "Recorded filesystem event");
        }
    }

    /// Broadcast one reload if any change has settled.
    fn flush(debouncer: &EventDebouncer, registry: &ConnectionRegistry) -> bool {
        let events = debouncer.drain_ready();
        if events.is_empty() {
            return false;
        }

        let delivered = registry.broadcast_all(RELOAD_SIGNAL);
        for event in &events {
            tracing::debug!(path = %event.path.display(), kind = ?event.kind, "Change settled");
        }
        tracing::info!(changes = events.len(), clients = delivered, "Reload broadcast");
        true
    }

    /// Map a notify event kind to a change kind.
    ///
    /// Metadata changes (`touch`, `chmod`) count as modifications. Access
    /// events are dropped: reading a file to serve it must not trigger a
    /// reload.
    fn classify(kind: &EventKind) -> Option<FsEventKind> {
        match kind {
            EventKind::Create(_) => Some(FsEventKind::Created),
            EventKind::Remove(_) => Some(FsEventKind::Removed),
            EventKind::Modify(_) => Some(FsEventKind::Modified),
            _ => None,
        }
    }
}
