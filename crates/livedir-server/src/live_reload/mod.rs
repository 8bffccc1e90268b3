//! Live reload: connection registry, WebSocket relay and change watcher.

mod debouncer;
mod filter;
mod registry;
mod watcher;
mod websocket;

pub use registry::{ConnectionId, ConnectionRegistry, DEFAULT_QUEUE_CAPACITY, GREETING};
pub use watcher::DEFAULT_DEBOUNCE_MS;
pub(crate) use watcher::ChangeWatcher;
pub(crate) use websocket::handle_socket;
