//! Application state.
//!
//! Shared state for all request handlers.

use std::sync::Arc;
use std::time::Duration;

use crate::live_reload::ConnectionRegistry;
use crate::root::ServedRoot;

/// Application state shared across all handlers.
pub(crate) struct AppState {
    /// Directory being served.
    pub(crate) root: ServedRoot,
    /// Port the listener is bound to, embedded in the reload client.
    pub(crate) port: u16,
    /// Live WebSocket connections.
    pub(crate) registry: Arc<ConnectionRegistry>,
    /// Close WebSocket connections silent for this long.
    pub(crate) ws_idle_timeout: Duration,
}
