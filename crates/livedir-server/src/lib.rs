//! Local development file server with live reload.
//!
//! Serves a directory over HTTP and reloads connected browser tabs when files
//! under it change:
//! - Files are served verbatim, HTML gets a small reload client injected
//!   right after `<head>`
//! - The same port accepts WebSocket upgrades; every connection joins a
//!   broadcast channel
//! - A recursive file watcher broadcasts `reload` whenever the tree changes
//!
//! # Quick Start
//!
//! ```ignore
//! use std::path::PathBuf;
//! use livedir_server::{ServerConfig, run_server};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ServerConfig {
//!         root: PathBuf::from("site"),
//!         port: 8080,
//!         ..ServerConfig::default()
//!     };
//!
//!     run_server(config).await.unwrap();
//! }
//! ```
//!
//! # Architecture
//!
//! ```text
//! Browser ──HTTP──► axum fallback handler
//!    ▲                   │
//!    │                   ├─► upgrade? ──► WebSocket task ◄──► ConnectionRegistry
//!    │                   │                                          ▲
//!    │                   └─► ServedRoot ──► file / HTML injector    │
//!    │                                                              │
//!    └──── "reload" ◄──── ChangeWatcher ◄── notify (recursive) ─────┘
//! ```

mod app;
mod error;
mod handlers;
mod inject;
mod live_reload;
mod mime;
mod root;
mod state;

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;

use live_reload::ChangeWatcher;
use state::AppState;

pub use error::StartupError;
pub use inject::{RELOAD_SIGNAL, inject_reload_client, reload_client_script};
pub use live_reload::{
    ConnectionId, ConnectionRegistry, DEFAULT_DEBOUNCE_MS, DEFAULT_QUEUE_CAPACITY, GREETING,
};
pub use mime::{FALLBACK_CONTENT_TYPE, content_type_for};
pub use root::{INDEX_FILE, RequestTarget, ServedRoot};

/// Default port when none is configured.
pub const DEFAULT_PORT: u16 = 8080;

/// Shortest accepted WebSocket idle timeout.
const MIN_IDLE_TIMEOUT: Duration = Duration::from_secs(1);

/// Server configuration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on (`0` picks a free port).
    pub port: u16,
    /// File or directory to serve.
    pub root: PathBuf,
    /// Watch the root and broadcast reloads.
    pub live_reload_enabled: bool,
    /// Quiet period before a burst of changes triggers a reload.
    pub debounce_ms: u64,
    /// Close WebSocket connections that stay silent this long.
    pub ws_idle_timeout: Duration,
    /// Outbound queue capacity per WebSocket connection.
    pub ws_queue_capacity: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: DEFAULT_PORT,
            root: PathBuf::from("."),
            live_reload_enabled: true,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            ws_idle_timeout: Duration::from_secs(60),
            ws_queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

/// A server whose listener is bound and ready to accept connections.
pub struct Server {
    listener: TcpListener,
    local_addr: SocketAddr,
    state: Arc<AppState>,
    watcher: Option<ChangeWatcher>,
}

impl Server {
    /// Resolve the served root, bind the listener and start the watcher.
    ///
    /// All fatal errors happen here, before any connection is accepted. A
    /// watcher that fails to start only disables live reload.
    ///
    /// # Errors
    ///
    /// Returns an error if the root cannot be resolved or the port cannot be
    /// bound.
    pub async fn bind(config: ServerConfig) -> Result<Self, StartupError> {
        let root = ServedRoot::resolve(&config.root)?;

        let addr = tokio::net::lookup_host((config.host.as_str(), config.port))
            .await
            .ok()
            .and_then(|mut addrs| addrs.next())
            .ok_or_else(|| StartupError::InvalidAddress(format!("{}:{}", config.host, config.port)))?;

        let listener = TcpListener::bind(addr).await.map_err(|source| {
            if source.kind() == std::io::ErrorKind::AddrInUse {
                StartupError::PortInUse { addr }
            } else {
                StartupError::Bind { addr, source }
            }
        })?;
        let local_addr = listener
            .local_addr()
            .map_err(|source| StartupError::Bind { addr, source })?;

        let registry = Arc::new(ConnectionRegistry::new(config.ws_queue_capacity));

        let watcher = if config.live_reload_enabled {
            let mut watcher = ChangeWatcher::new(
                root.path().to_path_buf(),
                Arc::clone(&registry),
                config.debounce_ms,
            );
            match watcher.start() {
                Ok(()) => Some(watcher),
                Err(err) => {
                    tracing::error!(error = %err, "File watcher failed to start, live reload disabled");
                    None
                }
            }
        } else {
            None
        };

        let state = Arc::new(AppState {
            root,
            port: local_addr.port(),
            registry,
            ws_idle_timeout: config.ws_idle_timeout.max(MIN_IDLE_TIMEOUT),
        });

        Ok(Self {
            listener,
            local_addr,
            state,
            watcher,
        })
    }

    /// Address the listener is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Directory being served.
    pub fn root(&self) -> &Path {
        self.state.root.path()
    }

    /// Registry of live WebSocket connections.
    pub fn registry(&self) -> Arc<ConnectionRegistry> {
        Arc::clone(&self.state.registry)
    }

    /// Whether the file watcher is running.
    pub fn live_reload_active(&self) -> bool {
        self.watcher.as_ref().is_some_and(ChangeWatcher::is_watching)
    }

    /// Serve until Ctrl-C.
    ///
    /// # Errors
    ///
    /// Returns an error if the server loop fails.
    pub async fn run(self) -> std::io::Result<()> {
        self.run_until(shutdown_signal()).await
    }

    /// Serve until `shutdown` completes.
    ///
    /// # Errors
    ///
    /// Returns an error if the server loop fails.
    pub async fn run_until<F>(self, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let Self {
            listener,
            local_addr,
            state,
            watcher,
        } = self;
        // The watch stops when this is dropped.
        let _watcher = watcher;

        tracing::info!(
            address = %local_addr,
            root = %state.root.path().display(),
            "Starting server"
        );

        let app = app::create_router(state);
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await
    }
}

/// Bind and serve until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the server fails to start.
pub async fn run_server(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let server = Server::bind(config).await?;
    server.run().await?;
    Ok(())
}

/// Wait for shutdown signal (Ctrl-C).
async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, stopping server...");
}
