//! Serve command: arguments and startup.

use std::path::PathBuf;

use clap::Args;
use livedir_server::{DEFAULT_DEBOUNCE_MS, DEFAULT_PORT, Server, ServerConfig};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for serving a directory.
#[derive(Args, Debug)]
pub(crate) struct ServeArgs {
    /// File or directory to serve (a file serves its parent directory).
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Port to listen on.
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Host to bind to.
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Quiet period in milliseconds before changes trigger a reload.
    #[arg(long, default_value_t = DEFAULT_DEBOUNCE_MS)]
    debounce_ms: u64,

    /// Serve files without watching for changes.
    #[arg(long)]
    no_live_reload: bool,

    /// Enable verbose output (request and reload logs).
    #[arg(short, long)]
    pub verbose: bool,
}

impl ServeArgs {
    /// Bind the server and serve until Ctrl-C.
    ///
    /// # Errors
    ///
    /// Returns an error if the path or port is unusable.
    pub(crate) async fn execute(self, output: &Output) -> Result<(), CliError> {
        let server = Server::bind(self.server_config()).await?;
        let addr = server.local_addr();

        output.serving(server.root(), addr);
        output.live_reload(server.live_reload_active());
        tracing::info!(%addr, root = %server.root().display(), "Server started");

        server.run().await?;
        tracing::info!(%addr, "Server stopped");
        Ok(())
    }

    fn server_config(&self) -> ServerConfig {
        ServerConfig {
            host: self.host.clone(),
            port: self.port,
            root: self.path.clone(),
            live_reload_enabled: !self.no_live_reload,
            debounce_ms: self.debounce_ms,
            ..ServerConfig::default()
        }
    }
}
