//! Server error types.

use std::net::SocketAddr;
use std::path::PathBuf;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Error that prevents the server from starting.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// Serve path does not exist.
    #[error("path not found: {}", path.display())]
    PathNotFound {
        /// Path as given by the operator.
        path: PathBuf,
    },

    /// Serve path exists but cannot be read.
    #[error("cannot read {}", path.display())]
    PathUnreadable {
        /// Path that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Host and port do not form a socket address.
    #[error("invalid listen address: {0}")]
    InvalidAddress(String),

    /// Another process already listens on the port.
    #[error("port {} is already in use ({addr})", addr.port())]
    PortInUse {
        /// Address that was requested.
        addr: SocketAddr,
    },

    /// Any other failure while binding the listener.
    #[error("failed to bind {addr}")]
    Bind {
        /// Address that was requested.
        addr: SocketAddr,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl StartupError {
    /// Whether the operator should be shown usage text alongside the error.
    pub fn is_usage_error(&self) -> bool {
        matches!(
            self,
            Self::PathNotFound { .. } | Self::InvalidAddress(_) | Self::PortInUse { .. }
        )
    }
}

/// Error while serving a single request.
///
/// Never leaks internal detail to the client; the cause is logged instead.
#[derive(Debug, thiserror::Error)]
pub(crate) enum ServerError {
    /// Nothing to serve at the requested path.
    #[error("not found")]
    NotFound,

    /// I/O failure while reading the file.
    #[error("I/O error")]
    Io(#[from] std::io::Error),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        match self {
            Self::NotFound => (StatusCode::NOT_FOUND, "Not Found").into_response(),
            Self::Io(err) if err.kind() == std::io::ErrorKind::NotFound => {
                (StatusCode::NOT_FOUND, "Not Found").into_response()
            }
            Self::Io(err) => {
                tracing::error!(error = %err, "Failed to serve file");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_status() {
        let response = ServerError::NotFound.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_io_not_found_maps_to_404() {
        let err = std::io::Error::from(std::io::ErrorKind::NotFound);
        let response = ServerError::from(err).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_other_io_maps_to_500() {
        let err = std::io::Error::from(std::io::ErrorKind::PermissionDenied);
        let response = ServerError::from(err).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_port_in_use_message() {
        let err = StartupError::PortInUse {
            addr: "127.0.0.1:8080".parse().unwrap(),
        };
        assert_eq!(err.to_string(), "port 8080 is already in use (127.0.0.1:8080)");
        assert!(err.is_usage_error());
    }
}
