//! CLI error types.

use livedir_server::StartupError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Startup(#[from] StartupError),

    #[error("{0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Whether usage text should follow the error message.
    pub(crate) fn is_usage_error(&self) -> bool {
        match self {
            Self::Startup(err) => err.is_usage_error(),
            Self::Io(_) => false,
        }
    }
}
