//! livedir CLI - serve a directory with live reload.

mod error;
mod output;
mod serve;

use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use error::CliError;
use output::Output;
use serve::ServeArgs;

/// Serve a directory over HTTP and reload browsers when its files change.
#[derive(Parser)]
#[command(name = "livedir", version, about)]
struct Cli {
    #[command(flatten)]
    serve: ServeArgs,
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.serve.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = tokio::runtime::Runtime::new()
        .map_err(CliError::from)
        .and_then(|rt| rt.block_on(cli.serve.execute(&output)));

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        if err.is_usage_error() {
            output.usage(&Cli::command().render_usage().to_string());
        }
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_help_is_not_a_failure() {
        let err = Cli::try_parse_from(["livedir", "--help"]).err().unwrap();

        assert_eq!(err.kind(), ErrorKind::DisplayHelp);
        assert_eq!(err.exit_code(), 0);
    }

    #[test]
    fn test_usage_mentions_path() {
        let usage = Cli::command().render_usage().to_string();

        assert!(usage.contains("livedir"));
        assert!(usage.contains("[PATH]"));
    }
}
