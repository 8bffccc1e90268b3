//! Operator-facing terminal output.

use std::net::SocketAddr;
use std::path::Path;

use console::{Style, Term};

/// Styled writer for startup and error messages on stderr.
pub(crate) struct Output {
    term: Term,
    dim: Style,
    green: Style,
    yellow: Style,
    red: Style,
    cyan_bold: Style,
}

impl Output {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
            dim: Style::new().dim(),
            green: Style::new().green(),
            yellow: Style::new().yellow(),
            red: Style::new().red(),
            cyan_bold: Style::new().cyan().bold(),
        }
    }

    /// Announce where the server is listening.
    pub(crate) fn serving(&self, root: &Path, addr: SocketAddr) {
        self.line(&format!(
            "Serving {} on {}",
            root.display(),
            self.cyan_bold.apply_to(format!("http://{addr}"))
        ));
    }

    /// Report whether browsers will reload on changes.
    pub(crate) fn live_reload(&self, active: bool) {
        if active {
            self.line(&self.green.apply_to("Live reload: enabled").to_string());
        } else {
            self.line(&self.yellow.apply_to("Live reload: disabled").to_string());
        }
    }

    /// Print an error message (red).
    pub(crate) fn error(&self, msg: &str) {
        self.line(&self.red.apply_to(msg).to_string());
    }

    /// Print usage text after an error.
    pub(crate) fn usage(&self, usage: &str) {
        self.line(&self.dim.apply_to(usage).to_string());
    }

    fn line(&self, msg: &str) {
        let _ = self.term.write_line(msg);
    }
}
