use std::{
    fmt::Debug,
    io::{self, Write},
    sync::Mutex,
};

use wxquery_core::{View, view::BUSY_LABEL};

/// Prints view updates as plain lines. Hidden elements print nothing.
#[derive(Debug)]
pub struct TerminalView<W> {
    out: Mutex<W>,
}

impl TerminalView<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send + Debug> TerminalView<W> {
    pub fn new(out: W) -> Self {
        Self { out: Mutex::new(out) }
    }

    fn line(&self, text: &str) {
        let Ok(mut out) = self.out.lock() else {
            return;
        };
        if let Err(err) = writeln!(out, "{text}") {
            log::warn!("Failed to write to terminal: {err}");
        }
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        match self.out.into_inner() {
            Ok(out) => out,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl<W: Write + Send + Debug> View for TerminalView<W> {
    fn set_busy(&self, busy: bool) {
        if busy {
            self.line(BUSY_LABEL);
        }
    }

    fn show_status(&self, text: &str) {
        self.line(text);
    }

    fn show_summary(&self, summary: Option<&str>) {
        if let Some(summary) = summary {
            self.line(&format!("\n{summary}\n"));
        }
    }

    fn show_download_link(&self, href: Option<&str>) {
        if let Some(href) = href {
            self.line(&format!("Download CSV: {href}"));
        }
    }

    fn show_chart_container(&self, _visible: bool) {}

    fn show_result(&self, text: &str) {
        self.line(text);
    }
}
