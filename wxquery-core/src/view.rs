use serde::{Deserialize, Serialize};
use std::fmt::Debug;

pub const IDLE_LABEL: &str = "Submit";
pub const BUSY_LABEL: &str = "Please wait...";
pub const PROCESSING_TEXT: &str = "Processing...";

/// Which output elements a submission drives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresentationMode {
    /// Status line, summary, download link and chart.
    #[default]
    Full,
    /// A single result line (error or summary) plus the chart.
    Compact,
}

impl PresentationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PresentationMode::Full => "full",
            PresentationMode::Compact => "compact",
        }
    }

    pub const fn all() -> &'static [PresentationMode] {
        &[PresentationMode::Full, PresentationMode::Compact]
    }
}

impl std::fmt::Display for PresentationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PresentationMode {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "full" => Ok(PresentationMode::Full),
            "compact" => Ok(PresentationMode::Compact),
            _ => Err(anyhow::anyhow!(
                "Unknown presentation mode '{value}'. Supported: full, compact."
            )),
        }
    }
}

/// Output surface of the query form.
///
/// Methods take `&self`; implementations use interior mutability so a
/// dispatcher can be shared between tasks.
pub trait View: Send + Sync + Debug {
    /// Busy disables the submit control and shows [`BUSY_LABEL`].
    fn set_busy(&self, busy: bool);

    /// Status line (the source URL, `Processing...`, or an error).
    fn show_status(&self, text: &str);

    /// `None` hides the summary.
    fn show_summary(&self, summary: Option<&str>);

    /// `None` hides the download link.
    fn show_download_link(&self, href: Option<&str>);

    fn show_chart_container(&self, visible: bool);

    /// Single result line used by [`PresentationMode::Compact`].
    fn show_result(&self, text: &str);
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::Mutex;

    /// Snapshot of what a page would currently show.
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct ViewState {
        pub busy: bool,
        pub button_label: String,
        pub status: String,
        pub summary: Option<String>,
        pub download_link: Option<String>,
        pub chart_visible: bool,
        pub result: String,
        pub busy_transitions: Vec<bool>,
    }

    #[derive(Debug, Default)]
    pub struct RecordingView {
        state: Mutex<ViewState>,
    }

    impl RecordingView {
        pub fn state(&self) -> ViewState {
            self.state.lock().unwrap().clone()
        }
    }

    impl View for RecordingView {
        fn set_busy(&self, busy: bool) {
            let mut s = self.state.lock().unwrap();
            s.busy = busy;
            s.button_label = if busy { BUSY_LABEL } else { IDLE_LABEL }.to_string();
            s.busy_transitions.push(busy);
        }

        fn show_status(&self, text: &str) {
            self.state.lock().unwrap().status = text.to_string();
        }

        fn show_summary(&self, summary: Option<&str>) {
            self.state.lock().unwrap().summary = summary.map(str::to_string);
        }

        fn show_download_link(&self, href: Option<&str>) {
            self.state.lock().unwrap().download_link = href.map(str::to_string);
        }

        fn show_chart_container(&self, visible: bool) {
            self.state.lock().unwrap().chart_visible = visible;
        }

        fn show_result(&self, text: &str) {
            self.state.lock().unwrap().result = text.to_string();
        }
    }
}
