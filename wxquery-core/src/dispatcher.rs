//! Query submission: loading state, one POST, routing the envelope, idle again.

use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;

use crate::{
    chart::{ChartHandle, ChartRenderer},
    error::DispatchError,
    model::{Answer, Outcome},
    series::{LabelZone, build_chart},
    transport::Transport,
    view::{PROCESSING_TEXT, PresentationMode, View},
};

#[derive(Debug)]
pub enum SubmitOutcome {
    /// A chart was rendered for the answer.
    Rendered,
    /// The answer was shown but its payload had nothing to plot.
    NoChart,
    Failed(DispatchError),
    /// A newer submission started before this one finished; its result was dropped.
    Superseded,
}

#[derive(Debug)]
pub struct Dispatcher<T, V, R> {
    transport: T,
    view: V,
    chart: Mutex<ChartHandle<R>>,
    generation: AtomicU64,
    mode: PresentationMode,
    zone: LabelZone,
}

impl<T, V, R> Dispatcher<T, V, R>
where
    T: Transport,
    V: View,
    R: ChartRenderer,
{
    pub fn new(transport: T, view: V, renderer: R) -> Self {
        Self {
            transport,
            view,
            chart: Mutex::new(ChartHandle::new(renderer)),
            generation: AtomicU64::new(0),
            mode: PresentationMode::default(),
            zone: LabelZone::default(),
        }
    }

    pub fn with_mode(mut self, mode: PresentationMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_label_zone(mut self, zone: LabelZone) -> Self {
        self.zone = zone;
        self
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub async fn chart_is_live(&self) -> bool {
        self.chart.lock().await.is_live()
    }

    /// Submit `query` and drive the view through one full query cycle.
    ///
    /// Starting a submission invalidates every earlier one still in flight:
    /// their responses are discarded without touching the view. View writes
    /// happen only while the chart lock is held, and a response re-checks its
    /// generation under that lock before writing anything.
    pub async fn submit(&self, query: &str) -> SubmitOutcome {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let query = query.trim();

        {
            let mut chart = self.chart.lock().await;
            self.enter_loading(&mut chart);

            if query.is_empty() {
                let err = DispatchError::EmptyQuery;
                self.show_error(&err);
                self.view.set_busy(false);
                return SubmitOutcome::Failed(err);
            }
        }

        log::info!("Submitting query #{generation}: {query}");
        let response = self.transport.process_request(query).await;

        let mut chart = self.chart.lock().await;
        if !self.is_current(generation) {
            log::debug!("Dropping response for superseded query #{generation}");
            return SubmitOutcome::Superseded;
        }

        let outcome = match response.and_then(|envelope| envelope.into_outcome()) {
            Ok(Outcome::Answered(answer)) => self.show_answer(&mut chart, answer),
            Ok(Outcome::Failed(message)) => {
                let err = DispatchError::Application(message);
                self.show_error(&err);
                SubmitOutcome::Failed(err)
            }
            Err(transport) => {
                let err = DispatchError::Transport(transport);
                self.show_error(&err);
                SubmitOutcome::Failed(err)
            }
        };

        self.view.set_busy(false);
        outcome
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    fn enter_loading(&self, chart: &mut ChartHandle<R>) {
        self.view.set_busy(true);
        match self.mode {
            PresentationMode::Full => {
                self.view.show_status(PROCESSING_TEXT);
                self.view.show_download_link(None);
                self.view.show_summary(None);
            }
            PresentationMode::Compact => self.view.show_result(PROCESSING_TEXT),
        }
        self.view.show_chart_container(false);

        chart.clear();
    }

    fn show_error(&self, err: &DispatchError) {
        log::warn!("Query failed: {err}");
        let text = err.status_text();
        match self.mode {
            PresentationMode::Full => self.view.show_status(&text),
            PresentationMode::Compact => self.view.show_result(&text),
        }
    }

    fn show_answer(&self, chart: &mut ChartHandle<R>, answer: Answer) -> SubmitOutcome {
        let Answer { summary, weather_data, csv_id } = answer;

        match self.mode {
            PresentationMode::Full => {
                self.view.show_summary(summary.as_deref());
                self.view.show_status(&weather_data.url);
                let href = csv_id.map(|id| self.transport.download_url(&id));
                self.view.show_download_link(href.as_deref());
            }
            PresentationMode::Compact => {
                self.view.show_result(summary.as_deref().unwrap_or_default());
            }
        }
        self.view.show_chart_container(true);

        let Some(spec) = build_chart(&weather_data, self.zone) else {
            return SubmitOutcome::NoChart;
        };

        match chart.replace(&spec) {
            Ok(()) => SubmitOutcome::Rendered,
            Err(err) => {
                log::error!("Failed to render chart: {err}");
                SubmitOutcome::NoChart
            }
        }
    }
}
