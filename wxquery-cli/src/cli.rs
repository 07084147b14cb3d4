use anyhow::{Context, Result, anyhow};
use clap::{Args, Parser, Subcommand};
use inquire::{InquireError, Select, Text};
use std::{
    fs,
    path::{Path, PathBuf},
    process::ExitCode,
};
use wxquery_core::{
    ChartHandle, Config, Dispatcher, LabelZone, PresentationMode, ResponseEnvelope,
    SubmitOutcome, WeatherPayload, build_chart,
};

use crate::{render::HtmlChartRenderer, terminal::TerminalView};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "wxquery", version, about = "Ask a weather backend and chart the answer")]
pub struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Submit one free-text query.
    Ask {
        /// e.g. "Is it a good day to run in Amsterdam tomorrow?"
        query: String,

        #[command(flatten)]
        opts: RunOpts,
    },

    /// Keep asking queries; each answer replaces the previous chart.
    Repl {
        #[command(flatten)]
        opts: RunOpts,
    },

    /// Chart a saved response envelope or bare weather payload.
    Render {
        /// JSON file to read.
        input: PathBuf,

        #[arg(long)]
        out: Option<PathBuf>,

        #[arg(long)]
        zone: Option<LabelZone>,
    },

    /// Interactively edit the configuration file.
    Configure,
}

/// Per-run overrides of the config file.
#[derive(Debug, Clone, Default, Args)]
pub struct RunOpts {
    /// Backend base URL.
    #[arg(long)]
    pub base_url: Option<String>,

    #[arg(long)]
    pub mode: Option<PresentationMode>,

    /// Time zone of the chart labels.
    #[arg(long)]
    pub zone: Option<LabelZone>,

    /// Where to write the chart page.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

impl RunOpts {
    fn apply(self, mut cfg: Config) -> Config {
        if let Some(base_url) = self.base_url {
            cfg.base_url = base_url;
        }
        if let Some(mode) = self.mode {
            cfg.mode = mode;
        }
        if let Some(zone) = self.zone {
            cfg.label_zone = zone;
        }
        if let Some(out) = self.out {
            cfg.chart_path = out;
        }
        cfg
    }
}

type CliDispatcher =
    Dispatcher<wxquery_core::HttpTransport, TerminalView<std::io::Stdout>, HtmlChartRenderer>;

impl Cli {
    /// `ExitCode::FAILURE` when a single `ask` ends in an error;
    /// the error itself has already been printed by the view.
    pub async fn run(self) -> Result<ExitCode> {
        match self.command {
            Command::Ask { query, opts } => {
                let cfg = opts.apply(Config::load()?);
                let dispatcher = build_dispatcher(&cfg)?;
                let outcome = dispatcher.submit(&query).await;
                report(&outcome, &cfg);
                return Ok(exit_code(&outcome));
            }
            Command::Repl { opts } => {
                let cfg = opts.apply(Config::load()?);
                let dispatcher = build_dispatcher(&cfg)?;
                repl(&dispatcher, &cfg).await?;
            }
            Command::Render { input, out, zone } => {
                let cfg = Config::load()?;
                render_file(
                    &input,
                    out.unwrap_or(cfg.chart_path),
                    zone.unwrap_or(cfg.label_zone),
                )?;
            }
            Command::Configure => configure()?,
        }

        Ok(ExitCode::SUCCESS)
    }
}

fn build_dispatcher(cfg: &Config) -> Result<CliDispatcher> {
    let transport = cfg.transport()?;
    log::debug!("Using backend {}", transport.base_url());

    Ok(Dispatcher::new(
        transport,
        TerminalView::stdout(),
        HtmlChartRenderer::new(&cfg.chart_path),
    )
    .with_mode(cfg.mode)
    .with_label_zone(cfg.label_zone))
}

fn exit_code(outcome: &SubmitOutcome) -> ExitCode {
    match outcome {
        SubmitOutcome::Failed(_) => ExitCode::FAILURE,
        _ => ExitCode::SUCCESS,
    }
}

fn report(outcome: &SubmitOutcome, cfg: &Config) {
    match outcome {
        SubmitOutcome::Rendered => println!("Chart: {}", cfg.chart_path.display()),
        SubmitOutcome::NoChart => println!("No observation data to chart."),
        SubmitOutcome::Failed(_) | SubmitOutcome::Superseded => {}
    }
}

async fn repl(dispatcher: &CliDispatcher, cfg: &Config) -> Result<()> {
    loop {
        let prompt = Text::new("Query:").with_help_message("empty line or Esc to quit");
        let query = match prompt.prompt() {
            Ok(q) if q.trim().is_empty() => break,
            Ok(q) => q,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(err) => return Err(err).context("Failed to read query"),
        };

        let outcome = dispatcher.submit(&query).await;
        report(&outcome, cfg);
    }

    Ok(())
}

fn render_file(input: &Path, out: PathBuf, zone: LabelZone) -> Result<()> {
    let contents = fs::read_to_string(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    let payload = parse_saved_response(&contents)
        .with_context(|| format!("Failed to load weather data from {}", input.display()))?;

    let Some(spec) = build_chart(&payload, zone) else {
        println!("No observation data to chart.");
        return Ok(());
    };

    let mut chart = ChartHandle::new(HtmlChartRenderer::new(&out));
    chart.replace(&spec)?;
    println!("Chart: {}", out.display());

    Ok(())
}

/// Accepts either a full `/process_request` envelope or a bare payload.
fn parse_saved_response(contents: &str) -> Result<WeatherPayload> {
    let value: serde_json::Value =
        serde_json::from_str(contents).context("File is not valid JSON")?;

    if value.get("features").is_some() {
        return serde_json::from_value(value).context("Malformed weather payload");
    }

    let envelope: ResponseEnvelope =
        serde_json::from_value(value).context("Malformed response envelope")?;
    if let Some(error) = envelope.error {
        return Err(anyhow!("Saved response is an error: {error}"));
    }

    envelope.weather_data.ok_or_else(|| anyhow!("Saved response has no weather_data"))
}

fn configure() -> Result<()> {
    let mut cfg = Config::load()?;

    cfg.base_url = Text::new("Backend base URL:")
        .with_default(&cfg.base_url)
        .prompt()
        .context("Failed to read base URL")?;

    cfg.mode = Select::new("Presentation mode:", PresentationMode::all().to_vec())
        .with_starting_cursor(position(PresentationMode::all(), cfg.mode))
        .prompt()
        .context("Failed to read presentation mode")?;

    cfg.label_zone = Select::new("Label time zone:", LabelZone::all().to_vec())
        .with_starting_cursor(position(LabelZone::all(), cfg.label_zone))
        .prompt()
        .context("Failed to read label time zone")?;

    let chart_path = cfg.chart_path.display().to_string();
    cfg.chart_path = Text::new("Chart output file:")
        .with_default(&chart_path)
        .prompt()
        .context("Failed to read chart path")?
        .into();

    cfg.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());

    Ok(())
}

fn position<T: PartialEq>(all: &[T], current: T) -> usize {
    all.iter().position(|v| *v == current).unwrap_or(0)
}
