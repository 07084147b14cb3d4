//! Core library for the `wxquery` CLI.
//!
//! This crate defines:
//! - Wire models for the `/process_request` envelope and weather payload
//! - The request dispatcher and the view/transport seams it drives
//! - The series transformer producing Chart.js-ready line charts
//! - Ownership of the single live chart
//! - Configuration handling
//!
//! It is used by `wxquery-cli`, but can also be reused by other front ends.

pub mod chart;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod model;
pub mod series;
pub mod transport;
pub mod view;

pub use chart::{ChartHandle, ChartInstance, ChartRenderer};
pub use config::Config;
pub use dispatcher::{Dispatcher, SubmitOutcome};
pub use error::{DispatchError, RenderError, TransportError};
pub use model::{ResponseEnvelope, WeatherPayload};
pub use series::{ChartSpec, LabelZone, build_chart};
pub use transport::{HttpTransport, Transport};
pub use view::{PresentationMode, View};
