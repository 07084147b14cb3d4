//! Turns a weather payload into a multi-axis line chart description.
//!
//! Every parameter found in the first observation becomes one dataset with its
//! own y axis. Axes alternate left/right and only the first one draws grid
//! lines on the chart area.

use chrono::{DateTime, Local, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::model::WeatherPayload;

/// Series colors, assigned by `index % PALETTE.len()`.
pub const PALETTE: [&str; 5] = [
    "rgb(75, 192, 192)",
    "rgb(255, 99, 132)",
    "rgb(54, 162, 235)",
    "rgb(255, 206, 86)",
    "rgb(153, 102, 255)",
];

pub const LINE_TENSION: f64 = 0.1;

/// Time zone used for the `HH:MM` labels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelZone {
    #[default]
    Utc,
    Local,
}

impl LabelZone {
    pub fn as_str(&self) -> &'static str {
        match self {
            LabelZone::Utc => "utc",
            LabelZone::Local => "local",
        }
    }

    pub const fn all() -> &'static [LabelZone] {
        &[LabelZone::Utc, LabelZone::Local]
    }
}

impl std::fmt::Display for LabelZone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for LabelZone {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "utc" => Ok(LabelZone::Utc),
            "local" => Ok(LabelZone::Local),
            _ => Err(anyhow::anyhow!("Unknown label zone '{value}'. Supported: utc, local.")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisPosition {
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub label: String,
    pub data: Vec<Option<f64>>,
    pub border_color: &'static str,
    pub tension: f64,
    pub y_axis_id: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Axis {
    pub id: String,
    pub position: AxisPosition,
    pub draw_on_chart_area: bool,
    pub tick_color: &'static str,
}

/// Chart-ready labels, datasets and axes.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
    pub axes: Vec<Axis>,
}

impl ChartSpec {
    /// Full Chart.js line chart configuration.
    pub fn to_chartjs(&self) -> Value {
        let datasets: Vec<Value> = self
            .datasets
            .iter()
            .map(|d| {
                json!({
                    "label": d.label,
                    "data": d.data,
                    "borderColor": d.border_color,
                    "tension": d.tension,
                    "yAxisID": d.y_axis_id,
                })
            })
            .collect();

        let mut scales = Map::new();
        for axis in &self.axes {
            scales.insert(
                axis.id.clone(),
                json!({
                    "type": "linear",
                    "display": true,
                    "position": axis.position,
                    "grid": { "drawOnChartArea": axis.draw_on_chart_area },
                    "ticks": { "color": axis.tick_color },
                }),
            );
        }

        json!({
            "type": "line",
            "data": { "labels": self.labels, "datasets": datasets },
            "options": {
                "responsive": true,
                "maintainAspectRatio": false,
                "interaction": { "mode": "index", "intersect": false },
                "scales": scales,
            }
        })
    }
}

/// Build the chart for `payload`, or `None` when there is nothing to plot.
///
/// The parameter set and order come from the first timestamp; later
/// timestamps missing a parameter leave a gap in that series.
pub fn build_chart(payload: &WeatherPayload, zone: LabelZone) -> Option<ChartSpec> {
    let Some(properties) = payload.first_properties() else {
        log::error!("Data is not in the expected format: {payload:?}");
        return None;
    };

    let labels = properties.keys().map(|ts| format_label(ts, zone)).collect();

    let (_, first) = properties.first()?;
    let parameters: Vec<&String> = first.keys().collect();

    let datasets = parameters
        .iter()
        .enumerate()
        .map(|(index, param)| Dataset {
            label: (*param).clone(),
            data: properties
                .values()
                .map(|obs| obs.get(*param).copied().flatten())
                .collect(),
            border_color: color_for(index),
            tension: LINE_TENSION,
            y_axis_id: (*param).clone(),
        })
        .collect();

    let axes = parameters
        .iter()
        .enumerate()
        .map(|(index, param)| Axis {
            id: (*param).clone(),
            position: if index % 2 == 0 { AxisPosition::Left } else { AxisPosition::Right },
            draw_on_chart_area: index == 0,
            tick_color: color_for(index),
        })
        .collect();

    Some(ChartSpec { labels, datasets, axes })
}

pub fn color_for(index: usize) -> &'static str {
    PALETTE[index % PALETTE.len()]
}

/// Offset-less ISO 8601 forms, read as wall-clock time in the label zone.
const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// `HH:MM` in 24-hour form. Unparseable timestamps are passed through.
pub fn format_label(timestamp: &str, zone: LabelZone) -> String {
    if let Ok(dt) = DateTime::parse_from_rfc3339(timestamp) {
        return match zone {
            LabelZone::Utc => dt.with_timezone(&Utc).format("%H:%M").to_string(),
            LabelZone::Local => dt.with_timezone(&Local).format("%H:%M").to_string(),
        };
    }

    // Without an offset the time already is in the label zone.
    match NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(timestamp, fmt).ok())
    {
        Some(naive) => naive.format("%H:%M").to_string(),
        None => {
            log::warn!("Could not parse timestamp '{timestamp}'");
            timestamp.to_string()
        }
    }
}
