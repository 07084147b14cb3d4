use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::TransportError;

/// Parameter name → observed value, in the order the backend sent them.
///
/// Values that are `null` or not numbers are kept as `None` so they show up
/// as gaps in the chart instead of failing the whole payload.
pub type Observation = IndexMap<String, Option<f64>>;

/// Body of `POST /process_request`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QueryRequest {
    pub query: String,
}

/// Raw weather observation JSON returned by the backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct WeatherPayload {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub features: Vec<Feature>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Feature {
    /// ISO timestamp → observation. `None` when the key was missing or null.
    #[serde(default, deserialize_with = "deserialize_properties")]
    pub properties: Option<IndexMap<String, Observation>>,
}

impl WeatherPayload {
    /// Properties of the first feature, if present and non-empty.
    pub fn first_properties(&self) -> Option<&IndexMap<String, Observation>> {
        self.features
            .first()
            .and_then(|f| f.properties.as_ref())
            .filter(|p| !p.is_empty())
    }
}

/// Outer JSON response: either `error` or the success fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ResponseEnvelope {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub llm_summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather_data: Option<WeatherPayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub csv_id: Option<String>,
}

/// Successful answer extracted from an envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct Answer {
    pub summary: Option<String>,
    pub weather_data: WeatherPayload,
    pub csv_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The server reported an application error.
    Failed(String),
    Answered(Answer),
}

impl ResponseEnvelope {
    /// Classify the envelope. `error` wins over any success field.
    pub fn into_outcome(self) -> Result<Outcome, TransportError> {
        if let Some(message) = self.error {
            return Ok(Outcome::Failed(message));
        }

        let weather_data = self.weather_data.ok_or(TransportError::MissingWeatherData)?;

        Ok(Outcome::Answered(Answer {
            summary: self.llm_summary,
            weather_data,
            csv_id: self.csv_id,
        }))
    }
}

fn deserialize_properties<'de, D>(
    deserializer: D,
) -> Result<Option<IndexMap<String, Observation>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<IndexMap<String, IndexMap<String, serde_json::Value>>> =
        Option::deserialize(deserializer)?;

    Ok(raw.map(|props| {
        props
            .into_iter()
            .map(|(ts, values)| {
                let values = values.into_iter().map(|(k, v)| (k, v.as_f64())).collect();
                (ts, values)
            })
            .collect()
    }))
}
