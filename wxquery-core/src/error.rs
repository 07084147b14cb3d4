use thiserror::Error;

/// The request never produced a usable envelope.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("{0}")]
    Request(#[from] reqwest::Error),

    #[error("response is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("response is missing weather_data")]
    MissingWeatherData,

    /// Used by non-HTTP transports (and test doubles).
    #[error("{0}")]
    Other(String),
}

/// Why a submission did not produce an answer.
///
/// Both kinds are shown to the user verbatim as `Error: <message>`.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("No query provided")]
    EmptyQuery,

    /// The server answered with `{ "error": ... }`.
    #[error("{0}")]
    Application(String),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl DispatchError {
    /// Text for the status element.
    pub fn status_text(&self) -> String {
        format!("Error: {self}")
    }
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to write chart to {path}")]
    Write {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize chart configuration")]
    Serialize(#[from] serde_json::Error),
}
